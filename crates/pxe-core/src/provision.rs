//! prepare / delete / apply
//!
//! Every step edits the DHCP configuration through the insert-if-absent and
//! remove-if-present operations, so commands can be re-run safely after a
//! partial failure. The configuration file is only rewritten when something
//! actually changed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pxe_dhcpconf::{BlockType, ChangeSet, ConfigDocument, insert_if_absent, remove_if_present};
use pxe_softlayer::{Device, DeviceKind, Inventory, SubnetFilter, Vlan};

use crate::manifest::{Machine, Manifest};
use crate::password;
use crate::selection::Selection;
use crate::system::{ServiceControl, ip_to_hex};
use crate::templates::{AutoyastParams, TemplateSet, autoyast_vars};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct PrepareOptions {
    /// Write the root password in clear text instead of SHA-512 crypt
    pub unencrypted_password: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    /// Skip the DHCP restart and reboots; only wait for notifications
    pub listen_only: bool,
}

/// A host that received DHCP configuration and an autoyast profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedHost {
    pub hostname: String,
    pub ip: String,
    /// `network/cidr` of the subnet the address belongs to
    pub subnet: String,
    pub autoyast: PathBuf,
}

/// Outcome of [`Provisioner::prepare`]
#[derive(Debug, Default)]
pub struct PrepareReport {
    pub changes: ChangeSet,
    pub hosts: Vec<PreparedHost>,
    /// Hostnames without a reserved address in the VLAN
    pub skipped: Vec<String>,
    /// Whether the DHCP configuration was rewritten
    pub saved: bool,
}

/// Outcome of [`Provisioner::delete`]
#[derive(Debug, Default)]
pub struct DeleteReport {
    pub removed: Vec<String>,
    /// Selected hosts that had no host section
    pub not_configured: Vec<String>,
    pub saved: bool,
}

/// Outcome of [`Provisioner::apply`]
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Configured hosts with the device each resolved to
    pub devices: Vec<Device>,
    /// Whether the DHCP service was restarted and the devices rebooted
    pub triggered: bool,
}

/// Drives the provisioning commands against one manifest and inventory.
pub struct Provisioner {
    manifest: Manifest,
    inventory: Arc<dyn Inventory>,
    templates: TemplateSet,
    boot_ip: String,
}

impl Provisioner {
    pub fn new(manifest: Manifest, inventory: Arc<dyn Inventory>, boot_ip: impl Into<String>) -> Self {
        let templates = TemplateSet::from_manifest(&manifest);
        Self {
            manifest,
            inventory,
            templates,
            boot_ip: boot_ip.into(),
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn boot_ip(&self) -> &str {
        &self.boot_ip
    }

    fn load_dhcp_conf(&self) -> Result<ConfigDocument> {
        let doc = ConfigDocument::from_file(self.manifest.dhcp_conf())?;
        self.require_section(&doc, BlockType::SharedNetwork)?;
        self.require_section(&doc, BlockType::Group)?;
        Ok(doc)
    }

    fn require_section(&self, doc: &ConfigDocument, kind: BlockType) -> Result<()> {
        let present = match kind {
            BlockType::SharedNetwork => doc.shared_network().is_some(),
            BlockType::Group => doc.group().is_some(),
            _ => true,
        };
        if present {
            Ok(())
        } else {
            Err(Error::DhcpStructure {
                path: self.manifest.dhcp_conf().to_path_buf(),
                section: kind.keyword(),
            })
        }
    }

    /// Bare-metal devices for a selection, one per hostname.
    ///
    /// Every requested hostname must resolve, and no device may carry more
    /// than one of the manifest's machine tags.
    pub async fn gather_devices(&self, selection: &Selection) -> Result<Vec<Device>> {
        let devices = match selection {
            Selection::Hostnames(hostnames) => {
                let devices = self
                    .inventory
                    .devices_by_hostname(hostnames, DeviceKind::BareMetal)
                    .await?;
                let found: HashSet<&str> = devices.iter().map(|d| d.hostname.as_str()).collect();
                let missing: Vec<&str> = hostnames
                    .iter()
                    .map(String::as_str)
                    .filter(|h| !found.contains(h))
                    .collect();
                if !missing.is_empty() {
                    return Err(Error::MissingDevices {
                        hostnames: missing.join(", "),
                    });
                }
                devices
            }
            Selection::Tags(tags) => {
                self.inventory
                    .devices_by_tag(tags, DeviceKind::BareMetal)
                    .await?
            }
        };

        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(devices.len());
        for device in devices {
            self.install_tag(&device)?;
            if seen.insert(device.hostname.clone()) {
                unique.push(device);
            }
        }
        tracing::debug!(count = unique.len(), "gathered devices");
        Ok(unique)
    }

    /// The single manifest tag a device carries, if any.
    fn install_tag<'m>(&'m self, device: &Device) -> Result<Option<&'m str>> {
        let valid = self.manifest.machine_tags();
        let matched: Vec<&str> = valid
            .iter()
            .copied()
            .filter(|tag| device.has_tag(tag))
            .collect();
        match matched.as_slice() {
            [] => Ok(None),
            [tag] => Ok(Some(*tag)),
            _ => Err(Error::MultipleTags {
                device_id: device.id,
                hostname: device.hostname.clone(),
                tags: device.tags.join(", "),
                valid: valid.join(", "),
            }),
        }
    }

    fn machine_for(&self, device: &Device) -> Result<&Machine> {
        self.install_tag(device)?
            .and_then(|tag| self.manifest.machine(tag))
            .ok_or_else(|| Error::NoMachineForDevice {
                device_id: device.id,
                hostname: device.hostname.clone(),
                tags: device.tags.join(", "),
            })
    }

    async fn provisioning_vlan(&self) -> Result<Vlan> {
        let vlan_ref = self.manifest.vlan_ref();
        self.inventory
            .vlan(&vlan_ref, SubnetFilter::private_portable())
            .await?
            .ok_or_else(|| Error::VlanNotFound(vlan_ref.to_string()))
    }

    /// Configure DHCP and write autoyast profiles for the selected hosts.
    pub async fn prepare(
        &self,
        selection: &Selection,
        options: PrepareOptions,
    ) -> Result<PrepareReport> {
        let devices = self.gather_devices(selection).await?;
        if devices.is_empty() {
            return Err(Error::NoMatchingDevices);
        }
        let hostnames: Vec<&str> = devices.iter().map(|d| d.hostname.as_str()).collect();
        tracing::info!(hosts = %hostnames.join(", "), "configuring DHCP");

        let vlan = self.provisioning_vlan().await?;
        let mut doc = self.load_dhcp_conf()?;
        let mut report = PrepareReport::default();

        let boot_subnet = self
            .inventory
            .subnet_for_ip(&self.boot_ip)
            .await?
            .ok_or_else(|| Error::BootSubnetNotFound {
                ip: self.boot_ip.clone(),
            })?;
        self.ensure_subnet(&mut doc, &boot_subnet, &mut report.changes)?;

        for device in &devices {
            let machine = self.machine_for(device)?;
            let Some((ip, subnet)) = self
                .inventory
                .ip_info_by_note_in_vlan(&vlan, &device.hostname)
                .await?
            else {
                tracing::warn!(
                    hostname = %device.hostname,
                    "no reserved IP noted with this hostname in the VLAN, skipping"
                );
                report.skipped.push(device.hostname.clone());
                continue;
            };
            tracing::info!(
                hostname = %device.hostname,
                %ip,
                subnet = %subnet.identifier(),
                "reserved IP found"
            );

            self.ensure_subnet(&mut doc, &subnet, &mut report.changes)?;

            let host = self.templates.host_entry(device, &ip, &machine.image)?;
            if let Some(group) = doc.group_mut()
                && !insert_if_absent(group, host, &mut report.changes)
            {
                tracing::info!(hostname = %device.hostname, "host already configured in DHCP");
            }

            // Profiles are always regenerated; the template may have changed
            let autoyast = self.write_autoyast(device, machine, &ip, &subnet, options)?;
            report.hosts.push(PreparedHost {
                hostname: device.hostname.clone(),
                ip,
                subnet: subnet.identifier(),
                autoyast,
            });
        }

        report.saved = doc.save_if_changed(&report.changes)?;
        Ok(report)
    }

    fn ensure_subnet(
        &self,
        doc: &mut ConfigDocument,
        subnet: &pxe_softlayer::Subnet,
        changes: &mut ChangeSet,
    ) -> Result<()> {
        let entry = self.templates.subnet_entry(&self.boot_ip, subnet)?;
        if let Some(shared) = doc.shared_network_mut()
            && !insert_if_absent(shared, entry, changes)
        {
            tracing::debug!(subnet = %subnet.identifier(), "subnet already configured in DHCP");
        }
        Ok(())
    }

    fn write_autoyast(
        &self,
        device: &Device,
        machine: &Machine,
        ip: &str,
        subnet: &pxe_softlayer::Subnet,
        options: PrepareOptions,
    ) -> Result<PathBuf> {
        let clear = device.password.as_deref().unwrap_or_default();
        if device.password.is_none() {
            tracing::warn!(hostname = %device.hostname, "device reports no root password");
        }
        let root_password = if options.unencrypted_password {
            clear.to_string()
        } else {
            password::encrypt(clear)?
        };

        let params = AutoyastParams {
            ip,
            subnet,
            boot_ip: &self.boot_ip,
            listen_port: self.manifest.listen_port(),
            root_password: &root_password,
            password_encrypted: !options.unencrypted_password,
        };
        let out = self.manifest.autoyast_path(&ip_to_hex(ip)?);
        self.templates
            .render_autoyast(&machine.yast_template, &out, &autoyast_vars(device, &params))?;
        tracing::info!(hostname = %device.hostname, path = %out.display(), "autoyast file generated");
        Ok(out)
    }

    /// Remove the host sections of the selected hosts.
    pub async fn delete(&self, selection: &Selection) -> Result<DeleteReport> {
        let devices = self.gather_devices(selection).await?;
        if devices.is_empty() {
            return Err(Error::NoMatchingDevices);
        }

        let mut doc = self.load_dhcp_conf()?;
        let mut changes = ChangeSet::new();
        let mut report = DeleteReport::default();

        if let Some(group) = doc.group_mut() {
            for device in &devices {
                if remove_if_present(group, BlockType::Host, Some(&device.hostname), &mut changes) {
                    tracing::info!(hostname = %device.hostname, "DHCP configuration removed");
                    report.removed.push(device.hostname.clone());
                } else {
                    tracing::info!(hostname = %device.hostname, "DHCP configuration not found");
                    report.not_configured.push(device.hostname.clone());
                }
            }
        }

        report.saved = doc.save_if_changed(&changes)?;
        Ok(report)
    }

    /// Hostnames of the host sections currently in the DHCP group.
    pub fn configured_hosts(&self) -> Result<Vec<String>> {
        let doc = self.load_dhcp_conf()?;
        Ok(host_names(&doc))
    }

    /// Restart DHCP and reboot every configured host into its installer.
    ///
    /// All hosts must resolve to a device before anything is restarted.
    pub async fn apply(
        &self,
        options: ApplyOptions,
        service: &dyn ServiceControl,
    ) -> Result<ApplyReport> {
        let hosts = self.configured_hosts()?;
        if hosts.is_empty() {
            return Err(Error::NoHostsConfigured);
        }

        let mut report = ApplyReport::default();
        for hostname in &hosts {
            tracing::info!(%hostname, "gathering device information");
            let device = self
                .inventory
                .device_by_hostname(hostname)
                .await?
                .ok_or_else(|| Error::DeviceNotFound(hostname.clone()))?;
            report.devices.push(device);
        }

        if options.listen_only {
            return Ok(report);
        }

        service.restart(self.manifest.dhcp_service()).await?;
        for device in &report.devices {
            tracing::info!(hostname = %device.hostname, device_id = device.id, "triggering OS install");
            self.inventory.reboot_soft(device.id).await?;
        }
        report.triggered = true;
        Ok(report)
    }
}

/// Hostnames configured in the DHCP file at `path`.
pub fn configured_hosts_in(path: &Path) -> Result<Vec<String>> {
    Ok(host_names(&ConfigDocument::from_file(path)?))
}

/// Names of the host sections in the document's group.
pub fn host_names(doc: &ConfigDocument) -> Vec<String> {
    doc.group()
        .and_then(|group| group.children(BlockType::Host))
        .map(|hosts| {
            hosts
                .iter()
                .filter_map(|h| h.name().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
