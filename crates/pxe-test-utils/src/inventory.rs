//! In-memory [`Inventory`] for workflow tests.
//!
//! [`FakeInventory::lab`] gives a ready-made topology: a boot server at
//! [`BOOT_IP`] in its own subnet and a provisioning VLAN with one private
//! portable subnet. Devices and reserved addresses are added per test.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use pxe_softlayer::{
    AddressSpace, Device, DeviceKind, Inventory, Result, Subnet, SubnetFilter, SubnetType, Vlan,
    VlanRef,
};

/// Address of the boot server in the lab topology.
pub const BOOT_IP: &str = "10.0.0.2";
pub const BOOT_SUBNET_ID: u64 = 100;
pub const VLAN_ID: u64 = 1234;
pub const VLAN_NAME: &str = "provisioning";
pub const PROVISIONING_SUBNET_ID: u64 = 200;

/// A `/26` subnet starting at `network`, gateway at `.1`.
pub fn subnet(id: u64, network: &str, subnet_type: SubnetType) -> Subnet {
    let prefix = network.rsplit_once('.').map_or(network, |(p, _)| p);
    Subnet {
        id,
        network: network.to_string(),
        netmask: "255.255.255.192".to_string(),
        broadcast: Some(format!("{prefix}.63")),
        gateway: Some(format!("{prefix}.1")),
        cidr: 26,
        address_space: Some(AddressSpace::Private),
        subnet_type: Some(subnet_type),
    }
}

/// A bare-metal device with a MAC address and root password.
pub fn device(id: u64, hostname: &str, tags: &[&str]) -> Device {
    Device {
        id,
        hostname: hostname.to_string(),
        domain: "lab.example.com".to_string(),
        ip: None,
        mac: Some(format!("00:16:3e:00:00:{:02x}", id % 256)),
        password: Some(format!("{hostname}-secret")),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        subnet_id: None,
    }
}

#[derive(Default)]
pub struct FakeInventory {
    devices: Vec<Device>,
    vlans: Vec<Vlan>,
    subnets_by_ip: HashMap<String, Subnet>,
    notes: HashMap<(u64, String), Vec<String>>,
    reboots: Mutex<Vec<u64>>,
}

impl FakeInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Boot subnet plus the provisioning VLAN, no devices.
    pub fn lab() -> Self {
        let portable = subnet(PROVISIONING_SUBNET_ID, "10.1.0.0", SubnetType::Portable);
        let mut primary = subnet(300, "10.2.0.0", SubnetType::Primary);
        primary.address_space = Some(AddressSpace::Public);

        Self::new()
            .with_ip_subnet(BOOT_IP, subnet(BOOT_SUBNET_ID, "10.0.0.0", SubnetType::Primary))
            .with_vlan(Vlan {
                id: VLAN_ID,
                name: Some(VLAN_NAME.to_string()),
                number: 901,
                datacenter: Some("dal09".to_string()),
                subnets: vec![portable, primary],
            })
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.devices.push(device);
        self
    }

    pub fn with_vlan(mut self, vlan: Vlan) -> Self {
        self.vlans.push(vlan);
        self
    }

    /// Make `subnet_for_ip(ip)` return `subnet`.
    pub fn with_ip_subnet(mut self, ip: &str, subnet: Subnet) -> Self {
        self.subnets_by_ip.insert(ip.to_string(), subnet);
        self
    }

    /// Reserve `ip` in `subnet_id` with `note` as its note.
    pub fn with_note(mut self, subnet_id: u64, note: &str, ip: &str) -> Self {
        self.notes
            .entry((subnet_id, note.to_string()))
            .or_default()
            .push(ip.to_string());
        self
    }

    /// Device ids passed to `reboot_soft`, in call order.
    pub fn rebooted(&self) -> Vec<u64> {
        self.reboots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Inventory for FakeInventory {
    async fn devices_by_hostname(
        &self,
        hostnames: &[String],
        _kind: DeviceKind,
    ) -> Result<Vec<Device>> {
        Ok(self
            .devices
            .iter()
            .filter(|d| hostnames.contains(&d.hostname))
            .cloned()
            .collect())
    }

    async fn devices_by_tag(&self, tags: &[String], _kind: DeviceKind) -> Result<Vec<Device>> {
        Ok(self
            .devices
            .iter()
            .filter(|d| tags.iter().any(|t| d.has_tag(t)))
            .cloned()
            .collect())
    }

    async fn vlan(&self, vlan: &VlanRef, filter: SubnetFilter) -> Result<Option<Vlan>> {
        let found = self.vlans.iter().find(|v| match vlan {
            VlanRef::Id(id) => v.id == *id,
            VlanRef::Name(name) => v.name.as_deref() == Some(name.as_str()),
        });
        Ok(found.map(|v| {
            let mut v = v.clone();
            v.subnets.retain(|s| filter.matches(s));
            v
        }))
    }

    async fn subnet_for_ip(&self, ip: &str) -> Result<Option<Subnet>> {
        Ok(self.subnets_by_ip.get(ip).cloned())
    }

    async fn ip_by_note_in_subnet(&self, subnet_id: u64, note: &str) -> Result<Option<String>> {
        match self.notes.get(&(subnet_id, note.to_string())).map(Vec::as_slice) {
            None | Some([]) => Ok(None),
            Some([ip]) => Ok(Some(ip.clone())),
            Some(_) => Err(pxe_softlayer::Error::AmbiguousIp {
                note: note.to_string(),
            }),
        }
    }

    async fn reboot_soft(&self, device_id: u64) -> Result<()> {
        self.reboots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(device_id);
        Ok(())
    }
}
