//! The inventory seam used by the provisioning workflow

use async_trait::async_trait;

use crate::types::{Device, DeviceKind, Subnet, SubnetFilter, Vlan, VlanRef};
use crate::{Error, Result};

/// Read access to devices and networks, plus the one device action the
/// workflow needs.
#[async_trait]
pub trait Inventory: Send + Sync {
    /// Devices whose hostname is one of `hostnames`.
    async fn devices_by_hostname(&self, hostnames: &[String], kind: DeviceKind)
    -> Result<Vec<Device>>;

    /// Devices carrying at least one of `tags`.
    async fn devices_by_tag(&self, tags: &[String], kind: DeviceKind) -> Result<Vec<Device>>;

    /// A VLAN with its subnets narrowed by `filter`, or `None` if it does not exist.
    async fn vlan(&self, vlan: &VlanRef, filter: SubnetFilter) -> Result<Option<Vlan>>;

    /// The subnet containing `ip`.
    async fn subnet_for_ip(&self, ip: &str) -> Result<Option<Subnet>>;

    /// The address in subnet `subnet_id` whose note equals `note`.
    ///
    /// Fails when more than one address carries the note.
    async fn ip_by_note_in_subnet(&self, subnet_id: u64, note: &str) -> Result<Option<String>>;

    /// Soft-reboot a bare-metal device.
    async fn reboot_soft(&self, device_id: u64) -> Result<()>;

    /// The single bare-metal device named `hostname`.
    async fn device_by_hostname(&self, hostname: &str) -> Result<Option<Device>> {
        let mut devices = self
            .devices_by_hostname(&[hostname.to_string()], DeviceKind::BareMetal)
            .await?;
        match devices.len() {
            0 => Ok(None),
            1 => Ok(devices.pop()),
            _ => Err(Error::AmbiguousDevice {
                hostname: hostname.to_string(),
                ids: devices
                    .iter()
                    .map(|d| d.id.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }

    /// The address noted `note` across all subnets of `vlan`, with its subnet.
    async fn ip_info_by_note_in_vlan(
        &self,
        vlan: &Vlan,
        note: &str,
    ) -> Result<Option<(String, Subnet)>> {
        let mut found = Vec::new();
        for subnet in &vlan.subnets {
            if let Some(ip) = self.ip_by_note_in_subnet(subnet.id, note).await? {
                found.push((ip, subnet.clone()));
            }
        }
        if found.len() > 1 {
            return Err(Error::AmbiguousIp {
                note: note.to_string(),
            });
        }
        Ok(found.pop())
    }
}
