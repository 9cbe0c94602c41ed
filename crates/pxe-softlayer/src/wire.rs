//! JSON shapes returned by the SoftLayer REST API

use serde::Deserialize;

use crate::types::{AddressSpace, Device, Subnet, SubnetFilter, SubnetType, Vlan};

pub(crate) const SUBNET_MASK: &str =
    "id,networkIdentifier,netmask,broadcastAddress,gateway,cidr,addressSpace,subnetType";

pub(crate) fn device_mask() -> String {
    format!(
        "id,hostname,domain,primaryBackendIpAddress,\
         operatingSystem[passwords[username,password]],\
         tagReferences[tag[name]],\
         networkComponents[name,port,macAddress,primarySubnet[{SUBNET_MASK}]]"
    )
}

pub(crate) fn vlan_mask() -> String {
    format!("id,name,vlanNumber,primaryRouter[datacenter[name]],subnets[{SUBNET_MASK}]")
}

pub(crate) const IP_ADDRESS_MASK: &str = "id,ipAddress,isReserved,note";

/// User whose OS password is reported as the device password.
const ROOT_USER: &str = "root";

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    pub error: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireSubnet {
    id: u64,
    network_identifier: String,
    netmask: String,
    broadcast_address: Option<String>,
    gateway: Option<String>,
    cidr: Option<u8>,
    address_space: Option<AddressSpace>,
    subnet_type: Option<SubnetType>,
}

impl From<WireSubnet> for Subnet {
    fn from(w: WireSubnet) -> Self {
        let cidr = w.cidr.unwrap_or_else(|| Subnet::prefix_len(&w.netmask));
        Self {
            id: w.id,
            network: w.network_identifier,
            netmask: w.netmask,
            broadcast: w.broadcast_address,
            gateway: w.gateway,
            cidr,
            address_space: w.address_space,
            subnet_type: w.subnet_type,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WirePassword {
    username: String,
    password: String,
}

#[derive(Debug, Default, Deserialize)]
struct WireOperatingSystem {
    #[serde(default)]
    passwords: Vec<WirePassword>,
}

#[derive(Debug, Deserialize)]
struct WireTag {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireTagReference {
    tag: Option<WireTag>,
}

#[derive(Debug, Deserialize)]
struct WireSubnetRef {
    id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNetworkComponent {
    name: Option<String>,
    port: Option<u32>,
    mac_address: Option<String>,
    primary_subnet: Option<WireSubnetRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireDevice {
    id: u64,
    hostname: String,
    domain: String,
    primary_backend_ip_address: Option<String>,
    #[serde(default)]
    operating_system: Option<WireOperatingSystem>,
    #[serde(default)]
    tag_references: Vec<WireTagReference>,
    #[serde(default)]
    network_components: Vec<WireNetworkComponent>,
}

impl From<WireDevice> for Device {
    fn from(w: WireDevice) -> Self {
        let password = w
            .operating_system
            .unwrap_or_default()
            .passwords
            .into_iter()
            .find(|cred| cred.username == ROOT_USER)
            .map(|cred| cred.password);

        let tags = w
            .tag_references
            .into_iter()
            .filter_map(|r| r.tag.map(|t| t.name))
            .collect();

        let private_nic = w
            .network_components
            .into_iter()
            .find(|c| c.name.as_deref() == Some("eth") && c.port == Some(0));
        let (mac, subnet_id) = match private_nic {
            Some(nic) => (nic.mac_address, nic.primary_subnet.map(|s| s.id)),
            None => (None, None),
        };

        Self {
            id: w.id,
            hostname: w.hostname,
            domain: w.domain,
            ip: w.primary_backend_ip_address,
            mac,
            password,
            tags,
            subnet_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireDatacenter {
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireRouter {
    datacenter: Option<WireDatacenter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireVlan {
    id: u64,
    name: Option<String>,
    vlan_number: u32,
    primary_router: Option<WireRouter>,
    #[serde(default)]
    subnets: Vec<WireSubnet>,
}

impl WireVlan {
    pub(crate) fn into_vlan(self, filter: SubnetFilter) -> Vlan {
        let subnets = self
            .subnets
            .into_iter()
            .map(Subnet::from)
            .filter(|s| filter.matches(s))
            .collect();
        Vlan {
            id: self.id,
            name: self.name,
            number: self.vlan_number,
            datacenter: self
                .primary_router
                .and_then(|r| r.datacenter)
                .map(|d| d.name),
            subnets,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireIpAddress {
    pub ip_address: String,
}
