//! Inventory records

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which kind of device a lookup should cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceKind {
    #[default]
    BareMetal,
    VirtualMachine,
    Any,
}

impl DeviceKind {
    pub(crate) fn includes_bare_metal(self) -> bool {
        matches!(self, Self::BareMetal | Self::Any)
    }

    pub(crate) fn includes_virtual(self) -> bool {
        matches!(self, Self::VirtualMachine | Self::Any)
    }
}

/// Subnet allocation type as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubnetType {
    #[serde(rename = "ADDITIONAL_PRIMARY")]
    Primary,
    #[serde(rename = "SECONDARY_ON_VLAN")]
    Portable,
    #[serde(rename = "PRIMARY_6")]
    PrimaryIpv6,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AddressSpace {
    Public,
    Private,
    #[serde(other)]
    Other,
}

/// Restricts which subnets of a VLAN are kept. `None` fields match anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubnetFilter {
    pub subnet_type: Option<SubnetType>,
    pub address_space: Option<AddressSpace>,
}

impl SubnetFilter {
    pub fn any() -> Self {
        Self::default()
    }

    /// Private portable subnets, the ones provisioned hosts get addresses from.
    pub fn private_portable() -> Self {
        Self {
            subnet_type: Some(SubnetType::Portable),
            address_space: Some(AddressSpace::Private),
        }
    }

    pub fn matches(&self, subnet: &Subnet) -> bool {
        let type_ok = self
            .subnet_type
            .is_none_or(|t| subnet.subnet_type == Some(t));
        let space_ok = self
            .address_space
            .is_none_or(|s| subnet.address_space == Some(s));
        type_ok && space_ok
    }
}

/// A VLAN addressed by numeric id or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VlanRef {
    Id(u64),
    Name(String),
}

impl fmt::Display for VlanRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {id}"),
            Self::Name(name) => write!(f, "name '{name}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subnet {
    pub id: u64,
    pub network: String,
    pub netmask: String,
    pub broadcast: Option<String>,
    pub gateway: Option<String>,
    pub cidr: u8,
    pub address_space: Option<AddressSpace>,
    pub subnet_type: Option<SubnetType>,
}

impl Subnet {
    /// Prefix length for a dotted netmask, e.g. 26 for `255.255.255.192`.
    pub fn prefix_len(netmask: &str) -> u8 {
        netmask
            .split('.')
            .filter_map(|octet| octet.parse::<u8>().ok())
            .map(|octet| octet.count_ones() as u8)
            .sum()
    }

    /// `network/cidr`, e.g. `10.0.0.0/26`.
    pub fn identifier(&self) -> String {
        format!("{}/{}", self.network, self.cidr)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub id: u64,
    pub hostname: String,
    pub domain: String,
    /// Primary backend (private) address.
    pub ip: Option<String>,
    /// MAC of the first private interface (`eth`, port 0).
    pub mac: Option<String>,
    /// Root password of the installed OS, when the API reports one.
    pub password: Option<String>,
    pub tags: Vec<String>,
    pub subnet_id: Option<u64>,
}

impl Device {
    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.hostname, self.domain)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vlan {
    pub id: u64,
    pub name: Option<String>,
    pub number: u32,
    pub datacenter: Option<String>,
    /// Subnets that passed the filter the VLAN was loaded with.
    pub subnets: Vec<Subnet>,
}
