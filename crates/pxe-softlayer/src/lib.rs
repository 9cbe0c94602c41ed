//! SoftLayer hardware inventory
//!
//! Typed records for devices, VLANs and subnets, the [`Inventory`] seam the
//! provisioning workflow depends on, and a REST implementation of it.

pub mod client;
pub mod error;
pub mod inventory;
pub mod types;
mod wire;

pub use client::{Credentials, SoftLayerClient};
pub use error::{Error, Result};
pub use inventory::Inventory;
pub use types::{AddressSpace, Device, DeviceKind, Subnet, SubnetFilter, SubnetType, Vlan, VlanRef};
