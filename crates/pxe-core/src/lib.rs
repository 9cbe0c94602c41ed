//! Provisioning workflow
//!
//! Ties the dhcpd.conf editor, the template renderer and the hardware
//! inventory together: preparing hosts for network installation, retracting
//! them, triggering installs, and handling completion notifications.

pub mod completion;
pub mod error;
pub mod generate;
pub mod manifest;
pub mod password;
pub mod provision;
pub mod selection;
pub mod system;
pub mod templates;

pub use completion::CompletionHandler;
pub use error::{Error, Result};
pub use generate::{ScriptKind, generate_scripts};
pub use manifest::{Image, Machine, Manifest};
pub use provision::{
    ApplyOptions, ApplyReport, DeleteReport, PrepareOptions, PrepareReport, PreparedHost,
    Provisioner, configured_hosts_in,
};
pub use selection::Selection;
pub use system::{ServiceControl, Systemctl, ip_to_hex, local_ipv4};
pub use templates::TemplateSet;
