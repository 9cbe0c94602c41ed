//! Error types for pxe-core

use std::path::PathBuf;

/// Result type for pxe-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the provisioning workflow
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The manifest parsed but is not usable
    #[error("Invalid manifest {path}: {message}")]
    InvalidManifest { path: PathBuf, message: String },

    #[error("Invalid tag '{tag}'. Valid values are: {valid}")]
    InvalidTag { tag: String, valid: String },

    #[error("Did not find matching devices for these hostnames: {hostnames}")]
    MissingDevices { hostnames: String },

    #[error(
        "Device {device_id} ({hostname}) has tags {tags}; only one of these may be assigned: {valid}"
    )]
    MultipleTags {
        device_id: u64,
        hostname: String,
        tags: String,
        valid: String,
    },

    #[error("No machine configuration matches device {device_id} ({hostname}) with tags: {tags}")]
    NoMachineForDevice {
        device_id: u64,
        hostname: String,
        tags: String,
    },

    #[error("Cannot find VLAN with {0}")]
    VlanNotFound(String),

    #[error("Cannot identify the subnet of the boot server at {ip}")]
    BootSubnetNotFound { ip: String },

    #[error(
        "{path} has no {section} section; run the boot server configuration again"
    )]
    DhcpStructure { path: PathBuf, section: &'static str },

    #[error("No hosts configured in the DHCP configuration")]
    NoHostsConfigured,

    #[error("No matching hosts found")]
    NoMatchingDevices,

    #[error("Was not able to find device info for hostname '{0}'")]
    DeviceNotFound(String),

    #[error("Invalid IPv4 address: {0}")]
    InvalidIp(String),

    #[error("Restarting service {unit} failed: {message}")]
    ServiceFailed { unit: String, message: String },

    #[error("Invalid script type '{0}'. Valid values are: download, tftp, all")]
    InvalidScriptKind(String),

    #[error("Password encryption failed: {0}")]
    Password(String),

    #[error(transparent)]
    Fs(#[from] pxe_fs::Error),

    #[error(transparent)]
    Dhcp(#[from] pxe_dhcpconf::Error),

    #[error(transparent)]
    Template(#[from] pxe_template::Error),

    #[error(transparent)]
    Inventory(#[from] pxe_softlayer::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
