//! Templates the workflow renders and the variables it feeds them

use std::path::{Path, PathBuf};

use pxe_dhcpconf::{BlockType, ConfigDocument, ConfigEntry};
use pxe_softlayer::{Device, Subnet};
use pxe_template::{Vars, render_file, render_to_file};

use crate::Result;
use crate::manifest::Manifest;

const SUBNET_TEMPLATE: &str = "dhcp/dhcp_subnet_template.txt";
const HOST_TEMPLATE: &str = "dhcp/dhcp_host_template.txt";

/// Locations of the DHCP, TFTP and autoyast templates.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    templates_dir: PathBuf,
    yast_templates_dir: PathBuf,
}

impl TemplateSet {
    pub fn new(templates_dir: impl Into<PathBuf>, yast_templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            yast_templates_dir: yast_templates_dir.into(),
        }
    }

    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self::new(manifest.templates_dir(), manifest.yast_templates_dir())
    }

    /// Path of a template below the templates directory.
    pub fn template(&self, relative: &str) -> PathBuf {
        self.templates_dir.join(relative)
    }

    /// A `subnet` section for `subnet`, ready to insert into the shared-network.
    pub fn subnet_entry(&self, boot_ip: &str, subnet: &Subnet) -> Result<ConfigEntry> {
        let text = render_file(&self.template(SUBNET_TEMPLATE), &subnet_vars(boot_ip, subnet))?;
        Ok(ConfigDocument::from_fragment(&text, BlockType::Subnet)?)
    }

    /// A `host` section for `device`, ready to insert into the group.
    pub fn host_entry(&self, device: &Device, ip: &str, image: &str) -> Result<ConfigEntry> {
        let text = render_file(&self.template(HOST_TEMPLATE), &host_vars(device, ip, image))?;
        Ok(ConfigDocument::from_fragment(&text, BlockType::Host)?)
    }

    /// Render the autoyast template `name` to `out`.
    pub fn render_autoyast(&self, name: &str, out: &Path, vars: &Vars) -> Result<()> {
        render_to_file(&self.yast_templates_dir.join(name), out, vars)?;
        Ok(())
    }
}

pub fn subnet_vars(boot_ip: &str, subnet: &Subnet) -> Vars {
    Vars::new()
        .with("bootServerIP", boot_ip)
        .with("subnet_ip", subnet.network.as_str())
        .with("subnet_netmask", subnet.netmask.as_str())
        .with("subnet_broadcast", subnet.broadcast.clone().unwrap_or_default())
        .with("subnet_gateway", subnet.gateway.clone().unwrap_or_default())
}

pub fn host_vars(device: &Device, ip: &str, image: &str) -> Vars {
    Vars::new()
        .with("server_hostname", device.hostname.as_str())
        .with("server_mac_address", device.mac.clone().unwrap_or_default())
        .with("server_ip", ip)
        .with("server_image", image)
}

/// Inputs of an autoyast profile besides the device itself.
#[derive(Debug, Clone)]
pub struct AutoyastParams<'a> {
    pub ip: &'a str,
    pub subnet: &'a Subnet,
    pub boot_ip: &'a str,
    pub listen_port: u16,
    /// Root password as it should appear in the profile
    pub root_password: &'a str,
    pub password_encrypted: bool,
}

pub fn autoyast_vars(device: &Device, params: &AutoyastParams<'_>) -> Vars {
    Vars::new()
        .with("target_ip", params.ip)
        .with("target_hostname", device.hostname.as_str())
        .with("target_domain", device.domain.as_str())
        .with("target_root_password", params.root_password)
        .with("target_password_encrypted", params.password_encrypted.to_string())
        .with("subnet_netmask", params.subnet.netmask.as_str())
        .with("subnet_net_prefix", params.subnet.cidr.to_string())
        .with("subnet_gateway", params.subnet.gateway.clone().unwrap_or_default())
        .with("bootserver_ip", params.boot_ip)
        .with("bootserver_listen_port", params.listen_port.to_string())
}
