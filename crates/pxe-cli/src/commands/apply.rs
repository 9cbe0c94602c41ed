//! Apply command implementation

use std::sync::Arc;

use colored::Colorize;
use pxe_core::{
    ApplyOptions, CompletionHandler, Manifest, Provisioner, Systemctl, configured_hosts_in,
};

use crate::error::Result;
use crate::listener;

/// List the hosts that currently have DHCP configuration.
pub fn run_show(manifest: &Manifest) -> Result<()> {
    let hosts = configured_hosts_in(manifest.dhcp_conf())?;

    println!("{}:", "Configured Hosts".bold());
    if hosts.is_empty() {
        println!("  {} (use {} to add)", "None".dimmed(), "pxeprov prepare".cyan());
    } else {
        for hostname in &hosts {
            println!("  {} {}", "+".green(), hostname.cyan());
        }
    }
    Ok(())
}

/// Reboot configured hosts into the installer, then wait for them.
pub async fn run_apply(provisioner: &Provisioner, listen_only: bool) -> Result<()> {
    let report = provisioner
        .apply(ApplyOptions { listen_only }, &Systemctl)
        .await?;

    for device in &report.devices {
        let action = if report.triggered {
            "rebooted".green()
        } else {
            "waiting".dimmed()
        };
        println!("  {} {} ({})", device.hostname.cyan(), device.id, action);
    }

    let manifest = provisioner.manifest();
    let handler = CompletionHandler::from_manifest(manifest, Arc::new(Systemctl));
    listener::run(manifest.listen_port(), handler).await
}
