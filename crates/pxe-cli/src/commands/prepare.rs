//! Prepare command implementation

use colored::Colorize;
use pxe_core::{PrepareOptions, Provisioner, Selection};

use crate::error::Result;

/// Run the prepare command
pub async fn run_prepare(
    provisioner: &Provisioner,
    selection: &Selection,
    unencrypted_password: bool,
) -> Result<()> {
    let report = provisioner
        .prepare(
            selection,
            PrepareOptions {
                unencrypted_password,
            },
        )
        .await?;

    for host in &report.hosts {
        println!(
            "{} {} {} ({})",
            "+".green(),
            host.hostname.cyan(),
            host.ip,
            host.subnet.dimmed()
        );
        println!("    {}: {}", "autoyast".dimmed(), host.autoyast.display());
    }
    for hostname in &report.skipped {
        println!(
            "{} {} {}",
            "!".yellow(),
            hostname.cyan(),
            "skipped: no reserved IP in the VLAN".yellow()
        );
    }
    println!();

    if report.saved {
        for change in &report.changes {
            println!("  {change}");
        }
        println!(
            "{} updated",
            provisioner.manifest().dhcp_conf().display().to_string().bold()
        );
    } else {
        println!("DHCP configuration already up to date");
    }
    Ok(())
}
