//! Delete command implementation

use colored::Colorize;
use pxe_core::{Provisioner, Selection};

use crate::error::Result;

/// Run the delete command
pub async fn run_delete(provisioner: &Provisioner, selection: &Selection) -> Result<()> {
    let report = provisioner.delete(selection).await?;

    for hostname in &report.removed {
        println!("{} {} removed", "-".red(), hostname.cyan());
    }
    for hostname in &report.not_configured {
        println!("  {} {}", hostname.cyan(), "was not configured".dimmed());
    }

    if report.saved {
        println!(
            "{} updated",
            provisioner.manifest().dhcp_conf().display().to_string().bold()
        );
    }
    Ok(())
}
