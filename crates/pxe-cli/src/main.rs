//! PXE provisioning CLI
//!
//! Prepares DHCP and autoyast configuration for bare-metal hosts, reboots
//! them into the installer and waits for their completion notifications.

mod cli;
mod commands;
mod error;
mod listener;

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use pxe_core::{Manifest, Provisioner, local_ipv4};
use pxe_softlayer::{Credentials, SoftLayerClient};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    // A second subscriber is only possible in tests; ignore that case
    let _ = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };
    tracing::debug!("Verbose mode enabled");
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut manifest = Manifest::load(&cli.config)?;
    if let Some(path) = &cli.dhcp_conf {
        manifest.set_dhcp_conf(path);
    }
    let boot_ip = cli
        .ip
        .clone()
        .unwrap_or_else(|| local_ipv4().to_string());
    tracing::debug!(config = %cli.config.display(), %boot_ip, "loaded manifest");

    // Commands that never talk to the hardware API
    match &cli.command {
        Commands::Generate { gen_dir, scripts } => {
            return commands::run_generate(&manifest, &boot_ip, gen_dir, scripts);
        }
        Commands::Apply { show: true, .. } => return commands::run_show(&manifest),
        _ => {}
    }

    let selection = match &cli.command {
        Commands::Prepare { target, .. } | Commands::Delete { target } => {
            Some(target.selection(&manifest)?)
        }
        _ => None,
    };

    let credentials = Credentials::resolve(cli.sl_user.clone(), cli.sl_apikey.clone())?;
    let client = match &cli.sl_endpoint {
        Some(endpoint) => SoftLayerClient::with_endpoint(credentials, endpoint.as_str())?,
        None => SoftLayerClient::new(credentials)?,
    };
    let provisioner = Provisioner::new(manifest, Arc::new(client), boot_ip);

    match (cli.command, selection) {
        (
            Commands::Prepare {
                unencrypted_password,
                ..
            },
            Some(selection),
        ) => commands::run_prepare(&provisioner, &selection, unencrypted_password).await,
        (Commands::Delete { .. }, Some(selection)) => {
            commands::run_delete(&provisioner, &selection).await
        }
        (Commands::Apply { listen_only, .. }, _) => {
            commands::run_apply(&provisioner, listen_only).await
        }
        _ => Err(error::CliError::user("no hosts selected")),
    }
}
