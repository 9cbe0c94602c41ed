//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pxe_core::{Manifest, Selection};

/// PXE provisioning - Install operating systems on bare-metal servers
#[derive(Parser, Debug)]
#[command(name = "pxeprov")]
#[command(author, version, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The provisioning manifest (YAML)
    #[arg(short, long, value_name = "CONF", env = "PXEPROV_CONFIG")]
    pub config: PathBuf,

    /// SoftLayer API user name (default: SL_USER or SL_USERNAME)
    #[arg(long, value_name = "USER")]
    pub sl_user: Option<String>,

    /// SoftLayer API key (default: SL_APIKEY or SL_API_KEY)
    #[arg(long, value_name = "KEY")]
    pub sl_apikey: Option<String>,

    /// SoftLayer API root
    #[arg(long, value_name = "URL", env = "SL_ENDPOINT", hide = true)]
    pub sl_endpoint: Option<String>,

    /// IP address of this boot server (default: the primary local address)
    #[arg(long, value_name = "IP")]
    pub ip: Option<String>,

    /// Override the DHCP configuration file from the manifest
    #[arg(long, value_name = "FILE")]
    pub dhcp_conf: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Add DHCP configuration and autoyast profiles for hosts
    ///
    /// Examples:
    ///   pxeprov -c manifest.yaml prepare --hostname web1,web2
    ///   pxeprov -c manifest.yaml prepare --tag all
    Prepare {
        #[command(flatten)]
        target: TargetArgs,

        /// Write the root password in clear text
        #[arg(long)]
        unencrypted_password: bool,
    },

    /// Remove the DHCP configuration of hosts
    Delete {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Reboot configured hosts into the installer and wait for them
    ///
    /// Restarts the DHCP server, soft-reboots every host that has DHCP
    /// configuration and then listens for completion notifications until
    /// all hosts reported back.
    Apply {
        /// Only list the hosts that are configured
        #[arg(long, conflicts_with = "listen_only")]
        show: bool,

        /// Do not restart DHCP or reboot; only wait for notifications
        #[arg(long)]
        listen_only: bool,
    },

    /// Generate image download and TFTP setup scripts
    Generate {
        /// Output directory for the generated files
        #[arg(long, value_name = "DIR")]
        gen_dir: PathBuf,

        /// Which scripts to generate: download, tftp or all
        #[arg(long, value_name = "TYPE1[,TYPE2...]", default_value = "all")]
        scripts: String,
    },
}

/// Hosts to act on; exactly one of the two
#[derive(Args, Debug, Clone, PartialEq, Eq)]
#[group(required = true, multiple = false)]
pub struct TargetArgs {
    /// Comma separated hostnames
    #[arg(long, value_name = "H1[,H2...]")]
    pub hostname: Option<String>,

    /// Comma separated machine tags from the manifest, or 'all'
    #[arg(long, value_name = "TAG1[,TAG2...]")]
    pub tag: Option<String>,
}

impl TargetArgs {
    pub fn selection(&self, manifest: &Manifest) -> pxe_core::Result<Selection> {
        match (&self.hostname, &self.tag) {
            (Some(hostnames), _) => Ok(Selection::hostnames(hostnames)),
            (None, Some(tags)) => Selection::tags(tags, manifest),
            // clap enforces one of the two
            (None, None) => Ok(Selection::Hostnames(Vec::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn about_comes_from_doc_comment() {
        let about = Cli::command().get_about().map(|a| a.to_string()).unwrap_or_default();
        assert!(about.contains("bare-metal servers"), "about was {about:?}");
    }

    #[test]
    fn prepare_requires_a_target() {
        let err = Cli::try_parse_from(["pxeprov", "-c", "m.yaml", "prepare"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn hostname_and_tag_are_exclusive() {
        let err = Cli::try_parse_from([
            "pxeprov", "-c", "m.yaml", "delete", "--hostname", "a", "--tag", "b",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn apply_flags_parse() {
        let cli =
            Cli::try_parse_from(["pxeprov", "-c", "m.yaml", "apply", "--listen-only"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Apply {
                show: false,
                listen_only: true
            }
        );
        assert!(
            Cli::try_parse_from(["pxeprov", "-c", "m.yaml", "apply", "--show", "--listen-only"])
                .is_err()
        );
    }

    #[test]
    fn generate_defaults_to_all_scripts() {
        let cli = Cli::try_parse_from(["pxeprov", "-c", "m.yaml", "generate", "--gen-dir", "out"])
            .unwrap();
        match cli.command {
            Commands::Generate { gen_dir, scripts } => {
                assert_eq!(gen_dir, PathBuf::from("out"));
                assert_eq!(scripts, "all");
            }
            other => panic!("expected generate, got {other:?}"),
        }
    }
}
