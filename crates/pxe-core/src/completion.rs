//! Handling of "installation completed" notifications

use std::path::PathBuf;
use std::sync::Arc;

use pxe_dhcpconf::{BlockType, ChangeSet, ConfigDocument, remove_if_present};

use crate::Result;
use crate::manifest::Manifest;
use crate::provision::{configured_hosts_in, host_names};
use crate::system::ServiceControl;

/// Removes a finished host from DHCP so it boots from disk next time.
pub struct CompletionHandler {
    dhcp_conf: PathBuf,
    unit: String,
    service: Arc<dyn ServiceControl>,
}

impl CompletionHandler {
    pub fn new(dhcp_conf: impl Into<PathBuf>, unit: impl Into<String>, service: Arc<dyn ServiceControl>) -> Self {
        Self {
            dhcp_conf: dhcp_conf.into(),
            unit: unit.into(),
            service,
        }
    }

    pub fn from_manifest(manifest: &Manifest, service: Arc<dyn ServiceControl>) -> Self {
        Self::new(manifest.dhcp_conf(), manifest.dhcp_service(), service)
    }

    /// Number of hosts still configured for installation.
    pub fn remaining(&self) -> Result<usize> {
        Ok(configured_hosts_in(&self.dhcp_conf)?.len())
    }

    /// Drop the host section of `hostname` and restart DHCP if it existed.
    ///
    /// Returns how many hosts are still configured. A host that is not
    /// configured is not an error; the notification may be a repeat.
    pub async fn installation_completed(&self, hostname: &str) -> Result<usize> {
        tracing::info!(%hostname, "installation completed");
        let path = self.dhcp_conf.clone();
        let host = hostname.to_string();

        // file edits run on the blocking pool
        let (removed, remaining) = tokio::task::spawn_blocking(move || -> Result<(bool, usize)> {
            let mut doc = ConfigDocument::from_file(&path)?;
            let mut changes = ChangeSet::new();
            let removed = doc
                .group_mut()
                .is_some_and(|group| remove_if_present(group, BlockType::Host, Some(&host), &mut changes));
            doc.save_if_changed(&changes)?;
            Ok((removed, host_names(&doc).len()))
        })
        .await??;

        if removed {
            self.service.restart(&self.unit).await?;
        } else {
            tracing::warn!(%hostname, "no DHCP host section for completed installation");
        }

        tracing::info!(remaining, "hosts still installing");
        Ok(remaining)
    }
}
