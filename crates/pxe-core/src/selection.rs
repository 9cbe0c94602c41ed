//! Which hosts a command applies to

use crate::manifest::Manifest;
use crate::{Error, Result};

/// Tag value that stands for every machine tag in the manifest.
pub const ALL_TAGS: &str = "all";

/// Hosts selected either by name or by manifest machine tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Hostnames(Vec<String>),
    Tags(Vec<String>),
}

impl Selection {
    /// Hostnames from a comma separated list.
    pub fn hostnames(list: &str) -> Self {
        Self::Hostnames(split_list(list))
    }

    /// Tags from a comma separated list, checked against the manifest.
    ///
    /// `all` expands to every machine tag of the manifest.
    pub fn tags(list: &str, manifest: &Manifest) -> Result<Self> {
        let valid = manifest.machine_tags();
        let requested = split_list(list);

        let tags: Vec<String> = if requested.len() == 1 && requested[0] == ALL_TAGS {
            valid.iter().map(|t| t.to_string()).collect()
        } else {
            requested
        };

        if let Some(bad) = tags.iter().find(|t| !valid.contains(&t.as_str())) {
            return Err(Error::InvalidTag {
                tag: bad.clone(),
                valid: valid.join(", "),
            });
        }
        Ok(Self::Tags(tags))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Hostnames(v) | Self::Tags(v) => v.is_empty(),
        }
    }
}

/// Split `a,b , c` into trimmed, non-empty items.
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
