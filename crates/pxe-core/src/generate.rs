//! Boot server script generation
//!
//! Expands per-image download and TFTP templates into a directory the
//! boot server setup runs from.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use pxe_template::{Vars, render_to_file};

use crate::manifest::Manifest;
use crate::templates::TemplateSet;
use crate::{Error, Result};

/// Templates expanded once per image, with the output name pattern.
const TFTP_PER_IMAGE: [(&str, &str); 3] = [
    ("tftp/pxelinux_cfg_default_for_image.txt", "default_for_{}"),
    ("tftp/boot_msg_for_image.txt", "boot_msg_for_{}"),
    ("tftp/setup_tftp_for_image.sh", "setup_tftp_for_{}.sh"),
];
const DOWNLOAD_TEMPLATE: (&str, &str) = ("tftp/download_image.sh", "download_image_{}.sh");
const MOUNT_TEMPLATE: (&str, &str) = ("tftp/mount_image.sh", "mount_image.sh");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Download,
    Tftp,
}

impl ScriptKind {
    /// Parse `download`, `tftp`, `all`, or a comma separated mix.
    pub fn parse_list(list: &str) -> Result<Vec<ScriptKind>> {
        let mut kinds = Vec::new();
        for item in crate::selection::split_list(list) {
            if item == "all" {
                return Ok(vec![Self::Download, Self::Tftp]);
            }
            let kind = item.parse()?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        if kinds.is_empty() {
            return Err(Error::InvalidScriptKind(list.to_string()));
        }
        Ok(kinds)
    }
}

impl FromStr for ScriptKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "download" => Ok(Self::Download),
            "tftp" => Ok(Self::Tftp),
            other => Err(Error::InvalidScriptKind(other.to_string())),
        }
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Download => "download",
            Self::Tftp => "tftp",
        })
    }
}

/// Expand the requested script templates into `gen_dir`.
///
/// Returns the generated files in creation order.
pub fn generate_scripts(
    manifest: &Manifest,
    boot_ip: &str,
    gen_dir: &Path,
    kinds: &[ScriptKind],
) -> Result<Vec<PathBuf>> {
    let templates = TemplateSet::from_manifest(manifest);
    let base = Vars::new()
        .with("bootserverIP", boot_ip)
        .with("http_root_dir", manifest.http_root_dir().display().to_string())
        .with("GEN_DIR", gen_dir.display().to_string());

    let mut generated = Vec::new();

    if kinds.contains(&ScriptKind::Download) {
        tracing::info!("generating download scripts");
        expand_per_image(manifest, &templates, &base, gen_dir, DOWNLOAD_TEMPLATE, &mut generated)?;
    }

    if kinds.contains(&ScriptKind::Tftp) {
        tracing::info!("generating TFTP config and scripts");
        for pattern in TFTP_PER_IMAGE {
            expand_per_image(manifest, &templates, &base, gen_dir, pattern, &mut generated)?;
        }
        let (template, out_name) = MOUNT_TEMPLATE;
        let out = gen_dir.join(out_name);
        render_to_file(&templates.template(template), &out, &Vars::new())?;
        generated.push(out);
    }

    Ok(generated)
}

fn expand_per_image(
    manifest: &Manifest,
    templates: &TemplateSet,
    base: &Vars,
    gen_dir: &Path,
    (template, out_pattern): (&str, &str),
    generated: &mut Vec<PathBuf>,
) -> Result<()> {
    for image in &manifest.images {
        tracing::debug!(template, image = %image.name, "expanding template");
        let image_vars: Vars = image
            .fields()
            .into_iter()
            .map(|(field, value)| (format!("image_{field}"), value))
            .collect();
        let out = gen_dir.join(out_pattern.replace("{}", &image.name));
        render_to_file(&templates.template(template), &out, &base.merge(&image_vars))?;
        generated.push(out);
    }
    Ok(())
}
