//! Provisioning manifest
//!
//! The YAML file that describes where generated files go, which VLAN hosts
//! are provisioned on, which OS images exist and which machine tag installs
//! which image.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use pxe_fs::{ConfigFormat, ConfigStore};
use pxe_softlayer::VlanRef;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::{Error, Result};

fn default_dhcp_conf() -> PathBuf {
    PathBuf::from("/etc/dhcp/dhcpd.conf")
}

fn default_listen_port() -> u16 {
    8888
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_yast_templates_dir() -> PathBuf {
    PathBuf::from("yast_templates")
}

fn default_dhcp_service() -> String {
    "dhcpd".to_string()
}

/// The `conf` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfSection {
    /// Root of the web server that serves autoyast files and images
    pub http_root_dir: PathBuf,

    #[serde(default = "default_dhcp_conf")]
    pub dhcp_conf: PathBuf,

    /// Port the completion listener binds to
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,

    #[serde(default = "default_yast_templates_dir")]
    pub yast_templates_dir: PathBuf,

    /// systemd unit of the DHCP server
    #[serde(default = "default_dhcp_service")]
    pub dhcp_service: String,
}

/// The `vlan` section; `id` wins when both are given
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VlanSection {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// An installable OS image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub name: String,
    pub file_url: String,
    pub filename: String,
    pub save_dir: String,
    pub mount_point: String,
    /// Any further fields; exposed to templates like the required ones
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Image {
    /// All scalar fields as `(field, value)` pairs.
    pub fn fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("name".to_string(), self.name.clone()),
            ("file_url".to_string(), self.file_url.clone()),
            ("filename".to_string(), self.filename.clone()),
            ("save_dir".to_string(), self.save_dir.clone()),
            ("mount_point".to_string(), self.mount_point.clone()),
        ];
        fields.extend(scalar_fields(&self.extra));
        fields
    }
}

/// Maps a device tag to the image and autoyast template to install
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Machine {
    pub tag: String,
    pub image: String,
    pub yast_template: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn scalar_fields(extra: &BTreeMap<String, Value>) -> impl Iterator<Item = (String, String)> + '_ {
    extra.iter().filter_map(|(key, value)| {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        Some((key.clone(), text))
    })
}

/// A loaded and validated manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub conf: ConfSection,
    #[serde(default)]
    pub vlan: VlanSection,
    pub images: Vec<Image>,
    pub machines: Vec<Machine>,

    /// Directory relative paths in `conf` are resolved against
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Manifest {
    /// Load and validate a manifest file (YAML or JSON by extension).
    pub fn load(path: &Path) -> Result<Self> {
        let mut manifest: Manifest = ConfigStore::new().load(path)?;
        manifest.base_dir = base_dir_of(path);
        manifest.validate(path)?;
        tracing::debug!(
            path = %path.display(),
            images = manifest.images.len(),
            machines = manifest.machines.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    /// Parse YAML content as if it had been read from `path`.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut manifest: Manifest =
            ConfigStore::new().parse(path, ConfigFormat::Yaml, content)?;
        manifest.base_dir = base_dir_of(path);
        manifest.validate(path)?;
        Ok(manifest)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        let invalid = |message: String| Error::InvalidManifest {
            path: path.to_path_buf(),
            message,
        };

        if self.conf.http_root_dir.as_os_str().is_empty() {
            return Err(invalid("conf.http_root_dir is empty".into()));
        }
        if self.vlan.id.is_none() && self.vlan.name.is_none() {
            return Err(invalid("no VLAN id or name in the 'vlan' section".into()));
        }

        let mut image_names = HashSet::new();
        for image in &self.images {
            if !image_names.insert(image.name.as_str()) {
                return Err(invalid(format!("image '{}' is defined twice", image.name)));
            }
        }

        let mut tags = HashSet::new();
        for machine in &self.machines {
            if !tags.insert(machine.tag.as_str()) {
                return Err(invalid(format!("machine tag '{}' is defined twice", machine.tag)));
            }
            if !image_names.contains(machine.image.as_str()) {
                return Err(invalid(format!(
                    "machine '{}' is referencing an undefined image: {}",
                    machine.tag, machine.image
                )));
            }
        }
        Ok(())
    }

    pub fn vlan_ref(&self) -> VlanRef {
        match (&self.vlan.id, &self.vlan.name) {
            (Some(id), _) => VlanRef::Id(*id),
            (None, Some(name)) => VlanRef::Name(name.clone()),
            // validate() guarantees one of the two
            (None, None) => VlanRef::Name(String::new()),
        }
    }

    /// Machine tags in manifest order.
    pub fn machine_tags(&self) -> Vec<&str> {
        self.machines.iter().map(|m| m.tag.as_str()).collect()
    }

    pub fn machine(&self, tag: &str) -> Option<&Machine> {
        self.machines.iter().find(|m| m.tag == tag)
    }

    pub fn image(&self, name: &str) -> Option<&Image> {
        self.images.iter().find(|i| i.name == name)
    }

    pub fn http_root_dir(&self) -> &Path {
        &self.conf.http_root_dir
    }

    pub fn dhcp_conf(&self) -> &Path {
        &self.conf.dhcp_conf
    }

    pub fn listen_port(&self) -> u16 {
        self.conf.listen_port
    }

    pub fn dhcp_service(&self) -> &str {
        &self.conf.dhcp_service
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.base_dir.join(&self.conf.templates_dir)
    }

    pub fn yast_templates_dir(&self) -> PathBuf {
        self.base_dir.join(&self.conf.yast_templates_dir)
    }

    /// Override where the DHCP configuration lives.
    pub fn set_dhcp_conf(&mut self, path: impl Into<PathBuf>) {
        self.conf.dhcp_conf = path.into();
    }

    /// Where the autoyast file for the host with `ip_hex` is written.
    pub fn autoyast_path(&self, ip_hex: &str) -> PathBuf {
        self.conf.http_root_dir.join("autoyast").join(ip_hex)
    }
}

fn base_dir_of(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MANIFEST: &str = r#"
conf:
  http_root_dir: /srv/www/htdocs
vlan:
  name: prov-vlan
images:
  - name: sles12
    file_url: http://mirror/sles12.iso
    filename: sles12.iso
    save_dir: /srv/images
    mount_point: /srv/www/htdocs/sles12
    md5_value: abc123
    release: 12
machines:
  - tag: kvmhost
    image: sles12
    yast_template: kvm.xml
"#;

    #[test]
    fn defaults_are_applied() {
        let m = Manifest::parse(MANIFEST, Path::new("/opt/pxe/manifest.yaml")).unwrap();
        assert_eq!(m.dhcp_conf(), Path::new("/etc/dhcp/dhcpd.conf"));
        assert_eq!(m.listen_port(), 8888);
        assert_eq!(m.dhcp_service(), "dhcpd");
        assert_eq!(m.templates_dir(), PathBuf::from("/opt/pxe/templates"));
        assert_eq!(m.yast_templates_dir(), PathBuf::from("/opt/pxe/yast_templates"));
        assert_eq!(m.vlan_ref(), VlanRef::Name("prov-vlan".into()));
    }

    #[test]
    fn image_fields_include_extras() {
        let m = Manifest::parse(MANIFEST, Path::new("manifest.yaml")).unwrap();
        let fields = m.image("sles12").unwrap().fields();
        assert!(fields.contains(&("md5_value".to_string(), "abc123".to_string())));
        assert!(fields.contains(&("release".to_string(), "12".to_string())));
        assert_eq!(fields[0], ("name".to_string(), "sles12".to_string()));
    }

    #[test]
    fn vlan_id_wins_over_name() {
        let text = MANIFEST.replace("  name: prov-vlan", "  name: prov-vlan\n  id: 77");
        let m = Manifest::parse(&text, Path::new("manifest.yaml")).unwrap();
        assert_eq!(m.vlan_ref(), VlanRef::Id(77));
    }

    #[test]
    fn missing_vlan_is_rejected() {
        let text = MANIFEST.replace("vlan:\n  name: prov-vlan\n", "");
        let err = Manifest::parse(&text, Path::new("manifest.yaml")).unwrap_err();
        assert!(err.to_string().contains("VLAN"));
    }

    #[test]
    fn undefined_image_reference_is_rejected() {
        let text = MANIFEST.replace("    image: sles12", "    image: rhel8");
        let err = Manifest::parse(&text, Path::new("manifest.yaml")).unwrap_err();
        assert!(err.to_string().contains("kvmhost"));
        assert!(err.to_string().contains("rhel8"));
    }

    #[test]
    fn missing_required_image_field_is_rejected() {
        let text = MANIFEST.replace("    filename: sles12.iso\n", "");
        let err = Manifest::parse(&text, Path::new("manifest.yaml")).unwrap_err();
        assert!(matches!(err, Error::Fs(pxe_fs::Error::ConfigParse { .. })));
        assert!(err.to_string().contains("filename"));
    }
}
