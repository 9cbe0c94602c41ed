//! [`TestWorkspace`] builder for provisioning scenarios.
//!
//! Lays out a boot server in a temporary directory: the shipped DHCP, TFTP
//! and autoyast templates, a minimal dhcpd.conf, a web root and a manifest
//! that points at all of them.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Skeleton written by the boot server setup: one shared-network and one
/// anonymous group, both empty.
pub const DHCPD_CONF: &str = "\
ddns-update-style none;
authoritative;

shared-network provisioning {
}

group {
  next-server 10.0.0.2;
}
";

pub const YAST_TEMPLATE: &str = "sles_minimal.xml";

const TEMPLATES: [(&str, &str); 7] = [
    (
        "dhcp/dhcp_subnet_template.txt",
        include_str!("../../../templates/dhcp/dhcp_subnet_template.txt"),
    ),
    (
        "dhcp/dhcp_host_template.txt",
        include_str!("../../../templates/dhcp/dhcp_host_template.txt"),
    ),
    (
        "tftp/download_image.sh",
        include_str!("../../../templates/tftp/download_image.sh"),
    ),
    (
        "tftp/mount_image.sh",
        include_str!("../../../templates/tftp/mount_image.sh"),
    ),
    (
        "tftp/setup_tftp_for_image.sh",
        include_str!("../../../templates/tftp/setup_tftp_for_image.sh"),
    ),
    (
        "tftp/pxelinux_cfg_default_for_image.txt",
        include_str!("../../../templates/tftp/pxelinux_cfg_default_for_image.txt"),
    ),
    (
        "tftp/boot_msg_for_image.txt",
        include_str!("../../../templates/tftp/boot_msg_for_image.txt"),
    ),
];

const YAST: &str = include_str!("../../../yast_templates/sles_minimal.xml");

/// A temporary boot server layout.
///
/// # Example
///
/// ```rust,no_run
/// use pxe_test_utils::TestWorkspace;
///
/// let ws = TestWorkspace::new();
/// ws.assert_file_contains("dhcpd.conf", "shared-network provisioning {");
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Workspace with manifest machines `kvmhost` and `storage`, both
    /// installing image `sles12`.
    pub fn new() -> Self {
        let ws = Self {
            temp_dir: TempDir::new().unwrap(),
        };

        for (relative, content) in TEMPLATES {
            ws.write(&format!("templates/{relative}"), content);
        }
        ws.write(&format!("yast_templates/{YAST_TEMPLATE}"), YAST);
        ws.write("dhcpd.conf", DHCPD_CONF);
        fs::create_dir_all(ws.http_root()).unwrap();
        ws.write("manifest.yaml", &ws.default_manifest());
        ws
    }

    fn default_manifest(&self) -> String {
        format!(
            "\
conf:
  http_root_dir: {http_root}
  dhcp_conf: {dhcp_conf}
  listen_port: 8888
  templates_dir: templates
  yast_templates_dir: yast_templates
  dhcp_service: isc-dhcp-server
vlan:
  name: provisioning
images:
  - name: sles12
    file_url: http://mirror.example.com/sles12.iso
    filename: sles12.iso
    save_dir: /srv/images
    mount_point: /srv/www/htdocs/sles12
    md5_value: 0123abcd
machines:
  - tag: kvmhost
    image: sles12
    yast_template: {YAST_TEMPLATE}
  - tag: storage
    image: sles12
    yast_template: {YAST_TEMPLATE}
",
            http_root = self.http_root().display(),
            dhcp_conf = self.dhcp_conf_path().display(),
        )
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root().join("manifest.yaml")
    }

    pub fn dhcp_conf_path(&self) -> PathBuf {
        self.root().join("dhcpd.conf")
    }

    pub fn http_root(&self) -> PathBuf {
        self.root().join("www")
    }

    pub fn dhcp_conf(&self) -> String {
        self.read("dhcpd.conf")
    }

    /// Write `content` to `path` (relative to the root), creating parents.
    pub fn write(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", full_path.display()));
    }

    pub fn read(&self, path: &str) -> String {
        let full_path = self.root().join(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Assert that `path` (relative to the root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to root) contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read(path);
        assert!(
            file_content.contains(content),
            "File {path} does not contain expected content.\nExpected: {content}\nActual: {file_content}"
        );
    }
}
