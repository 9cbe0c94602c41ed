//! Integration tests for the pxeprov binary.
//!
//! These tests exercise the actual compiled binary using assert_cmd. Only
//! commands that do not need the hardware API are run to completion.

use assert_cmd::Command;
use predicates::prelude::*;
use pxe_test_utils::TestWorkspace;

/// Get a Command for the pxeprov binary with a clean environment
fn pxeprov_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pxeprov"));
    for var in [
        "PXEPROV_CONFIG",
        "SL_USER",
        "SL_USERNAME",
        "SL_APIKEY",
        "SL_API_KEY",
        "SL_ENDPOINT",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_output() {
    pxeprov_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("bare-metal"))
        .stdout(predicate::str::contains("prepare"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn test_version_output() {
    pxeprov_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pxeprov"));
}

#[test]
fn test_config_is_required() {
    pxeprov_cmd()
        .args(["apply", "--show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--config"));
}

// ============================================================================
// Manifest Errors
// ============================================================================

#[test]
fn test_missing_manifest_fails() {
    let ws = TestWorkspace::new();
    pxeprov_cmd()
        .arg("-c")
        .arg(ws.root().join("nope.yaml"))
        .args(["apply", "--show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("nope.yaml"));
}

#[test]
fn test_invalid_manifest_names_the_problem() {
    let ws = TestWorkspace::new();
    let broken = ws.read("manifest.yaml").replace("image: sles12\n    yast", "image: rhel8\n    yast");
    ws.write("broken.yaml", &broken);

    pxeprov_cmd()
        .arg("-c")
        .arg(ws.root().join("broken.yaml"))
        .args(["apply", "--show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rhel8"));
}

// ============================================================================
// Commands Without the Hardware API
// ============================================================================

#[test]
fn test_generate_writes_scripts() {
    let ws = TestWorkspace::new();
    let out = ws.root().join("gen");

    pxeprov_cmd()
        .arg("-c")
        .arg(ws.manifest_path())
        .args(["--ip", "10.0.0.2", "generate", "--scripts", "tftp", "--gen-dir"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 files generated"));

    ws.assert_file_exists("gen/mount_image.sh");
    ws.assert_file_contains("gen/default_for_sles12", "autoyast=http://10.0.0.2/autoyast/");
    assert!(!out.join("download_image_sles12.sh").exists());
}

#[test]
fn test_generate_rejects_unknown_script_type() {
    let ws = TestWorkspace::new();

    pxeprov_cmd()
        .arg("-c")
        .arg(ws.manifest_path())
        .args(["generate", "--scripts", "iso", "--gen-dir"])
        .arg(ws.root().join("gen"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid script type 'iso'"));
}

#[test]
fn test_apply_show_lists_configured_hosts() {
    let ws = TestWorkspace::new();
    ws.write(
        "dhcpd.conf",
        "shared-network provisioning {\n}\ngroup {\nhost web1 {\n}\nhost db1 {\n}\n}\n",
    );

    pxeprov_cmd()
        .arg("-c")
        .arg(ws.manifest_path())
        .args(["apply", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("web1"))
        .stdout(predicate::str::contains("db1"));
}

#[test]
fn test_apply_show_without_hosts() {
    let ws = TestWorkspace::new();

    pxeprov_cmd()
        .arg("-c")
        .arg(ws.manifest_path())
        .args(["apply", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("None"));
}

#[test]
fn test_dhcp_conf_override() {
    let ws = TestWorkspace::new();
    ws.write("other.conf", "group {\nhost override1 {\n}\n}\n");

    pxeprov_cmd()
        .arg("-c")
        .arg(ws.manifest_path())
        .arg("--dhcp-conf")
        .arg(ws.root().join("other.conf"))
        .args(["apply", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("override1"));
}

// ============================================================================
// Selection and Credentials
// ============================================================================

#[test]
fn test_unknown_tag_is_rejected() {
    let ws = TestWorkspace::new();

    pxeprov_cmd()
        .arg("-c")
        .arg(ws.manifest_path())
        .args(["prepare", "--tag", "gpu"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid tag 'gpu'"))
        .stderr(predicate::str::contains("kvmhost, storage"));
}

#[test]
fn test_prepare_without_credentials_fails() {
    let ws = TestWorkspace::new();

    pxeprov_cmd()
        .arg("-c")
        .arg(ws.manifest_path())
        .args(["prepare", "--hostname", "web1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing SoftLayer credentials"));

    // nothing was touched
    assert_eq!(ws.dhcp_conf(), pxe_test_utils::workspace::DHCPD_CONF);
}
