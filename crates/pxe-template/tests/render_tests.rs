use pretty_assertions::assert_eq;
use pxe_template::{Error, Vars, render_file, render_to_file};
use std::fs;
use tempfile::TempDir;

const HOST_TEMPLATE: &str = "\
host @server_hostname@ {
  hardware ethernet @server_mac_address@;
  fixed-address @server_ip@;
  option host-name \"@server_hostname@\";
  filename \"@server_image@/pxelinux.0\";
}
";

fn host_vars() -> Vars {
    Vars::new()
        .with("server_hostname", "web1")
        .with("server_mac_address", "00:11:22:33:44:55")
        .with("server_ip", "10.0.0.5")
        .with("server_image", "sles12")
}

#[test]
fn test_render_host_block() {
    let temp = TempDir::new().unwrap();
    let template = temp.path().join("dhcp_host_template.txt");
    fs::write(&template, HOST_TEMPLATE).unwrap();

    let rendered = render_file(&template, &host_vars()).unwrap();
    insta::assert_snapshot!(rendered, @r###"
host web1 {
  hardware ethernet 00:11:22:33:44:55;
  fixed-address 10.0.0.5;
  option host-name "web1";
  filename "sles12/pxelinux.0";
}
"###);
}

#[test]
fn test_render_to_file_creates_output_dirs() {
    let temp = TempDir::new().unwrap();
    let template = temp.path().join("in.txt");
    fs::write(&template, "ip=@server_ip@\n").unwrap();
    let out = temp.path().join("autoyast").join("0A000005");

    render_to_file(&template, &out, &host_vars()).unwrap();

    assert_eq!(fs::read_to_string(&out).unwrap(), "ip=10.0.0.5\n");
}

#[test]
fn test_merged_vars_override_base() {
    let temp = TempDir::new().unwrap();
    let template = temp.path().join("in.txt");
    fs::write(&template, "@server_ip@ @extra@\n").unwrap();

    let extra = Vars::new().with("server_ip", "10.0.0.9").with("extra", "x");
    let rendered = render_file(&template, &host_vars().merge(&extra)).unwrap();

    assert_eq!(rendered, "10.0.0.9 x\n");
}

#[test]
fn test_missing_template_is_error() {
    let temp = TempDir::new().unwrap();
    let err = render_file(&temp.path().join("absent.txt"), &Vars::new()).unwrap_err();
    let Error::Fs(inner) = err;
    assert_eq!(inner.path(), Some(temp.path().join("absent.txt").as_path()));
}
