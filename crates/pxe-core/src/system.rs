//! Host-side helpers: service restarts and local addressing

use std::net::{Ipv4Addr, UdpSocket};

use async_trait::async_trait;
use tokio::process::Command;

use crate::{Error, Result};

/// Restarts system services.
#[async_trait]
pub trait ServiceControl: Send + Sync {
    async fn restart(&self, unit: &str) -> Result<()>;
}

/// [`ServiceControl`] through `systemctl restart <unit>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Systemctl;

#[async_trait]
impl ServiceControl for Systemctl {
    async fn restart(&self, unit: &str) -> Result<()> {
        tracing::info!(unit, "restarting service");
        let output = Command::new("systemctl")
            .args(["restart", unit])
            .output()
            .await
            .map_err(|e| Error::ServiceFailed {
                unit: unit.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ServiceFailed {
                unit: unit.to_string(),
                message: format!("{}: {}", output.status, stderr.trim()),
            });
        }
        tracing::debug!(unit, "service restarted");
        Ok(())
    }
}

/// The address this host uses for outbound IPv4 traffic, or `127.0.0.1`.
///
/// Connecting a UDP socket sends nothing; it only selects a route.
pub fn local_ipv4() -> Ipv4Addr {
    let probe = || -> std::io::Result<Ipv4Addr> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect((Ipv4Addr::new(10, 255, 255, 255), 1))?;
        match socket.local_addr()?.ip() {
            std::net::IpAddr::V4(ip) if !ip.is_unspecified() => Ok(ip),
            _ => Ok(Ipv4Addr::LOCALHOST),
        }
    };
    probe().unwrap_or(Ipv4Addr::LOCALHOST)
}

/// Upper-case hex form of an IPv4 address, as PXE clients request files by.
///
/// `10.0.0.5` becomes `0A000005`.
pub fn ip_to_hex(ip: &str) -> Result<String> {
    let addr: Ipv4Addr = ip
        .trim()
        .parse()
        .map_err(|_| Error::InvalidIp(ip.to_string()))?;
    Ok(format!("{:08X}", u32::from(addr)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("10.0.0.5", "0A000005")]
    #[case("192.168.1.254", "C0A801FE")]
    #[case("0.0.0.0", "00000000")]
    fn hex_form(#[case] ip: &str, #[case] expected: &str) {
        assert_eq!(ip_to_hex(ip).unwrap(), expected);
    }

    #[test]
    fn hex_rejects_garbage() {
        assert!(matches!(ip_to_hex("10.0.0"), Err(Error::InvalidIp(_))));
    }

    #[test]
    fn local_ipv4_is_never_unspecified() {
        assert!(!local_ipv4().is_unspecified());
    }
}
