//! REST client for the SoftLayer API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::inventory::Inventory;
use crate::types::{Device, DeviceKind, Subnet, SubnetFilter, Vlan, VlanRef};
use crate::wire::{self, ApiError, WireDevice, WireIpAddress, WireSubnet, WireVlan};
use crate::{Error, Result};

pub const DEFAULT_ENDPOINT: &str = "https://api.softlayer.com/rest/v3.1";

const USER_VARS: [&str; 2] = ["SL_USER", "SL_USERNAME"];
const API_KEY_VARS: [&str; 2] = ["SL_APIKEY", "SL_API_KEY"];

/// API user name and key.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_key", &"***")
            .finish()
    }
}

impl Credentials {
    /// Use explicit values where given, falling back to the environment.
    pub fn resolve(username: Option<String>, api_key: Option<String>) -> Result<Self> {
        let username = username.or_else(|| first_env(&USER_VARS));
        let api_key = api_key.or_else(|| first_env(&API_KEY_VARS));
        match (username, api_key) {
            (Some(username), Some(api_key)) => Ok(Self { username, api_key }),
            _ => Err(Error::MissingCredentials),
        }
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
}

/// [`Inventory`] backed by the SoftLayer REST API.
pub struct SoftLayerClient {
    http: Client,
    endpoint: String,
    credentials: Credentials,
}

impl SoftLayerClient {
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_endpoint(credentials, DEFAULT_ENDPOINT)
    }

    /// Client for a specific API root, e.g. a private network endpoint.
    pub fn with_endpoint(credentials: Credentials, endpoint: impl Into<String>) -> Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        mask: Option<&str>,
        filter: Option<Value>,
    ) -> Result<T> {
        let url = format!("{}/{}.json", self.endpoint, path);
        let mut request = self.http.get(&url).basic_auth(
            &self.credentials.username,
            Some(&self.credentials.api_key),
        );
        if let Some(mask) = mask {
            request = request.query(&[("objectMask", format!("mask[{mask}]"))]);
        }
        if let Some(filter) = filter {
            request = request.query(&[("objectFilter", filter.to_string())]);
        }

        tracing::debug!(%url, "SoftLayer request");
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json::<T>().await?)
    }

    async fn list_devices(&self, field: Value, kind: DeviceKind) -> Result<Vec<Device>> {
        let mask = wire::device_mask();
        let mut devices = Vec::new();

        if kind.includes_bare_metal() {
            let filter = json!({ "hardware": field });
            let found: Vec<WireDevice> = self
                .get("SoftLayer_Account/getHardware", Some(&mask), Some(filter))
                .await?;
            devices.extend(found.into_iter().map(Device::from));
        }
        if kind.includes_virtual() {
            let filter = json!({ "virtualGuests": field });
            let found: Vec<WireDevice> = self
                .get("SoftLayer_Account/getVirtualGuests", Some(&mask), Some(filter))
                .await?;
            devices.extend(found.into_iter().map(Device::from));
        }
        Ok(devices)
    }
}

fn in_filter(values: &[String]) -> Value {
    json!({
        "operation": "in",
        "options": [{ "name": "data", "value": values }]
    })
}

#[async_trait]
impl Inventory for SoftLayerClient {
    async fn devices_by_hostname(
        &self,
        hostnames: &[String],
        kind: DeviceKind,
    ) -> Result<Vec<Device>> {
        self.list_devices(json!({ "hostname": in_filter(hostnames) }), kind)
            .await
    }

    async fn devices_by_tag(&self, tags: &[String], kind: DeviceKind) -> Result<Vec<Device>> {
        let field = json!({ "tagReferences": { "tag": { "name": in_filter(tags) } } });
        self.list_devices(field, kind).await
    }

    async fn vlan(&self, vlan: &VlanRef, filter: SubnetFilter) -> Result<Option<Vlan>> {
        let mask = wire::vlan_mask();
        let found: Option<WireVlan> = match vlan {
            VlanRef::Id(id) => {
                let path = format!("SoftLayer_Network_Vlan/{id}/getObject");
                match self.get(&path, Some(&mask), None).await {
                    Ok(vlan) => Some(vlan),
                    Err(Error::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                        None
                    }
                    Err(e) => return Err(e),
                }
            }
            VlanRef::Name(name) => {
                let filter = json!({ "networkVlans": { "name": { "operation": name } } });
                let vlans: Vec<WireVlan> = self
                    .get("SoftLayer_Account/getNetworkVlans", Some(&mask), Some(filter))
                    .await?;
                vlans.into_iter().next()
            }
        };
        Ok(found.map(|v| v.into_vlan(filter)))
    }

    async fn subnet_for_ip(&self, ip: &str) -> Result<Option<Subnet>> {
        let path = format!("SoftLayer_Network_Subnet/getSubnetForIpAddress/{ip}");
        let found: Option<WireSubnet> = self.get(&path, Some(wire::SUBNET_MASK), None).await?;
        Ok(found.map(Subnet::from))
    }

    async fn ip_by_note_in_subnet(&self, subnet_id: u64, note: &str) -> Result<Option<String>> {
        let path = format!("SoftLayer_Network_Subnet/{subnet_id}/getIpAddresses");
        let filter = json!({ "ipAddresses": { "note": { "operation": note } } });
        let mut found: Vec<WireIpAddress> = self
            .get(&path, Some(wire::IP_ADDRESS_MASK), Some(filter))
            .await?;
        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop().map(|ip| ip.ip_address)),
            _ => Err(Error::AmbiguousIp {
                note: note.to_string(),
            }),
        }
    }

    async fn reboot_soft(&self, device_id: u64) -> Result<()> {
        let path = format!("SoftLayer_Hardware_Server/{device_id}/rebootSoft");
        let _accepted: Value = self.get(&path, None, None).await?;
        tracing::info!(device_id, "soft reboot requested");
        Ok(())
    }
}
