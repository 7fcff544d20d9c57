//! Rackspace / OpenStack Nova wire types

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use topolab_cloud::{Image, Instance, InstanceState, KeyPair, Size};

/// Service catalog entry that hosts the next-generation servers API
pub const COMPUTE_SERVICE: &str = "cloudServersOpenStack";

/// Where the SSH public key is injected on new servers
pub const AUTHORIZED_KEYS_PATH: &str = "/root/.ssh/authorized_keys";

// ---- identity ----

#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    pub auth: AuthBody<'a>,
}

#[derive(Debug, Serialize)]
pub struct AuthBody<'a> {
    #[serde(rename = "RAX-KSKEY:apiKeyCredentials")]
    pub api_key_credentials: ApiKeyCredentials<'a>,
}

#[derive(Debug, Serialize)]
pub struct ApiKeyCredentials<'a> {
    pub username: &'a str,
    #[serde(rename = "apiKey")]
    pub api_key: &'a str,
}

impl<'a> AuthRequest<'a> {
    pub fn new(username: &'a str, api_key: &'a str) -> Self {
        Self {
            auth: AuthBody {
                api_key_credentials: ApiKeyCredentials { username, api_key },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub access: Access,
}

#[derive(Debug, Deserialize)]
pub struct Access {
    pub token: Token,
    #[serde(rename = "serviceCatalog", default)]
    pub service_catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
pub struct Token {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

#[derive(Debug, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(rename = "publicURL")]
    pub public_url: String,
}

impl Access {
    /// Public compute URL for `region`; any region when `region` is empty.
    pub fn compute_endpoint(&self, region: &str) -> Option<&str> {
        let endpoints = &self
            .service_catalog
            .iter()
            .find(|entry| entry.name == COMPUTE_SERVICE)?
            .endpoints;

        if region.is_empty() {
            return endpoints.first().map(|e| e.public_url.as_str());
        }

        endpoints
            .iter()
            .find(|e| {
                e.region
                    .as_deref()
                    .is_some_and(|r| r.eq_ignore_ascii_case(region))
            })
            .map(|e| e.public_url.as_str())
    }
}

// ---- servers ----

#[derive(Debug, Deserialize)]
pub struct ServerList {
    pub servers: Vec<Server>,
}

#[derive(Debug, Deserialize)]
pub struct ServerEnvelope {
    pub server: Server,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub flavor: Option<IdRef>,
    /// Nova sends `""` instead of an object for volume-booted servers
    #[serde(default)]
    pub image: Option<serde_json::Value>,
    #[serde(default)]
    pub addresses: HashMap<String, Vec<Address>>,
}

#[derive(Debug, Deserialize)]
pub struct IdRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct Address {
    pub addr: String,
}

/// Map a Nova server status onto the vendor-neutral state.
pub fn instance_state(status: &str) -> InstanceState {
    match status.to_ascii_uppercase().as_str() {
        "ACTIVE" => InstanceState::Running,
        "BUILD" | "REBUILD" => InstanceState::Pending,
        "REBOOT" | "HARD_REBOOT" => InstanceState::Rebooting,
        "SHUTOFF" | "SUSPENDED" => InstanceState::Stopped,
        "DELETED" => InstanceState::Terminated,
        _ => InstanceState::Unknown,
    }
}

impl Server {
    pub fn into_instance(self) -> Instance {
        let image_id = self
            .image
            .as_ref()
            .and_then(|v| v.get("id"))
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let mut addresses = self.addresses;
        let ips = |key: &str, map: &mut HashMap<String, Vec<Address>>| {
            map.remove(key)
                .unwrap_or_default()
                .into_iter()
                .map(|a| a.addr)
                .collect::<Vec<_>>()
        };

        Instance {
            name: self.name.unwrap_or_default(),
            size_id: self.flavor.map(|f| f.id),
            image_id,
            // A freshly created server has no status yet
            state: self
                .status
                .as_deref()
                .map(instance_state)
                .unwrap_or(InstanceState::Pending),
            public_ips: ips("public", &mut addresses),
            private_ips: ips("private", &mut addresses),
            id: self.id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateServerRequest {
    pub server: CreateServer,
}

#[derive(Debug, Serialize)]
pub struct CreateServer {
    pub name: String,
    #[serde(rename = "imageRef")]
    pub image_ref: String,
    #[serde(rename = "flavorRef")]
    pub flavor_ref: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub personality: Vec<PersonalityFile>,
}

#[derive(Debug, Serialize)]
pub struct PersonalityFile {
    pub path: String,
    pub contents: String,
}

impl PersonalityFile {
    /// Install `public_key` as root's authorized key.
    pub fn authorized_key(public_key: &str) -> Self {
        Self {
            path: AUTHORIZED_KEYS_PATH.to_string(),
            contents: STANDARD.encode(public_key.as_bytes()),
        }
    }
}

// ---- flavors / images ----

#[derive(Debug, Deserialize)]
pub struct FlavorList {
    pub flavors: Vec<Flavor>,
}

#[derive(Debug, Deserialize)]
pub struct FlavorEnvelope {
    pub flavor: Flavor,
}

#[derive(Debug, Deserialize)]
pub struct Flavor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ram: u32,
    #[serde(default)]
    pub disk: u32,
    #[serde(default)]
    pub vcpus: Option<u32>,
}

impl From<Flavor> for Size {
    fn from(f: Flavor) -> Self {
        Size {
            id: f.id,
            name: f.name,
            ram: f.ram,
            disk: f.disk,
            vcpus: f.vcpus,
            price: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ImageList {
    pub images: Vec<ApiImage>,
}

#[derive(Debug, Deserialize)]
pub struct ImageEnvelope {
    pub image: ApiImage,
}

#[derive(Debug, Deserialize)]
pub struct ApiImage {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl From<ApiImage> for Image {
    fn from(i: ApiImage) -> Self {
        Image {
            id: i.id,
            name: i.name,
        }
    }
}

// ---- key pairs ----

#[derive(Debug, Serialize)]
pub struct CreateKeyPairRequest<'a> {
    pub keypair: NewKeyPair<'a>,
}

#[derive(Debug, Serialize)]
pub struct NewKeyPair<'a> {
    pub name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct KeyPairEnvelope {
    pub keypair: ApiKeyPair,
}

#[derive(Debug, Deserialize)]
pub struct KeyPairList {
    pub keypairs: Vec<KeyPairEnvelope>,
}

#[derive(Debug, Deserialize)]
pub struct ApiKeyPair {
    pub name: String,
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub private_key: Option<String>,
}

impl From<ApiKeyPair> for KeyPair {
    fn from(k: ApiKeyPair) -> Self {
        KeyPair {
            name: k.name,
            public_key: k.public_key,
            fingerprint: k.fingerprint,
            private_key: k.private_key,
        }
    }
}

/// Extract the human-readable message from an error body.
///
/// Nova wraps faults as `{"itemNotFound": {"message": "...", "code": 404}}`.
pub fn fault_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.as_object()?
                .values()
                .find_map(|fault| fault.get("message")?.as_str().map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}
