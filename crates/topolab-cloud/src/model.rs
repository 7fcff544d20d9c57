//! Vendor-neutral compute objects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Account credentials for one provider session
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    username: String,
    api_key: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_key: api_key.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Lifecycle state of a remote node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    Running,
    Rebooting,
    Terminated,
    Pending,
    Stopped,
    #[default]
    Unknown,
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceState::Running => write!(f, "running"),
            InstanceState::Rebooting => write!(f, "rebooting"),
            InstanceState::Terminated => write!(f, "terminated"),
            InstanceState::Pending => write!(f, "pending"),
            InstanceState::Stopped => write!(f, "stopped"),
            InstanceState::Unknown => write!(f, "unknown"),
        }
    }
}

/// Snapshot of a remote compute node.
///
/// The provider owns the authoritative state; refresh through
/// `CloudCtrl::get_instance` before trusting `state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub name: String,
    pub size_id: Option<String>,
    pub image_id: Option<String>,
    pub state: InstanceState,
    #[serde(default)]
    pub public_ips: Vec<String>,
    #[serde(default)]
    pub private_ips: Vec<String>,
}

impl Instance {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            size_id: None,
            image_id: None,
            state: InstanceState::Unknown,
            public_ips: Vec::new(),
            private_ips: Vec::new(),
        }
    }

    pub fn with_state(mut self, state: InstanceState) -> Self {
        self.state = state;
        self
    }

    /// First public address, if the provider assigned one.
    pub fn public_ip(&self) -> Option<&str> {
        self.public_ips.first().map(String::as_str)
    }
}

/// Machine size (flavor) offered by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub id: String,
    pub name: String,
    /// RAM in MB
    pub ram: u32,
    /// Disk in GB
    pub disk: u32,
    pub vcpus: Option<u32>,
    /// Hourly price, when the provider publishes one
    pub price: Option<f64>,
}

/// Boot image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub name: String,
}

/// SSH key pair registered with the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    pub name: String,
    pub public_key: String,
    pub fingerprint: Option<String>,
    /// Only present in the response that created the pair
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}
