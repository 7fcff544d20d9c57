//! Supported cloud providers

use crate::error::CloudError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of providers a session can be opened against.
///
/// Parsed from the `cloud_provider` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Rackspace,
    /// In-memory provider for trying things out without an account
    Dummy,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::Rackspace, ProviderKind::Dummy];

    /// Settings key (e.g., "rackspace")
    pub fn key(self) -> &'static str {
        match self {
            ProviderKind::Rackspace => "rackspace",
            ProviderKind::Dummy => "dummy",
        }
    }

    /// Name shown to users
    pub fn display_name(self) -> &'static str {
        match self {
            ProviderKind::Rackspace => "Rackspace",
            ProviderKind::Dummy => "Dummy (local)",
        }
    }

    /// Whether opening a session needs a user name and API key.
    pub fn requires_credentials(self) -> bool {
        !matches!(self, ProviderKind::Dummy)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ProviderKind {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CloudError::ProviderNotFound(s.to_string()))
    }
}
