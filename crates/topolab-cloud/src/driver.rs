//! Vendor SDK seam
//!
//! A [`ComputeDriver`] wraps one vendor's compute API. Drivers report
//! failures as [`DriverError`]; the controller turns those into the
//! typed [`CloudError`](crate::CloudError) taxonomy.

use crate::model::{Image, Instance, KeyPair, Size};
use crate::status::ParsedError;
use async_trait::async_trait;
use std::fmt;

/// Failure reported by a driver.
///
/// `status` is the HTTP-like status code when the vendor exposes one.
/// `permanent` marks status-less failures that retrying cannot fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    pub status: Option<u16>,
    pub message: String,
    pub permanent: bool,
}

impl DriverError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            permanent: false,
        }
    }

    /// A failure with no status, e.g. a dropped connection.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            permanent: false,
        }
    }

    /// A failure with no status that will recur on every attempt, such as
    /// an unknown region or a response the driver cannot decode.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            permanent: true,
        }
    }

    /// Build from an SDK message that encodes the status in its first
    /// three characters.
    pub fn from_message(text: &str) -> Self {
        let parsed = ParsedError::parse(text);
        Self {
            status: parsed.status,
            message: parsed.detail,
            permanent: false,
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{}{}", status, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for DriverError {}

pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// SSH public key to install on a new node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAuthSshKey {
    pub public_key: String,
}

/// Arguments for [`ComputeDriver::create_node`]
#[derive(Debug, Clone)]
pub struct CreateNodeRequest {
    pub name: String,
    pub size: Size,
    pub image: Image,
    pub auth: Option<NodeAuthSshKey>,
}

/// Compute API of one cloud vendor
#[async_trait]
pub trait ComputeDriver: Send + Sync {
    /// Short provider identifier (e.g., "rackspace")
    fn name(&self) -> &str;

    /// Validate the credentials the driver was built with.
    async fn authenticate(&self) -> DriverResult<()>;

    async fn list_nodes(&self) -> DriverResult<Vec<Instance>>;

    async fn create_node(&self, request: CreateNodeRequest) -> DriverResult<Instance>;

    async fn destroy_node(&self, node: &Instance) -> DriverResult<bool>;

    async fn list_sizes(&self) -> DriverResult<Vec<Size>>;

    async fn get_size(&self, size_id: &str) -> DriverResult<Size>;

    /// Look up an image; `Ok(None)` when it does not exist.
    async fn get_image(&self, image_id: &str) -> DriverResult<Option<Image>>;

    async fn list_images(&self) -> DriverResult<Vec<Image>>;

    async fn create_key_pair(&self, name: &str) -> DriverResult<KeyPair>;

    async fn delete_key_pair(&self, key_pair: &KeyPair) -> DriverResult<bool>;

    async fn list_key_pairs(&self) -> DriverResult<Vec<KeyPair>>;
}

#[async_trait]
impl<T: ComputeDriver + ?Sized> ComputeDriver for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn authenticate(&self) -> DriverResult<()> {
        (**self).authenticate().await
    }

    async fn list_nodes(&self) -> DriverResult<Vec<Instance>> {
        (**self).list_nodes().await
    }

    async fn create_node(&self, request: CreateNodeRequest) -> DriverResult<Instance> {
        (**self).create_node(request).await
    }

    async fn destroy_node(&self, node: &Instance) -> DriverResult<bool> {
        (**self).destroy_node(node).await
    }

    async fn list_sizes(&self) -> DriverResult<Vec<Size>> {
        (**self).list_sizes().await
    }

    async fn get_size(&self, size_id: &str) -> DriverResult<Size> {
        (**self).get_size(size_id).await
    }

    async fn get_image(&self, image_id: &str) -> DriverResult<Option<Image>> {
        (**self).get_image(image_id).await
    }

    async fn list_images(&self) -> DriverResult<Vec<Image>> {
        (**self).list_images().await
    }

    async fn create_key_pair(&self, name: &str) -> DriverResult<KeyPair> {
        (**self).create_key_pair(name).await
    }

    async fn delete_key_pair(&self, key_pair: &KeyPair) -> DriverResult<bool> {
        (**self).delete_key_pair(key_pair).await
    }

    async fn list_key_pairs(&self) -> DriverResult<Vec<KeyPair>> {
        (**self).list_key_pairs().await
    }
}
