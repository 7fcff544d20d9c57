//! Vendor-neutral instance and key pair lifecycle

use crate::driver::{ComputeDriver, CreateNodeRequest, DriverError, NodeAuthSshKey};
use crate::error::{CloudError, ErrorKind, Result};
use crate::model::{Credential, Image, Instance, KeyPair, Size};
use crate::status::StatusTable;

/// Statuses that mean "the credentials were rejected".
const AUTH_REJECTED: &[u16] = &[401, 403];

/// Key pair names are unique per account; the provider answers a
/// duplicate with 409.
const KEY_PAIR_OVERRIDES: &[(u16, ErrorKind)] = &[(409, ErrorKind::KeyPairExists)];

/// Controller for one provider session.
///
/// Every operation either returns the domain object or a single
/// [`CloudError`]. Driver failures with a status are mapped through the
/// status table; failures without one are logged and surfaced as
/// [`CloudError::Provider`], whatever the operation, unless the driver
/// marks them permanent, which surfaces as [`CloudError::InvalidConfig`].
pub struct CloudCtrl {
    credential: Credential,
    driver: Box<dyn ComputeDriver>,
}

impl CloudCtrl {
    pub fn new(credential: Credential, driver: impl ComputeDriver + 'static) -> Self {
        Self::from_boxed(credential, Box::new(driver))
    }

    pub fn from_boxed(credential: Credential, driver: Box<dyn ComputeDriver>) -> Self {
        Self { credential, driver }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn provider_name(&self) -> &str {
        self.driver.name()
    }

    fn surface(&self, operation: &str, err: DriverError, table: StatusTable<'_>) -> CloudError {
        match err.status {
            Some(status) => {
                let mapped = table.dispatch(status, err.message);
                tracing::debug!(
                    "{} on {} failed with status {}: {}",
                    operation,
                    self.driver.name(),
                    status,
                    mapped
                );
                mapped
            }
            None if err.permanent => {
                tracing::error!(
                    "{} cannot succeed on {}: {}",
                    operation,
                    self.driver.name(),
                    err.message
                );
                CloudError::InvalidConfig(err.message)
            }
            None => {
                tracing::error!("{} raised a provider error: {}", operation, err.message);
                CloudError::Provider(err.message)
            }
        }
    }

    /// Validate the stored credentials.
    ///
    /// A rejection is `Ok(false)`; only other failures are errors.
    pub async fn authenticate(&self) -> Result<bool> {
        tracing::debug!(
            "Authenticating {} as {}",
            self.driver.name(),
            self.credential.username()
        );
        match self.driver.authenticate().await {
            Ok(()) => Ok(true),
            Err(err) if err.status.is_some_and(|s| AUTH_REJECTED.contains(&s)) => {
                tracing::warn!(
                    "Credentials for {} were rejected:{}",
                    self.credential.username(),
                    err.message
                );
                Ok(false)
            }
            Err(err) => Err(self.surface("authenticate", err, StatusTable::base())),
        }
    }

    pub async fn list_sizes(&self) -> Result<Vec<Size>> {
        self.driver
            .list_sizes()
            .await
            .map_err(|e| self.surface("list_sizes", e, StatusTable::base()))
    }

    pub async fn list_images(&self) -> Result<Vec<Image>> {
        self.driver
            .list_images()
            .await
            .map_err(|e| self.surface("list_images", e, StatusTable::base()))
    }

    pub async fn get_image(&self, image_id: &str) -> Result<Option<Image>> {
        self.driver
            .get_image(image_id)
            .await
            .map_err(|e| self.surface("get_image", e, StatusTable::base()))
    }

    /// Create a new instance.
    ///
    /// The image and size must both resolve. A key pair's public key is
    /// installed on the node for SSH access.
    pub async fn create_instance(
        &self,
        name: &str,
        size_id: &str,
        image_id: &str,
        key_pair: Option<&KeyPair>,
    ) -> Result<Instance> {
        let image = self
            .get_image(image_id)
            .await?
            .ok_or_else(|| CloudError::ItemNotFound("Image not found".to_string()))?;

        let size = self
            .driver
            .get_size(size_id)
            .await
            .map_err(|e| self.surface("create_instance", e, StatusTable::base()))?;

        let request = CreateNodeRequest {
            name: name.to_string(),
            size,
            image,
            auth: key_pair.map(|k| NodeAuthSshKey {
                public_key: k.public_key.clone(),
            }),
        };

        tracing::info!("Creating instance {} ({}, {})", name, size_id, image_id);
        let instance = self
            .driver
            .create_node(request)
            .await
            .map_err(|e| self.surface("create_instance", e, StatusTable::base()))?;
        tracing::debug!("Created instance {} with id {}", instance.name, instance.id);
        Ok(instance)
    }

    /// Delete the instance. Returns what the provider reported.
    pub async fn delete_instance(&self, instance: &Instance) -> Result<bool> {
        tracing::info!("Deleting instance {} ({})", instance.name, instance.id);
        self.driver
            .destroy_node(instance)
            .await
            .map_err(|e| self.surface("delete_instance", e, StatusTable::base()))
    }

    /// Fetch the provider's current view of `instance`.
    ///
    /// Scans the full listing; instance counts per account are small.
    pub async fn get_instance(&self, instance: &Instance) -> Result<Instance> {
        self.list_instances()
            .await?
            .into_iter()
            .find(|i| i.id == instance.id)
            .ok_or_else(|| CloudError::ItemNotFound("Instance not found".to_string()))
    }

    /// Instances in the current region, in provider order.
    pub async fn list_instances(&self) -> Result<Vec<Instance>> {
        self.driver
            .list_nodes()
            .await
            .map_err(|e| self.surface("list_instances", e, StatusTable::base()))
    }

    pub async fn create_key_pair(&self, name: &str) -> Result<KeyPair> {
        tracing::info!("Creating key pair {}", name);
        self.driver.create_key_pair(name).await.map_err(|e| {
            self.surface(
                "create_key_pair",
                e,
                StatusTable::with_overrides(KEY_PAIR_OVERRIDES),
            )
        })
    }

    pub async fn delete_key_pair(&self, key_pair: &KeyPair) -> Result<bool> {
        tracing::info!("Deleting key pair {}", key_pair.name);
        self.driver
            .delete_key_pair(key_pair)
            .await
            .map_err(|e| self.surface("delete_key_pair", e, StatusTable::base()))
    }

    pub async fn list_key_pairs(&self) -> Result<Vec<KeyPair>> {
        self.driver
            .list_key_pairs()
            .await
            .map_err(|e| self.surface("list_key_pairs", e, StatusTable::base()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::{DummyDriver, DummyOp};
    use std::sync::Arc;

    fn ctrl_with(driver: Arc<DummyDriver>) -> CloudCtrl {
        CloudCtrl::new(Credential::new("alice", "key"), driver)
    }

    #[tokio::test]
    async fn test_create_then_list_finds_instance() {
        let driver = Arc::new(DummyDriver::new());
        let ctrl = ctrl_with(driver);

        let created = ctrl
            .create_instance("router-lab", "2", "ubuntu-22.04", None)
            .await
            .unwrap();

        let listed = ctrl.list_instances().await.unwrap();
        let found = listed.iter().find(|i| i.id == created.id).unwrap();
        assert_eq!(found.name, "router-lab");
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn test_create_with_missing_image() {
        let ctrl = ctrl_with(Arc::new(DummyDriver::new()));
        let err = ctrl
            .create_instance("x", "1", "no-such-image", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::ItemNotFound));
    }

    #[tokio::test]
    async fn test_create_with_missing_size() {
        let ctrl = ctrl_with(Arc::new(DummyDriver::new()));
        let err = ctrl
            .create_instance("x", "99", "ubuntu-22.04", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::ItemNotFound));
    }

    #[tokio::test]
    async fn test_create_attaches_key_pair() {
        let driver = Arc::new(DummyDriver::new());
        let ctrl = ctrl_with(driver.clone());
        let key = ctrl.create_key_pair("lab").await.unwrap();

        let instance = ctrl
            .create_instance("with-key", "1", "ubuntu-22.04", Some(&key))
            .await
            .unwrap();

        assert_eq!(
            driver.authorized_key(&instance.id).await,
            Some(key.public_key.clone())
        );
    }

    #[tokio::test]
    async fn test_create_surfaces_status_error() {
        let driver = Arc::new(DummyDriver::new());
        driver
            .fail_next(DummyOp::CreateNode, DriverError::from_message("413 Quota exceeded"))
            .await;
        let ctrl = ctrl_with(driver);

        let err = ctrl
            .create_instance("x", "1", "ubuntu-22.04", None)
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::OverLimit(ref d) if d == " Quota exceeded"));
    }

    #[tokio::test]
    async fn test_unparseable_errors_surface_for_every_operation() {
        let driver = Arc::new(DummyDriver::with_nodes(1));
        let ctrl = ctrl_with(driver.clone());
        let node = ctrl.list_instances().await.unwrap().remove(0);
        let key = ctrl.create_key_pair("k").await.unwrap();
        let boom = || DriverError::from_message("erroccurred");

        driver.fail_next(DummyOp::CreateNode, boom()).await;
        let err = ctrl
            .create_instance("x", "1", "ubuntu-22.04", None)
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::Provider(ref d) if d == "erroccurred"));

        driver.fail_next(DummyOp::ListNodes, boom()).await;
        assert!(matches!(
            ctrl.list_instances().await,
            Err(CloudError::Provider(_))
        ));

        driver.fail_next(DummyOp::DestroyNode, boom()).await;
        assert!(matches!(
            ctrl.delete_instance(&node).await,
            Err(CloudError::Provider(_))
        ));

        driver.fail_next(DummyOp::CreateKeyPair, boom()).await;
        assert!(matches!(
            ctrl.create_key_pair("k2").await,
            Err(CloudError::Provider(_))
        ));

        driver.fail_next(DummyOp::DeleteKeyPair, boom()).await;
        assert!(matches!(
            ctrl.delete_key_pair(&key).await,
            Err(CloudError::Provider(_))
        ));
    }

    #[tokio::test]
    async fn test_permanent_failures_are_not_transient() {
        let driver = Arc::new(DummyDriver::new());
        let ctrl = ctrl_with(driver.clone());

        driver
            .fail_next(
                DummyOp::ListNodes,
                DriverError::permanent("No compute endpoint for region 'SYD'"),
            )
            .await;
        let err = ctrl.list_instances().await.unwrap_err();
        assert!(matches!(err, CloudError::InvalidConfig(ref d) if d.contains("SYD")));
        assert!(!err.is_transient());

        driver
            .fail_next(DummyOp::ListNodes, DriverError::transport("connection reset"))
            .await;
        let err = ctrl.list_instances().await.unwrap_err();
        assert!(matches!(err, CloudError::Provider(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_delete_instance() {
        let ctrl = ctrl_with(Arc::new(DummyDriver::with_nodes(2)));
        let node = ctrl.list_instances().await.unwrap().remove(0);

        assert!(ctrl.delete_instance(&node).await.unwrap());
        let err = ctrl.get_instance(&node).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::ItemNotFound));

        let err = ctrl.delete_instance(&node).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::ItemNotFound));
    }

    #[tokio::test]
    async fn test_get_instance_returns_provider_view() {
        let ctrl = ctrl_with(Arc::new(DummyDriver::with_nodes(3)));
        let listed = ctrl.list_instances().await.unwrap();

        let stale = Instance::new(listed[1].id.clone(), "renamed-locally");
        let fresh = ctrl.get_instance(&stale).await.unwrap();
        assert_eq!(fresh, listed[1]);

        let missing = Instance::new("does-not-exist", "ghost");
        let err = ctrl.get_instance(&missing).await.unwrap_err();
        assert!(matches!(err, CloudError::ItemNotFound(ref d) if d == "Instance not found"));
    }

    #[tokio::test]
    async fn test_duplicate_key_pair_maps_to_key_pair_exists() {
        let ctrl = ctrl_with(Arc::new(DummyDriver::new()));
        ctrl.create_key_pair("lab").await.unwrap();

        let err = ctrl.create_key_pair("lab").await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::KeyPairExists));
    }

    #[tokio::test]
    async fn test_key_pair_override_beats_base_table() {
        let driver = Arc::new(DummyDriver::new());
        driver
            .fail_next(
                DummyOp::CreateKeyPair,
                DriverError::from_message("409 Key pair already exists"),
            )
            .await;
        let ctrl = ctrl_with(driver.clone());

        let err = ctrl.create_key_pair("fresh").await.unwrap_err();
        assert!(matches!(err, CloudError::KeyPairExists(ref d) if d == " Key pair already exists"));

        // 409 has no base entry, so other operations treat it as unmapped
        driver
            .fail_next(DummyOp::ListKeyPairs, DriverError::new(409, " conflict"))
            .await;
        let err = ctrl.list_key_pairs().await.unwrap_err();
        assert!(matches!(err, CloudError::UnmappedStatus { status: 409, .. }));
    }

    #[tokio::test]
    async fn test_key_pair_lifecycle() {
        let ctrl = ctrl_with(Arc::new(DummyDriver::new()));
        let key = ctrl.create_key_pair("lab").await.unwrap();
        assert!(key.private_key.is_some());

        let names: Vec<_> = ctrl
            .list_key_pairs()
            .await
            .unwrap()
            .into_iter()
            .map(|k| k.name)
            .collect();
        assert_eq!(names, vec!["lab".to_string()]);

        assert!(ctrl.delete_key_pair(&key).await.unwrap());
        assert!(ctrl.list_key_pairs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_authenticate() {
        let ctrl = ctrl_with(Arc::new(DummyDriver::new()));
        assert!(ctrl.authenticate().await.unwrap());

        let driver = Arc::new(DummyDriver::new());
        driver
            .fail_next(DummyOp::Authenticate, DriverError::new(401, " bad key"))
            .await;
        assert!(!ctrl_with(driver.clone()).authenticate().await.unwrap());

        driver
            .fail_next(DummyOp::Authenticate, DriverError::transport("timed out"))
            .await;
        assert!(matches!(
            ctrl_with(driver).authenticate().await,
            Err(CloudError::Provider(_))
        ));
    }

    #[tokio::test]
    async fn test_list_sizes_passthrough() {
        let driver = Arc::new(DummyDriver::new());
        let ctrl = ctrl_with(driver.clone());
        let sizes = ctrl.list_sizes().await.unwrap();
        assert_eq!(sizes, driver.list_sizes().await.unwrap());
    }
}
