//! In-memory compute driver
//!
//! Keeps nodes and key pairs in process memory. Used by tests and by the
//! `dummy` provider, which lets the CLI run without a cloud account.
//! Failures can be injected per operation with [`DummyDriver::fail_next`].

use crate::driver::{ComputeDriver, CreateNodeRequest, DriverError, DriverResult};
use crate::model::{Image, Instance, InstanceState, KeyPair, Size};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Driver operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DummyOp {
    Authenticate,
    ListNodes,
    CreateNode,
    DestroyNode,
    ListSizes,
    GetSize,
    GetImage,
    ListImages,
    CreateKeyPair,
    DeleteKeyPair,
    ListKeyPairs,
}

#[derive(Default)]
struct DummyState {
    nodes: Vec<Instance>,
    authorized_keys: HashMap<String, String>,
    key_pairs: Vec<KeyPair>,
    next_id: u32,
    failures: HashMap<DummyOp, DriverError>,
}

impl DummyState {
    fn take_failure(&mut self, op: DummyOp) -> DriverResult<()> {
        match self.failures.remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }
}

/// Compute driver backed by process memory
pub struct DummyDriver {
    sizes: Vec<Size>,
    images: Vec<Image>,
    state: Mutex<DummyState>,
}

impl Default for DummyDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyDriver {
    /// An empty account.
    pub fn new() -> Self {
        Self {
            sizes: default_sizes(),
            images: default_images(),
            state: Mutex::new(DummyState::default()),
        }
    }

    /// An account that already runs `count` nodes named `dummy-1`...
    pub fn with_nodes(count: u32) -> Self {
        let mut state = DummyState::default();
        for _ in 0..count {
            let id = state.allocate_id();
            let mut node = Instance::new(id.clone(), format!("dummy-{}", id))
                .with_state(InstanceState::Running);
            node.size_id = Some("1".to_string());
            node.image_id = Some("ubuntu-22.04".to_string());
            node.public_ips.push(format!("127.0.0.{}", id));
            state.nodes.push(node);
        }

        Self {
            state: Mutex::new(state),
            ..Self::new()
        }
    }

    /// Make the next call of `op` fail with `error`.
    pub async fn fail_next(&self, op: DummyOp, error: DriverError) {
        self.state.lock().await.failures.insert(op, error);
    }

    /// Public key installed on the node with `instance_id`, if any.
    pub async fn authorized_key(&self, instance_id: &str) -> Option<String> {
        self.state
            .lock()
            .await
            .authorized_keys
            .get(instance_id)
            .cloned()
    }
}

fn default_sizes() -> Vec<Size> {
    [(1, "Small", 512, 20), (2, "Medium", 2048, 40), (3, "Large", 4096, 80)]
        .into_iter()
        .map(|(id, name, ram, disk)| Size {
            id: id.to_string(),
            name: name.to_string(),
            ram,
            disk,
            vcpus: Some(id),
            price: Some(f64::from(id) * 0.02),
        })
        .collect()
}

fn default_images() -> Vec<Image> {
    [
        ("ubuntu-22.04", "Ubuntu 22.04 LTS"),
        ("debian-12", "Debian 12"),
        ("alpine-3.19", "Alpine 3.19"),
    ]
    .into_iter()
    .map(|(id, name)| Image {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}

#[async_trait]
impl ComputeDriver for DummyDriver {
    fn name(&self) -> &str {
        "dummy"
    }

    async fn authenticate(&self) -> DriverResult<()> {
        self.state.lock().await.take_failure(DummyOp::Authenticate)
    }

    async fn list_nodes(&self) -> DriverResult<Vec<Instance>> {
        let mut state = self.state.lock().await;
        state.take_failure(DummyOp::ListNodes)?;
        Ok(state.nodes.clone())
    }

    async fn create_node(&self, request: CreateNodeRequest) -> DriverResult<Instance> {
        let mut state = self.state.lock().await;
        state.take_failure(DummyOp::CreateNode)?;

        let id = state.allocate_id();
        let mut node = Instance::new(id.clone(), request.name).with_state(InstanceState::Pending);
        node.size_id = Some(request.size.id);
        node.image_id = Some(request.image.id);

        if let Some(auth) = request.auth {
            state.authorized_keys.insert(id, auth.public_key);
        }
        state.nodes.push(node.clone());
        tracing::debug!("dummy: created node {}", node.id);
        Ok(node)
    }

    async fn destroy_node(&self, node: &Instance) -> DriverResult<bool> {
        let mut state = self.state.lock().await;
        state.take_failure(DummyOp::DestroyNode)?;

        let before = state.nodes.len();
        state.nodes.retain(|n| n.id != node.id);
        if state.nodes.len() == before {
            return Err(DriverError::new(404, " Instance not found"));
        }
        state.authorized_keys.remove(&node.id);
        Ok(true)
    }

    async fn list_sizes(&self) -> DriverResult<Vec<Size>> {
        self.state.lock().await.take_failure(DummyOp::ListSizes)?;
        Ok(self.sizes.clone())
    }

    async fn get_size(&self, size_id: &str) -> DriverResult<Size> {
        self.state.lock().await.take_failure(DummyOp::GetSize)?;
        self.sizes
            .iter()
            .find(|s| s.id == size_id)
            .cloned()
            .ok_or_else(|| DriverError::new(404, " Size not found"))
    }

    async fn get_image(&self, image_id: &str) -> DriverResult<Option<Image>> {
        self.state.lock().await.take_failure(DummyOp::GetImage)?;
        Ok(self.images.iter().find(|i| i.id == image_id).cloned())
    }

    async fn list_images(&self) -> DriverResult<Vec<Image>> {
        self.state.lock().await.take_failure(DummyOp::ListImages)?;
        Ok(self.images.clone())
    }

    async fn create_key_pair(&self, name: &str) -> DriverResult<KeyPair> {
        let mut state = self.state.lock().await;
        state.take_failure(DummyOp::CreateKeyPair)?;

        if state.key_pairs.iter().any(|k| k.name == name) {
            return Err(DriverError::new(409, " Key pair already exists"));
        }

        let serial = state.allocate_id();
        let key_pair = KeyPair {
            name: name.to_string(),
            public_key: format!("ssh-ed25519 AAAADUMMY{} {}", serial, name),
            fingerprint: Some(format!("dummy:{}", serial)),
            private_key: Some(format!("DUMMY PRIVATE KEY {}", serial)),
        };
        state.key_pairs.push(KeyPair {
            private_key: None,
            ..key_pair.clone()
        });
        Ok(key_pair)
    }

    async fn delete_key_pair(&self, key_pair: &KeyPair) -> DriverResult<bool> {
        let mut state = self.state.lock().await;
        state.take_failure(DummyOp::DeleteKeyPair)?;

        let before = state.key_pairs.len();
        state.key_pairs.retain(|k| k.name != key_pair.name);
        if state.key_pairs.len() == before {
            return Err(DriverError::new(404, " Key pair not found"));
        }
        Ok(true)
    }

    async fn list_key_pairs(&self) -> DriverResult<Vec<KeyPair>> {
        let mut state = self.state.lock().await;
        state.take_failure(DummyOp::ListKeyPairs)?;
        Ok(state.key_pairs.clone())
    }
}
