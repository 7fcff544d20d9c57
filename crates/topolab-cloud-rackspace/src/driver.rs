//! Rackspace compute driver
//!
//! Talks to the Rackspace identity service and the Nova-compatible
//! next-generation servers API directly over HTTPS.

use crate::api::{
    self, AuthRequest, AuthResponse, CreateKeyPairRequest, CreateServer, CreateServerRequest,
    FlavorEnvelope, FlavorList, ImageEnvelope, ImageList, KeyPairEnvelope, KeyPairList,
    NewKeyPair, PersonalityFile, ServerEnvelope, ServerList,
};
use crate::error::{RackspaceError, Result};
use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::Mutex;
use topolab_cloud::{
    ComputeDriver, CreateNodeRequest, Credential, DriverResult, Image, Instance, KeyPair, Size,
};

pub const DEFAULT_IDENTITY_URL: &str = "https://identity.api.rackspacecloud.com/v2.0";

/// Connection settings for [`RackspaceDriver`]
#[derive(Debug, Clone)]
pub struct RackspaceConfig {
    pub credential: Credential,
    /// Region code such as "DFW"; empty picks the first catalog endpoint
    pub region: String,
    pub identity_url: String,
    pub timeout: Duration,
}

impl RackspaceConfig {
    pub fn new(credential: Credential, region: impl Into<String>) -> Self {
        Self {
            credential,
            region: region.into(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_identity_url(mut self, url: impl Into<String>) -> Self {
        self.identity_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
struct Session {
    token: String,
    endpoint: Url,
}

/// Rackspace cloud servers driver
pub struct RackspaceDriver {
    client: reqwest::Client,
    config: RackspaceConfig,
    session: Mutex<Option<Session>>,
}

impl RackspaceDriver {
    pub fn new(config: RackspaceConfig) -> Result<Self> {
        if config.credential.username().is_empty() {
            return Err(RackspaceError::InvalidConfig(
                "username must not be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            config,
            session: Mutex::new(None),
        })
    }

    pub fn region(&self) -> &str {
        &self.config.region
    }

    /// Exchange the API key for a token and locate the compute endpoint.
    async fn login(&self) -> Result<Session> {
        let url = format!("{}/tokens", self.config.identity_url.trim_end_matches('/'));
        let credential = &self.config.credential;
        tracing::debug!("Authenticating {} against {}", credential.username(), url);

        let response = self
            .client
            .post(&url)
            .json(&AuthRequest::new(credential.username(), credential.api_key()))
            .send()
            .await?;
        let auth: AuthResponse = read_json(response).await?;

        let endpoint = auth
            .access
            .compute_endpoint(&self.config.region)
            .ok_or_else(|| RackspaceError::EndpointNotFound(self.config.region.clone()))?;
        let endpoint = Url::parse(endpoint).map_err(|e| {
            RackspaceError::InvalidConfig(format!("compute endpoint {}: {}", endpoint, e))
        })?;

        tracing::debug!("Using compute endpoint {}", endpoint);
        Ok(Session {
            token: auth.access.token.id,
            endpoint,
        })
    }

    async fn session(&self) -> Result<Session> {
        let mut cached = self.session.lock().await;
        if let Some(session) = cached.as_ref() {
            return Ok(session.clone());
        }
        let session = self.login().await?;
        *cached = Some(session.clone());
        Ok(session)
    }

    /// Forget the cached session if it still holds `token`.
    async fn invalidate(&self, token: &str) {
        let mut cached = self.session.lock().await;
        if cached.as_ref().is_some_and(|s| s.token == token) {
            *cached = None;
        }
    }

    /// Send a compute API request, logging in again once if the token
    /// has expired.
    ///
    /// `path` is a list of raw segments; each is percent-encoded on its own.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &[&str],
        body: Option<&B>,
    ) -> Result<reqwest::Response> {
        let mut retried = false;
        loop {
            let session = self.session().await?;
            let url = compute_url(&session.endpoint, path)?;
            tracing::debug!("{} {}", method, url);

            let mut request = self
                .client
                .request(method.clone(), url)
                .header("X-Auth-Token", &session.token)
                .header("Accept", "application/json");
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await?;
            if response.status() == StatusCode::UNAUTHORIZED && !retried {
                tracing::debug!("Token rejected, re-authenticating");
                self.invalidate(&session.token).await;
                retried = true;
                continue;
            }
            return check_status(response).await;
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T> {
        let response = self.send::<()>(Method::GET, path, None).await?;
        read_json(response).await
    }
}

/// Append `segments` to the compute endpoint.
///
/// Empty, `.` and `..` segments are refused since they cannot name a
/// resource and would otherwise be dropped or resolved away.
fn compute_url(endpoint: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = endpoint.clone();
    {
        let mut path = url.path_segments_mut().map_err(|_| {
            RackspaceError::InvalidConfig(format!("compute endpoint {} has no path", endpoint))
        })?;
        path.pop_if_empty();
        for segment in segments {
            if matches!(*segment, "" | "." | "..") {
                return Err(RackspaceError::InvalidId(segment.to_string()));
            }
            path.push(segment);
        }
    }
    Ok(url)
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RackspaceError::Api {
        status: status.as_u16(),
        message: api::fault_message(&body),
    })
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl ComputeDriver for RackspaceDriver {
    fn name(&self) -> &str {
        "rackspace"
    }

    async fn authenticate(&self) -> DriverResult<()> {
        *self.session.lock().await = None;
        self.session().await?;
        Ok(())
    }

    async fn list_nodes(&self) -> DriverResult<Vec<Instance>> {
        let list: ServerList = self.get(&["servers", "detail"]).await?;
        Ok(list.servers.into_iter().map(|s| s.into_instance()).collect())
    }

    async fn create_node(&self, request: CreateNodeRequest) -> DriverResult<Instance> {
        let body = CreateServerRequest {
            server: CreateServer {
                name: request.name.clone(),
                image_ref: request.image.id.clone(),
                flavor_ref: request.size.id.clone(),
                personality: request
                    .auth
                    .iter()
                    .map(|auth| PersonalityFile::authorized_key(&auth.public_key))
                    .collect(),
            },
        };

        let response = self.send(Method::POST, &["servers"], Some(&body)).await?;
        let created: ServerEnvelope = read_json(response).await?;

        // The create response only echoes the id; fill in what we sent
        let mut instance = created.server.into_instance();
        if instance.name.is_empty() {
            instance.name = request.name;
        }
        instance.size_id.get_or_insert(request.size.id);
        instance.image_id.get_or_insert(request.image.id);
        Ok(instance)
    }

    async fn destroy_node(&self, node: &Instance) -> DriverResult<bool> {
        self.send::<()>(Method::DELETE, &["servers", node.id.as_str()], None)
            .await?;
        Ok(true)
    }

    async fn list_sizes(&self) -> DriverResult<Vec<Size>> {
        let list: FlavorList = self.get(&["flavors", "detail"]).await?;
        Ok(list.flavors.into_iter().map(Size::from).collect())
    }

    async fn get_size(&self, size_id: &str) -> DriverResult<Size> {
        let envelope: FlavorEnvelope = self.get(&["flavors", size_id]).await?;
        Ok(envelope.flavor.into())
    }

    async fn get_image(&self, image_id: &str) -> DriverResult<Option<Image>> {
        match self.get::<ImageEnvelope>(&["images", image_id]).await {
            Ok(envelope) => Ok(Some(envelope.image.into())),
            Err(RackspaceError::Api { status: 404, .. } | RackspaceError::InvalidId(_)) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_images(&self) -> DriverResult<Vec<Image>> {
        let list: ImageList = self.get(&["images", "detail"]).await?;
        Ok(list.images.into_iter().map(Image::from).collect())
    }

    async fn create_key_pair(&self, name: &str) -> DriverResult<KeyPair> {
        let body = CreateKeyPairRequest {
            keypair: NewKeyPair { name },
        };
        let response = self.send(Method::POST, &["os-keypairs"], Some(&body)).await?;
        let envelope: KeyPairEnvelope = read_json(response).await?;
        Ok(envelope.keypair.into())
    }

    async fn delete_key_pair(&self, key_pair: &KeyPair) -> DriverResult<bool> {
        self.send::<()>(Method::DELETE, &["os-keypairs", key_pair.name.as_str()], None)
            .await?;
        Ok(true)
    }

    async fn list_key_pairs(&self) -> DriverResult<Vec<KeyPair>> {
        let list: KeyPairList = self.get(&["os-keypairs"]).await?;
        Ok(list
            .keypairs
            .into_iter()
            .map(|envelope| envelope.keypair.into())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_username_rejected() {
        let config = RackspaceConfig::new(Credential::new("", "key"), "DFW");
        assert!(matches!(
            RackspaceDriver::new(config),
            Err(RackspaceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_compute_url_encodes_segments() {
        let endpoint = Url::parse("https://dfw.servers.example/v2/123456/").unwrap();

        let url = compute_url(&endpoint, &["images", "img-ubuntu?x#frag"]).unwrap();
        assert_eq!(url.path(), "/v2/123456/images/img-ubuntu%3Fx%23frag");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        let url = compute_url(&endpoint, &["os-keypairs", "../servers/srv-a"]).unwrap();
        assert_eq!(url.path(), "/v2/123456/os-keypairs/..%2Fservers%2Fsrv-a");
    }

    #[test]
    fn test_compute_url_refuses_dot_segments() {
        let endpoint = Url::parse("https://dfw.servers.example/v2/123456").unwrap();
        for bad in ["", ".", ".."] {
            assert!(matches!(
                compute_url(&endpoint, &["servers", bad]),
                Err(RackspaceError::InvalidId(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_invalidate_keeps_newer_session() {
        let config = RackspaceConfig::new(Credential::new("u", "k"), "DFW");
        let driver = RackspaceDriver::new(config).unwrap();
        *driver.session.lock().await = Some(Session {
            token: "fresh".to_string(),
            endpoint: Url::parse("https://dfw.servers.example/v2/1").unwrap(),
        });

        driver.invalidate("stale").await;
        assert!(driver.session.lock().await.is_some());

        driver.invalidate("fresh").await;
        assert!(driver.session.lock().await.is_none());
    }

    #[test]
    fn test_config_builders() {
        let config = RackspaceConfig::new(Credential::new("u", "k"), "ORD")
            .with_identity_url("http://127.0.0.1:1/v2.0")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.identity_url, "http://127.0.0.1:1/v2.0");
        assert_eq!(config.timeout, Duration::from_secs(5));

        let driver = RackspaceDriver::new(config).unwrap();
        assert_eq!(driver.region(), "ORD");
        assert_eq!(driver.name(), "rackspace");
    }
}
