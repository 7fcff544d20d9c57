use anyhow::Context;
use topolab_cloud::{CloudCtrl, Credential, DummyDriver, ProviderKind};
use topolab_cloud_rackspace::{RackspaceConfig, RackspaceDriver};
use topolab_config::CloudSettings;

/// Number of instances the dummy account starts with
const DUMMY_NODES: u32 = 2;

/// Build a controller for the provider named in `settings`.
pub fn connect(settings: &CloudSettings) -> anyhow::Result<CloudCtrl> {
    let kind = settings.provider()?;
    tracing::debug!(provider = kind.key(), region = %settings.cloud_region, "connecting");

    let credential = if kind.requires_credentials() {
        settings.credential().with_context(|| {
            format!(
                "{} needs cloud_user_name and cloud_api_key",
                kind.display_name()
            )
        })?
    } else {
        settings
            .credential()
            .unwrap_or_else(|_| Credential::new("dummy", "dummy"))
    };

    let ctrl = match kind {
        ProviderKind::Rackspace => {
            let config = RackspaceConfig::new(credential.clone(), &settings.cloud_region)
                .with_timeout(settings.instance_timeout());
            CloudCtrl::new(credential, RackspaceDriver::new(config)?)
        }
        ProviderKind::Dummy => CloudCtrl::new(credential, DummyDriver::with_nodes(DUMMY_NODES)),
    };
    Ok(ctrl)
}
