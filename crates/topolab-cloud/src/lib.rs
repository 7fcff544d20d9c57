//! Topolab Cloud Infrastructure
//!
//! This crate provides the cloud provider abstraction for Topolab, letting
//! emulated topologies run on remote compute instances regardless of the
//! vendor behind them.
//!
//! # Supported Providers
//!
//! - **Rackspace**: Servers, key pairs (via `topolab-cloud-rackspace`)
//! - **Dummy**: in-memory provider for tests and offline use
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   Topolab CLI                    │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 topolab-cloud                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │   CloudCtrl (instance / key pair API)    │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────────────┐     │
//! │  │ Status table │  │ trait ComputeDriver  │     │
//! │  └──────────────┘  └──────────────────────┘     │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │   rackspace   │ │     dummy     │
//! │    driver     │ │    driver     │
//! └───────────────┘ └───────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use topolab_cloud::{CloudCtrl, Credential, DummyDriver};
//!
//! let ctrl = CloudCtrl::new(Credential::new("user", "key"), DummyDriver::new());
//! let instance = ctrl.create_instance("lab-1", "1", "ubuntu-22.04", None).await?;
//! ```

pub mod controller;
pub mod driver;
pub mod dummy;
pub mod error;
pub mod model;
pub mod provider;
pub mod status;

// Re-exports
pub use controller::CloudCtrl;
pub use driver::{ComputeDriver, CreateNodeRequest, DriverError, DriverResult, NodeAuthSshKey};
pub use dummy::{DummyDriver, DummyOp};
pub use error::{CloudError, ErrorKind, Result};
pub use model::{Credential, Image, Instance, InstanceState, KeyPair, Size};
pub use provider::ProviderKind;
pub use status::{ParsedError, StatusTable};
