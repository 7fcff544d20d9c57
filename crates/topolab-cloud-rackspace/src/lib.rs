//! Rackspace provider for Topolab
//!
//! This crate implements the `ComputeDriver` trait for Rackspace cloud
//! servers, so Topolab can run topology nodes on Rackspace instances.
//!
//! # Features
//!
//! - Server management (create, list, delete)
//! - Flavor and image lookup
//! - SSH key pair management
//!
//! # Requirements
//!
//! - A Rackspace account user name and API key
//!
//! # Example
//!
//! ```ignore
//! use topolab_cloud::{CloudCtrl, Credential};
//! use topolab_cloud_rackspace::{RackspaceConfig, RackspaceDriver};
//!
//! let credential = Credential::new("user", "api-key");
//! let driver = RackspaceDriver::new(RackspaceConfig::new(credential.clone(), "DFW"))?;
//! let ctrl = CloudCtrl::new(credential, driver);
//!
//! if !ctrl.authenticate().await? {
//!     panic!("Rackspace rejected the credentials");
//! }
//! ```

pub mod api;
pub mod driver;
pub mod error;

pub use driver::{DEFAULT_IDENTITY_URL, RackspaceConfig, RackspaceDriver};
pub use error::{RackspaceError, Result};
