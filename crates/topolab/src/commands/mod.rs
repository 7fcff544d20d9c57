pub mod auth;
pub mod catalog;
pub mod config;
pub mod instances;
pub mod keypairs;
