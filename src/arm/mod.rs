//! Azure Resource Manager transport
//!
//! Talks to the management REST endpoint on behalf of the resource layer.
//!
//! # Module Structure
//!
//! - [`auth`] - bearer tokens from a fixed token or the Azure CLI
//! - [`client`] - URL building and the [`Transport`](crate::resource::Transport) impl
//! - [`http`] - HTTP verbs and status handling
//!
//! # Example
//!
//! ```ignore
//! use tarm::arm::{auth::ArmCredentials, client::{ArmClient, DEFAULT_ENDPOINT}};
//! use tarm::network::{ApplicationGateway, NetworkManager};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let creds = ArmCredentials::new(DEFAULT_ENDPOINT);
//!     let client = ArmClient::new("00000000-0000-0000-0000-000000000000", DEFAULT_ENDPOINT, creds)?;
//!     let manager = NetworkManager::new(client);
//!     let gateway: ApplicationGateway = manager.get("my-rg", "my-gateway").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;

pub use client::ArmClient;
