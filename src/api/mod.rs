//! Chef Server API access used by the agent cycle.
mod client;
mod signer;

#[cfg(test)]
mod tests;

use async_trait::async_trait;

use crate::cookbooks::CookbookSet;
use crate::domain::Node;
use crate::error::ApiError;

pub use client::{ApiSettings, ChefClient, DEFAULT_USER_AGENT};
pub use signer::{HeaderSigner, RequestSigner};

/// Requests a simulated chef-client makes against the server.
///
/// Implementations are shared by every agent of a fleet, so they must be
/// usable concurrently from many tasks.
#[async_trait]
pub trait ChefApi: Send + Sync {
    /// `GET nodes/<name>`.
    async fn get_node(&self, name: &str) -> Result<Node, ApiError>;

    /// `POST nodes` with the full node body.
    async fn create_node(&self, node: &Node) -> Result<(), ApiError>;

    /// `PUT nodes/<name>`, overwriting the server copy.
    async fn update_node(&self, node: &Node) -> Result<(), ApiError>;

    /// `POST environments/<environment>/cookbook_versions` for a run list.
    async fn resolve_cookbooks(
        &self,
        environment: &str,
        run_list: &[String],
    ) -> Result<CookbookSet, ApiError>;

    /// `GET` an arbitrary path or URL and discard the body. Returns the number
    /// of body bytes read.
    async fn probe(&self, path: &str) -> Result<u64, ApiError>;
}
