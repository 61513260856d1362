//! Simulated chef-client: one check-in cycle and the loop that repeats it.
mod run_exec;
mod run_loop;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use crate::api::ChefApi;
use crate::cookbooks::CookbookDownloader;
use crate::domain::{Attributes, RunConfig};

pub use run_exec::{CycleReport, FetchOutcome, FetchStatus, PersistStatus, run_cycle};
pub use run_loop::run_agent;

/// Everything an agent needs, shared by reference across the fleet.
#[derive(Clone)]
pub struct AgentContext {
    pub config: Arc<RunConfig>,
    pub attributes: Arc<Attributes>,
    pub api: Arc<dyn ChefApi>,
    pub downloader: Arc<dyn CookbookDownloader>,
}
