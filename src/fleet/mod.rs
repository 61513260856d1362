//! Fleet driver: launches one agent loop per node and waits for all of them.
mod completion;


use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::agent::{AgentContext, run_agent};
use crate::error::FleetError;

pub use completion::{CompletionGroup, CompletionToken};

/// Launches the agents of one fleet run.
pub struct Fleet {
    context: AgentContext,
}

impl Fleet {
    #[must_use]
    pub const fn new(context: AgentContext) -> Self {
        Self { context }
    }

    /// Spawns one agent loop per configured node, all at once.
    ///
    /// Agents check `stop` before every cycle; setting it to `true` lets each
    /// of them finish its current cycle and signal completion.
    #[must_use]
    pub fn launch(&self, stop: &watch::Receiver<bool>) -> FleetRun {
        let config = &self.context.config;
        let mut completion = CompletionGroup::new(config.node_count);
        let mut handles = Vec::with_capacity(config.node_count);

        for name in config.agent_names() {
            let Some(token) = completion.token() else {
                break;
            };
            let context = self.context.clone();
            let stop = stop.clone();
            handles.push(tokio::spawn(async move {
                run_agent(&context, name, &stop, token).await
            }));
        }

        info!(
            "Launched {} nodes, {} runs each, sleeping {}s between runs",
            handles.len(),
            config.run_count,
            config.sleep_duration.as_secs()
        );
        FleetRun {
            completion,
            handles,
        }
    }
}

/// A launched fleet.
pub struct FleetRun {
    completion: CompletionGroup,
    handles: Vec<JoinHandle<u64>>,
}

impl FleetRun {
    /// Waits until every agent has signaled completion.
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::AgentsLost`] when agent tasks ended without
    /// signaling, which only happens if one of them panicked.
    pub async fn wait(self) -> Result<(), FleetError> {
        let expected = self.completion.expected();
        self.completion.wait().await?;

        let mut cycles: u64 = 0;
        for handle in self.handles {
            match handle.await {
                Ok(completed) => cycles = cycles.saturating_add(completed),
                Err(err) => warn!("Agent task failed after signaling completion: {}", err),
            }
        }
        info!("All {} nodes finished after {} runs in total", expected, cycles);
        Ok(())
    }
}
