use tokio::sync::watch;
use tracing::{debug, info};

use crate::domain::AgentName;
use crate::fleet::CompletionToken;

use super::AgentContext;
use super::run_exec::run_cycle;

/// Repeats the check-in cycle for one agent, then signals completion.
///
/// `stop` is checked before each cycle; a cycle that has started always runs
/// to the end. Returns the number of cycles performed.
pub async fn run_agent(
    context: &AgentContext,
    name: AgentName,
    stop: &watch::Receiver<bool>,
    token: CompletionToken,
) -> u64 {
    let run_count = context.config.run_count;
    let mut completed: u64 = 0;

    while run_count.allows(completed) {
        let stop_requested = *stop.borrow();
        if stop_requested {
            info!(node = %name, "Stop requested after {} runs", completed);
            break;
        }
        let report = run_cycle(context, &name).await;
        completed = completed.saturating_add(1);
        debug!(node = %name, run = completed, ?report, "Run finished");
    }

    token.complete(name);
    completed
}
