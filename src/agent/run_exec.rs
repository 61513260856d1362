use tracing::{debug, warn};

use crate::api::ChefApi;
use crate::cookbooks::CookbookSet;
use crate::domain::{AgentName, DEFAULT_ENVIRONMENT, Node};

use super::AgentContext;

/// Result of looking up the agent's node at the start of a cycle.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The server returned the node.
    Found(Node),
    /// The server didn't know the node and accepted the new record.
    Created(Node),
    /// The server didn't know the node and rejected the new record; the local
    /// record is still used for the rest of the cycle.
    Unsaved(Node),
    /// Lookup failed for another reason. No record is available, so the
    /// cycle won't persist anything.
    FetchFailed,
}

impl FetchOutcome {
    #[must_use]
    pub const fn node(&self) -> Option<&Node> {
        match self {
            FetchOutcome::Found(node)
            | FetchOutcome::Created(node)
            | FetchOutcome::Unsaved(node) => Some(node),
            FetchOutcome::FetchFailed => None,
        }
    }

    #[must_use]
    pub fn into_node(self) -> Option<Node> {
        match self {
            FetchOutcome::Found(node)
            | FetchOutcome::Created(node)
            | FetchOutcome::Unsaved(node) => Some(node),
            FetchOutcome::FetchFailed => None,
        }
    }

    #[must_use]
    pub const fn status(&self) -> FetchStatus {
        match self {
            FetchOutcome::Found(_) => FetchStatus::Found,
            FetchOutcome::Created(_) => FetchStatus::Created,
            FetchOutcome::Unsaved(_) => FetchStatus::Unsaved,
            FetchOutcome::FetchFailed => FetchStatus::FetchFailed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Found,
    Created,
    Unsaved,
    FetchFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStatus {
    Saved,
    Failed,
    /// No node record was available to save.
    Skipped,
}

/// What happened during one cycle. Lives only until the loop logs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub fetch: FetchStatus,
    pub cookbooks_resolved: bool,
    pub cookbook_count: usize,
    pub cookbooks_downloaded: bool,
    pub probes_succeeded: usize,
    pub probes_failed: usize,
    pub persist: PersistStatus,
}

/// Runs one chef-client check-in for `name`.
///
/// Every step runs in order regardless of earlier failures; failures are
/// logged and reflected in the report. Only persistence is skipped, and only
/// when the node could not be fetched or created locally.
pub async fn run_cycle(context: &AgentContext, name: &AgentName) -> CycleReport {
    let config = &context.config;
    let api = context.api.as_ref();

    let fetched = fetch_node(api, name).await;

    let environment = fetched
        .node()
        .map_or(DEFAULT_ENVIRONMENT, |node| node.environment.as_str());
    let (cookbooks, cookbooks_resolved) =
        sync_run_list(api, name, environment, &config.run_list).await;

    if config.download_cookbooks {
        context
            .downloader
            .download(name.as_str(), api, &cookbooks)
            .await;
    }

    let (probes_succeeded, probes_failed) =
        probe_endpoints(api, name, &config.api_get_requests).await;

    tokio::time::sleep(config.sleep_duration).await;

    let fetch = fetched.status();
    let persist = match fetched.into_node() {
        Some(mut node) => {
            node.attach_run_state(&config.run_list, &context.attributes);
            persist_node(api, name, &node).await
        }
        None => {
            warn!(
                node = %name,
                step = "persist_node",
                "Skipping node update, no node record was available"
            );
            PersistStatus::Skipped
        }
    };

    CycleReport {
        fetch,
        cookbooks_resolved,
        cookbook_count: cookbooks.len(),
        cookbooks_downloaded: config.download_cookbooks,
        probes_succeeded,
        probes_failed,
        persist,
    }
}

async fn fetch_node(api: &dyn ChefApi, name: &AgentName) -> FetchOutcome {
    match api.get_node(name.as_str()).await {
        Ok(node) => FetchOutcome::Found(node),
        Err(err) if err.is_not_found() => {
            let node = Node::new(name.as_str());
            match api.create_node(&node).await {
                Ok(()) => {
                    debug!(node = %name, "Created node");
                    FetchOutcome::Created(node)
                }
                Err(err) => {
                    warn!(node = %name, step = "create_node", "Couldn't create node: {}", err);
                    FetchOutcome::Unsaved(node)
                }
            }
        }
        Err(err) => {
            warn!(node = %name, step = "fetch_node", "Couldn't get node: {}", err);
            FetchOutcome::FetchFailed
        }
    }
}

async fn sync_run_list(
    api: &dyn ChefApi,
    name: &AgentName,
    environment: &str,
    run_list: &[String],
) -> (CookbookSet, bool) {
    match api.resolve_cookbooks(environment, run_list).await {
        Ok(cookbooks) => (cookbooks, true),
        Err(err) => {
            warn!(
                node = %name,
                step = "sync_run_list",
                "Couldn't resolve cookbooks: {}",
                err
            );
            (CookbookSet::default(), false)
        }
    }
}

async fn probe_endpoints(
    api: &dyn ChefApi,
    name: &AgentName,
    paths: &[String],
) -> (usize, usize) {
    let mut succeeded: usize = 0;
    let mut failed: usize = 0;
    for path in paths {
        match api.probe(path).await {
            Ok(_) => succeeded = succeeded.saturating_add(1),
            Err(err) => {
                failed = failed.saturating_add(1);
                warn!(node = %name, step = "api_get_request", path = %path, "{}", err);
            }
        }
    }
    (succeeded, failed)
}

async fn persist_node(api: &dyn ChefApi, name: &AgentName, node: &Node) -> PersistStatus {
    match api.update_node(node).await {
        Ok(()) => PersistStatus::Saved,
        Err(err) => {
            warn!(node = %name, step = "persist_node", "Couldn't update node: {}", err);
            PersistStatus::Failed
        }
    }
}
