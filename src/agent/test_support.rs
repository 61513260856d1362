use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tokio::sync::watch;

use super::AgentContext;
use crate::api::ChefApi;
use crate::cookbooks::{CookbookDownloader, CookbookSet};
use crate::domain::{Attributes, DEFAULT_ENVIRONMENT, Node, RunConfig, RunCount};
use crate::error::ApiError;

/// Request as seen by [`FakeChefServer`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ApiCall {
    GetNode(String),
    CreateNode(String),
    ResolveCookbooks {
        environment: String,
        run_list: Vec<String>,
    },
    Probe(String),
    UpdateNode(Node),
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum GetBehavior {
    /// Every node already exists.
    Existing,
    /// Nodes are unknown until created.
    NotFoundUntilCreated,
    /// Every lookup fails with this status.
    Fail(StatusCode),
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum ResolveBehavior {
    Cookbooks(&'static str),
    Malformed,
    Fail(StatusCode),
}

/// In-memory Chef Server double that records every call.
pub(crate) struct FakeChefServer {
    calls: Mutex<Vec<ApiCall>>,
    known: Mutex<HashSet<String>>,
    environment: String,
    get_behavior: GetBehavior,
    create_fails: bool,
    resolve_behavior: ResolveBehavior,
    failing_probes: Vec<String>,
    stop_after_updates: Option<(usize, watch::Sender<bool>)>,
}

impl FakeChefServer {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            known: Mutex::new(HashSet::new()),
            environment: DEFAULT_ENVIRONMENT.to_owned(),
            get_behavior: GetBehavior::Existing,
            create_fails: false,
            resolve_behavior: ResolveBehavior::Cookbooks("{}"),
            failing_probes: Vec::new(),
            stop_after_updates: None,
        }
    }

    pub(crate) fn with_environment(mut self, environment: &str) -> Self {
        environment.clone_into(&mut self.environment);
        self
    }

    pub(crate) fn with_get(mut self, behavior: GetBehavior) -> Self {
        self.get_behavior = behavior;
        self
    }

    pub(crate) fn with_failing_create(mut self) -> Self {
        self.create_fails = true;
        self
    }

    pub(crate) fn with_resolve(mut self, behavior: ResolveBehavior) -> Self {
        self.resolve_behavior = behavior;
        self
    }

    pub(crate) fn with_failing_probe(mut self, path: &str) -> Self {
        self.failing_probes.push(path.to_owned());
        self
    }

    /// Sets `stop` once `updates` node updates have been received.
    pub(crate) fn with_stop_after_updates(
        mut self,
        updates: usize,
        stop: watch::Sender<bool>,
    ) -> Self {
        self.stop_after_updates = Some((updates, stop));
        self
    }

    pub(crate) fn calls(&self) -> Vec<ApiCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, matches: impl Fn(&ApiCall) -> bool) -> usize {
        self.calls().iter().filter(|call| matches(call)).count()
    }

    pub(crate) fn updates(&self) -> Vec<Node> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::UpdateNode(node) => Some(node),
                ApiCall::GetNode(_)
                | ApiCall::CreateNode(_)
                | ApiCall::ResolveCookbooks { .. }
                | ApiCall::Probe(_) => None,
            })
            .collect()
    }

    fn record(&self, call: ApiCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn is_known(&self, name: &str) -> bool {
        self.known
            .lock()
            .map(|known| known.contains(name))
            .unwrap_or(false)
    }

    fn node(&self, name: &str) -> Node {
        let mut node = Node::new(name);
        node.environment.clone_from(&self.environment);
        node
    }
}

pub(crate) fn status_error(method: Method, path: &str, status: StatusCode) -> ApiError {
    ApiError::Status {
        method,
        url: format!("http://chef.test/{}", path),
        status,
    }
}

fn decode_error(path: &str) -> ApiError {
    match serde_json::from_str::<serde_json::Value>("{not json") {
        Err(source) => ApiError::Decode {
            url: format!("http://chef.test/{}", path),
            source,
        },
        Ok(_) => status_error(Method::POST, path, StatusCode::INTERNAL_SERVER_ERROR),
    }
}

#[async_trait]
impl ChefApi for FakeChefServer {
    async fn get_node(&self, name: &str) -> Result<Node, ApiError> {
        self.record(ApiCall::GetNode(name.to_owned()));
        let path = format!("nodes/{}", name);
        match self.get_behavior {
            GetBehavior::Existing => Ok(self.node(name)),
            GetBehavior::NotFoundUntilCreated if self.is_known(name) => Ok(self.node(name)),
            GetBehavior::NotFoundUntilCreated => {
                Err(status_error(Method::GET, &path, StatusCode::NOT_FOUND))
            }
            GetBehavior::Fail(status) => Err(status_error(Method::GET, &path, status)),
        }
    }

    async fn create_node(&self, node: &Node) -> Result<(), ApiError> {
        self.record(ApiCall::CreateNode(node.name.clone()));
        if self.create_fails {
            return Err(status_error(
                Method::POST,
                "nodes",
                StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
        if let Ok(mut known) = self.known.lock() {
            known.insert(node.name.clone());
        }
        Ok(())
    }

    async fn update_node(&self, node: &Node) -> Result<(), ApiError> {
        self.record(ApiCall::UpdateNode(node.clone()));
        if let Some((limit, stop)) = self.stop_after_updates.as_ref()
            && self.updates().len() >= *limit
        {
            stop.send_replace(true);
        }
        Ok(())
    }

    async fn resolve_cookbooks(
        &self,
        environment: &str,
        run_list: &[String],
    ) -> Result<CookbookSet, ApiError> {
        self.record(ApiCall::ResolveCookbooks {
            environment: environment.to_owned(),
            run_list: run_list.to_vec(),
        });
        let path = format!("environments/{}/cookbook_versions", environment);
        match self.resolve_behavior {
            ResolveBehavior::Cookbooks(json) => {
                serde_json::from_str(json).map_err(|source| ApiError::Decode { url: path, source })
            }
            ResolveBehavior::Malformed => Err(decode_error(&path)),
            ResolveBehavior::Fail(status) => Err(status_error(Method::POST, &path, status)),
        }
    }

    async fn probe(&self, path: &str) -> Result<u64, ApiError> {
        self.record(ApiCall::Probe(path.to_owned()));
        if self.failing_probes.iter().any(|failing| failing == path) {
            return Err(status_error(Method::GET, path, StatusCode::BAD_GATEWAY));
        }
        Ok(0)
    }
}

/// Downloader double recording `(node, cookbook count)` per call.
#[derive(Default)]
pub(crate) struct RecordingDownloader {
    downloads: Mutex<Vec<(String, usize)>>,
}

impl RecordingDownloader {
    pub(crate) fn downloads(&self) -> Vec<(String, usize)> {
        self.downloads
            .lock()
            .map(|downloads| downloads.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CookbookDownloader for RecordingDownloader {
    async fn download(&self, node_name: &str, _api: &dyn ChefApi, cookbooks: &CookbookSet) {
        if let Ok(mut downloads) = self.downloads.lock() {
            downloads.push((node_name.to_owned(), cookbooks.len()));
        }
    }
}

pub(crate) fn run_config(node_count: usize, runs: u64) -> RunConfig {
    RunConfig {
        node_count,
        run_count: RunCount::from_config(runs),
        sleep_duration: Duration::ZERO,
        node_name_prefix: "chef-load".to_owned(),
        run_list: vec!["role[base]".to_owned(), "recipe[ntp]".to_owned()],
        api_get_requests: Vec::new(),
        download_cookbooks: false,
    }
}

pub(crate) fn context(
    config: RunConfig,
    api: &Arc<FakeChefServer>,
    downloader: &Arc<RecordingDownloader>,
) -> AgentContext {
    let mut attributes = Attributes::new();
    attributes.insert("platform".to_owned(), serde_json::json!("ubuntu"));
    AgentContext {
        config: Arc::new(config),
        attributes: Arc::new(attributes),
        api: api.clone(),
        downloader: downloader.clone(),
    }
}
