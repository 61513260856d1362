use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Environment every new node starts in.
pub const DEFAULT_ENVIRONMENT: &str = "_default";
const NODE_CHEF_TYPE: &str = "node";
const NODE_JSON_CLASS: &str = "Chef::Node";

/// Attribute map as stored on a node: string keys, arbitrary JSON values.
pub type Attributes = Map<String, Value>;

/// Server-side node object for one agent.
///
/// The automatic attributes are held behind an `Arc` so the shared Ohai data
/// can be attached to every node without copying it per cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(rename = "chef_environment", default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_chef_type")]
    pub chef_type: String,
    #[serde(default = "default_json_class")]
    pub json_class: String,
    #[serde(default)]
    pub run_list: Vec<String>,
    #[serde(default)]
    pub automatic: Arc<Attributes>,
    #[serde(default)]
    pub normal: Attributes,
    #[serde(default)]
    pub default: Attributes,
    #[serde(rename = "override", default)]
    pub override_attributes: Attributes,
}

impl Node {
    /// Builds the record used to create a node that the server doesn't know
    /// yet: empty run list, empty attribute maps, `_default` environment.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            environment: default_environment(),
            chef_type: default_chef_type(),
            json_class: default_json_class(),
            run_list: Vec::new(),
            automatic: Arc::new(Attributes::new()),
            normal: Attributes::new(),
            default: Attributes::new(),
            override_attributes: Attributes::new(),
        }
    }

    /// Attaches the state produced by a run: the configured run list and the
    /// shared automatic attributes.
    pub fn attach_run_state(&mut self, run_list: &[String], automatic: &Arc<Attributes>) {
        self.run_list = run_list.to_vec();
        self.automatic = Arc::clone(automatic);
    }
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_owned()
}

fn default_chef_type() -> String {
    NODE_CHEF_TYPE.to_owned()
}

fn default_json_class() -> String {
    NODE_JSON_CLASS.to_owned()
}
