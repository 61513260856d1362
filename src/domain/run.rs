use std::fmt;
use std::num::NonZeroU64;
use std::time::Duration;

/// Unique node name of one simulated agent, `<prefix>-<index>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentName(String);

impl AgentName {
    #[must_use]
    pub fn new(prefix: &str, index: usize) -> Self {
        Self(format!("{}-{}", prefix, index))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How many cycles each agent performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunCount {
    Bounded(NonZeroU64),
    Unbounded,
}

impl RunCount {
    /// Maps the config value, where `0` requests an unbounded run.
    #[must_use]
    pub const fn from_config(runs: u64) -> Self {
        match NonZeroU64::new(runs) {
            Some(runs) => RunCount::Bounded(runs),
            None => RunCount::Unbounded,
        }
    }

    /// Whether another cycle may start after `completed` cycles.
    #[must_use]
    pub const fn allows(self, completed: u64) -> bool {
        match self {
            RunCount::Bounded(limit) => completed < limit.get(),
            RunCount::Unbounded => true,
        }
    }
}

impl fmt::Display for RunCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunCount::Bounded(limit) => write!(f, "{}", limit),
            RunCount::Unbounded => f.write_str("unbounded"),
        }
    }
}

/// Immutable settings shared by every agent of one fleet run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub node_count: usize,
    pub run_count: RunCount,
    pub sleep_duration: Duration,
    pub node_name_prefix: String,
    pub run_list: Vec<String>,
    pub api_get_requests: Vec<String>,
    pub download_cookbooks: bool,
}

impl RunConfig {
    /// Identities of the whole fleet, in launch order.
    pub fn agent_names(&self) -> impl Iterator<Item = AgentName> + '_ {
        (0..self.node_count).map(|index| AgentName::new(&self.node_name_prefix, index))
    }
}
