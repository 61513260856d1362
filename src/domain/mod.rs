//! Data model shared by the agent loop and the fleet driver.
mod node;
mod run;


pub use node::{Attributes, DEFAULT_ENVIRONMENT, Node};
pub use run::{AgentName, RunConfig, RunCount};
