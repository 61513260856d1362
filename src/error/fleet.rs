use thiserror::Error;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error("Only {received} of {expected} agents signaled completion before their tasks ended.")]
    AgentsLost { expected: usize, received: usize },
}
