use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::AgentName;
use crate::error::FleetError;

/// Counts completion signals for one fleet run.
///
/// The group hands out exactly `expected` tokens. Completing a token consumes
/// it, so an agent can signal at most once and the channel never holds more
/// than `expected` signals.
pub struct CompletionGroup {
    expected: usize,
    issued: usize,
    tx: mpsc::Sender<AgentName>,
    rx: mpsc::Receiver<AgentName>,
}

impl CompletionGroup {
    #[must_use]
    pub fn new(expected: usize) -> Self {
        let (tx, rx) = mpsc::channel(expected.max(1));
        Self {
            expected,
            issued: 0,
            tx,
            rx,
        }
    }

    #[must_use]
    pub const fn expected(&self) -> usize {
        self.expected
    }

    /// Issues the next token, or `None` once `expected` tokens are out.
    pub fn token(&mut self) -> Option<CompletionToken> {
        if self.issued >= self.expected {
            return None;
        }
        self.issued = self.issued.saturating_add(1);
        Some(CompletionToken {
            tx: self.tx.clone(),
        })
    }

    /// Waits for exactly `expected` signals.
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::AgentsLost`] when every outstanding token was
    /// dropped before enough signals arrived.
    pub async fn wait(self) -> Result<(), FleetError> {
        let Self {
            expected, tx, mut rx, ..
        } = self;
        drop(tx);

        let mut received: usize = 0;
        while received < expected {
            match rx.recv().await {
                Some(name) => {
                    received = received.saturating_add(1);
                    debug!("Node {} finished ({}/{})", name, received, expected);
                }
                None => return Err(FleetError::AgentsLost { expected, received }),
            }
        }
        Ok(())
    }
}

/// One agent's right to signal completion.
pub struct CompletionToken {
    tx: mpsc::Sender<AgentName>,
}

impl CompletionToken {
    /// Signals that the agent named `name` is done.
    pub fn complete(self, name: AgentName) {
        // Capacity equals the number of tokens, so the send can't be full.
        if self.tx.try_send(name).is_err() {
            debug!("Completion signal dropped, fleet is no longer waiting");
        }
    }
}
