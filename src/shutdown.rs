use tokio::sync::watch;

/// Flips to `true` when agents should stop starting new cycles.
pub type StopSender = watch::Sender<bool>;
pub type StopReceiver = watch::Receiver<bool>;

#[must_use]
pub fn stop_channel() -> (StopSender, StopReceiver) {
    watch::channel(false)
}
