use std::time::Duration;

use tracing::warn;

use crate::shutdown::StopSender;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit status used when a second signal aborts the run.
const FORCED_EXIT_CODE: i32 = 130;
/// Grace period before the second-signal listener is armed, so one key press
/// delivered twice by the terminal doesn't abort the run.
const SECOND_SIGNAL_ARM_DELAY: Duration = Duration::from_millis(200);

/// Turns the first Ctrl-C/SIGTERM into a graceful stop and the second one into
/// an immediate exit. The task ends on its own if something else sets the stop
/// flag first.
pub fn setup_signal_stop_handler(stop_tx: &StopSender) -> tokio::task::JoinHandle<()> {
    let stop_tx = stop_tx.clone();
    tokio::spawn(async move {
        let mut stop_rx = stop_tx.subscribe();

        tokio::select! {
            _ = stop_rx.wait_for(|stopped| *stopped) => return,
            () = wait_for_signal() => {}
        }

        stop_tx.send_replace(true);
        warn!("Stop requested, letting in-flight runs finish. Signal again to exit immediately.");

        tokio::time::sleep(SECOND_SIGNAL_ARM_DELAY).await;
        wait_for_signal().await;
        warn!("Second stop signal received, exiting.");
        std::process::exit(FORCED_EXIT_CODE);
    })
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        let mut term_signal = match signal(SignalKind::terminate()) {
            Ok(signal) => Some(signal),
            Err(err) => {
                eprintln!("Failed to register SIGTERM handler: {}", err);
                None
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            () = async {
                if let Some(signal) = term_signal.as_mut() {
                    signal.recv().await;
                } else {
                    std::future::pending::<()>().await;
                }
            } => {}
        }
    }

    #[cfg(not(unix))]
    {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
