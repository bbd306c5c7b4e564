//! Cooperative shutdown
//!
//! Both services stop through a `watch::Receiver<bool>` that flips to `true`
//! once. Every suspension point of a run loop goes through [`until_shutdown`]
//! so an in-flight wait is abandoned as soon as shutdown is requested.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

pub fn shutdown_requested(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow()
}

/// Resolve once shutdown is requested or the sender is gone.
pub async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// Drive `fut` to completion unless shutdown wins first.
pub async fn until_shutdown<F: Future>(
    fut: F,
    shutdown: &mut watch::Receiver<bool>,
) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = wait_for_shutdown(shutdown) => None,
        output = fut => Some(output),
    }
}

/// Sleep for `duration`. Returns `false` if shutdown cut the sleep short.
pub async fn sleep_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    until_shutdown(tokio::time::sleep(duration), shutdown)
        .await
        .is_some()
}

/// Flip `tx` on SIGINT or SIGTERM.
pub async fn forward_signals(tx: watch::Sender<bool>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl-c, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }

    let _ = tx.send(true);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_completes_without_shutdown() {
        let (_tx, mut rx) = watch::channel(false);
        assert!(sleep_or_shutdown(Duration::from_secs(5), &mut rx).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_sleep() {
        let (tx, mut rx) = watch::channel(false);

        let sleeper = tokio::spawn(async move {
            let started = tokio::time::Instant::now();
            let completed = sleep_or_shutdown(Duration::from_secs(60), &mut rx).await;
            (completed, started.elapsed())
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(true).unwrap();

        let (completed, elapsed) = sleeper.await.unwrap();
        assert!(!completed);
        assert!(elapsed < Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_already_requested_shutdown_skips_future() {
        let (_tx, mut rx) = watch::channel(true);
        let output = until_shutdown(async { 42 }, &mut rx).await;
        assert_eq!(output, None);
        assert!(shutdown_requested(&rx));
    }

    #[tokio::test]
    async fn test_dropped_sender_counts_as_shutdown() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);
        let output = until_shutdown(std::future::pending::<()>(), &mut rx).await;
        assert_eq!(output, None);
    }
}
