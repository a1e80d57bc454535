use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub const PROCESS_NAME: &str = "implant-triangulator";

/// Cancels `token` on the first interrupt or terminate signal.
///
/// Yields once after spawning so the listener installs its handlers before
/// the caller continues, even on a current-thread runtime.
pub async fn spawn_signal_listener(token: CancellationToken) -> JoinHandle<()> {
    let handle = tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = shutdown_signal() => token.cancel(),
        }
    });
    tokio::task::yield_now().await;
    handle
}

/// Completes when the process receives Ctrl+C or SIGTERM.
///
/// A handler that cannot be installed is logged and never fires, leaving
/// the other one in charge.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        () = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_listener_waits_for_signal() {
        let token = CancellationToken::new();
        let handle = spawn_signal_listener(token.clone()).await;

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!token.is_cancelled());
        assert!(!handle.is_finished());

        handle.abort();
    }

    #[tokio::test]
    async fn test_listener_exits_once_token_is_cancelled() {
        let token = CancellationToken::new();
        let handle = spawn_signal_listener(token.clone()).await;

        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
