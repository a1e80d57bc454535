use std::process::Command;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use watch_service::spawn_signal_listener;

// Lives in its own test binary: the signal reaches every listener in the process.
#[cfg(unix)]
#[tokio::test]
async fn test_sigterm_right_after_spawn_cancels_token() {
    let token = CancellationToken::new();
    let listener = spawn_signal_listener(token.clone()).await;

    // No further yield: the handler must already be in place.
    let status = Command::new("kill")
        .args(["-TERM", &std::process::id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    tokio::time::timeout(Duration::from_secs(5), token.cancelled())
        .await
        .unwrap();
    listener.await.unwrap();
}
