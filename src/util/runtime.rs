use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Spawns a background task on the ambient tokio runtime.
///
/// Every caller runs inside the shell's runtime, so no fallback runtime is
/// built here.
pub fn spawn_detached<F>(future: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(future)
}

/// Waits for `duration`; zero returns immediately without yielding to the timer.
pub async fn sleep(duration: Duration) {
    if duration.is_zero() {
        return;
    }
    tokio::time::sleep(duration).await;
}

pub fn current_timestamp_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
