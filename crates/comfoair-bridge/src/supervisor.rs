//! Restart-on-failure wrapper for long-running tasks.

use std::any::Any;
use std::future::Future;
use std::time::Duration;

use tracing::{error, info, warn};

/// Run `task` in its own tokio task; whenever it returns an error or
/// panics, log it, wait `backoff` and start a fresh one.
///
/// Returns when a run finishes with `Ok(())` or is cancelled.
pub async fn supervise<F, Fut>(name: &'static str, backoff: Duration, mut task: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    loop {
        match tokio::spawn(task()).await {
            Ok(Ok(())) => {
                info!(task = name, "Task finished");
                return;
            }
            Ok(Err(e)) => {
                error!(task = name, "Task failed: {:#}, restarting", e);
            }
            Err(e) if e.is_panic() => {
                error!(task = name, "Panic: {}, restarting", panic_message(e.into_panic()));
            }
            Err(e) => {
                warn!(task = name, error = %e, "Task cancelled");
                return;
            }
        }

        tokio::time::sleep(backoff).await;
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic>".to_string()
    }
}
