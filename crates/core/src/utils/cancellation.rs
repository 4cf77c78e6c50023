//! Cancellation helpers for in-flight backend calls.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::errors::{Error, Result};

/// Runs `future` unless `token` is cancelled first.
///
/// A cancelled call returns [`Error::Cancelled`] and its result, if it ever
/// arrives, is dropped with the future.
pub async fn cancellable<T, F>(token: &CancellationToken, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if token.is_cancelled() {
        return Err(Error::Cancelled);
    }
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Error::Cancelled),
        result = future => result,
    }
}

/// Sleeps for `duration`, returning early with [`Error::Cancelled`].
pub async fn cancellable_sleep(token: &CancellationToken, duration: Duration) -> Result<()> {
    cancellable(token, async {
        tokio::time::sleep(duration).await;
        Ok(())
    })
    .await
}
