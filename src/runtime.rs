//! Async runtime helpers.
//!
//! All timing goes through tokio's clock so that tests can run against a
//! paused clock.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

pub use tokio::time::Instant;

/// A boxed future type, used by the object-safe collaborator traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Sleep for the specified duration.
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await
}

/// Run a future with a timeout.
///
/// Returns `Err(TimedOut)` if the timeout expires before the future completes.
pub async fn timeout<F, T>(duration: Duration, future: F) -> Result<T, TimedOut>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| TimedOut)
}

/// Error returned when a timeout expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation timed out")]
pub struct TimedOut;

/// A cooperative cancellation signal.
///
/// Clones share the same signal. Once cancelled it stays cancelled.
///
/// ```
/// use lively_lights::runtime::Cancel;
///
/// let cancel = Cancel::new();
/// let worker = cancel.clone();
/// cancel.cancel();
/// assert!(worker.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct Cancel {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for Cancel {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancel {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Cancel {
            sender: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once [`Cancel::cancel`] has been called on any clone.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }

    /// Sleep unless cancelled first.
    ///
    /// Returns `true` if the full duration elapsed, `false` on cancellation.
    pub async fn sleep(&self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return false;
        }
        tokio::select! {
            _ = sleep(duration) => true,
            _ = self.cancelled() => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_completes() {
        let cancel = Cancel::new();
        let start = Instant::now();
        assert!(cancel.sleep(Duration::from_secs(5)).await);
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_interrupted() {
        let cancel = Cancel::new();
        let remote = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(1)).await;
            remote.cancel();
        });

        let start = Instant::now();
        assert!(!cancel.sleep(Duration::from_secs(60)).await);
        assert!(start.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_already_cancelled() {
        let cancel = Cancel::new();
        cancel.cancel();
        assert!(!cancel.sleep(Duration::from_secs(60)).await);
    }

    #[tokio::test]
    async fn test_timeout() {
        let result = timeout(Duration::from_millis(10), std::future::pending::<()>()).await;
        assert_eq!(result, Err(TimedOut));
    }
}
