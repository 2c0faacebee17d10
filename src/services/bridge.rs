use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::task::{JoinError, JoinHandle};

use crate::error::{AppError, AppResult};

/// Handle to a fetch running on the tokio worker pool.
///
/// Awaiting the handle yields exactly one outcome. Dropping it, or calling
/// [`FetchTask::cancel`], aborts the fetch before it can commit anything.
#[must_use = "dropping a FetchTask cancels the fetch"]
pub struct FetchTask<T> {
    handle: Option<JoinHandle<AppResult<T>>>,
}

impl<T: Send + 'static> FetchTask<T> {
    /// Spawns the operation onto the runtime
    pub fn spawn<F>(operation: F) -> Self
    where
        F: Future<Output = AppResult<T>> + Send + 'static,
    {
        Self {
            handle: Some(tokio::spawn(operation)),
        }
    }

    /// Aborts the fetch and waits until its future has been torn down
    pub async fn cancel(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::warn!(error = %e, "Fetch task failed while being cancelled");
                }
            }
        }
    }
}

fn join_failure(e: JoinError) -> AppError {
    if e.is_cancelled() {
        AppError::Internal("fetch task was cancelled".to_string())
    } else {
        tracing::error!(error = %e, "Fetch task panicked");
        AppError::Internal(e.to_string())
    }
}

impl<T> Future for FetchTask<T> {
    type Output = AppResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Some(handle) = self.handle.as_mut() else {
            return Poll::Ready(Err(AppError::Internal(
                "fetch task polled after completion".to_string(),
            )));
        };

        let polled = Pin::new(handle).poll(cx);
        match polled {
            Poll::Ready(joined) => {
                self.handle = None;
                Poll::Ready(joined.unwrap_or_else(|e| Err(join_failure(e))))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Drop for FetchTask<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };
    use std::time::Duration;

    #[tokio::test]
    async fn test_delivers_single_success() {
        let task = FetchTask::spawn(async { Ok(7) });
        assert_eq!(task.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_delivers_single_failure() {
        let task: FetchTask<u32> = FetchTask::spawn(async { Err(AppError::NoMoreResults) });
        assert!(matches!(task.await, Err(AppError::NoMoreResults)));
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let task: FetchTask<u32> = FetchTask::spawn(async { panic!("boom") });
        assert!(matches!(task.await, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_cancel_prevents_completion() {
        let completed = Arc::new(AtomicBool::new(false));
        let flag = completed.clone();

        let task = FetchTask::spawn(async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        task.cancel().await;
        assert!(!completed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_drop_aborts_task() {
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let task = FetchTask::spawn(async move {
            // Holding tx keeps the channel open until the future is dropped
            let _tx = tx;
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        });
        drop(task);

        // The sender is released only once the aborted future is torn down
        assert!(rx.await.is_err());
    }
}
