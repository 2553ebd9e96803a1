//! Task group with first-error-wins cancellation

use futures::future::join_all;
use futures::FutureExt;
use parking_lot::Mutex;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::error::{Result, ServerError};
use crate::shutdown::Shutdown;

/// A set of tasks that live and die together.
///
/// The first task to fail records its error and cancels the group token;
/// siblings are expected to watch [`token`](Self::token) and return.
/// [`wait`](Self::wait) joins every task and yields the recorded error.
pub struct TaskGroup {
    token: Shutdown,
    first_error: Arc<Mutex<Option<ServerError>>>,
    handles: Vec<JoinHandle<()>>,
}

impl TaskGroup {
    pub fn new() -> Self {
        Self {
            token: Shutdown::new(),
            first_error: Arc::new(Mutex::new(None)),
            handles: Vec::new(),
        }
    }

    /// Token cancelled when any task fails
    pub fn token(&self) -> Shutdown {
        self.token.clone()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Spawn a task into the group. A panic counts as a failure.
    pub fn spawn<F>(&mut self, name: &'static str, task: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let token = self.token.clone();
        let first_error = Arc::clone(&self.first_error);

        self.handles.push(tokio::spawn(async move {
            let result = match AssertUnwindSafe(task).catch_unwind().await {
                Ok(result) => result,
                Err(_) => Err(ServerError::Task(format!("{} task panicked", name))),
            };

            if let Err(e) = result {
                if matches!(e, ServerError::Cancelled) {
                    debug!("{} task cancelled", name);
                } else {
                    error!("{} task failed: {}", name, e);
                }
                record(&first_error, e);
                token.cancel();
            }
        }));
    }

    /// Wait for every task to exit and return the first recorded error
    pub async fn wait(self) -> Result<()> {
        for joined in join_all(self.handles).await {
            if let Err(e) = joined {
                record(&self.first_error, ServerError::Task(e.to_string()));
            }
        }

        match self.first_error.lock().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for TaskGroup {
    fn default() -> Self {
        Self::new()
    }
}

fn record(slot: &Mutex<Option<ServerError>>, error: ServerError) {
    let mut slot = slot.lock();
    if slot.is_none() {
        *slot = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_all_ok() {
        let mut group = TaskGroup::new();
        group.spawn("a", async { Ok(()) });
        group.spawn("b", async { Ok(()) });
        assert_eq!(group.len(), 2);
        assert!(group.wait().await.is_ok());
    }

    #[tokio::test]
    async fn test_first_error_cancels_siblings() {
        let mut group = TaskGroup::new();
        let token = group.token();

        group.spawn("waiter", async move {
            token.cancelled().await;
            Ok(())
        });
        group.spawn("failing", async {
            Err(ServerError::Config("bad".to_string()))
        });

        let err = group.wait().await.unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[tokio::test]
    async fn test_later_errors_are_dropped() {
        let mut group = TaskGroup::new();
        let token = group.token();

        group.spawn("first", async { Err(ServerError::Cancelled) });
        group.spawn("second", async move {
            token.cancelled().await;
            Err(ServerError::Task("late".to_string()))
        });

        assert!(matches!(group.wait().await, Err(ServerError::Cancelled)));
    }

    #[tokio::test]
    #[allow(unreachable_code)]
    async fn test_panic_is_a_failure() {
        let mut group = TaskGroup::new();
        let token = group.token();

        group.spawn("waiter", async move {
            token.cancelled().await;
            Ok(())
        });
        group.spawn("panicking", async {
            panic!("boom");
            Ok(())
        });

        assert!(matches!(group.wait().await, Err(ServerError::Task(_))));
    }
}
