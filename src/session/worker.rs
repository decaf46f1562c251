//! Background execution of solver and resolver requests

use log::debug;
use tokio::sync::oneshot;

use crate::analyzer::CancelFlag;
use crate::errors::{FingerprintError, FingerprintResult};

/// Handle to a request running on the blocking pool
///
/// The result arrives once through a single-shot channel. Cancelling is
/// best effort: the search may run to completion, but its result is
/// dropped and [`FingerprintTask::wait`] reports `Cancelled`.
#[derive(Debug)]
pub struct FingerprintTask<T> {
    generation: u64,
    cancel: CancelFlag,
    receiver: oneshot::Receiver<FingerprintResult<T>>,
}

impl<T: Send + 'static> FingerprintTask<T> {
    /// Run `job` on the Tokio blocking pool
    ///
    /// Must be called from within a Tokio runtime.
    pub(crate) fn spawn<F>(generation: u64, job: F) -> Self
    where
        F: FnOnce(&CancelFlag) -> FingerprintResult<T> + Send + 'static,
    {
        let cancel = CancelFlag::new();
        let (sender, receiver) = oneshot::channel();
        let flag = cancel.clone();

        tokio::task::spawn_blocking(move || {
            let result = job(&flag);
            if flag.is_cancelled() {
                debug!("Discarding result of a cancelled request");
                return;
            }
            // The caller may have dropped the handle; nothing to deliver to
            let _ = sender.send(result);
        });

        Self {
            generation,
            cancel,
            receiver,
        }
    }
}

impl<T> FingerprintTask<T> {
    /// Snapshot generation the request runs against
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Ask the request to stop and discard its result
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the result
    pub async fn wait(self) -> FingerprintResult<T> {
        let outcome = self.receiver.await;
        if self.cancel.is_cancelled() {
            return Err(FingerprintError::Cancelled);
        }
        match outcome {
            Ok(result) => result,
            Err(_) => Err(FingerprintError::Worker(
                "worker stopped before delivering a result".to_string(),
            )),
        }
    }
}
