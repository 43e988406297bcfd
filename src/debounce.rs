//! Debouncer - run the latest scheduled task after a quiet period / 防抖器
//!
//! Every `schedule` cancels the pending task and restarts the timer, so a burst of
//! keystrokes produces exactly one recomputation.

use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<CancellationToken>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `task`, replacing any pending one / 调度任务，取消之前的任务
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let token = CancellationToken::new();
        if let Some(previous) = self.pending.lock().replace(token.clone()) {
            previous.cancel();
        }

        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::trace!("Debounced task superseded");
                }
                _ = tokio::time::sleep(delay) => {
                    if !token.is_cancelled() {
                        task();
                    }
                }
            }
        });
    }

    /// Cancel the pending task, if any / 取消待执行任务
    pub fn cancel(&self) -> bool {
        match self.pending.lock().take() {
            Some(token) => {
                let was_pending = !token.is_cancelled();
                token.cancel();
                was_pending
            }
            None => false,
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(token) = self.pending.get_mut().take() {
            token.cancel();
        }
    }
}
