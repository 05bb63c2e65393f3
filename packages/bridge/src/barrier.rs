//! # Barrier
//!
//! "Do this, tell me when you're done" across the boundary:
//!
//! 1. [`Barrier::request`] registers a completion and returns the
//!    `ACTION_REQUEST` message to send.
//! 2. The counterpart performs the action and replies `ACTION_COMPLETE` with
//!    the same request id; the owner feeds it to [`Barrier::complete`].
//! 3. Whoever holds the [`Completion`] awaits it under the barrier timeout.
//!
//! The outcome is advisory. Callers proceed on [`BarrierOutcome::TimedOut`]
//! too, and a completion arriving after the timeout is ignored.

use crate::protocol::{Action, Message, RequestId};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::oneshot;

pub const DEFAULT_BARRIER_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BarrierOutcome {
    Completed,
    TimedOut,
}

#[derive(Debug)]
struct Pending {
    action: Action,
    done: oneshot::Sender<()>,
}

/// Outstanding action requests, keyed by request id
#[derive(Debug)]
pub struct Barrier {
    timeout: Duration,
    pending: HashMap<RequestId, Pending>,
    last_id: i64,
}

impl Barrier {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            pending: HashMap::new(),
            last_id: 0,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Register a new request and build the message announcing it
    pub fn request(&mut self, action: Action) -> (Message, Completion) {
        self.pending.retain(|_, p| !p.done.is_closed());

        let request_id = self.next_id();
        let (done, rx) = oneshot::channel();
        self.pending.insert(request_id, Pending { action, done });

        tracing::debug!(%request_id, ?action, "barrier request issued");

        (
            Message::ActionRequest { action, request_id },
            Completion {
                action,
                request_id,
                timeout: self.timeout,
                rx,
            },
        )
    }

    /// Resolve a request. Returns `false` for unknown, mismatched or late ids.
    pub fn complete(&mut self, action: Action, request_id: RequestId) -> bool {
        match self.pending.remove(&request_id) {
            Some(pending) if pending.action == action => {
                if pending.done.send(()).is_ok() {
                    return true;
                }
                tracing::debug!(%request_id, "late barrier completion ignored");
                false
            }
            Some(pending) => {
                tracing::warn!(
                    %request_id,
                    expected = ?pending.action,
                    got = ?action,
                    "barrier completion for a different action"
                );
                self.pending.insert(request_id, pending);
                false
            }
            None => {
                tracing::debug!(%request_id, "completion for unknown request ignored");
                false
            }
        }
    }

    /// Forget a request, usually after its completion timed out
    pub fn cancel(&mut self, request_id: RequestId) -> bool {
        self.pending.remove(&request_id).is_some()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn next_id(&mut self) -> RequestId {
        let now = chrono::Utc::now().timestamp_millis();
        self.last_id = now.max(self.last_id + 1);
        RequestId(self.last_id)
    }
}

impl Default for Barrier {
    fn default() -> Self {
        Self::new(DEFAULT_BARRIER_TIMEOUT)
    }
}

/// Awaitable side of one barrier request
#[derive(Debug)]
pub struct Completion {
    action: Action,
    request_id: RequestId,
    timeout: Duration,
    rx: oneshot::Receiver<()>,
}

impl Completion {
    pub fn action(&self) -> Action {
        self.action
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub async fn wait(self) -> BarrierOutcome {
        match tokio::time::timeout(self.timeout, self.rx).await {
            Ok(Ok(())) => BarrierOutcome::Completed,
            Ok(Err(_)) => {
                tracing::debug!(request_id = %self.request_id, "barrier dropped before completion");
                BarrierOutcome::TimedOut
            }
            Err(_) => {
                tracing::warn!(
                    request_id = %self.request_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "barrier timed out"
                );
                BarrierOutcome::TimedOut
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let mut barrier = Barrier::default();
        let (_, a) = barrier.request(Action::FlushEditable);
        let (_, b) = barrier.request(Action::FlushEditable);

        assert!(b.request_id() > a.request_id());
        assert_eq!(barrier.pending(), 2);
    }

    #[test]
    fn test_request_message_carries_id() {
        let mut barrier = Barrier::default();
        let (message, completion) = barrier.request(Action::FlushEditable);

        assert_eq!(
            message,
            Message::ActionRequest {
                action: Action::FlushEditable,
                request_id: completion.request_id(),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed() {
        let mut barrier = Barrier::default();
        let (_, completion) = barrier.request(Action::FlushEditable);

        assert!(barrier.complete(Action::FlushEditable, completion.request_id()));
        assert_eq!(completion.wait().await, BarrierOutcome::Completed);
        assert_eq!(barrier.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_then_late_completion_ignored() {
        let mut barrier = Barrier::new(Duration::from_millis(50));
        let (_, completion) = barrier.request(Action::FlushEditable);
        let id = completion.request_id();

        assert_eq!(completion.wait().await, BarrierOutcome::TimedOut);
        assert!(!barrier.complete(Action::FlushEditable, id));
        assert_eq!(barrier.pending(), 0);
    }

    #[test]
    fn test_unknown_and_mismatched_completions() {
        let mut barrier = Barrier::default();
        let (_, completion) = barrier.request(Action::FlushEditable);

        assert!(!barrier.complete(Action::FlushEditable, RequestId(1)));
        assert!(!barrier.complete(Action::Unknown, completion.request_id()));
        assert_eq!(barrier.pending(), 1);
    }
}
