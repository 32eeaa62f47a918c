//! Cancellation and deadline propagation for agent executions.
//!
//! An [`ExecContext`] is a cheap, cloneable handle shared between a caller
//! and the executor. Contexts form a chain: a context derived with
//! [`ExecContext::with_timeout`] or [`ExecContext::with_cancel`] is done as
//! soon as it or any of its ancestors is done.
//!
//! ```
//! use cliagent::context::ExecContext;
//! use std::time::Duration;
//!
//! let (ctx, cancel) = ExecContext::background().with_cancel();
//! let bounded = ctx.with_timeout(Duration::from_secs(30));
//! assert!(bounded.done().is_none());
//!
//! cancel.cancel();
//! assert!(bounded.done().is_some());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why a context stopped accepting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneReason {
    /// A [`CancelHandle`] on this context or an ancestor was triggered.
    Cancelled,
    /// The earliest deadline in the chain has passed.
    DeadlineExceeded,
}

#[derive(Debug)]
struct ContextInner {
    parent: Option<ExecContext>,
    deadline: Option<Instant>,
    cancelled: AtomicBool,
}

#[derive(Debug, Clone)]
pub struct ExecContext {
    inner: Arc<ContextInner>,
}

impl ExecContext {
    /// Root context: never cancelled, no deadline.
    pub fn background() -> Self {
        Self::derive(None, None)
    }

    fn derive(parent: Option<ExecContext>, deadline: Option<Instant>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                parent,
                deadline,
                cancelled: AtomicBool::new(false),
            }),
        }
    }

    /// Derive a child context that expires `timeout` from now.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now().checked_add(timeout);
        Self::derive(Some(self.clone()), deadline)
    }

    /// Derive a child context together with the handle that cancels it.
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let ctx = Self::derive(Some(self.clone()), None);
        let handle = CancelHandle {
            inner: Arc::clone(&ctx.inner),
        };
        (ctx, handle)
    }

    /// Earliest deadline along the chain, if any.
    pub fn deadline(&self) -> Option<Instant> {
        let parent = self.inner.parent.as_ref().and_then(|p| p.deadline());
        match (self.inner.deadline, parent) {
            (Some(own), Some(inherited)) => Some(own.min(inherited)),
            (own, inherited) => own.or(inherited),
        }
    }

    /// Time left before the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Returns the reason this context is done, or `None` while it is live.
    ///
    /// Explicit cancellation is reported in preference to an expired deadline.
    pub fn done(&self) -> Option<DoneReason> {
        if self.is_cancelled() {
            return Some(DoneReason::Cancelled);
        }
        match self.deadline() {
            Some(deadline) if Instant::now() >= deadline => Some(DoneReason::DeadlineExceeded),
            _ => None,
        }
    }

    fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
            || self
                .inner
                .parent
                .as_ref()
                .is_some_and(|parent| parent.is_cancelled())
    }
}

impl Default for ExecContext {
    fn default() -> Self {
        Self::background()
    }
}

/// Cancels the context it was created with, and every context derived from it.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    inner: Arc<ContextInner>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }
}
