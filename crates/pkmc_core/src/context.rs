//! Cancellation and deadline propagation for store-facing calls.
//!
//! # Responsibility
//! - Carry an optional deadline and a shared cancellation flag per operation.
//! - Report why an operation must stop (`Canceled` vs `DeadlineExceeded`).
//!
//! # Invariants
//! - Cancellation is sticky: once canceled, a context never becomes live again.
//! - Clones share the same cancellation flag; child contexts never extend the
//!   parent deadline.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Reason an operation context is no longer live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// `OpContext::cancel` was called.
    Canceled,
    /// The context deadline has passed.
    DeadlineExceeded,
}

impl Display for ContextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Canceled => write!(f, "context canceled"),
            Self::DeadlineExceeded => write!(f, "context deadline exceeded"),
        }
    }
}

impl Error for ContextError {}

/// Deadline/cancellation scope passed to every repository and service call.
#[derive(Debug, Clone)]
pub struct OpContext {
    deadline: Option<Instant>,
    canceled: Arc<AtomicBool>,
}

impl Default for OpContext {
    fn default() -> Self {
        Self::background()
    }
}

impl OpContext {
    /// Context without deadline. Can still be canceled explicitly.
    pub fn background() -> Self {
        Self {
            deadline: None,
            canceled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::with_deadline(deadline),
            None => Self::background(),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            canceled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Derives a context sharing this one's cancellation flag whose deadline
    /// is the earlier of the parent deadline and `now + timeout`.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now().checked_add(timeout);
        let deadline = match (self.deadline, candidate) {
            (Some(parent), Some(child)) => Some(parent.min(child)),
            (Some(parent), None) => Some(parent),
            (None, child) => child,
        };
        Self {
            deadline,
            canceled: Arc::clone(&self.canceled),
        }
    }

    /// Cancels this context and every clone/child sharing its flag.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn is_done(&self) -> bool {
        self.check().is_err()
    }

    /// Returns `Ok(())` while the context is live.
    ///
    /// Cancellation takes precedence over deadline expiry.
    pub fn check(&self) -> Result<(), ContextError> {
        if self.canceled.load(Ordering::SeqCst) {
            return Err(ContextError::Canceled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ContextError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}
