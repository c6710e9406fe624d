//! Repository error and lookup outcome types.

use crate::db::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoOp {
    Find,
    Create,
    Count,
}

impl Display for RepoOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Find => write!(f, "find"),
            Self::Create => write!(f, "create"),
            Self::Count => write!(f, "count"),
        }
    }
}

/// What went wrong, independent of where.
#[derive(Debug)]
pub enum RepoErrorKind {
    /// No live row matched the lookup key.
    NotFound,
    /// The store rejected or could not run the call.
    Store(StoreError),
}

impl Display for RepoErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "entity not found"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

/// Repository failure carrying `(operation, entity, key)` diagnostics.
#[derive(Debug)]
pub struct RepoError {
    pub op: RepoOp,
    pub entity: &'static str,
    pub key: String,
    pub kind: RepoErrorKind,
}

impl RepoError {
    pub fn new(op: RepoOp, entity: &'static str, key: impl Into<String>, kind: RepoErrorKind) -> Self {
        Self {
            op,
            entity,
            key: key.into(),
            kind,
        }
    }

    pub fn not_found(op: RepoOp, entity: &'static str, key: impl Into<String>) -> Self {
        Self::new(op, entity, key, RepoErrorKind::NotFound)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, RepoErrorKind::NotFound)
    }

    /// Underlying store failure, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        match &self.kind {
            RepoErrorKind::Store(err) => Some(err),
            RepoErrorKind::NotFound => None,
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        self.store_error()
            .is_some_and(StoreError::is_constraint_violation)
    }

    pub fn is_deadline_exceeded(&self) -> bool {
        self.store_error().is_some_and(StoreError::is_deadline_exceeded)
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "repository {} {} failed for '{}': {}",
            self.entity, self.op, self.key, self.kind
        )
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            RepoErrorKind::Store(err) => Some(err),
            RepoErrorKind::NotFound => None,
        }
    }
}

/// Outcome of a natural-key or identity lookup.
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Failed(StoreError),
}

impl<T> Lookup<T> {
    pub(crate) fn from_query(outcome: Result<Option<T>, StoreError>) -> Self {
        match outcome {
            Ok(Some(value)) => Self::Found(value),
            Ok(None) => Self::NotFound,
            Err(err) => Self::Failed(err),
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound | Self::Failed(_) => None,
        }
    }

    /// Converts into a repository result, attaching lookup diagnostics.
    pub fn into_result(self, op: RepoOp, entity: &'static str, key: &str) -> RepoResult<T> {
        match self {
            Self::Found(value) => Ok(value),
            Self::NotFound => Err(RepoError::not_found(op, entity, key)),
            Self::Failed(err) => Err(RepoError::new(op, entity, key, RepoErrorKind::Store(err))),
        }
    }
}
