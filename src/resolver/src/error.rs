//! Error types for the resolution engine

use std::convert::Infallible;
use thiserror::Error;

/// Conditions that end a resolution without an outcome
///
/// `NotFound` and `Ambiguous` are deliberately absent: they are regular
/// [`ResolutionOutcome`](crate::ResolutionOutcome) variants. The type parameter
/// carries the injected fetcher's error, which is passed through untouched.
#[derive(Debug, Error)]
pub enum ResolveError<E = Infallible> {
    /// Empty or whitespace-only input
    #[error("{0}")]
    InvalidInput(String),

    /// Operator aborted the selection prompt
    #[error("Selection cancelled")]
    Cancelled,

    /// Operator picked an entry outside the presented list (1-based)
    #[error("Invalid selection {selected} (must be 1-{available})")]
    InvalidSelection { selected: usize, available: usize },

    /// `#N` position outside the listed candidates (1-based)
    #[error("Invalid {noun} number {position} (must be 1-{available})")]
    InvalidPosition {
        noun: &'static str,
        position: usize,
        available: usize,
    },

    /// The prompt sink failed for a reason other than an interrupt
    #[error("Prompt failed: {0}")]
    Prompt(#[source] std::io::Error),

    /// Candidate fetch failed
    #[error(transparent)]
    Fetch(E),
}

impl ResolveError<Infallible> {
    /// Re-types a fetch-free error for a pipeline with a real fetcher error
    pub fn widen<E>(self) -> ResolveError<E> {
        match self {
            Self::InvalidInput(msg) => ResolveError::InvalidInput(msg),
            Self::Cancelled => ResolveError::Cancelled,
            Self::InvalidSelection { selected, available } => {
                ResolveError::InvalidSelection { selected, available }
            }
            Self::InvalidPosition {
                noun,
                position,
                available,
            } => ResolveError::InvalidPosition {
                noun,
                position,
                available,
            },
            Self::Prompt(err) => ResolveError::Prompt(err),
            Self::Fetch(never) => match never {},
        }
    }
}

impl<E> ResolveError<E> {
    /// Returns true for operator-initiated aborts
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns the fetcher's error if this is a fetch failure
    pub fn into_fetch_error(self) -> Option<E> {
        match self {
            Self::Fetch(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for fetch-free resolution steps
pub type Result<T> = std::result::Result<T, ResolveError>;
