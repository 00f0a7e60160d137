//! Core reference types.

use vds_types::ObjectId;

/// Canonical name of the repository's current-commit pointer.
pub const HEAD: &str = "HEAD";

/// Outcome of a compare-and-swap ref update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CasOutcome {
    /// The ref held the expected value and now points at the new commit.
    Updated,
    /// The ref did not hold the expected value; nothing was written.
    Mismatch {
        /// What the ref actually held at the time of the attempt.
        actual: Option<ObjectId>,
    },
    /// Another writer held the ref's lock for longer than the store waits;
    /// nothing was compared or written. Retrying later is safe.
    Busy,
}

impl CasOutcome {
    /// Returns `true` if the update was applied.
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated)
    }
}
