//! The [`RefStore`] trait defining the reference storage interface.

use vds_types::ObjectId;

use crate::error::Result;
use crate::types::{CasOutcome, HEAD};

/// Storage backend for named references.
///
/// Refs are the only mutable state in a repository. Every update is a
/// compare-and-swap: the caller states the value it last observed
/// (`None` for "the ref does not exist yet") and the update is applied only
/// if the ref still holds exactly that value. Implementations must make the
/// compare and the write a single atomic step with respect to every other
/// writer of the same store. A store that cannot get exclusive access in
/// time answers [`CasOutcome::Busy`] rather than failing.
///
/// The namespace is `HEAD` plus `refs/...`; tags live under `refs/tags/`.
pub trait RefStore: Send + Sync {
    /// Read a ref by its canonical name.
    ///
    /// Returns `Ok(None)` if the ref does not exist.
    fn read_ref(&self, name: &str) -> Result<Option<ObjectId>>;

    /// Atomically set `name` to `new` if it currently holds `expected`.
    fn compare_and_swap(
        &self,
        name: &str,
        expected: Option<ObjectId>,
        new: ObjectId,
    ) -> Result<CasOutcome>;

    /// The commit HEAD points at, or `None` for an empty repository.
    fn head(&self) -> Result<Option<ObjectId>> {
        self.read_ref(HEAD)
    }

    /// Compare-and-swap HEAD.
    fn advance_head(&self, expected: Option<ObjectId>, new: ObjectId) -> Result<CasOutcome> {
        self.compare_and_swap(HEAD, expected, new)
    }
}
