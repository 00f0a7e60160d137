//! In-memory reference store for testing and ephemeral use.
//!
//! [`InMemoryRefStore`] stores all refs in a `HashMap` protected by a
//! `RwLock`. A compare-and-swap holds the write lock across the compare and
//! the store, which makes it atomic with respect to every other caller.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;
use vds_types::ObjectId;

use crate::error::{RefError, Result};
use crate::names::validate_ref_name;
use crate::traits::RefStore;
use crate::types::CasOutcome;

/// An in-memory implementation of [`RefStore`].
///
/// Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryRefStore {
    refs: RwLock<HashMap<String, ObjectId>>,
}

impl InMemoryRefStore {
    /// Create a new empty ref store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RefStore for InMemoryRefStore {
    fn read_ref(&self, name: &str) -> Result<Option<ObjectId>> {
        validate_ref_name(name)?;
        let refs = self.refs.read().map_err(|_| RefError::LockPoisoned)?;
        Ok(refs.get(name).copied())
    }

    fn compare_and_swap(
        &self,
        name: &str,
        expected: Option<ObjectId>,
        new: ObjectId,
    ) -> Result<CasOutcome> {
        validate_ref_name(name)?;
        let mut refs = self.refs.write().map_err(|_| RefError::LockPoisoned)?;
        let actual = refs.get(name).copied();
        if actual != expected {
            debug!(name, ?expected, ?actual, "ref compare-and-swap mismatch");
            return Ok(CasOutcome::Mismatch { actual });
        }
        refs.insert(name.to_string(), new);
        Ok(CasOutcome::Updated)
    }
}
