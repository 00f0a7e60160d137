//! Reference management for the versioned document store.
//!
//! A repository has exactly one piece of mutable state: the `HEAD` ref,
//! naming the newest commit. Other names under `refs/` may point at
//! historical commits. Every ref update is a compare-and-swap,
//! which is what gives concurrent writers their linearizable history.
//!
//! # Modules
//!
//! - [`error`] -- Error types for ref operations
//! - [`types`] -- [`HEAD`] and the [`CasOutcome`] of an update
//! - [`traits`] -- The [`RefStore`] trait defining the storage interface
//! - [`names`] -- Ref name validation
//! - [`memory`] -- In-memory [`InMemoryRefStore`] for tests
//! - [`fs`] -- On-disk [`FsRefStore`] with lock-file updates

pub mod error;
pub mod fs;
pub mod memory;
pub mod names;
pub mod traits;
pub mod types;

pub use error::{RefError, Result};
pub use fs::FsRefStore;
pub use memory::InMemoryRefStore;
pub use names::validate_ref_name;
pub use traits::RefStore;
pub use types::{CasOutcome, HEAD};
