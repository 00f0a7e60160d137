//! Foundation types for the versioned document store (VDS).
//!
//! Every other VDS crate depends on `vds-types`.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- Content-addressed identifier (BLAKE3 hash)
//! - [`Signature`] -- Author/committer identity with a timestamp

pub mod error;
pub mod object;
pub mod signature;

pub use error::TypeError;
pub use object::ObjectId;
pub use signature::Signature;
