//! Hashing primitives for the versioned document store.
//!
//! Object identity is a domain-separated BLAKE3 hash: a blob, a tree and a
//! commit with identical encoded bytes still get distinct ids. All crypto
//! wraps the `blake3` crate, nothing is hand-rolled.

pub mod hasher;

pub use hasher::ContentHasher;
