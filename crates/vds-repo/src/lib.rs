//! Path-addressed versioned document store.
//!
//! Documents live at `/`-rooted paths inside a git-style commit graph. Any
//! historical version can be read back, and writes are optimistic: each
//! states what it expects to replace and becomes a new commit on top of
//! HEAD, or fails without touching visible state.
//!
//! # Modules
//!
//! - [`path`] -- [`LogicalPath`] parsing and write-target rules
//! - [`resolve`] -- descending trees by path
//! - [`listing`] -- directory listings
//! - [`history`] -- per-path history over the first-parent chain
//! - [`writer`] -- conflict-checked writes with HEAD compare-and-swap
//! - [`repository`] -- the [`Repository`] facade tying them to the stores
//!
//! ```
//! use vds_repo::{ExpectedId, LogicalPath, RepoConfig, Repository, WriteRequest};
//!
//! let repo = Repository::in_memory(RepoConfig::default());
//! let path = LogicalPath::parse("/notes/today.md").unwrap();
//! let out = repo
//!     .write(&WriteRequest::new(path.clone(), "hello").expect(ExpectedId::ExpectAbsent))
//!     .unwrap();
//! assert_eq!(repo.head().unwrap(), Some(out.commit));
//! assert_eq!(repo.history(&path, None, None).unwrap().entries.len(), 1);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod history;
pub mod listing;
pub mod path;
pub mod repository;
pub mod resolve;
pub mod view;
pub mod writer;

pub use config::{AuthorConfig, RepoConfig};
pub use context::Snapshot;
pub use error::{ErrorKind, RepoError, RepoResult};
pub use history::{History, HistoryEntry, HistoryOptions};
pub use listing::DirEntry;
pub use path::LogicalPath;
pub use repository::Repository;
pub use resolve::{Object, Resolved, Target};
pub use view::{View, ViewContent};
pub use writer::{ExpectedId, WriteOutcome, WriteRequest, Writer};

pub use vds_store::{Blob, Commit, Tree, TreeEntry};
pub use vds_types::{ObjectId, Signature};
