//! Conflict-checked writes that advance HEAD by compare-and-swap.
//!
//! One attempt reads HEAD, checks the caller's expectation against the
//! entry currently at the path, stores the blob, rebuilds the trees from the
//! leaf up to the root (sharing every untouched subtree), stores a commit
//! whose only parent is the HEAD it read, and finally swaps HEAD from that
//! value to the new commit. Losing the swap re-runs the whole attempt
//! against the new HEAD, a bounded number of times.
//!
//! Everything an attempt writes before the swap is content-addressed and
//! unreachable until the swap succeeds, so an abandoned attempt leaves only
//! orphaned objects behind.

use std::fmt;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vds_refs::{CasOutcome, RefStore};
use vds_store::{Commit, ObjectStore, Tree, TreeEntry};
use vds_types::{ObjectId, Signature};

use crate::config::RepoConfig;
use crate::error::{RepoError, RepoResult};
use crate::path::LogicalPath;

/// What the writer believes is currently stored at the target path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExpectedId {
    /// Overwrite whatever is there.
    #[default]
    Unchecked,
    /// The path must not exist yet.
    ExpectAbsent,
    /// The path must currently hold exactly this blob.
    ExpectId(ObjectId),
}

impl fmt::Display for ExpectedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchecked => f.write_str("unchecked"),
            Self::ExpectAbsent => f.write_str("absent"),
            Self::ExpectId(id) => write!(f, "{}", id.short_hex()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct WriteRequest {
    pub path: LogicalPath,
    pub expected: ExpectedId,
    pub message: String,
    pub content: Vec<u8>,
    /// Falls back to the configured default author.
    pub author: Option<Signature>,
}

impl WriteRequest {
    pub fn new(path: LogicalPath, content: impl Into<Vec<u8>>) -> Self {
        let message = format!("Update {path}");
        Self {
            path,
            expected: ExpectedId::Unchecked,
            message,
            content: content.into(),
            author: None,
        }
    }

    pub fn expect(mut self, expected: ExpectedId) -> Self {
        self.expected = expected;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn author(mut self, author: Signature) -> Self {
        self.author = Some(author);
        self
    }
}

/// Result of a successful write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOutcome {
    /// The new HEAD.
    pub commit: ObjectId,
    /// The blob now stored at the path.
    pub id: ObjectId,
    #[serde(skip)]
    pub attempts: u32,
}

/// What the path held in the commit an attempt started from.
#[derive(Debug, PartialEq, Eq)]
enum Prior {
    Missing,
    File(ObjectId),
    Directory,
    /// A file occupies an intermediate segment.
    Blocked(LogicalPath),
}

/// Trees along the path as of one HEAD, root first.
///
/// `trail[i]` is the directory holding segment `i`; directories that do
/// not exist yet appear as empty trees.
struct Base {
    head: Option<ObjectId>,
    trail: Vec<Tree>,
    prior: Prior,
}

/// Runs writes against one object store and ref store.
pub struct Writer<'a> {
    objects: &'a dyn ObjectStore,
    refs: &'a dyn RefStore,
    config: &'a RepoConfig,
}

impl<'a> Writer<'a> {
    pub fn new(
        objects: &'a dyn ObjectStore,
        refs: &'a dyn RefStore,
        config: &'a RepoConfig,
    ) -> Self {
        Self {
            objects,
            refs,
            config,
        }
    }

    /// Apply `request`, retrying lost HEAD races.
    pub fn write(&self, request: &WriteRequest) -> RepoResult<WriteOutcome> {
        let path = &request.path;
        path.validate_for_write(&self.config.metadata_suffix)?;

        let author = match &request.author {
            Some(author) => author.clone(),
            None => self.config.default_signature()?,
        };

        let max_attempts = self.config.max_write_retries.saturating_add(1);
        for attempt in 1..=max_attempts {
            let base = self.read_base(path)?;
            debug!(
                path = %path,
                attempt,
                head = ?base.head,
                expected = %request.expected,
                "write attempt"
            );
            self.check(path, request.expected, &base)?;

            let blob = self.objects.write_blob(&request.content)?;
            let tree = self.build_tree(path, base.trail, blob)?;
            let commit = Commit {
                tree,
                parents: base.head.into_iter().collect(),
                author: author.clone(),
                committer: author.with_time(Utc::now().fixed_offset()),
                message: request.message.clone(),
            };
            let commit_id = self.objects.write_commit(&commit)?;

            match self.refs.advance_head(base.head, commit_id)? {
                CasOutcome::Updated => {
                    info!(path = %path, commit = %commit_id.short_hex(), attempt, "committed");
                    return Ok(WriteOutcome {
                        commit: commit_id,
                        id: blob,
                        attempts: attempt,
                    });
                }
                CasOutcome::Mismatch { actual } => {
                    debug!(path = %path, attempt, ?actual, "HEAD moved during write; retrying");
                }
                CasOutcome::Busy => {
                    debug!(path = %path, attempt, "HEAD locked by another writer; retrying");
                    if attempt < max_attempts {
                        thread::sleep(busy_pause(attempt));
                    }
                }
            }
        }

        Err(RepoError::conflict(
            path,
            format!("HEAD kept moving or stayed locked; gave up after {max_attempts} attempts"),
        ))
    }

    fn read_base(&self, path: &LogicalPath) -> RepoResult<Base> {
        let head = self.refs.head()?;
        let root = match head {
            Some(id) => {
                let commit = self.objects.read_commit(&id)?;
                self.objects.read_tree(&commit.tree)?
            }
            None => Tree::empty(),
        };

        // validate_for_write guarantees at least one segment.
        let (leaf, dirs) = path
            .segments()
            .split_last()
            .ok_or_else(|| RepoError::invalid_path(path.to_string(), "cannot write the root"))?;

        let mut trail = vec![root];
        let mut missing = false;
        for (depth, name) in dirs.iter().enumerate() {
            let next = if missing {
                Tree::empty()
            } else {
                let found = trail[depth]
                    .get(name)
                    .map(|entry| (entry.mode.is_dir(), entry.object_id));
                match found {
                    Some((true, subtree)) => self.objects.read_tree(&subtree)?,
                    Some((false, _)) => {
                        return Ok(Base {
                            head,
                            trail,
                            prior: Prior::Blocked(path.prefix(depth + 1)),
                        })
                    }
                    None => {
                        missing = true;
                        Tree::empty()
                    }
                }
            };
            trail.push(next);
        }

        let prior = if missing {
            Prior::Missing
        } else {
            match trail[dirs.len()].get(leaf) {
                Some(entry) if entry.mode.is_dir() => Prior::Directory,
                Some(entry) => Prior::File(entry.object_id),
                None => Prior::Missing,
            }
        };
        Ok(Base { head, trail, prior })
    }

    fn check(&self, path: &LogicalPath, expected: ExpectedId, base: &Base) -> RepoResult<()> {
        if base.head.is_none() {
            return match expected {
                ExpectedId::ExpectAbsent => Ok(()),
                ExpectedId::Unchecked => Err(RepoError::conflict(
                    path,
                    "repository is empty; the first write must expect absence",
                )),
                ExpectedId::ExpectId(id) => Err(RepoError::Gone {
                    path: path.to_string(),
                    expected: id,
                }),
            };
        }

        match (&base.prior, expected) {
            (Prior::Blocked(at), _) => Err(RepoError::conflict(path, format!("{at} is a file"))),
            (Prior::Directory, _) => Err(RepoError::conflict(path, "path is a directory")),
            (Prior::File(_), ExpectedId::Unchecked) => Ok(()),
            (Prior::File(current), ExpectedId::ExpectAbsent) => Err(RepoError::conflict(
                path,
                format!("already exists as {}", current.short_hex()),
            )),
            (Prior::File(current), ExpectedId::ExpectId(id)) if *current == id => Ok(()),
            (Prior::File(current), ExpectedId::ExpectId(id)) => Err(RepoError::conflict(
                path,
                format!(
                    "expected {} but found {}",
                    id.short_hex(),
                    current.short_hex()
                ),
            )),
            (Prior::Missing, ExpectedId::ExpectId(id)) => Err(RepoError::Gone {
                path: path.to_string(),
                expected: id,
            }),
            (Prior::Missing, _) => Ok(()),
        }
    }

    /// Write the new leaf and every ancestor tree, returning the root id.
    fn build_tree(
        &self,
        path: &LogicalPath,
        mut trail: Vec<Tree>,
        blob: ObjectId,
    ) -> RepoResult<ObjectId> {
        let segments = path.segments();
        let mut depth = segments.len();
        let mut entry = TreeEntry::file(segments[depth - 1].as_str(), blob);

        while let Some(mut tree) = trail.pop() {
            tree.upsert(entry)?;
            let id = self.objects.write_tree(&tree)?;
            depth -= 1;
            if depth == 0 {
                return Ok(id);
            }
            entry = TreeEntry::dir(segments[depth - 1].as_str(), id);
        }
        Err(RepoError::invalid_path(path.to_string(), "cannot write the root"))
    }
}

/// Backoff after finding HEAD locked: 2ms, 4ms, ... capped at 128ms.
fn busy_pause(attempt: u32) -> Duration {
    Duration::from_millis(2u64 << attempt.saturating_sub(1).min(6))
}
