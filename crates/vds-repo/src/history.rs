//! Per-path history over the first-parent chain.
//!
//! Walking from a start commit towards the root, the object a path names
//! forms runs of identical ids. Each run begins (in commit order) at the
//! commit that introduced that version, and that commit is the one
//! reported. A path created at A, untouched at B and edited at C therefore
//! yields `[C, A]`.
//!
//! The walk stops at a root commit, at the first commit where the path does
//! not exist, or when the step budget runs out. Merge parents other than the
//! first are never followed.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vds_store::{Commit, ObjectStore};
use vds_types::{ObjectId, Signature};

use crate::error::RepoResult;
use crate::path::LogicalPath;
use crate::resolve::resolve_entry;

/// A commit at which the object at a path changed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub commit: ObjectId,
    pub when: DateTime<FixedOffset>,
    pub message: String,
    pub author: Signature,
}

impl HistoryEntry {
    fn new(commit_id: ObjectId, commit: Commit) -> Self {
        Self {
            commit: commit_id,
            when: commit.committer.when,
            message: commit.message,
            author: commit.author,
        }
    }
}

/// Bounds on a history walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryOptions {
    /// Commits the walk may visit before giving up.
    pub max_steps: usize,
    /// Stop once this many entries have been produced.
    pub limit: Option<usize>,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            max_steps: 10_000,
            limit: None,
        }
    }
}

/// Newest-first history of one path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub entries: Vec<HistoryEntry>,
    /// The step budget ran out before the walk reached its natural end; the
    /// oldest entry may then be later than the true creation of its version.
    pub truncated: bool,
}

/// The oldest commit seen so far that still carries `target`.
struct Run {
    commit_id: ObjectId,
    commit: Commit,
    target: ObjectId,
}

/// Reconstruct the history of `path` starting at commit `start`.
pub fn history(
    store: &dyn ObjectStore,
    start: ObjectId,
    path: &LogicalPath,
    options: HistoryOptions,
) -> RepoResult<History> {
    let limit = options.limit.unwrap_or(usize::MAX);
    let mut out = History::default();
    let mut run: Option<Run> = None;
    let mut next = Some(start);
    let mut steps = 0usize;

    while let Some(commit_id) = next {
        if out.entries.len() >= limit {
            return Ok(out);
        }
        if steps == options.max_steps {
            debug!(path = %path, steps, "history walk hit its step budget");
            out.truncated = true;
            break;
        }
        steps += 1;

        let commit = store.read_commit(&commit_id)?;
        let root = store.read_tree(&commit.tree)?;
        let Some(target) = resolve_entry(store, commit.tree, &root, path)? else {
            break;
        };
        next = commit.first_parent().copied();

        match run.take() {
            Some(current) if current.target != target.id => {
                out.entries.push(HistoryEntry::new(current.commit_id, current.commit));
            }
            _ => {}
        }
        run = Some(Run {
            commit_id,
            commit,
            target: target.id,
        });
    }

    if let Some(current) = run {
        if out.entries.len() < limit {
            out.entries.push(HistoryEntry::new(current.commit_id, current.commit));
        }
    }
    Ok(out)
}
