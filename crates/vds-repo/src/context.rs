use vds_store::{Commit, ObjectStore, Tree};
use vds_types::ObjectId;

use crate::error::RepoResult;

/// An immutable view of the repository at one commit.
///
/// Every read is answered against a snapshot taken at its start, so a
/// concurrent write that advances HEAD mid-request never mixes two versions
/// into one answer. An empty repository snapshots to an empty root tree.
#[derive(Clone, Debug)]
pub struct Snapshot {
    commit_id: Option<ObjectId>,
    commit: Option<Commit>,
    root_id: ObjectId,
    root: Tree,
}

impl Snapshot {
    /// Snapshot of a repository with no commits.
    pub fn empty() -> RepoResult<Self> {
        let root = Tree::empty();
        let root_id = root.to_stored_object()?.compute_id();
        Ok(Self {
            commit_id: None,
            commit: None,
            root_id,
            root,
        })
    }

    /// Snapshot at commit `id`, loading its root tree.
    pub fn at_commit(store: &dyn ObjectStore, id: ObjectId, commit: Commit) -> RepoResult<Self> {
        let root = store.read_tree(&commit.tree)?;
        Ok(Self {
            commit_id: Some(id),
            root_id: commit.tree,
            commit: Some(commit),
            root,
        })
    }

    pub fn commit_id(&self) -> Option<ObjectId> {
        self.commit_id
    }

    pub fn commit(&self) -> Option<&Commit> {
        self.commit.as_ref()
    }

    pub fn root_id(&self) -> ObjectId {
        self.root_id
    }

    pub fn root(&self) -> &Tree {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.commit_id.is_none()
    }
}
