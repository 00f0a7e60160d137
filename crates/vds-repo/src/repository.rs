use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::info;
use vds_refs::{FsRefStore, InMemoryRefStore, RefStore};
use vds_store::{Commit, FsObjectStore, InMemoryObjectStore, ObjectKind, ObjectStore};
use vds_types::ObjectId;

use crate::config::RepoConfig;
use crate::context::Snapshot;
use crate::error::{RepoError, RepoResult};
use crate::history::{self, History, HistoryOptions};
use crate::listing::{self, DirEntry};
use crate::path::LogicalPath;
use crate::resolve::{self, Object, Resolved, Target};
use crate::view::{View, ViewContent};
use crate::writer::{WriteOutcome, WriteRequest, Writer};

/// A versioned document store: an object store plus its HEAD.
///
/// Cloning is cheap and clones share the same stores, so one `Repository`
/// can be handed to every request handler.
#[derive(Clone)]
pub struct Repository {
    objects: Arc<dyn ObjectStore>,
    refs: Arc<dyn RefStore>,
    config: RepoConfig,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Repository {
    pub fn new(objects: Arc<dyn ObjectStore>, refs: Arc<dyn RefStore>, config: RepoConfig) -> Self {
        Self {
            objects,
            refs,
            config,
        }
    }

    /// An empty repository that lives only as long as the value.
    pub fn in_memory(config: RepoConfig) -> Self {
        Self::new(
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(InMemoryRefStore::new()),
            config,
        )
    }

    /// Create (or reopen) an on-disk repository at `root`.
    pub fn init(root: &Path, config: RepoConfig) -> RepoResult<Self> {
        fs::create_dir_all(root).map_err(vds_store::StoreError::from)?;
        let objects = FsObjectStore::open(root)?;
        let refs = FsRefStore::open(root)?;
        info!(root = %root.display(), "initialized repository");
        Ok(Self::new(Arc::new(objects), Arc::new(refs), config))
    }

    /// Open an existing on-disk repository.
    pub fn open(root: &Path, config: RepoConfig) -> RepoResult<Self> {
        if !root.join("objects").is_dir() || !root.join("refs").is_dir() {
            return Err(RepoError::NotARepository(root.to_path_buf()));
        }
        let objects = FsObjectStore::open(root)?;
        let refs = FsRefStore::open(root)?;
        Ok(Self::new(Arc::new(objects), Arc::new(refs), config))
    }

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    pub fn objects(&self) -> &dyn ObjectStore {
        &*self.objects
    }

    /// The current commit, or `None` before the first write.
    pub fn head(&self) -> RepoResult<Option<ObjectId>> {
        Ok(self.refs.head()?)
    }

    /// Load a commit, failing with `UnknownCommit` if `id` names none.
    pub fn read_commit(&self, id: ObjectId) -> RepoResult<Commit> {
        match self.objects.read(&id)? {
            Some(obj) if obj.kind == ObjectKind::Commit => Ok(Commit::from_stored_object(&obj)?),
            _ => Err(RepoError::UnknownCommit(id)),
        }
    }

    /// Freeze the repository at `at`, or at HEAD when `at` is `None`.
    pub fn snapshot(&self, at: Option<ObjectId>) -> RepoResult<Snapshot> {
        let id = match at {
            Some(id) => id,
            None => match self.head()? {
                Some(id) => id,
                None => return Snapshot::empty(),
            },
        };
        let commit = self.read_commit(id)?;
        Snapshot::at_commit(self.objects(), id, commit)
    }

    pub fn resolve(&self, path: &LogicalPath, at: Option<ObjectId>) -> RepoResult<Resolved> {
        let snapshot = self.snapshot(at)?;
        self.resolve_in(&snapshot, path)
    }

    /// Resolve `path` and load the object, against a snapshot already taken.
    pub fn resolve_in(&self, snapshot: &Snapshot, path: &LogicalPath) -> RepoResult<Resolved> {
        resolve::resolve(self.objects(), snapshot.root_id(), snapshot.root(), path)
    }

    /// Resolve `path` without loading the object it names.
    pub fn locate_in(&self, snapshot: &Snapshot, path: &LogicalPath) -> RepoResult<Option<Target>> {
        resolve::resolve_entry(self.objects(), snapshot.root_id(), snapshot.root(), path)
    }

    /// Children of the directory at `path`.
    pub fn list(&self, path: &LogicalPath, at: Option<ObjectId>) -> RepoResult<Vec<DirEntry>> {
        match self.resolve(path, at)?.object {
            Object::Tree(tree) => Ok(listing::list(&tree).collect()),
            Object::Blob(_) => Err(RepoError::not_found(path.as_directory())),
        }
    }

    /// History of `path`, newest first, walking back from `at` or HEAD.
    ///
    /// `options` defaults to the configured step budget.
    pub fn history(
        &self,
        path: &LogicalPath,
        at: Option<ObjectId>,
        options: Option<HistoryOptions>,
    ) -> RepoResult<History> {
        let start = match at {
            Some(id) => {
                self.read_commit(id)?;
                id
            }
            None => match self.head()? {
                Some(id) => id,
                None => return Ok(History::default()),
            },
        };
        let options = options.unwrap_or_else(|| self.config.history_options());
        history::history(self.objects(), start, path, options)
    }

    /// Resolve `path` at one commit, optionally with its history.
    pub fn view(
        &self,
        path: &LogicalPath,
        at: Option<ObjectId>,
        with_history: bool,
    ) -> RepoResult<View> {
        self.view_in(&self.snapshot(at)?, path, with_history)
    }

    pub fn view_in(
        &self,
        snapshot: &Snapshot,
        path: &LogicalPath,
        with_history: bool,
    ) -> RepoResult<View> {
        let resolved = self.resolve_in(snapshot, path)?;
        let (display, content) = match resolved.object {
            Object::Blob(blob) => (
                path.clone(),
                ViewContent::File {
                    size: blob.data.len() as u64,
                    data: blob.data,
                },
            ),
            Object::Tree(tree) => (
                path.as_directory(),
                ViewContent::Directory {
                    entries: listing::list(&tree).collect(),
                },
            ),
        };

        let history = match snapshot.commit_id() {
            Some(start) if with_history => Some(history::history(
                self.objects(),
                start,
                path,
                self.config.history_options(),
            )?),
            None if with_history => Some(History::default()),
            _ => None,
        };

        Ok(View {
            path: display.to_string(),
            commit: snapshot.commit_id(),
            id: resolved.id,
            content,
            history,
        })
    }

    /// Apply a conflict-checked write and advance HEAD.
    pub fn write(&self, request: &WriteRequest) -> RepoResult<WriteOutcome> {
        Writer::new(self.objects(), &*self.refs, &self.config).write(request)
    }
}
