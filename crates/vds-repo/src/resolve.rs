//! Path resolution through nested trees.
//!
//! Descent is iterative and by exact name only: no globbing, no case
//! folding, no partial matches. Nothing here writes.

use std::borrow::Cow;

use vds_store::{Blob, EntryMode, ObjectStore, Tree};
use vds_types::ObjectId;

use crate::error::{RepoError, RepoResult};
use crate::path::LogicalPath;

/// What a path names: the object id and whether it is a directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Target {
    pub id: ObjectId,
    pub mode: EntryMode,
}

impl Target {
    pub fn is_dir(&self) -> bool {
        self.mode.is_dir()
    }
}

/// A loaded object reached by a path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub id: ObjectId,
    pub object: Object,
}

/// Find the entry `path` names under `root` without loading it.
///
/// Returns `Ok(None)` when a segment is missing, when a file sits where a
/// directory is needed, or when a trailing slash names a file. Only the
/// trees along the path are read.
pub fn resolve_entry(
    store: &dyn ObjectStore,
    root_id: ObjectId,
    root: &Tree,
    path: &LogicalPath,
) -> RepoResult<Option<Target>> {
    let Some((last, dirs)) = path.segments().split_last() else {
        return Ok(Some(Target {
            id: root_id,
            mode: EntryMode::Directory,
        }));
    };

    let mut current = Cow::Borrowed(root);
    for name in dirs {
        match current.get(name) {
            Some(entry) if entry.mode.is_dir() => {
                current = Cow::Owned(store.read_tree(&entry.object_id)?);
            }
            _ => return Ok(None),
        }
    }

    let target = current.get(last).map(|entry| Target {
        id: entry.object_id,
        mode: entry.mode,
    });
    Ok(target.filter(|t| t.is_dir() || !path.has_trailing_slash()))
}

/// Resolve `path` under `root` and load the object it names.
pub fn resolve(
    store: &dyn ObjectStore,
    root_id: ObjectId,
    root: &Tree,
    path: &LogicalPath,
) -> RepoResult<Resolved> {
    let target =
        resolve_entry(store, root_id, root, path)?.ok_or_else(|| RepoError::not_found(path))?;
    let object = match target.mode {
        EntryMode::Directory if path.is_root() => Object::Tree(root.clone()),
        EntryMode::Directory => Object::Tree(store.read_tree(&target.id)?),
        EntryMode::Regular => Object::Blob(store.read_blob(&target.id)?),
    };
    Ok(Resolved {
        id: target.id,
        object,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use vds_store::{InMemoryObjectStore, TreeEntry};

    /// `/a.txt`, `/b/c.txt`, `/b/d/e.txt`
    fn fixture() -> (InMemoryObjectStore, ObjectId, Tree) {
        let store = InMemoryObjectStore::new();
        let a = store.write_blob(b"a").unwrap();
        let c = store.write_blob(b"c").unwrap();
        let e = store.write_blob(b"e").unwrap();
        let d = Tree::new(vec![TreeEntry::file("e.txt", e)]).unwrap();
        let d_id = store.write_tree(&d).unwrap();
        let b = Tree::new(vec![TreeEntry::file("c.txt", c), TreeEntry::dir("d", d_id)]).unwrap();
        let b_id = store.write_tree(&b).unwrap();
        let root = Tree::new(vec![TreeEntry::file("a.txt", a), TreeEntry::dir("b", b_id)]).unwrap();
        let root_id = store.write_tree(&root).unwrap();
        (store, root_id, root)
    }

    fn p(raw: &str) -> LogicalPath {
        LogicalPath::parse(raw).unwrap()
    }

    #[test]
    fn root_resolves_to_itself() {
        let (store, root_id, root) = fixture();
        let resolved = resolve(&store, root_id, &root, &LogicalPath::root()).unwrap();
        assert_eq!(resolved.id, root_id);
        assert_eq!(resolved.object, Object::Tree(root));
    }

    #[test]
    fn nested_blob() {
        let (store, root_id, root) = fixture();
        let resolved = resolve(&store, root_id, &root, &p("/b/d/e.txt")).unwrap();
        assert_eq!(resolved.object, Object::Blob(Blob::new(b"e".to_vec())));
    }

    #[test]
    fn nested_tree() {
        let (store, root_id, root) = fixture();
        let resolved = resolve(&store, root_id, &root, &p("/b/d")).unwrap();
        match resolved.object {
            Object::Tree(t) => assert!(t.get("e.txt").is_some()),
            other => panic!("expected tree, got {other:?}"),
        }
    }

    #[test]
    fn missing_segment_is_not_found() {
        let (store, root_id, root) = fixture();
        let err = resolve(&store, root_id, &root, &p("/b/nope/e.txt")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn descending_through_blob_is_not_found() {
        let (store, root_id, root) = fixture();
        assert!(resolve_entry(&store, root_id, &root, &p("/a.txt/x")).unwrap().is_none());
    }

    #[test]
    fn trailing_slash_requires_directory() {
        let (store, root_id, root) = fixture();
        assert!(resolve_entry(&store, root_id, &root, &p("/a.txt/")).unwrap().is_none());
        assert!(resolve_entry(&store, root_id, &root, &p("/b/")).unwrap().unwrap().is_dir());
    }

    #[test]
    fn exact_match_only() {
        let (store, root_id, root) = fixture();
        assert!(resolve_entry(&store, root_id, &root, &p("/A.txt")).unwrap().is_none());
        assert!(resolve_entry(&store, root_id, &root, &p("/a")).unwrap().is_none());
    }

    #[test]
    fn dangling_subtree_is_io() {
        let store = InMemoryObjectStore::new();
        let missing = ObjectId::from_hash([9; 32]);
        let root = Tree::new(vec![TreeEntry::dir("gone", missing)]).unwrap();
        let root_id = store.write_tree(&root).unwrap();
        let err = resolve(&store, root_id, &root, &p("/gone/x")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
