//! Loose-object store on the local filesystem.
//!
//! On-disk layout, analogous to git's `.git/objects/`:
//!
//! ```text
//! <root>/objects/<first 2 hex chars>/<remaining 62 hex chars>
//! ```
//!
//! Each file holds the zstd-compressed encoding
//! `<kind> <decimal length>\0<data>`. Files are written to a temporary file
//! in the objects directory and renamed into place, so a reader never sees a
//! partially written object.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use vds_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::traits::ObjectStore;

const ZSTD_LEVEL: i32 = 3;

/// Filesystem-backed [`ObjectStore`].
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    objects_dir: PathBuf,
}

impl FsObjectStore {
    /// Open (or create) the object directory under `root`.
    pub fn open(root: &Path) -> StoreResult<Self> {
        let objects_dir = root.join("objects");
        fs::create_dir_all(&objects_dir)?;
        Ok(Self { objects_dir })
    }

    /// Path of the file holding `id`, whether or not it exists.
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let hex = id.to_hex();
        self.objects_dir.join(&hex[..2]).join(&hex[2..])
    }
}

fn encode(object: &StoredObject) -> StoreResult<Vec<u8>> {
    let mut raw = format!("{} {}\0", object.kind, object.data.len()).into_bytes();
    raw.extend_from_slice(&object.data);
    Ok(zstd::encode_all(raw.as_slice(), ZSTD_LEVEL)?)
}

fn decode(id: &ObjectId, compressed: &[u8]) -> StoreResult<StoredObject> {
    let corrupt = |reason: &str| StoreError::CorruptObject {
        id: *id,
        reason: reason.to_string(),
    };

    let raw = zstd::decode_all(compressed)?;
    let nul = raw
        .iter()
        .position(|b| *b == 0)
        .ok_or_else(|| corrupt("missing header terminator"))?;
    let header = std::str::from_utf8(&raw[..nul]).map_err(|_| corrupt("header is not UTF-8"))?;
    let (kind, len) = header
        .split_once(' ')
        .ok_or_else(|| corrupt("malformed header"))?;
    let kind: ObjectKind = kind.parse()?;
    let len: usize = len.parse().map_err(|_| corrupt("malformed length"))?;

    let data = raw[nul + 1..].to_vec();
    if data.len() != len {
        return Err(corrupt("length does not match header"));
    }
    Ok(StoredObject::new(kind, data))
}

impl ObjectStore for FsObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let compressed = match fs::read(self.object_path(id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let object = decode(id, &compressed)?;
        let computed = object.compute_id();
        if computed != *id {
            return Err(StoreError::HashMismatch { id: *id, computed });
        }
        Ok(Some(object))
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        let path = self.object_path(&id);
        if path.exists() {
            return Ok(id);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut tmp = tempfile::NamedTempFile::new_in(&self.objects_dir)?;
        tmp.write_all(&encode(object)?)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(id = %id.short_hex(), kind = %object.kind, size = object.size, "wrote object");
        Ok(id)
    }
}
