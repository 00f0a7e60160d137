use serde::Serialize;
use vds_types::ObjectId;

use crate::history::History;
use crate::listing::DirEntry;

/// Everything a reader needs to render one path at one commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct View {
    /// Path as requested, directory form for trees.
    pub path: String,
    /// Commit the view was taken at; `None` for an empty repository.
    pub commit: Option<ObjectId>,
    /// Object at the path.
    pub id: ObjectId,
    #[serde(flatten)]
    pub content: ViewContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<History>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ViewContent {
    File {
        size: u64,
        #[serde(skip)]
        data: Vec<u8>,
    },
    Directory {
        entries: Vec<DirEntry>,
    },
}

impl ViewContent {
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }
}
