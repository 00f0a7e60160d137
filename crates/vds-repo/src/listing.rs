use serde::{Deserialize, Serialize};
use vds_store::Tree;
use vds_types::ObjectId;

/// One child of a directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub id: ObjectId,
    #[serde(rename = "isDirectory")]
    pub is_dir: bool,
}

impl DirEntry {
    /// The synthetic `..` entry pointing at the containing directory.
    pub fn parent(id: ObjectId) -> Self {
        Self {
            name: "..".into(),
            id,
            is_dir: true,
        }
    }
}

/// Immediate children of `tree` in its canonical (byte-wise name) order.
///
/// The iterator is lazy; call again to restart.
pub fn list(tree: &Tree) -> impl Iterator<Item = DirEntry> + '_ {
    tree.entries().iter().map(|entry| DirEntry {
        name: entry.name.clone(),
        id: entry.object_id,
        is_dir: entry.mode.is_dir(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vds_store::TreeEntry;

    fn id(byte: u8) -> ObjectId {
        ObjectId::from_hash([byte; 32])
    }

    #[test]
    fn stable_order_regardless_of_construction() {
        let forward = Tree::new(vec![
            TreeEntry::file("a.txt", id(1)),
            TreeEntry::dir("b", id(2)),
            TreeEntry::file("c.txt", id(3)),
        ])
        .unwrap();
        let reversed = Tree::new(vec![
            TreeEntry::file("c.txt", id(3)),
            TreeEntry::dir("b", id(2)),
            TreeEntry::file("a.txt", id(1)),
        ])
        .unwrap();

        let names: Vec<_> = list(&forward).map(|e| e.name).collect();
        assert_eq!(names, ["a.txt", "b", "c.txt"]);
        assert_eq!(list(&forward).collect::<Vec<_>>(), list(&reversed).collect::<Vec<_>>());
        assert!(list(&forward).nth(1).unwrap().is_dir);
    }

    #[test]
    fn empty_tree_lists_nothing() {
        assert_eq!(list(&Tree::empty()).count(), 0);
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_value(DirEntry::parent(id(4))).unwrap();
        assert_eq!(json["name"], "..");
        assert_eq!(json["isDirectory"], true);
        assert_eq!(json["id"], id(4).to_hex());
    }
}
