use wiki_hash::Ident;
use wiki_object::{mode, ObjectKind, TreeEntry};
use wiki_odb::ObjectStore;

use crate::dirtree::DirectoryTree;
use crate::{IndexEntry, IndexError};

/// Assemble the staged entries into tree objects and return the root ident.
///
/// Directories are emitted in post-order, blobs before subtrees, both in
/// insertion order, so the result is deterministic for a given index.
pub fn write_tree(store: &ObjectStore, entries: &[IndexEntry]) -> Result<Ident, IndexError> {
    let mut tree = DirectoryTree::build(entries);

    for node in tree.post_order() {
        let mut body = Vec::new();
        for file in tree.files(node) {
            body.push(TreeEntry::new(
                file.mode.clone(),
                ObjectKind::Blob,
                file.ident,
                file.name.clone(),
            ));
        }
        for &subdir in tree.subdirs(node) {
            let ident = tree
                .ident(subdir)
                .expect("post-order emits children before parents");
            body.push(TreeEntry::new(
                mode::TREE,
                ObjectKind::Tree,
                ident,
                tree.name(subdir).expect("subdirs are named").to_string(),
            ));
        }
        let ident = store.add_tree(&body)?;
        tree.set_ident(node, ident);
    }

    Ok(tree
        .ident(crate::dirtree::ROOT)
        .expect("root is emitted last"))
}

/// Flatten a stored tree into per-file records with full `/`-joined paths.
pub fn tree_files(store: &ObjectStore, tree_ident: &Ident) -> Result<Vec<IndexEntry>, IndexError> {
    let mut files = Vec::new();
    collect_files(store, tree_ident, "", &mut files)?;
    Ok(files)
}

fn collect_files(
    store: &ObjectStore,
    tree_ident: &Ident,
    prefix: &str,
    files: &mut Vec<IndexEntry>,
) -> Result<(), IndexError> {
    for entry in store.fetch_tree(tree_ident)? {
        let path = if prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{prefix}/{}", entry.name)
        };
        match entry.kind {
            ObjectKind::Blob => files.push(IndexEntry::new(entry.mode, entry.ident, path)),
            ObjectKind::Tree => collect_files(store, &entry.ident, &path, files)?,
            ObjectKind::Commit => unreachable!("tree parsing rejects commit entries"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use wiki_object::Object;

    fn store() -> (TempDir, ObjectStore) {
        let dir = TempDir::new().unwrap();
        let objects = dir.path().join("objects");
        fs::create_dir(&objects).unwrap();
        (dir, ObjectStore::open(objects))
    }

    fn blob(store: &ObjectStore, data: &[u8]) -> Ident {
        store.add_blob(data).unwrap()
    }

    #[test]
    fn single_file_tree() {
        let (_dir, store) = store();
        let a = blob(&store, b"hello\n");
        let root = write_tree(&store, &[IndexEntry::new("644", a, "a.txt")]).unwrap();

        let entries = store.fetch_tree(&root).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].mode, "644");
        assert_eq!(entries[0].kind, ObjectKind::Blob);
        assert_eq!(entries[0].ident, a);
        assert_eq!(entries[0].name, "a.txt");
    }

    #[test]
    fn nested_tree_blobs_before_subtrees() {
        let (_dir, store) = store();
        let a = blob(&store, b"hello\n");
        let b = blob(&store, b"x");
        let root = write_tree(
            &store,
            &[
                IndexEntry::new("644", a, "a.txt"),
                IndexEntry::new("644", b, "dir/b.txt"),
            ],
        )
        .unwrap();

        let entries = store.fetch_tree(&root).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "a.txt");
        assert_eq!(entries[1].name, "dir");
        assert_eq!(entries[1].mode, "755");
        assert_eq!(entries[1].kind, ObjectKind::Tree);

        let sub = store.fetch_tree(&entries[1].ident).unwrap();
        assert_eq!(sub.len(), 1);
        assert_eq!(sub[0].name, "b.txt");
        assert_eq!(sub[0].ident, b);
    }

    #[test]
    fn write_tree_is_deterministic() {
        let (_dir, store1) = store();
        let (_dir2, store2) = store();
        let entries = |s: &ObjectStore| {
            vec![
                IndexEntry::new("644", blob(s, b"one"), "x/a"),
                IndexEntry::new("644", blob(s, b"two"), "x/y/b"),
                IndexEntry::new("644", blob(s, b"three"), "c"),
            ]
        };
        let e1 = entries(&store1);
        let e2 = entries(&store2);
        assert_eq!(
            write_tree(&store1, &e1).unwrap(),
            write_tree(&store2, &e2).unwrap()
        );
    }

    #[test]
    fn all_reachable_idents_exist() {
        let (_dir, store) = store();
        let entries = vec![
            IndexEntry::new("644", blob(&store, b"1"), "a/b/c.txt"),
            IndexEntry::new("644", blob(&store, b"2"), "a/d.txt"),
            IndexEntry::new("644", blob(&store, b"3"), "top.txt"),
        ];
        let root = write_tree(&store, &entries).unwrap();

        fn check(store: &ObjectStore, ident: &Ident) {
            match store.fetch(ident).unwrap() {
                Object::Tree(entries) => {
                    for e in entries {
                        check(store, &e.ident);
                    }
                }
                Object::Blob(_) => {}
                Object::Commit(_) => panic!("commit inside tree"),
            }
        }
        check(&store, &root);
    }

    #[test]
    fn tree_files_roundtrip() {
        let (_dir, store) = store();
        let entries = vec![
            IndexEntry::new("644", blob(&store, b"1"), "a/b/c.txt"),
            IndexEntry::new("644", blob(&store, b"2"), "a/d.txt"),
            IndexEntry::new("644", blob(&store, b"3"), "top.txt"),
        ];
        let root = write_tree(&store, &entries).unwrap();

        let mut listed = tree_files(&store, &root).unwrap();
        let mut expected = entries.clone();
        listed.sort_by(|x, y| x.path.cmp(&y.path));
        expected.sort_by(|x, y| x.path.cmp(&y.path));
        assert_eq!(listed, expected);
    }

    #[test]
    fn empty_index_writes_empty_tree() {
        let (_dir, store) = store();
        let root = write_tree(&store, &[]).unwrap();
        assert!(store.fetch_tree(&root).unwrap().is_empty());
        // The empty tree body is the empty byte string.
        assert_eq!(root, wiki_hash::hash_body(b""));
    }
}
