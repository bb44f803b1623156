use wiki_hash::Ident;

use crate::{ObjectError, ObjectKind};

/// A single entry in a tree object.
///
/// `name` is a single path segment, no separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: String,
    pub kind: ObjectKind,
    pub ident: Ident,
    pub name: String,
}

impl TreeEntry {
    pub fn new(
        mode: impl Into<String>,
        kind: ObjectKind,
        ident: Ident,
        name: impl Into<String>,
    ) -> Self {
        Self {
            mode: mode.into(),
            kind,
            ident,
            name: name.into(),
        }
    }
}

/// Serialize tree entries to the canonical body:
/// `"<mode> <KIND> <hexident> <name>\n"` per entry, in order.
pub fn serialize_tree(entries: &[TreeEntry]) -> Vec<u8> {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.mode);
        out.push(' ');
        out.push_str(entry.kind.name());
        out.push(' ');
        out.push_str(&entry.ident.to_hex());
        out.push(' ');
        out.push_str(&entry.name);
        out.push('\n');
    }
    out.into_bytes()
}

/// Parse a tree body back into entries.
pub fn parse_tree(body: &[u8]) -> Result<Vec<TreeEntry>, ObjectError> {
    let text = std::str::from_utf8(body).map_err(|_| ObjectError::NotUtf8)?;
    let mut entries = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let mut fields = line.splitn(4, ' ');
        let (mode, kind, ident, name) = match (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) {
            (Some(m), Some(k), Some(i), Some(n)) => (m, k, i, n),
            _ => {
                return Err(ObjectError::InvalidTreeEntry {
                    line: line_no + 1,
                    reason: "expected 4 fields".to_string(),
                })
            }
        };
        let kind = ObjectKind::from_name(kind)?;
        if kind == ObjectKind::Commit {
            return Err(ObjectError::InvalidTreeEntry {
                line: line_no + 1,
                reason: "trees may not reference commits".to_string(),
            });
        }
        let ident = Ident::from_hex(ident).map_err(|e| ObjectError::InvalidTreeEntry {
            line: line_no + 1,
            reason: e.to_string(),
        })?;
        entries.push(TreeEntry::new(mode, kind, ident, name));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode;

    fn ident(fill: u8) -> Ident {
        Ident::from_raw([fill; 32])
    }

    #[test]
    fn serialize_format() {
        let entries = vec![
            TreeEntry::new(mode::BLOB, ObjectKind::Blob, ident(0xaa), "a.txt"),
            TreeEntry::new(mode::TREE, ObjectKind::Tree, ident(0xbb), "dir"),
        ];
        let body = serialize_tree(&entries);
        let text = String::from_utf8(body).unwrap();
        let expected = format!(
            "644 BLOB {} a.txt\n755 TREE {} dir\n",
            ident(0xaa),
            ident(0xbb)
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn parse_roundtrip() {
        let entries = vec![
            TreeEntry::new(mode::BLOB, ObjectKind::Blob, ident(1), "readme"),
            TreeEntry::new(mode::BLOB, ObjectKind::Blob, ident(2), "notes.md"),
            TreeEntry::new(mode::TREE, ObjectKind::Tree, ident(3), "sub"),
        ];
        let parsed = parse_tree(&serialize_tree(&entries)).unwrap();
        assert_eq!(parsed, entries);
    }

    #[test]
    fn parse_empty_body() {
        assert!(parse_tree(b"").unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_short_line() {
        let err = parse_tree(b"644 BLOB aabb\n").unwrap_err();
        assert!(matches!(err, ObjectError::InvalidTreeEntry { line: 1, .. }));
    }

    #[test]
    fn parse_rejects_commit_entry() {
        let line = format!("644 COMMIT {} x\n", ident(9));
        assert!(parse_tree(line.as_bytes()).is_err());
    }

    #[test]
    fn insertion_order_preserved() {
        // Entries are not sorted; whatever order they were inserted in is
        // the order hashed.
        let a = vec![
            TreeEntry::new(mode::BLOB, ObjectKind::Blob, ident(1), "z.txt"),
            TreeEntry::new(mode::BLOB, ObjectKind::Blob, ident(2), "a.txt"),
        ];
        let b = vec![a[1].clone(), a[0].clone()];
        assert_ne!(serialize_tree(&a), serialize_tree(&b));
    }
}
