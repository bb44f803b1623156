use wiki_hash::Ident;

use crate::IndexEntry;

/// Handle to a node in a [`DirectoryTree`] arena.
pub type NodeIndex = usize;

/// A blob entry inside one directory. `name` is the path basename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobEntry {
    pub mode: String,
    pub ident: Ident,
    pub name: String,
}

#[derive(Debug)]
struct DirNode {
    /// `None` only for the root.
    name: Option<String>,
    parent: Option<NodeIndex>,
    subdirs: Vec<NodeIndex>,
    files: Vec<BlobEntry>,
    /// Tree object ident, set during write-tree once the node is emitted.
    ident: Option<Ident>,
}

/// In-memory mutable tree of directories and blob entries.
///
/// Nodes live in an arena; parent and child links are indices, so the
/// child→parent navigation needed for full paths involves no owning cycles.
#[derive(Debug)]
pub struct DirectoryTree {
    nodes: Vec<DirNode>,
}

/// Index of the root node.
pub const ROOT: NodeIndex = 0;

impl DirectoryTree {
    /// Create a tree holding only the unnamed root.
    pub fn new() -> Self {
        Self {
            nodes: vec![DirNode {
                name: None,
                parent: None,
                subdirs: Vec::new(),
                files: Vec::new(),
                ident: None,
            }],
        }
    }

    /// Build a tree from index entries by splitting each path on `/`.
    ///
    /// The last segment becomes a blob entry in its parent directory; empty
    /// directory prefixes belong to the root.
    pub fn build(entries: &[IndexEntry]) -> Self {
        let mut tree = Self::new();
        for entry in entries {
            let (dir_path, basename) = match entry.path.rsplit_once('/') {
                Some((dir, base)) => (dir, base),
                None => ("", entry.path.as_str()),
            };
            let node = tree.find_or_create(dir_path);
            tree.add_file(
                node,
                BlobEntry {
                    mode: entry.mode.clone(),
                    ident: entry.ident,
                    name: basename.to_string(),
                },
            );
        }
        tree
    }

    /// Find or create the directory named by a `/`-separated path.
    /// The empty path names the root.
    pub fn find_or_create(&mut self, path: &str) -> NodeIndex {
        let mut current = ROOT;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = match self.nodes[current]
                .subdirs
                .iter()
                .copied()
                .find(|&child| self.nodes[child].name.as_deref() == Some(segment))
            {
                Some(child) => child,
                None => self.add_subdir(current, segment),
            };
        }
        current
    }

    fn add_subdir(&mut self, parent: NodeIndex, name: &str) -> NodeIndex {
        let child = self.nodes.len();
        self.nodes.push(DirNode {
            name: Some(name.to_string()),
            parent: Some(parent),
            subdirs: Vec::new(),
            files: Vec::new(),
            ident: None,
        });
        self.nodes[parent].subdirs.push(child);
        child
    }

    /// Append a blob entry to a directory, in insertion order.
    pub fn add_file(&mut self, node: NodeIndex, entry: BlobEntry) {
        self.nodes[node].files.push(entry);
    }

    /// Blob entries of a directory, in insertion order.
    pub fn files(&self, node: NodeIndex) -> &[BlobEntry] {
        &self.nodes[node].files
    }

    /// Subdirectories of a directory, in insertion order.
    pub fn subdirs(&self, node: NodeIndex) -> &[NodeIndex] {
        &self.nodes[node].subdirs
    }

    /// The directory's own name; `None` for the root.
    pub fn name(&self, node: NodeIndex) -> Option<&str> {
        self.nodes[node].name.as_deref()
    }

    /// Tree object ident, if the node has been emitted.
    pub fn ident(&self, node: NodeIndex) -> Option<Ident> {
        self.nodes[node].ident
    }

    /// Record the tree object ident for a node.
    pub fn set_ident(&mut self, node: NodeIndex, ident: Ident) {
        self.nodes[node].ident = Some(ident);
    }

    /// Full `/`-joined path from the root; `None` for the root itself.
    pub fn full_path(&self, node: NodeIndex) -> Option<String> {
        let name = self.nodes[node].name.as_deref()?;
        match self.nodes[node].parent.and_then(|p| self.full_path(p)) {
            Some(parent_path) => Some(format!("{parent_path}/{name}")),
            None => Some(name.to_string()),
        }
    }

    /// Node indices in post-order: every child precedes its parent, the
    /// root comes last. Write-tree relies on this so a directory's body is
    /// only serialized after all its subtree idents exist.
    pub fn post_order(&self) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.nodes.len());
        self.walk_post(ROOT, &mut order);
        order
    }

    fn walk_post(&self, node: NodeIndex, order: &mut Vec<NodeIndex>) {
        for &child in &self.nodes[node].subdirs {
            self.walk_post(child, order);
        }
        order.push(node);
    }
}

impl Default for DirectoryTree {
    fn default() -> Self {
        Self::new()
    }
}
