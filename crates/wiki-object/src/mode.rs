//! Entry mode strings.
//!
//! Modes are short textual strings, not octal permission bits: `"644"` for
//! blob entries and `"755"` for subtree entries.

/// Mode string for blob entries.
pub const BLOB: &str = "644";

/// Mode string for subtree entries.
pub const TREE: &str = "755";
