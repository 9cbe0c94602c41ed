//! Idempotent insert/remove operations on section containers

use std::fmt;

use crate::entry::{BlockType, ConfigEntry};

/// One effective change to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// A section was added to its container.
    Inserted {
        kind: BlockType,
        name: Option<String>,
    },
    /// A section was removed from its container.
    Removed {
        kind: BlockType,
        name: Option<String>,
    },
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (verb, kind, name) = match self {
            Self::Inserted { kind, name } => ("added", kind, name),
            Self::Removed { kind, name } => ("removed", kind, name),
        };
        match name {
            Some(name) => write!(f, "{verb} {kind} {name}"),
            None => write!(f, "{verb} {kind}"),
        }
    }
}

/// Ordered record of the changes made to one document.
///
/// Only effective changes are recorded, so an empty set means the
/// document still matches what is on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, change: Change) {
        self.changes.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    /// Append another set's changes after this one's.
    pub fn extend(&mut self, other: ChangeSet) {
        self.changes.extend(other.changes);
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

/// Add `entry` to `container` unless a child with the same type and name exists.
///
/// Returns whether the entry was inserted. Untyped entries are never inserted.
pub fn insert_if_absent(
    container: &mut ConfigEntry,
    entry: ConfigEntry,
    changes: &mut ChangeSet,
) -> bool {
    let Some(kind) = entry.kind() else {
        return false;
    };
    if container.contains(kind, entry.name()) {
        tracing::debug!(%kind, name = ?entry.name(), "section already present");
        return false;
    }

    let name = entry.name().map(str::to_string);
    if container.add_child(entry).is_err() {
        return false;
    }
    tracing::debug!(%kind, name = ?name, "inserted section");
    changes.record(Change::Inserted { kind, name });
    true
}

/// Remove the child of `kind` named `name` from `container` if there is one.
///
/// A missing child is a normal outcome and returns `false`.
pub fn remove_if_present(
    container: &mut ConfigEntry,
    kind: BlockType,
    name: Option<&str>,
    changes: &mut ChangeSet,
) -> bool {
    if !container.remove_child(kind, name) {
        tracing::debug!(%kind, name = ?name, "section not present, nothing to remove");
        return false;
    }
    tracing::debug!(%kind, name = ?name, "removed section");
    changes.record(Change::Removed {
        kind,
        name: name.map(str::to_string),
    });
    true
}
