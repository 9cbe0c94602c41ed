//! Block model for dhcpd.conf sections

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Indentation added per nesting level when rendering.
const INDENT_STEP: &str = "  ";

/// Closing marker of every typed section.
const END_MARKER: &str = "}";

/// Section keywords recognized as block starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    SharedNetwork,
    Subnet,
    Host,
    Group,
}

impl BlockType {
    pub const ALL: [BlockType; 4] = [
        BlockType::SharedNetwork,
        BlockType::Subnet,
        BlockType::Host,
        BlockType::Group,
    ];

    /// The keyword that opens a section of this type.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::SharedNetwork => "shared-network",
            Self::Subnet => "subnet",
            Self::Host => "host",
            Self::Group => "group",
        }
    }

    /// Map a keyword to its type; `None` for anything that is not a section keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "shared-network" => Some(Self::SharedNetwork),
            "subnet" => Some(Self::Subnet),
            "host" => Some(Self::Host),
            "group" => Some(Self::Group),
            _ => None,
        }
    }
}

impl FromStr for BlockType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_keyword(s).ok_or_else(|| Error::UnknownSection(s.to_string()))
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Anything that can address a child group: a [`BlockType`] or its keyword.
///
/// An unknown keyword addresses no group, so lookups through it find nothing.
pub trait ChildKey {
    fn block_type(&self) -> Option<BlockType>;
}

impl ChildKey for BlockType {
    fn block_type(&self) -> Option<BlockType> {
        Some(*self)
    }
}

impl ChildKey for &str {
    fn block_type(&self) -> Option<BlockType> {
        BlockType::from_keyword(self)
    }
}

impl ChildKey for String {
    fn block_type(&self) -> Option<BlockType> {
        BlockType::from_keyword(self)
    }
}

/// One section of a dhcpd.conf document.
///
/// The synthetic root of a document has no type, no start line and no end
/// marker. Children are owned by value and grouped per type; groups keep the
/// order in which their type was first added, entries keep insertion order
/// within a group.
///
/// Equality follows the declaration line: two entries are equal when they
/// have the same type and byte-identical start text. Use
/// [`ConfigEntry::same_structure`] for a deep comparison.
#[derive(Debug, Clone)]
pub struct ConfigEntry {
    kind: Option<BlockType>,
    name: Option<String>,
    lines: Vec<String>,
    children: Vec<(BlockType, Vec<ConfigEntry>)>,
    start_text: Option<String>,
    end_text: Option<String>,
}

impl ConfigEntry {
    /// The synthetic, untyped root of a document.
    pub fn root() -> Self {
        Self {
            kind: None,
            name: None,
            lines: Vec::new(),
            children: Vec::new(),
            start_text: None,
            end_text: None,
        }
    }

    /// A typed section with an explicit declaration line.
    pub fn new(kind: BlockType, name: Option<String>, start_text: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            name,
            lines: Vec::new(),
            children: Vec::new(),
            start_text: Some(start_text.into()),
            end_text: Some(END_MARKER.to_string()),
        }
    }

    /// A typed section whose declaration line is `<keyword> [<name>] {`.
    pub fn block(kind: BlockType, name: Option<&str>) -> Self {
        let start_text = match name {
            Some(name) => format!("{} {} {{", kind.keyword(), name),
            None => format!("{} {{", kind.keyword()),
        };
        Self::new(kind, name.map(str::to_string), start_text)
    }

    pub fn kind(&self) -> Option<BlockType> {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn start_text(&self) -> Option<&str> {
        self.start_text.as_deref()
    }

    pub fn end_text(&self) -> Option<&str> {
        self.end_text.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.kind.is_none()
    }

    /// Append a child to the group of its type, creating the group if needed.
    ///
    /// No de-duplication happens here; see [`crate::insert_if_absent`].
    pub fn add_child(&mut self, entry: ConfigEntry) -> Result<()> {
        let kind = entry.kind.ok_or(Error::UntypedChild)?;
        match self.children.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, group)) => group.push(entry),
            None => self.children.push((kind, vec![entry])),
        }
        Ok(())
    }

    /// Append a free-text line.
    pub fn add_line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    /// All children of one type, in order, or `None` when there are none.
    pub fn children(&self, key: impl ChildKey) -> Option<&[ConfigEntry]> {
        let kind = key.block_type()?;
        self.children
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, group)| group.as_slice())
    }

    fn children_mut(&mut self, kind: BlockType) -> Option<&mut Vec<ConfigEntry>> {
        self.children
            .iter_mut()
            .find(|(k, _)| *k == kind)
            .map(|(_, group)| group)
    }

    /// Child groups in the order their type first appeared.
    pub fn child_groups(&self) -> impl Iterator<Item = (BlockType, &[ConfigEntry])> {
        self.children
            .iter()
            .map(|(kind, group)| (*kind, group.as_slice()))
    }

    /// First child of a type, regardless of name.
    pub fn first_child(&self, key: impl ChildKey) -> Option<&ConfigEntry> {
        self.children(key).and_then(|group| group.first())
    }

    pub fn first_child_mut(&mut self, key: impl ChildKey) -> Option<&mut ConfigEntry> {
        let kind = key.block_type()?;
        self.children_mut(kind).and_then(|group| group.first_mut())
    }

    /// First child of a type whose name equals `name`; `None` finds anonymous sections.
    pub fn find_child(&self, key: impl ChildKey, name: Option<&str>) -> Option<&ConfigEntry> {
        self.children(key)?
            .iter()
            .find(|child| child.name.as_deref() == name)
    }

    pub fn find_child_mut(
        &mut self,
        key: impl ChildKey,
        name: Option<&str>,
    ) -> Option<&mut ConfigEntry> {
        let kind = key.block_type()?;
        self.children_mut(kind)?
            .iter_mut()
            .find(|child| child.name.as_deref() == name)
    }

    /// First child equal to `entry` (same type and start text).
    pub fn find_child_entry(&self, entry: &ConfigEntry) -> Option<&ConfigEntry> {
        let kind = entry.kind?;
        self.children(kind)?.iter().find(|child| *child == entry)
    }

    pub fn contains(&self, key: impl ChildKey, name: Option<&str>) -> bool {
        self.find_child(key, name).is_some()
    }

    pub fn contains_entry(&self, entry: &ConfigEntry) -> bool {
        self.find_child_entry(entry).is_some()
    }

    /// Remove the first child of `kind` named `name`.
    ///
    /// Returns `false` when nothing matched. A group left empty is dropped.
    pub fn remove_child(&mut self, kind: BlockType, name: Option<&str>) -> bool {
        self.remove_where(kind, |child| child.name.as_deref() == name)
            .is_some()
    }

    /// Remove the first child equal to `entry`.
    pub fn remove_child_entry(&mut self, entry: &ConfigEntry) -> bool {
        match entry.kind {
            Some(kind) => self.remove_where(kind, |child| child == entry).is_some(),
            None => false,
        }
    }

    /// Detach and return the first child of a type.
    pub fn take_first_child(&mut self, kind: BlockType) -> Option<ConfigEntry> {
        self.remove_where(kind, |_| true)
    }

    fn remove_where(
        &mut self,
        kind: BlockType,
        pred: impl Fn(&ConfigEntry) -> bool,
    ) -> Option<ConfigEntry> {
        let group_idx = self.children.iter().position(|(k, _)| *k == kind)?;
        let group = &mut self.children[group_idx].1;
        let idx = group.iter().position(pred)?;
        let removed = group.remove(idx);
        if group.is_empty() {
            self.children.remove(group_idx);
        }
        Some(removed)
    }

    /// Deep comparison: type, name, free-text lines and children, recursively.
    pub fn same_structure(&self, other: &ConfigEntry) -> bool {
        self.kind == other.kind
            && self.name == other.name
            && self.lines == other.lines
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|((ka, a), (kb, b))| {
                    ka == kb
                        && a.len() == b.len()
                        && a.iter().zip(b).all(|(x, y)| x.same_structure(y))
                })
    }

    /// Render this entry and everything below it.
    ///
    /// A typed entry renders as a detached top-level section: its lines are
    /// not indented, its closing brace is not indented and no newline follows
    /// it. The root renders every line and child section followed by a
    /// newline. Use [`ConfigEntry::render_at`] for an entry nested deeper.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let depth = if self.is_root() { 0 } else { 1 };
        self.render_into(&mut out, "", depth);
        out
    }

    /// Render this entry as it appears `depth` levels below the root.
    ///
    /// The output is the exact text a whole-document rendering produces for
    /// the entry, minus the indentation before its start line.
    pub fn render_at(&self, depth: usize) -> String {
        let mut out = String::new();
        self.render_into(&mut out, &INDENT_STEP.repeat(depth), depth);
        out
    }

    fn render_into(&self, out: &mut String, indent: &str, depth: usize) {
        if let Some(start) = &self.start_text {
            out.push_str(start);
            out.push('\n');
        }
        for line in &self.lines {
            out.push_str(indent);
            out.push_str(line);
            out.push('\n');
        }

        let child_indent = format!("{indent}{INDENT_STEP}");
        for (_, group) in &self.children {
            for child in group {
                out.push_str(indent);
                child.render_into(out, &child_indent, depth + 1);
                out.push('\n');
            }
        }

        if let Some(end) = &self.end_text {
            if depth >= 2 {
                out.push_str(INDENT_STEP);
            }
            out.push_str(end);
        }
    }
}

impl PartialEq for ConfigEntry {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.start_text == other.start_text
    }
}

impl Eq for ConfigEntry {}

impl fmt::Display for ConfigEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
