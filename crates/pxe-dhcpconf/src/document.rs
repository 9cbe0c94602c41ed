//! dhcpd.conf document: parsing, rendering and persistence

use std::fmt;
use std::path::{Path, PathBuf};

use crate::entry::{BlockType, ConfigEntry};
use crate::mutation::ChangeSet;
use crate::tokenizer::tokenize;
use crate::{Error, Result};

/// A parsed dhcpd.conf file.
///
/// The whole text is parsed eagerly into a tree under a synthetic root.
/// Free-text lines are kept with whitespace collapsed and comments dropped;
/// rendering reproduces the sections with a fixed two-space indent.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    root: ConfigEntry,
    path: Option<PathBuf>,
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self {
            root: ConfigEntry::root(),
            path: None,
        }
    }
}

impl ConfigDocument {
    /// An empty document with no backing file.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Result<Self> {
        Self::from_lines(text.lines())
    }

    pub fn from_lines<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            root: parse_lines(lines)?,
            path: None,
        })
    }

    /// Parse a file and remember its path for [`ConfigDocument::save`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut doc = Self::new();
        doc.read_file(path)?;
        Ok(doc)
    }

    /// Replace this document's content with the parsed content of `path`.
    ///
    /// On error the document is left unchanged.
    pub fn read_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = pxe_fs::io::read_text(path)?;
        self.root = parse_lines(text.lines())?;
        self.path = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), "parsed dhcp configuration");
        Ok(())
    }

    /// Parse a generated fragment and detach its first top-level `kind` section.
    pub fn from_fragment(text: &str, kind: BlockType) -> Result<ConfigEntry> {
        let mut root = parse_lines(text.lines())?;
        root.take_first_child(kind)
            .ok_or_else(|| Error::FragmentMissing {
                keyword: kind.keyword().to_string(),
            })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn root(&self) -> &ConfigEntry {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut ConfigEntry {
        &mut self.root
    }

    /// First `shared-network` section at the top level.
    pub fn shared_network(&self) -> Option<&ConfigEntry> {
        self.root.first_child(BlockType::SharedNetwork)
    }

    pub fn shared_network_mut(&mut self) -> Option<&mut ConfigEntry> {
        self.root.first_child_mut(BlockType::SharedNetwork)
    }

    /// The anonymous `group` section at the top level.
    pub fn group(&self) -> Option<&ConfigEntry> {
        self.root.find_child(BlockType::Group, None)
    }

    pub fn group_mut(&mut self) -> Option<&mut ConfigEntry> {
        self.root.find_child_mut(BlockType::Group, None)
    }

    pub fn render(&self) -> String {
        self.root.render()
    }

    pub fn to_text(&self) -> String {
        self.render()
    }

    /// Write the rendered document to `path`, replacing its content.
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        pxe_fs::io::write_text(path, &self.render())?;
        tracing::debug!(path = %path.display(), "wrote dhcp configuration");
        Ok(())
    }

    /// Write back to the file this document was read from.
    ///
    /// Returns `false` when the document has no backing file.
    pub fn save(&self) -> Result<bool> {
        match &self.path {
            Some(path) => {
                self.write_file(path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Save only when `changes` recorded at least one effective mutation.
    pub fn save_if_changed(&self, changes: &ChangeSet) -> Result<bool> {
        if changes.is_empty() {
            tracing::debug!("no changes to dhcp configuration, not saving");
            return Ok(false);
        }
        self.save()
    }
}

impl fmt::Display for ConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Build a tree from lines of text.
///
/// Open sections live on an explicit stack together with the line that
/// opened them; a section is attached to its parent when it closes.
fn parse_lines<I, S>(lines: I) -> Result<ConfigEntry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut stack: Vec<(ConfigEntry, usize)> = vec![(ConfigEntry::root(), 0)];

    for (idx, raw) in lines.into_iter().enumerate() {
        let line_no = idx + 1;
        let tokens = tokenize(raw.as_ref());
        let Some(&first) = tokens.first() else {
            continue;
        };

        if let Some(kind) = BlockType::from_keyword(first) {
            if !tokens.contains(&"{") {
                return Err(Error::MissingOpenBrace {
                    line: line_no,
                    keyword: first.to_string(),
                    text: tokens.join(" "),
                });
            }
            let name = tokens
                .get(1)
                .filter(|token| **token != "{")
                .map(|token| token.to_string());
            stack.push((ConfigEntry::new(kind, name, tokens.join(" ")), line_no));
        } else if first == "}" {
            if stack.len() == 1 {
                return Err(Error::UnmatchedClose { line: line_no });
            }
            if let Some((closed, _)) = stack.pop()
                && let Some((parent, _)) = stack.last_mut()
            {
                parent.add_child(closed)?;
            }
        } else if let Some((current, _)) = stack.last_mut() {
            current.add_line(tokens.join(" "));
        }
    }

    if stack.len() > 1 {
        // Report the innermost open section
        if let Some((open, line)) = stack.pop() {
            return Err(Error::Unterminated {
                line,
                start_text: open.start_text().unwrap_or_default().to_string(),
            });
        }
    }

    match stack.pop() {
        Some((root, _)) => Ok(root),
        None => Ok(ConfigEntry::root()),
    }
}
