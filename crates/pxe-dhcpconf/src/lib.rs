//! Structured editor for dhcpd.conf
//!
//! Parses the nested, brace-delimited dhcpd.conf language into a tree of
//! [`ConfigEntry`] blocks, renders it back to text, and layers idempotent
//! insert/remove operations on top so provisioning steps can be re-run.
//!
//! ```
//! use pxe_dhcpconf::{BlockType, ConfigDocument};
//!
//! let doc = ConfigDocument::from_text("group {\n  host web1 {\n  }\n}\n").unwrap();
//! let group = doc.group().unwrap();
//! assert!(group.contains(BlockType::Host, Some("web1")));
//! ```

pub mod document;
pub mod entry;
pub mod error;
pub mod mutation;
pub mod tokenizer;

pub use document::ConfigDocument;
pub use entry::{BlockType, ChildKey, ConfigEntry};
pub use error::{Error, Result};
pub use mutation::{Change, ChangeSet, insert_if_absent, remove_if_present};
pub use tokenizer::tokenize;
