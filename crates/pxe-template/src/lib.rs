//! Plain-text template expansion
//!
//! Templates reference variables as `@name@`. Rendering is line oriented:
//! every template line is right-trimmed and written with a trailing newline.

pub mod error;
pub mod render;
pub mod vars;

pub use error::{Error, Result};
pub use render::{render_file, render_str, render_to_file};
pub use vars::Vars;
