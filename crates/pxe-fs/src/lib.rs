//! File I/O for the PXE provisioning toolkit
//!
//! Whole-file reads, atomic whole-file writes, and format-detecting
//! configuration loading. Every handle opened here is released before the
//! call returns, on success and on error.

pub mod config;
pub mod error;
pub mod io;

pub use config::{ConfigFormat, ConfigStore};
pub use error::{Error, Result};
