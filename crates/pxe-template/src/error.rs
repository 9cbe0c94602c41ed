//! Error types for pxe-template

/// Result type for pxe-template operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering templates
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] pxe_fs::Error),
}
