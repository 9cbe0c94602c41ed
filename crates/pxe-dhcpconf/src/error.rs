//! Error types for pxe-dhcpconf

/// Result type for pxe-dhcpconf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing or persisting a dhcpd.conf document.
///
/// Lookups that find nothing are not errors; they return `None` or `false`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("line {line}: section '{keyword}' has no opening brace: {text}")]
    MissingOpenBrace {
        line: usize,
        keyword: String,
        text: String,
    },

    #[error("line {line}: closing brace without an open section")]
    UnmatchedClose { line: usize },

    #[error("section opened at line {line} is never closed: {start_text}")]
    Unterminated { line: usize, start_text: String },

    #[error("unknown section keyword: {0}")]
    UnknownSection(String),

    #[error("fragment contains no top-level '{keyword}' section")]
    FragmentMissing { keyword: String },

    #[error("only typed sections can be added as children")]
    UntypedChild,

    #[error(transparent)]
    Fs(#[from] pxe_fs::Error),
}

impl Error {
    /// Whether this error describes malformed configuration structure
    /// rather than an I/O failure.
    pub fn is_structure(&self) -> bool {
        !matches!(self, Self::Fs(_))
    }

    /// 1-based line number the error refers to, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MissingOpenBrace { line, .. }
            | Self::UnmatchedClose { line }
            | Self::Unterminated { line, .. } => Some(*line),
            _ => None,
        }
    }
}
