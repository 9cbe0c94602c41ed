//! Error types for pxe-softlayer

/// Result type for pxe-softlayer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the inventory
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SoftLayer API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("More than one device found with hostname '{hostname}'. Device ids: {ids}")]
    AmbiguousDevice { hostname: String, ids: String },

    #[error("More than one IP found with note '{note}'")]
    AmbiguousIp { note: String },

    #[error(
        "Missing SoftLayer credentials: pass --sl-user/--sl-apikey or set SL_USER and SL_APIKEY"
    )]
    MissingCredentials,
}
