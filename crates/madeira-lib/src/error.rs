use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the Madeira helper library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a hash algorithm name does not match a supported digest.
    #[error("unknown hash algorithm: {name}")]
    UnknownAlgorithm { name: String },

    /// Raised when a named member is absent from a zip archive.
    #[error("archive does not contain member {member}")]
    ArchiveMemberMissing { member: String },

    /// The DNS provider configuration file could not be found.
    #[error("DNS provider configuration not found at {path}")]
    DnsConfigMissing { path: PathBuf },

    /// The DNS provider configuration file could not be parsed.
    #[error("invalid DNS provider configuration at {path}: {message}")]
    DnsConfigInvalid { path: PathBuf, message: String },

    /// No home directory could be resolved for the default configuration path.
    #[error("failed to resolve the home directory for DNS provider configuration")]
    HomeDirUnavailable,

    /// The DNS provider returned no record for the requested name and type.
    #[error("no {record_type} record found for {name}")]
    DnsRecordNotFound { name: String, record_type: String },

    /// The DNS provider rejected a record update.
    #[error("DNS provider rejected update with status {status}: {body}")]
    ProviderWriteFailed { status: u16, body: String },

    /// A public DNS lookup failed for a reason other than the name not existing.
    #[error("DNS lookup for {host} failed: {message}")]
    DnsLookupFailed { host: String, message: String },

    /// The desired DNS value was not observed within the attempt budget.
    #[error("{host} did not resolve to {desired} after {attempts} attempts")]
    DnsWaitExhausted {
        host: String,
        desired: String,
        attempts: u32,
    },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for ZIP archive errors.
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    /// Wrapper for JSON errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for directory traversal errors.
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}
