//! Error types for the usermap core library.
//!
//! Each subsystem has its own error type derived with `thiserror`; the CLI
//! carries them through `anyhow` unchanged.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from loading the connection configuration and building a client
/// from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// No API server URL from the file, the environment, or the command line.
    #[error("no server found for cluster: set [cluster].server, USERMAP_SERVER or --server")]
    MissingServer,

    /// The HTTP client could not be constructed from the settings.
    #[error("unable to build API client: {0}")]
    ClientBuild(String),

    /// Generic I/O error reading the config file or CA bundle.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// API errors
// ---------------------------------------------------------------------------

/// Errors returned by calls against the cluster API server.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP-level transport error (connection refused, TLS, timeout).
    #[error("unable to connect to the server: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the request credentials.
    #[error("You must be logged in to the server (Unauthorized)")]
    Unauthorized,

    /// The server answered with a structured `Status` failure.
    #[error("Error from server ({reason}): {message}")]
    Status {
        code: u16,
        reason: String,
        message: String,
    },

    /// The server answered with a non-success code and no `Status` body.
    #[error("the server responded with HTTP {code}: {body}")]
    UnexpectedResponse { code: u16, body: String },

    /// The request body could not be encoded.
    #[error("unable to encode request body: {0}")]
    Encode(String),

    /// The response body could not be decoded.
    #[error("unable to decode server response: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Printer errors
// ---------------------------------------------------------------------------

/// Errors from rendering objects to the output stream.
#[derive(Debug, Error)]
pub enum PrinterError {
    /// The requested `--output` value has no printer.
    #[error("unable to match a printer suitable for the output format \"{0}\", allowed formats are: json,name,yaml")]
    UnknownFormat(String),

    #[error("failed to encode object as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode object as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Writing to the output stream failed.
    #[error("output I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
