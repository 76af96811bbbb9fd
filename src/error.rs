//! Unified error types for instruction proxying.

use std::path::PathBuf;

use solana_pubkey::Pubkey;
use thiserror::Error;

/// Error from mapping an instruction or transaction.
///
/// Build-time failures surface as [`ConfigError`] and load failures as
/// [`LoadError`]; neither can occur while mapping.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The program has a dispatcher but none of its variants match the instruction tag.
    #[error("Unsupported instruction for program {program}: data {data}")]
    UnsupportedInstruction { program: Pubkey, data: String },
}

/// Result type alias for proxy operations.
pub type ProxyResult<T> = Result<T, ProxyError>;

/// Malformed mapping configuration. Raised while building proxies, never per call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{ix}: static accounts require a destination discriminator")]
    StaticAccountsWithoutDestination { ix: String },

    #[error("{ix}: index map requires a destination discriminator or a dynamic payer account")]
    IndexMapWithoutDestination { ix: String },

    #[error("{ix}: dynamic fee payer account must be writable and signer")]
    PayerNotWritableSigner { ix: String },

    #[error("{ix}: index map must remove exactly one account, removes {removed}")]
    PayerDropCount { ix: String, removed: usize },

    #[error("{ix}: at most one dynamic account is supported without a destination discriminator, found {count}")]
    TooManyPassThroughAccounts { ix: String, count: usize },

    #[error("{ix}: destination index {index} is assigned more than once")]
    DuplicateIndex { ix: String, index: usize },

    #[error("{ix}: destination index {index} is outside of 0..{num_accounts}")]
    IndexOutOfRange {
        ix: String,
        index: usize,
        num_accounts: usize,
    },

    #[error("{ix}: unknown dynamic account '{name}'")]
    UnknownDynamicAccount { ix: String, name: String },
}

/// An instruction does not fit the proxy it was handed to. Raised before any rewrite.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Expected CPI program to be {expected}, but was {actual} for invoked proxy program {invoked}")]
    ProgramMismatch {
        expected: Pubkey,
        actual: Pubkey,
        invoked: Pubkey,
    },

    #[error("Expected CPI discriminator length of {expected}, but data has {actual} bytes")]
    DataTooShort { expected: usize, actual: usize },

    #[error("Expected CPI discriminator {expected}, but was {actual}")]
    DiscriminatorMismatch { expected: String, actual: String },

    #[error("Expected at least {expected} accounts, found {actual}")]
    MissingAccounts { expected: usize, actual: usize },

    #[error("Mapped account {index} was never assigned")]
    UnassignedAccount { index: usize },
}

/// Errors raised while reading mapping configuration from disk or network.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("No local config directory specified")]
    MissingLocalDirectory,

    #[error("Local config directory {0} does not exist")]
    NotADirectory(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),
}

/// HTTP-layer errors for remote config fetches.
#[cfg(feature = "http")]
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}
