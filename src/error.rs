// Error types shared by every module of the library.
//
// Validation failures get their own variant so callers (and tests) can
// match on them. Transport, filesystem and JSON failures are passed
// through untouched so the user sees the underlying message.

use thiserror::Error;

/// Everything that can go wrong inside the library.
#[derive(Debug, Error)]
pub enum Error {
    /// No API key has been configured yet.
    #[error(
        "API key must be set before talking to HackMyVM.\n\
         Try: hack config fresh <username> <password> <api_key>\n     \
         hack config key <api_key>"
    )]
    ApiKeyMissing,

    /// The machine is not part of the catalog.
    #[error("machine '{0}' does not exist on hackmyvm. Check if it is spelled correctly")]
    MachineNotFound(String),

    /// Tried to remove a key that is not in the config store.
    #[error("keyword '{0}' does not exist in the config file. Check if it is spelled correctly")]
    KeywordNotFound(String),

    #[error("category '{0}' does not exist on hackmyvm. Check if it is spelled correctly")]
    CategoryNotFound(String),

    #[error("level '{0}' does not exist on hackmyvm. Check if it is spelled correctly")]
    LevelNotFound(String),

    /// A URL was given to `download` without `--no-verify`.
    #[error("'{0}' looks like a URL; pass --no-verify to download from a literal URL")]
    DownloadParamsInconsistency(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
