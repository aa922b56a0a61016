use thiserror::Error;

/// Bad admin input. Blocks submission; nothing is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title is required")]
    MissingTitle,

    #[error("video link is required")]
    MissingLink,
}

/// Failure reported by a [`CatalogRepository`](crate::repository::CatalogRepository).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("no catalog entry with id {0}")]
    NotFound(String),

    #[error("{0} is not supported by a read-only catalog source")]
    Unsupported(&'static str),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A [`RepositoryError`] raised while reloading the catalog.
///
/// The previously loaded catalog stays in place when this is returned.
#[derive(Debug, Error)]
#[error("could not load the catalog ({0}); showing the last loaded list")]
pub struct CatalogLoadError(#[from] pub RepositoryError);

/// Playback failures. The messages are user-facing hints, never raw platform errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("no playable link")]
    NoPlayableLink,

    #[error("video could not be played; the link may be invalid or not shared publicly")]
    MediaFailed,
}

/// Errors surfaced to the admin panel.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("no delete is awaiting confirmation")]
    NoPendingDelete,

    #[error("confirmation was for entry {pending}, not {requested}")]
    ConfirmationMismatch { pending: String, requested: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("unknown {kind}: {value}")]
    UnknownValue { kind: &'static str, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
