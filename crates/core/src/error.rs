use std::path::PathBuf;

use crate::assets::AssetKey;

/// Result alias that carries the custom [`OverlayError`] type.
pub type Result<T> = std::result::Result<T, OverlayError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    /// Free-form failure surfaced to the user as-is.
    #[error("{0}")]
    Message(String),
    /// `config.json` was not found in the working directory.
    #[error("Missing required config: {}", path.display())]
    ConfigNotFound { path: PathBuf },
    /// `config.json` exists but could not be parsed into an [`AppConfig`].
    ///
    /// [`AppConfig`]: crate::AppConfig
    #[error("Invalid config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Neither the override directory nor the bundled pack holds the image.
    #[error("Emoji asset not found for '{cluster}' as '{key}'")]
    AssetNotFound { cluster: String, key: AssetKey },
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl OverlayError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}
