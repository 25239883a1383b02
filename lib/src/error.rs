/// Custom error type for the markvault library
///
/// Using `thiserror` crate for automatic `Error` trait implementation and
/// `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum MarkvaultError {
    /// I/O errors (file operations)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse/serialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// HTML parsing errors
    #[error("HTML parse error: {0}")]
    HtmlParse(String),

    /// Input parsed as JSON but does not look like a bookmark export
    #[error("not a Chrome bookmark export")]
    NotBookmarkJson,

    /// Crypto/encryption errors
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// The vault's key derivation function is not available in this build
    #[error("unsupported key derivation function: {0}")]
    UnsupportedKdf(String),

    /// Terminal failure of an export attempt; no file is produced
    #[error("Export error: {0}")]
    Export(String),

    /// Export was requested with no bookmarks to write
    #[error("no bookmarks to export")]
    EmptyInput,

    /// Invalid input or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error for cases that don't fit other categories
    #[error("{0}")]
    Other(String),
}

/// Result type alias using MarkvaultError
pub type Result<T> = std::result::Result<T, MarkvaultError>;

impl MarkvaultError {
    /// True for the "unsupported KDF / not implemented" failure class the
    /// export builder keys its single retry on.
    pub fn is_unsupported_kdf(&self) -> bool {
        matches!(self, MarkvaultError::UnsupportedKdf(_))
    }
}

impl From<String> for MarkvaultError {
    fn from(s: String) -> Self {
        MarkvaultError::Other(s)
    }
}

impl From<&str> for MarkvaultError {
    fn from(s: &str) -> Self {
        MarkvaultError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for MarkvaultError {
    fn from(err: serde_json::Error) -> Self {
        MarkvaultError::Json(err.to_string())
    }
}

impl From<simd_json::Error> for MarkvaultError {
    fn from(err: simd_json::Error) -> Self {
        MarkvaultError::Json(err.to_string())
    }
}

impl From<tl::ParseError> for MarkvaultError {
    fn from(err: tl::ParseError) -> Self {
        MarkvaultError::HtmlParse(err.to_string())
    }
}
