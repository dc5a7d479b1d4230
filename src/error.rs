//! Error types for EPUB extraction.

use thiserror::Error;

/// Errors that can occur while opening a package or extracting from it.
///
/// Per-chapter failures are not represented here: they are recovered into
/// sentinel text (see [`crate::ChapterOutcome`]).
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The archive is not a recognizable EPUB package.
    #[error("Invalid EPUB: {0}")]
    Format(String),

    /// Neither an NCX nor a nav document could be found.
    #[error("Unsupported EPUB format: {0}")]
    UnsupportedFormat(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A navigation node lacks the label or target it must carry.
    #[error("Malformed navigation: {0}")]
    MalformedNavigation(String),

    #[error("Cover extraction is disabled")]
    CoverDisabled,
}

pub type Result<T> = std::result::Result<T, Error>;
