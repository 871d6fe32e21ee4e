//! Error types for `WbkForge`

use thiserror::Error;

/// The error type for `WbkForge` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A record read ran past the end of the bank image.
    #[error("unexpected end of file")]
    UnexpectedEof,

    // ==================== WBK Container Errors ====================
    /// The fixed header is truncated or internally inconsistent.
    #[error("malformed WBK header: {reason}")]
    MalformedHeader {
        /// What is wrong with the header.
        reason: String,
    },

    /// Entry payloads are not laid out the way the repacker requires.
    #[error("malformed WBK layout: {reason}")]
    MalformedLayout {
        /// What is wrong with the layout.
        reason: String,
    },

    /// The entry (or a replacement request) uses a codec without an implementation.
    #[error("{}", unsupported_codec_message(.index, .tag))]
    UnsupportedCodec {
        /// Entry index the codec belongs to, if any.
        index: Option<usize>,
        /// The raw codec tag.
        tag: u8,
    },

    /// A replacement target is outside the entry table.
    #[error("invalid entry index: {index} (bank has {count} entries, indices start at 1)")]
    InvalidIndex {
        /// The requested 1-based index.
        index: usize,
        /// Number of entries in the bank.
        count: usize,
    },

    // ==================== WAV Exchange Errors ====================
    /// The file is not a RIFF/WAVE container or is missing a required chunk.
    #[error("invalid WAV file: {0}")]
    InvalidWav(String),

    /// The WAV file is valid but uses a sample format we cannot exchange.
    #[error("unsupported WAV format: {0}")]
    UnsupportedWav(String),
}

#[allow(clippy::trivially_copy_pass_by_ref, clippy::ref_option)]
fn unsupported_codec_message(index: &Option<usize>, tag: &u8) -> String {
    match index {
        Some(index) => format!("unsupported codec ({tag}) for entry {index}"),
        None => format!("unsupported codec ({tag})"),
    }
}

impl Error {
    /// Shorthand for a [`Error::MalformedHeader`] with the given reason.
    pub(crate) fn header(reason: impl Into<String>) -> Self {
        Error::MalformedHeader {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`Error::MalformedLayout`] with the given reason.
    pub(crate) fn layout(reason: impl Into<String>) -> Self {
        Error::MalformedLayout {
            reason: reason.into(),
        }
    }

    /// Map an IO error raised while decoding an in-memory record.
    ///
    /// Reads from a `Cursor` only fail by running out of bytes.
    pub(crate) fn from_record_read(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEof
        } else {
            Error::Io(err)
        }
    }
}

/// A specialized Result type for `WbkForge` operations.
pub type Result<T> = std::result::Result<T, Error>;
