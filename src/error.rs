//! Error types for romforge.
//!
//! Every fallible operation in the library returns [`Result`]. Container
//! failures are split into fine-grained variants internally, while the
//! boolean [`ZipExtractor::extract`](crate::zip::ZipExtractor::extract)
//! contract collapses them into `false`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for romforge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all romforge operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Archive buffer cannot even hold an End of Central Directory record
    #[error("archive too small: {len} bytes")]
    ArchiveTooSmall {
        /// Buffer length
        len: usize,
    },

    /// No End of Central Directory signature in the buffer
    #[error("End of Central Directory record not found")]
    MissingEndOfCentralDirectory,

    /// EOCD declares no entries or an empty central directory
    #[error("archive is empty ({entries} entries, central directory of {cd_size} bytes)")]
    EmptyArchive {
        /// Declared entry count
        entries: u16,
        /// Declared central directory size
        cd_size: u32,
    },

    /// Accepted central directory records do not match the declared total
    #[error("accepted {accepted} of {declared} declared entries")]
    EntryCountMismatch {
        /// Entries with a supported method and a name
        accepted: usize,
        /// Entries declared by the EOCD
        declared: u16,
    },

    /// A record runs past the central directory or the buffer
    #[error("malformed {record} at offset {offset}")]
    MalformedRecord {
        /// Record kind
        record: &'static str,
        /// Byte offset of the record
        offset: u64,
    },

    /// Local file header has a bad signature or no name
    #[error("invalid local file header at offset {offset}")]
    InvalidLocalHeader {
        /// Byte offset of the header
        offset: u64,
    },

    /// Entry payload extends beyond the archive buffer
    #[error("payload of '{name}' out of bounds")]
    PayloadOutOfBounds {
        /// Entry name
        name: String,
    },

    /// Entry decompressed to a different length than declared
    #[error("size mismatch for '{name}': expected {expected} bytes, got {actual}")]
    UncompressedSizeMismatch {
        /// Entry name
        name: String,
        /// Declared uncompressed size
        expected: u64,
        /// Actual decompressed size
        actual: u64,
    },

    /// Entry CRC-32 does not match the declared value
    #[error("CRC-32 mismatch for '{name}': expected {expected:#010x}, got {actual:#010x}")]
    CrcMismatch {
        /// Entry name
        name: String,
        /// Declared CRC-32
        expected: u32,
        /// Computed CRC-32
        actual: u32,
    },

    /// Local header names a compression method other than Store/Deflate
    #[error("unsupported compression method {method} for '{name}'")]
    UnsupportedMethod {
        /// Entry name
        name: String,
        /// Method code from the local header
        method: u16,
    },

    /// Raw deflate stream could not be inflated
    #[error("failed to inflate '{name}': {source}")]
    Inflate {
        /// Entry name
        name: String,
        /// Underlying decoder error
        #[source]
        source: std::io::Error,
    },

    /// Entry name would escape the target directory
    #[error("path traversal detected: '{path}' would escape output directory")]
    PathTraversal {
        /// The offending entry name
        path: PathBuf,
    },

    /// Buffer length does not match a fixed-layout record size
    #[error("{record} needs exactly {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Record type name
        record: &'static str,
        /// Declared record size
        expected: usize,
        /// Buffer length supplied
        actual: usize,
    },

    /// Caller passed an argument outside its valid range
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// File extension does not identify a supported ROM image
    #[error("unknown ROM format: '{path}'")]
    UnknownRomFormat {
        /// Path of the image
        path: PathBuf,
    },

    /// Header variant does not belong to the image's platform
    #[error("cannot write a {header} header into a {image} image")]
    HeaderKindMismatch {
        /// Kind of the header value
        header: &'static str,
        /// Kind of the ROM image
        image: &'static str,
    },

    /// Failed to read input file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to create output directory
    #[error("failed to create directory '{path}': {source}")]
    DirectoryCreate {
        /// Path to the directory that failed to create
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O failure not tied to a single path
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// HTTP transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new directory creation error
    pub fn directory_create(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreate {
            path: path.into(),
            source,
        }
    }

    /// Creates a new path traversal error
    pub fn path_traversal(path: impl Into<PathBuf>) -> Self {
        Self::PathTraversal { path: path.into() }
    }

    /// Creates a new malformed record error
    pub fn malformed(record: &'static str, offset: u64) -> Self {
        Self::MalformedRecord { record, offset }
    }

    /// Creates a new invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if the archive itself is malformed or failed verification
    pub fn is_malformed_archive(&self) -> bool {
        matches!(
            self,
            Self::ArchiveTooSmall { .. }
                | Self::MissingEndOfCentralDirectory
                | Self::EmptyArchive { .. }
                | Self::EntryCountMismatch { .. }
                | Self::MalformedRecord { .. }
                | Self::InvalidLocalHeader { .. }
                | Self::PayloadOutOfBounds { .. }
                | Self::UncompressedSizeMismatch { .. }
                | Self::CrcMismatch { .. }
                | Self::UnsupportedMethod { .. }
                | Self::Inflate { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::path_traversal("../evil.exe");
        assert!(err.to_string().contains("path traversal"));
        assert!(err.to_string().contains("../evil.exe"));

        let err = Error::CrcMismatch {
            name: "a.txt".into(),
            expected: 0xDEADBEEF,
            actual: 0x1,
        };
        assert!(err.to_string().contains("0xdeadbeef"));
        assert!(err.to_string().contains("0x00000001"));
    }

    #[test]
    fn test_is_malformed_archive() {
        assert!(Error::MissingEndOfCentralDirectory.is_malformed_archive());
        assert!(Error::malformed("central directory header", 12).is_malformed_archive());
        assert!(!Error::path_traversal("/etc/passwd").is_malformed_archive());
        assert!(!Error::invalid_argument("run length").is_malformed_archive());
    }
}
