//! Error taxonomy for keymap install, query and loading.
//!
//! Every failure is returned to the immediate caller; nothing in this crate
//! retries internally. Errors that cross the privileged boundary can also be
//! reported as an errno value with [`KeymapError::errno`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for keymap operations
pub type KeymapResult<T> = std::result::Result<T, KeymapError>;

/// errno values reported to callers that use the syscall convention.
pub mod errno {
    /// Operation not permitted
    pub const EPERM: i32 = 1;
    /// No such file or directory
    pub const ENOENT: i32 = 2;
    /// I/O error
    pub const EIO: i32 = 5;
    /// Out of memory
    pub const ENOMEM: i32 = 12;
    /// Bad address
    pub const EFAULT: i32 = 14;
    /// Invalid argument
    pub const EINVAL: i32 = 22;
    /// File name too long
    pub const ENAMETOOLONG: i32 = 36;
    /// Illegal byte sequence
    pub const EILSEQ: i32 = 84;
}

/// Main error type for keymap operations
#[derive(Error, Debug)]
pub enum KeymapError {
    /// The caller lacks the capability or identity an operation requires.
    #[error("Permission denied: {operation} requires {requirement}")]
    PermissionDenied {
        /// Operation that was refused
        operation: &'static str,
        /// What the caller was missing
        requirement: &'static str,
    },

    /// A copy across the trust boundary touched memory the caller does not own.
    #[error("Bad address: {len} bytes at {address:#x}")]
    BoundaryFault {
        /// Start of the faulting range in caller memory
        address: usize,
        /// Length of the faulting range in bytes
        len: usize,
    },

    /// A map name does not fit the limit or the destination buffer.
    #[error("Map name too long: {len} bytes (maximum {max} bytes)")]
    NameTooLong {
        /// Actual length in bytes
        len: usize,
        /// Permitted length in bytes
        max: usize,
    },

    /// An entry buffer could not be allocated.
    #[error("Out of memory allocating {requested} codepoints")]
    AllocationFailure {
        /// Number of codepoints that were requested
        requested: usize,
    },

    /// The layout definition does not exist.
    #[error("Keymap not found: {}", path.display())]
    ResourceNotFound {
        /// Resolved path of the definition
        path: PathBuf,
    },

    /// The layout definition is not a well-formed character map.
    #[error("Malformed keymap definition {}: {reason}", path.display())]
    MalformedDefinition {
        /// Resolved path of the definition (empty for in-memory input)
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Text that must be UTF-8 was not.
    #[error("Invalid UTF-8 in {context}: {source}")]
    Utf8Decode {
        /// Where the bad text came from
        context: String,
        /// Underlying decoder error
        #[source]
        source: std::str::Utf8Error,
    },

    /// Any other I/O failure while reading a definition.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl KeymapError {
    /// Returns the errno value a syscall would report for this error.
    #[must_use]
    pub const fn errno(&self) -> i32 {
        match self {
            Self::PermissionDenied { .. } => errno::EPERM,
            Self::BoundaryFault { .. } => errno::EFAULT,
            Self::NameTooLong { .. } => errno::ENAMETOOLONG,
            Self::AllocationFailure { .. } => errno::ENOMEM,
            Self::ResourceNotFound { .. } => errno::ENOENT,
            Self::MalformedDefinition { .. } => errno::EINVAL,
            Self::Utf8Decode { .. } => errno::EILSEQ,
            Self::Io { .. } => errno::EIO,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedDefinition {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
