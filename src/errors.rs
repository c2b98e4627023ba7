use crate::block::BlockTag;
use std::fmt;

/// An error that can occur when encoding or decoding save data
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Error {
        Error::new(ErrorKind::InvalidArgument(msg.into()))
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Consume self and return the error kind
    #[must_use]
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Returns the byte offset where the error occurred (if available)
    pub fn offset(&self) -> Option<usize> {
        self.0.offset()
    }
}

/// Specific type of error
#[derive(Debug)]
pub enum ErrorKind {
    /// A read consumed past the end of the buffer
    StreamExhausted {
        /// Byte offset of the failed read
        offset: usize,
        /// Number of bytes the read required
        needed: usize,
    },

    /// The data disagrees with the active file format
    FormatMismatch(FormatError),

    /// A caller-supplied value was rejected before any bytes moved
    InvalidArgument(String),

    /// No registered file format matched the supplied bytes
    UnrecognizedFormat,

    /// Record nesting exceeded the deserializer's depth limit
    DepthLimit {
        /// Byte offset where the limit was hit
        offset: usize,
    },
}

impl ErrorKind {
    pub fn offset(&self) -> Option<usize> {
        match self {
            ErrorKind::StreamExhausted { offset, .. } => Some(*offset),
            ErrorKind::FormatMismatch(err) => err.offset(),
            ErrorKind::DepthLimit { offset } => Some(*offset),
            _ => None,
        }
    }
}

/// A validation failure against the block container protocol.
///
/// Every variant here is unconditionally enforced. The layouts this crate
/// targets have no recovery point: once a tag or length disagrees, nothing
/// downstream can be trusted, so the whole load or store is abandoned.
#[derive(Debug)]
pub enum FormatError {
    /// A tagged block carried a different tag than the section expected
    TagMismatch {
        offset: usize,
        expected: BlockTag,
        actual: BlockTag,
    },

    /// A tagged block's inner length was not outer length minus the header
    LengthMismatch {
        offset: usize,
        outer: u32,
        inner: u32,
    },

    /// A block length exceeded the format's maximum block size
    BlockTooLarge { offset: usize, len: u32, max: u32 },

    /// A section's payload did not match its fixed size for the format
    SectionSize {
        index: usize,
        expected: u32,
        actual: u32,
    },

    /// The trailing checksum disagreed with the sum of the preceding bytes
    ChecksumMismatch { stored: u32, computed: u32 },

    /// Detection identified a different format than the caller requested
    DetectionDisagreement {
        /// Name of the format the markers identified
        detected: String,
        /// Name of the format the caller expected
        expected: String,
    },
}

impl FormatError {
    pub fn offset(&self) -> Option<usize> {
        match self {
            FormatError::TagMismatch { offset, .. } => Some(*offset),
            FormatError::LengthMismatch { offset, .. } => Some(*offset),
            FormatError::BlockTooLarge { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &*self.0 {
            ErrorKind::StreamExhausted { offset, needed } => write!(
                f,
                "stream exhausted: {} byte read at offset {} ran past the end",
                needed, offset
            ),
            ErrorKind::FormatMismatch(err) => write!(f, "format mismatch: {}", err),
            ErrorKind::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            ErrorKind::UnrecognizedFormat => write!(f, "unrecognized save file format"),
            ErrorKind::DepthLimit { offset } => {
                write!(f, "record nesting too deep (offset: {})", offset)
            }
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FormatError::TagMismatch {
                offset,
                expected,
                actual,
            } => write!(
                f,
                "expected block tag {} but found {} (offset: {})",
                expected, actual, offset
            ),
            FormatError::LengthMismatch {
                offset,
                outer,
                inner,
            } => write!(
                f,
                "tagged block inner length {} does not match outer length {} (offset: {})",
                inner, outer, offset
            ),
            FormatError::BlockTooLarge { offset, len, max } => write!(
                f,
                "block length {} exceeds format maximum {} (offset: {})",
                len, max, offset
            ),
            FormatError::SectionSize {
                index,
                expected,
                actual,
            } => write!(
                f,
                "section {} payload is {} bytes but the format requires {}",
                index, actual, expected
            ),
            FormatError::ChecksumMismatch { stored, computed } => write!(
                f,
                "stored checksum {:#010x} does not match computed {:#010x}",
                stored, computed
            ),
            FormatError::DetectionDisagreement { detected, expected } => write!(
                f,
                "data detected as {} but {} was expected",
                detected, expected
            ),
        }
    }
}

impl From<FormatError> for Error {
    fn from(error: FormatError) -> Self {
        Error::new(ErrorKind::FormatMismatch(error))
    }
}
