//! Error types for rack persistence and structure.

use thiserror::Error;

/// Errors raised while parsing or writing rack streams.
///
/// These never cross into the audio path: the manager's file-level
/// methods catch them, fold them into the accumulated error string and
/// return `false` to the caller.
#[derive(Debug, Error)]
pub enum RackError {
    /// Magic number mismatch - not a rack/collection file.
    #[error("bad magic: expected {expected:#010x}, found {found:#010x}")]
    BadMagic {
        /// The magic the format requires.
        expected: u32,
        /// The magic actually read.
        found: u32,
    },

    /// File written by a newer format revision.
    #[error("unsupported format version {found} (newest supported is {max})")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
        /// Newest version this build reads.
        max: u32,
    },

    /// Effect type tag not present in this build's catalog.
    #[error("unknown effect tag {0}")]
    UnknownEffect(u32),

    /// Length-prefixed string exceeds the sanity cap.
    #[error("string length {len} exceeds the {max}-byte cap")]
    StringTooLong {
        /// Length prefix read from the stream.
        len: u32,
        /// Allowed maximum.
        max: u32,
    },

    /// Name bytes are not valid UTF-8.
    #[error("name is not valid UTF-8")]
    InvalidName,

    /// Effect count above the per-rack limit.
    #[error("effect count {count} exceeds the limit of {max}")]
    TooManyEffects {
        /// Count read from the stream.
        count: u32,
        /// Allowed maximum.
        max: u32,
    },

    /// Rack count outside the collection bounds.
    #[error("rack count {count} outside 1..={max}")]
    BadRackCount {
        /// Count read from the stream.
        count: i32,
        /// Allowed maximum.
        max: usize,
    },

    /// Settings payload version this build does not understand.
    #[error("settings stream version {0} unsupported")]
    BadSettingsVersion(u8),

    /// File carries more parameters than the current effect exposes.
    #[error("file has {file} parameters but the effect has {current}")]
    TooManyParams {
        /// Parameter count in the file.
        file: u8,
        /// Parameter count in this build.
        current: usize,
    },

    /// Bytes remain after the expected end of a rack file.
    #[error("trailing bytes after rack payload")]
    TrailingBytes,

    /// Underlying I/O failure (missing file, truncated stream).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
