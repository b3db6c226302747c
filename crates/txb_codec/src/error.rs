//! Error types that can be emitted from this library

use miette::Diagnostic;
use std::io;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`FormatError`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    Format(#[from] FormatError),

    /// Transparent wrapper for [`EncodingError`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    Encoding(#[from] EncodingError),
}

/// Problems found while decoding the binary container
#[derive(Error, Diagnostic, Debug)]
pub enum FormatError {
    /// file does not start with `txbL`
    #[error("file is not a txb container (bad magic at offset {offset})")]
    #[diagnostic(code(txb::bad_magic))]
    BadMagic { offset: u64 },

    /// a fixed size read ran past the end of the data
    #[error("unexpected end of data at offset {offset}")]
    #[diagnostic(code(txb::truncated))]
    Truncated { offset: u64 },

    /// the offset table is shorter than the declared entry count
    #[error("entry count is {declared} but only {found} offsets are present")]
    #[diagnostic(code(txb::count_mismatch))]
    CountMismatch { declared: u32, found: usize },

    /// an entry declares a negative text size or border count
    #[error("entry {entry} declares an invalid length of {value}")]
    #[diagnostic(code(txb::invalid_length))]
    InvalidLength { entry: usize, value: i16 },

    /// the text payload of an entry is not UTF-8
    #[error("entry {entry} does not contain valid UTF-8 text")]
    #[diagnostic(code(txb::invalid_text))]
    InvalidText {
        entry: usize,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// a border uses a position of zero or ends before it starts
    #[error("entry {entry} has an invalid border spanning {start}..={end}")]
    #[diagnostic(code(txb::invalid_border))]
    InvalidBorder { entry: usize, start: u16, end: u16 },

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRW(binrw::Error),
}

impl FormatError {
    /// Classify a failed read that started at `offset`.
    pub(crate) fn from_io(err: io::Error, offset: u64) -> Error {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            FormatError::Truncated { offset }.into()
        } else {
            Error::IOError(err)
        }
    }

    /// Classify a failed `binrw` read that started at `offset`.
    ///
    /// Errors raised inside a derived struct arrive wrapped in a backtrace and are unwrapped first.
    pub(crate) fn from_binrw(err: binrw::Error, offset: u64) -> Error {
        match err {
            binrw::Error::Backtrace(bt) => Self::from_binrw(*bt.error, offset),
            binrw::Error::BadMagic { pos, .. } => FormatError::BadMagic { offset: pos }.into(),
            binrw::Error::Io(e) => Self::from_io(e, offset),
            other => FormatError::BinRW(other).into(),
        }
    }
}

impl From<binrw::Error> for Error {
    fn from(err: binrw::Error) -> Self {
        match err {
            binrw::Error::Backtrace(bt) => Self::from(*bt.error),
            binrw::Error::Io(e) => Error::IOError(e),
            other => FormatError::BinRW(other).into(),
        }
    }
}

/// Problems found while building the binary form of a container
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// a value does not fit the field it is stored in
    #[error("entry {entry}: {field} of {value} does not fit its field")]
    #[diagnostic(code(txb::size_overflow))]
    SizeOverflow {
        entry: usize,
        field: &'static str,
        value: usize,
    },
}

/// Values inside `[c]...[/c=color;font]` markup that cannot be stored
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum MarkerError {
    /// a marker position that cannot be stored
    #[error("marker at character {position} is beyond the storable range")]
    #[diagnostic(code(txb::marker_position))]
    OutOfRange { position: usize },

    /// a color or font attribute above 255
    #[error("marker attribute {value} is out of range")]
    #[diagnostic(code(txb::marker_attribute))]
    InvalidAttribute { value: String },
}

/// Problems found while parsing one block of an annotated text document
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum TextParseError {
    /// the block does not start with a `[name]` line
    #[error("expected a `[name]` header line, found `{0}`")]
    #[diagnostic(code(txb::missing_header))]
    MissingHeader(String),

    /// the header is not followed by a flag line
    #[error("missing `b'xx xx'` flag line")]
    #[diagnostic(code(txb::missing_flags))]
    MissingFlags,

    /// the flag line is not two hex byte pairs
    #[error("malformed flag line `{0}`")]
    #[diagnostic(code(txb::invalid_flags))]
    InvalidFlags(String),

    /// the block never reaches a `[/tN]` line
    #[error("missing `[/tN]` terminal line")]
    #[diagnostic(code(txb::missing_terminal))]
    MissingTerminal,

    /// the terminal line does not hold a valid entry index
    #[error("invalid entry index in `{0}`")]
    #[diagnostic(code(txb::invalid_index))]
    InvalidIndex(String),

    /// an `unknown_` label without eight hex digits
    #[error("invalid unresolved hash label `{0}`")]
    #[diagnostic(code(txb::invalid_unknown_hash))]
    InvalidUnknownHash(String),

    /// Transparent wrapper for [`MarkerError`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    Marker(#[from] MarkerError),

    /// Transparent wrapper for [`EncodingError`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    Encoding(#[from] EncodingError),
}

/// A [`TextParseError`] together with where it happened
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error("block {block} (line {line}): {kind}")]
pub struct BlockError {
    /// 1-based ordinal of the block inside the document
    pub block: usize,
    /// 1-based line where the block starts
    pub line: usize,
    /// Raw text of the block
    pub content: String,
    #[source]
    #[diagnostic_source]
    pub kind: TextParseError,
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
