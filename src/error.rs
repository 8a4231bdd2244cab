// error.rs
//
//! Error types for encoding
use std::fmt;
use std::io;
use std::num::TryFromIntError;

/// Errors encountered while encoding
#[derive(Debug)]
pub enum Error {
    /// A wrapped I/O error.
    Io(io::Error),
    /// Integer out of bounds.
    TryFromInt(TryFromIntError),
    /// Screen width or height is zero.
    InvalidDimensions,
    /// Palette sampling factor outside of 1..=30.
    InvalidSampleFactor,
    /// Frame pixel buffer does not match the screen dimensions.
    FrameSizeMismatch,
    /// Frame submitted out of order.
    FrameOutOfOrder {
        /// Next expected frame index
        expected: u32,
        /// Index actually submitted
        got: u32,
    },
    /// Frames submitted do not match the configured frame count.
    FrameCountMismatch {
        /// Configured frame count
        expected: u32,
        /// Frames actually submitted
        got: u32,
    },
    /// LZW code table exceeded its maximum size without a reset.
    LzwTableOverflow,
    /// Session already finished or aborted.
    SessionClosed,
}

/// Gifloom result type
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(fmt),
            Error::TryFromInt(err) => err.fmt(fmt),
            _ => fmt::Debug::fmt(self, fmt),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::TryFromInt(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<TryFromIntError> for Error {
    fn from(err: TryFromIntError) -> Self {
        Error::TryFromInt(err)
    }
}
