use std::{io, str};

use derive_more::{Display, Error};

/// Errors raised while turning a telegram into a frame.
///
/// Every variant except [`Io`](EncodeError::Io) is reported before anything is written.
#[derive(Debug, Display, Error)]
pub enum EncodeError {
    /// Payload has no textual representation.
    #[display("telegram requires a serializable payload but received {_0}")]
    NotSerializable(#[error(not(source))] String),

    /// Text contains the `\r\n` terminator and would split into two frames.
    #[display("telegram contains the frame terminator at offset {offset}")]
    EmbeddedTerminator { offset: usize },

    /// Non-ASCII byte found while the codec is restricted to ASCII.
    #[display("non-ASCII byte in telegram at offset {offset}")]
    NonAscii { offset: usize },

    #[display("max outbound telegram size exceeded")]
    MaxSizeExceeded,

    #[display("I/O error: {_0}")]
    Io(io::Error),
}

impl PartialEq for EncodeError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EncodeError::NotSerializable(a), EncodeError::NotSerializable(b)) => a == b,
            (
                EncodeError::EmbeddedTerminator { offset: a },
                EncodeError::EmbeddedTerminator { offset: b },
            ) => a == b,
            (EncodeError::NonAscii { offset: a }, EncodeError::NonAscii { offset: b }) => a == b,
            (EncodeError::MaxSizeExceeded, EncodeError::MaxSizeExceeded) => true,
            (EncodeError::Io(_), _) => false,
            _ => false,
        }
    }
}

/// Errors raised while assembling inbound telegrams.
#[derive(Debug, Display, Error)]
pub enum ParseError {
    #[display("max inbound telegram size exceeded")]
    MaxSizeExceeded,

    #[display("non-ASCII byte in telegram at offset {offset}")]
    NonAscii { offset: usize },

    #[display("telegram is not valid UTF-8: {_0}")]
    Utf8(str::Utf8Error),

    /// Stream ended in the middle of a telegram.
    #[display("socket closed during telegram assembly")]
    Closed,

    #[display("I/O error: {_0}")]
    Io(io::Error),
}

impl PartialEq for ParseError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParseError::MaxSizeExceeded, ParseError::MaxSizeExceeded) => true,
            (ParseError::NonAscii { offset: a }, ParseError::NonAscii { offset: b }) => a == b,
            (ParseError::Closed, ParseError::Closed) => true,
            (ParseError::Utf8(_), _) => false,
            (ParseError::Io(_), _) => false,
            _ => false,
        }
    }
}

impl From<io::Error> for EncodeError {
    fn from(err: io::Error) -> Self {
        EncodeError::Io(err)
    }
}

impl From<io::Error> for ParseError {
    fn from(err: io::Error) -> Self {
        ParseError::Io(err)
    }
}

impl From<str::Utf8Error> for ParseError {
    fn from(err: str::Utf8Error) -> Self {
        ParseError::Utf8(err)
    }
}

/// Charset name not recognized by [`Charset`](crate::Charset)'s `FromStr` impl.
#[derive(Debug, Display, Error, PartialEq, Eq)]
#[display("unknown charset: {_0}")]
pub struct UnknownCharset(#[error(not(source))] pub String);
