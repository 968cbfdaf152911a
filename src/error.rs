use std::io;

use derive_more::{Display, Error};
use osip_codec::{EncodeError, ParseError};

/// Errors which can occur while talking to an OSIP peer.
#[derive(Debug, Display, Error)]
pub enum OsipError {
    /// Outgoing telegram could not be framed, or the socket failed while writing it.
    #[display("failed to send telegram: {_0}")]
    Encode(EncodeError),

    /// Incoming bytes did not form a telegram, or the socket failed while reading.
    #[display("failed to receive telegram: {_0}")]
    Parse(ParseError),

    /// Host name did not resolve to any address.
    #[display("could not resolve {_0}")]
    Resolve(#[error(not(source))] String),

    /// Connecting took too long.
    #[display("timed out while establishing connection")]
    Timeout,

    /// Unexpected io error
    #[display("I/O error: {_0}")]
    Io(io::Error),
}

impl OsipError {
    /// True if the failure came from the transport rather than from telegram contents.
    ///
    /// This covers a peer closing the socket, whether detected on write or mid-read.
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            OsipError::Io(_)
                | OsipError::Encode(EncodeError::Io(_))
                | OsipError::Parse(ParseError::Io(_) | ParseError::Closed)
        )
    }
}

impl From<EncodeError> for OsipError {
    fn from(err: EncodeError) -> Self {
        OsipError::Encode(err)
    }
}

impl From<ParseError> for OsipError {
    fn from(err: ParseError) -> Self {
        OsipError::Parse(err)
    }
}

impl From<io::Error> for OsipError {
    fn from(err: io::Error) -> Self {
        OsipError::Io(err)
    }
}
