use std::{borrow::Cow, fmt, str};

use bytes::Bytes;
use bytestring::ByteString;

use crate::error::EncodeError;

/// Application message that can be put on the wire as an OSIP telegram.
///
/// The textual encoding must be deterministic: encoding the same value twice produces the same
/// text. Payloads without a textual form report [`EncodeError::NotSerializable`].
pub trait Telegram {
    /// Telegram body, without the frame terminator.
    fn encode_text(&self) -> Result<Cow<'_, str>, EncodeError>;
}

impl<T: Telegram + ?Sized> Telegram for &T {
    fn encode_text(&self) -> Result<Cow<'_, str>, EncodeError> {
        (**self).encode_text()
    }
}

impl<T: Telegram + ?Sized> Telegram for Box<T> {
    fn encode_text(&self) -> Result<Cow<'_, str>, EncodeError> {
        (**self).encode_text()
    }
}

impl Telegram for str {
    fn encode_text(&self) -> Result<Cow<'_, str>, EncodeError> {
        Ok(Cow::Borrowed(self))
    }
}

impl Telegram for String {
    fn encode_text(&self) -> Result<Cow<'_, str>, EncodeError> {
        Ok(Cow::Borrowed(self.as_str()))
    }
}

impl Telegram for ByteString {
    fn encode_text(&self) -> Result<Cow<'_, str>, EncodeError> {
        Ok(Cow::Borrowed(&**self))
    }
}

impl Telegram for Bytes {
    fn encode_text(&self) -> Result<Cow<'_, str>, EncodeError> {
        str::from_utf8(self).map(Cow::Borrowed).map_err(|err| {
            EncodeError::NotSerializable(format!(
                "binary payload with invalid UTF-8 after {} bytes",
                err.valid_up_to()
            ))
        })
    }
}

/// Sends any [`Display`](fmt::Display) value as a telegram, using its formatted output as body.
///
/// ```
/// use osip_codec::{Displayed, Telegram};
///
/// struct Sys { seq: u32 }
///
/// impl std::fmt::Display for Sys {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "###00160MFC__SYS__{:05}", self.seq)
///     }
/// }
///
/// let msg = Displayed(Sys { seq: 42 });
/// let body = msg.encode_text().unwrap();
/// assert_eq!(body, "###00160MFC__SYS__00042");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Displayed<T>(pub T);

impl<T: fmt::Display> Telegram for Displayed<T> {
    fn encode_text(&self) -> Result<Cow<'_, str>, EncodeError> {
        Ok(Cow::Owned(self.0.to_string()))
    }
}
