use std::{borrow::Cow, str::FromStr};

use actix_codec::{Decoder, Encoder};
use bytes::{Buf as _, BufMut, BytesMut};
use bytestring::ByteString;

use crate::error::{EncodeError, ParseError, UnknownCharset};
use crate::telegram::Telegram;

/// Bytes closing every telegram on the wire.
pub const TERMINATOR: &[u8] = b"\r\n";

/// Character set telegram bodies are restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Charset {
    /// Any valid UTF-8 text.
    #[default]
    Utf8,

    /// 7-bit ASCII only.
    Ascii,
}

impl FromStr for Charset {
    type Err = UnknownCharset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "utf8" | "utf-8" | "UTF-8" => Ok(Charset::Utf8),
            "ascii" | "us-ascii" | "US-ASCII" => Ok(Charset::Ascii),
            _ => Err(UnknownCharset(s.to_owned())),
        }
    }
}

/// Frames telegrams as `text\r\n` and splits an inbound byte stream at each `\r\n`.
#[derive(Debug, Clone)]
pub struct TelegramCodec {
    max_size: usize,
    charset: Charset,
    // bytes of the read buffer already scanned without finding a terminator
    next_index: usize,
    // dropping the rest of an oversized telegram, up to its terminator
    is_discarding: bool,
}

impl TelegramCodec {
    /// Create `TelegramCodec` instance
    pub fn new() -> Self {
        TelegramCodec {
            max_size: 0,
            charset: Charset::Utf8,
            next_index: 0,
            is_discarding: false,
        }
    }

    /// Set max telegram body size, in both directions.
    ///
    /// If max size is set to `0`, size is unlimited.
    /// By default max size is set to `0`
    pub fn max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Restrict telegram bodies to `charset`.
    ///
    /// By default any UTF-8 text is accepted.
    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Returns the configured max telegram body size.
    pub fn get_max_size(&self) -> usize {
        self.max_size
    }

    /// Returns the configured charset.
    pub fn get_charset(&self) -> Charset {
        self.charset
    }

    /// Produces the body of `item` and checks it can be framed, without writing anything.
    pub fn validate<'a, T>(&self, item: &'a T) -> Result<Cow<'a, str>, EncodeError>
    where
        T: Telegram + ?Sized,
    {
        let text = item.encode_text()?;
        let bytes = text.as_bytes();

        if let Some(offset) = find_terminator(bytes) {
            return Err(EncodeError::EmbeddedTerminator { offset });
        }
        if self.charset == Charset::Ascii {
            if let Some(offset) = bytes.iter().position(|b| !b.is_ascii()) {
                return Err(EncodeError::NonAscii { offset });
            }
        }
        if self.max_size != 0 && bytes.len() > self.max_size {
            return Err(EncodeError::MaxSizeExceeded);
        }

        Ok(text)
    }

    /// Turns a complete body, terminator already stripped, into a telegram.
    pub(crate) fn finish(&self, body: BytesMut) -> Result<ByteString, ParseError> {
        if self.max_size != 0 && body.len() > self.max_size {
            return Err(ParseError::MaxSizeExceeded);
        }
        if self.charset == Charset::Ascii {
            if let Some(offset) = body.iter().position(|b| !b.is_ascii()) {
                return Err(ParseError::NonAscii { offset });
            }
        }
        Ok(ByteString::try_from(body.freeze())?)
    }

    /// Largest number of bytes that may sit in the buffer without a terminator.
    fn pending_limit(&self) -> Option<usize> {
        // a full body plus the `\r` of a terminator split across reads
        (self.max_size != 0).then(|| self.max_size + 1)
    }
}

impl Default for TelegramCodec {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn find_terminator(buf: &[u8]) -> Option<usize> {
    buf.windows(TERMINATOR.len()).position(|w| w == TERMINATOR)
}

impl Decoder for TelegramCodec {
    type Item = ByteString;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, ParseError> {
        loop {
            // step back one byte, the `\r` may have ended the previous read
            let start = self.next_index.saturating_sub(1).min(src.len());

            match find_terminator(&src[start..]) {
                Some(pos) if self.is_discarding => {
                    src.advance(start + pos + TERMINATOR.len());
                    self.next_index = 0;
                    self.is_discarding = false;
                    tracing::debug!("resynchronized after oversized telegram");
                }
                Some(pos) => {
                    let end = start + pos;
                    self.next_index = 0;

                    let mut frame = src.split_to(end + TERMINATOR.len());
                    frame.truncate(end);

                    let telegram = self.finish(frame)?;
                    tracing::trace!(len = telegram.len(), "telegram decoded");
                    return Ok(Some(telegram));
                }
                None if self.is_discarding => {
                    self.drop_pending(src);
                    return Ok(None);
                }
                None => {
                    if let Some(limit) = self.pending_limit() {
                        if src.len() > limit {
                            tracing::debug!(pending = src.len(), "telegram exceeds max size");
                            self.drop_pending(src);
                            self.is_discarding = true;
                            return Err(ParseError::MaxSizeExceeded);
                        }
                    }
                    self.next_index = src.len();
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, ParseError> {
        let res = self.decode(src);

        match res {
            Ok(Some(telegram)) => Ok(Some(telegram)),
            Ok(None) if src.is_empty() || self.is_discarding => {
                self.reset(src);
                Ok(None)
            }
            Ok(None) => {
                tracing::debug!(
                    pending = src.len(),
                    "socket closed during telegram assembly"
                );
                self.reset(src);
                Err(ParseError::Closed)
            }
            Err(err) => {
                self.reset(src);
                Err(err)
            }
        }
    }
}

impl TelegramCodec {
    /// Drops buffered bytes of a telegram being discarded, keeping a trailing `\r`.
    fn drop_pending(&mut self, src: &mut BytesMut) {
        let keep = usize::from(src.last() == Some(&b'\r'));
        src.advance(src.len() - keep);
        self.next_index = keep;
    }

    fn reset(&mut self, src: &mut BytesMut) {
        src.clear();
        self.next_index = 0;
        self.is_discarding = false;
    }
}

impl<T: Telegram> Encoder<T> for TelegramCodec {
    type Error = EncodeError;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), EncodeError> {
        let body = self.validate(&item)?;

        dst.reserve(body.len() + TERMINATOR.len());
        dst.put_slice(body.as_bytes());
        dst.put_slice(TERMINATOR);

        tracing::trace!(len = body.len(), "telegram encoded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::telegram::Displayed;

    #[test]
    fn test_encode_appends_crlf() {
        let mut codec = TelegramCodec::new();
        let mut buf = BytesMut::new();

        codec.encode("###00160MFC__SYS__00001", &mut buf).unwrap();
        codec.encode(String::new(), &mut buf).unwrap();

        assert_eq!(&buf[..], b"###00160MFC__SYS__00001\r\n\r\n");
        assert!(buf.ends_with(TERMINATOR));
    }

    #[test]
    fn test_encode_display_payload() {
        let mut codec = TelegramCodec::new();
        let mut buf = BytesMut::new();

        codec.encode(Displayed(4711), &mut buf).unwrap();
        assert_eq!(&buf[..], b"4711\r\n");
    }

    #[test]
    fn test_unserializable_writes_nothing() {
        let mut codec = TelegramCodec::new();
        let mut buf = BytesMut::new();

        let res = codec.encode(Bytes::from_static(b"\xc3\x28"), &mut buf);
        assert!(matches!(res, Err(EncodeError::NotSerializable(_))));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_embedded_terminator_rejected() {
        let mut codec = TelegramCodec::new();
        let mut buf = BytesMut::from(&b"kept"[..]);

        assert_eq!(
            codec.encode("LOCU\r\nSYS_", &mut buf),
            Err(EncodeError::EmbeddedTerminator { offset: 4 })
        );
        assert_eq!(&buf[..], b"kept");

        // a lone CR or LF does not end a frame
        codec.encode("A\rB\nC", &mut buf).unwrap();
        assert_eq!(&buf[..], b"keptA\rB\nC\r\n");
    }

    #[test]
    fn test_encode_ascii_and_max_size() {
        let mut codec = TelegramCodec::new().charset(Charset::Ascii).max_size(4);
        let mut buf = BytesMut::new();

        assert_eq!(
            codec.encode("Grüß", &mut buf),
            Err(EncodeError::NonAscii { offset: 2 })
        );
        assert_eq!(
            codec.encode("TOO_LONG", &mut buf),
            Err(EncodeError::MaxSizeExceeded)
        );
        assert!(buf.is_empty());

        codec.encode("OK__", &mut buf).unwrap();
        assert_eq!(&buf[..], b"OK__\r\n");
    }

    #[test]
    fn test_decode_frames_in_order() {
        let mut codec = TelegramCodec::new();
        let mut buf = BytesMut::from(&b"REQ_\r\nRES_\r\nERR"[..]);

        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "REQ_");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "RES_");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert_eq!(&buf[..], b"ERR");
    }

    #[test]
    fn test_decode_terminator_split_across_reads() {
        let mut codec = TelegramCodec::new();
        let mut buf = BytesMut::new();

        buf.extend_from_slice(b"UPD_\r");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"\nSYS_");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "UPD_");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "SYS_");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_max_size() {
        let mut codec = TelegramCodec::new().max_size(5);

        let mut buf = BytesMut::from(&b"12345\r"[..]);
        assert_eq!(codec.decode(&mut buf), Ok(None));
        buf.extend_from_slice(b"\n");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "12345");

        let mut buf = BytesMut::from(&b"1234567"[..]);
        assert_eq!(codec.decode(&mut buf), Err(ParseError::MaxSizeExceeded));

        let mut codec = TelegramCodec::new().max_size(5);
        let mut buf = BytesMut::from(&b"123456\r\n"[..]);
        assert_eq!(codec.decode(&mut buf), Err(ParseError::MaxSizeExceeded));
    }

    #[test]
    fn test_decode_resumes_after_oversized_telegram() {
        let mut codec = TelegramCodec::new().max_size(4);

        let mut buf = BytesMut::from(&b"123456789"[..]);
        assert_eq!(codec.decode(&mut buf), Err(ParseError::MaxSizeExceeded));
        assert!(buf.is_empty());

        // rest of the oversized telegram keeps being dropped
        buf.extend_from_slice(b"0123456789\r");
        assert_eq!(codec.decode(&mut buf), Ok(None));
        assert_eq!(&buf[..], b"\r");

        buf.extend_from_slice(b"\nOK\r\nSYS_\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "OK");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "SYS_");
        assert_eq!(codec.decode(&mut buf), Ok(None));

        // oversized and next telegram delivered in one read
        let mut codec = TelegramCodec::new().max_size(4);
        let mut buf = BytesMut::from(&b"123456789\r\nOK\r\n"[..]);
        assert_eq!(codec.decode(&mut buf), Err(ParseError::MaxSizeExceeded));
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "OK");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_eof_after_oversized_telegram() {
        let mut codec = TelegramCodec::new().max_size(4);

        let mut buf = BytesMut::from(&b"123456789"[..]);
        assert_eq!(codec.decode(&mut buf), Err(ParseError::MaxSizeExceeded));

        buf.extend_from_slice(b"ABC");
        assert_eq!(codec.decode_eof(&mut buf), Ok(None));
        assert!(buf.is_empty());
        assert_eq!(codec.decode_eof(&mut buf), Ok(None));

        // codec is usable again once the stream was reset
        let mut buf = BytesMut::from(&b"OK\r\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "OK");
    }

    #[test]
    fn test_decode_charset() {
        let mut codec = TelegramCodec::new();
        let mut buf = BytesMut::from(&b"\xff\xfe\r\n"[..]);
        assert!(matches!(codec.decode(&mut buf), Err(ParseError::Utf8(_))));

        let mut codec = TelegramCodec::new().charset(Charset::Ascii);
        let mut buf = BytesMut::from("Grüß\r\n");
        assert_eq!(
            codec.decode(&mut buf),
            Err(ParseError::NonAscii { offset: 2 })
        );
    }

    #[test]
    fn test_decode_eof() {
        let mut codec = TelegramCodec::new();

        let mut buf = BytesMut::new();
        assert_eq!(codec.decode_eof(&mut buf), Ok(None));

        let mut buf = BytesMut::from(&b"REQ_\r\nPARTIAL"[..]);
        assert_eq!(codec.decode_eof(&mut buf).unwrap().unwrap(), "REQ_");
        assert_eq!(codec.decode_eof(&mut buf), Err(ParseError::Closed));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_charset_from_str() {
        assert_eq!("utf-8".parse(), Ok(Charset::Utf8));
        assert_eq!("ascii".parse(), Ok(Charset::Ascii));
        assert_eq!(
            "latin1".parse::<Charset>(),
            Err(UnknownCharset("latin1".to_owned()))
        );
    }
}
