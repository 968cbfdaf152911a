use std::io::{self, BufRead, BufWriter, Write};

use actix_codec::Decoder as _;
use bytes::BytesMut;
use bytestring::ByteString;

use crate::codec::{TelegramCodec, TERMINATOR};
use crate::error::{EncodeError, ParseError};
use crate::telegram::Telegram;

/// Writes telegrams to blocking [`Write`] streams, such as a `std::net::TcpStream`.
#[derive(Debug, Clone, Default)]
pub struct TelegramSerializer {
    codec: TelegramCodec,
}

impl TelegramSerializer {
    pub fn new(codec: TelegramCodec) -> Self {
        TelegramSerializer { codec }
    }

    /// Writes `telegram` followed by `\r\n` and flushes `out`.
    ///
    /// The payload is validated first; on validation failure nothing reaches `out`. I/O failures
    /// (a peer that closed the socket, for instance) are returned as-is and never retried.
    pub fn serialize<T, W>(&self, telegram: &T, out: W) -> Result<(), EncodeError>
    where
        T: Telegram + ?Sized,
        W: Write,
    {
        let body = self.codec.validate(telegram)?;

        let mut os = BufWriter::new(out);
        os.write_all(body.as_bytes())?;
        os.write_all(TERMINATOR)?;
        os.flush()?;

        Ok(())
    }
}

/// Reads `\r\n` terminated telegrams from a blocking [`BufRead`] stream.
///
/// Bytes are pulled one buffer at a time and split by a [`TelegramCodec`], so a configured max
/// size bounds the memory held for a single telegram. After an oversized telegram the reader
/// skips to the next `\r\n` and carries on.
#[derive(Debug)]
pub struct TelegramReader<R> {
    inner: R,
    codec: TelegramCodec,
    buf: BytesMut,
    eof: bool,
}

impl<R: BufRead> TelegramReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_codec(inner, TelegramCodec::new())
    }

    pub fn with_codec(inner: R, codec: TelegramCodec) -> Self {
        TelegramReader {
            inner,
            codec,
            buf: BytesMut::new(),
            eof: false,
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Returns the underlying stream.
    ///
    /// Bytes already taken from it but not yet returned as a telegram are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reads the next telegram.
    ///
    /// Returns `Ok(None)` when the stream ends on a telegram boundary and
    /// [`ParseError::Closed`] when it ends part-way through one.
    pub fn read_telegram(&mut self) -> Result<Option<ByteString>, ParseError> {
        loop {
            if self.eof {
                return self.codec.decode_eof(&mut self.buf);
            }

            if let Some(telegram) = self.codec.decode(&mut self.buf)? {
                return Ok(Some(telegram));
            }

            let chunk = match self.inner.fill_buf() {
                Ok(chunk) => chunk,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };

            if chunk.is_empty() {
                self.eof = true;
                continue;
            }

            let n = chunk.len();
            self.buf.extend_from_slice(chunk);
            self.inner.consume(n);
        }
    }
}

impl<R: BufRead> Iterator for TelegramReader<R> {
    type Item = Result<ByteString, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_telegram().transpose()
    }
}
