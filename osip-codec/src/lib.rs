//! OSIP telegram codec.
//!
//! An OSIP telegram is a line of text closed by `\r\n`. This crate turns application messages
//! into such frames and splits inbound byte streams back into telegram bodies, either through
//! [`TelegramCodec`] for framed async I/O or through [`TelegramSerializer`] and
//! [`TelegramReader`] for blocking streams.
//!
//! ```
//! use actix_codec::{Decoder as _, Encoder as _};
//! use bytes::BytesMut;
//! use osip_codec::TelegramCodec;
//!
//! let mut codec = TelegramCodec::new();
//! let mut buf = BytesMut::new();
//!
//! codec.encode("###00160MFC__SYS__00001", &mut buf).unwrap();
//! assert_eq!(&buf[..], b"###00160MFC__SYS__00001\r\n");
//!
//! let telegram = codec.decode(&mut buf).unwrap().unwrap();
//! assert_eq!(telegram, "###00160MFC__SYS__00001");
//! ```

#![forbid(unsafe_code)]

mod codec;
mod error;
mod io;
mod telegram;

pub use self::codec::{Charset, TelegramCodec, TERMINATOR};
pub use self::error::{EncodeError, ParseError, UnknownCharset};
pub use self::io::{TelegramReader, TelegramSerializer};
pub use self::telegram::{Displayed, Telegram};
