//! OSIP telegram transport over TCP.
//!
//! Telegrams are lines of text closed by `\r\n` (see [`osip_codec`]). This crate moves them over
//! TCP: [`Connection`] dials a peer or wraps any async byte stream, [`Listener`] accepts peers,
//! and [`settings`] loads both from a TOML file with environment overrides.
//!
//! Each connection runs inside its own `osip.connection` tracing span carrying a
//! [`ConnectionId`]. No subscriber is installed by this crate.
//!
//! ```no_run
//! use osip::{settings::Settings, Connection};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::parse_toml("./Osip.toml")?;
//!
//! let mut conn = Connection::connect_with_settings(&settings).await?;
//! conn.send("###00160MFC__SYS__00001").await?;
//!
//! while let Some(telegram) = conn.recv().await? {
//!     println!("{telegram}");
//! }
//! # Ok(()) }
//! ```

#![forbid(unsafe_code)]

mod connection;
mod connection_id;
mod error;
mod listener;
pub mod settings;

pub use osip_codec::{
    Charset, Displayed, EncodeError, ParseError, Telegram, TelegramCodec, UnknownCharset,
};

pub use self::connection::Connection;
pub use self::connection_id::ConnectionId;
pub use self::error::OsipError;
pub use self::listener::Listener;
