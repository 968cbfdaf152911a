use std::{io, net::SocketAddr};

use osip_codec::TelegramCodec;
use tokio::net::{TcpListener, TcpStream};

use crate::connection::Connection;
use crate::error::OsipError;
use crate::settings::{ListenerSettings, Settings};

/// Accepts OSIP peers on a TCP socket.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    codec: TelegramCodec,
}

impl Listener {
    /// Binds to the address in `settings`; accepted connections are framed with `codec`.
    pub async fn bind(settings: &ListenerSettings, codec: TelegramCodec) -> Result<Self, OsipError> {
        let inner = TcpListener::bind((settings.host.as_str(), settings.port)).await?;
        tracing::info!(addr = ?inner.local_addr().ok(), "osip listener bound");
        Ok(Listener { inner, codec })
    }

    /// Binds using the listener and codec sections of `settings`.
    pub async fn bind_with_settings(settings: &Settings) -> Result<Self, OsipError> {
        Self::bind(&settings.listener, settings.codec.codec()).await
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Waits for the next peer.
    pub async fn accept(&self) -> Result<Connection<TcpStream>, OsipError> {
        let (stream, peer) = self.inner.accept().await?;
        Ok(Connection::with_peer(stream, self.codec.clone(), Some(peer)))
    }
}
