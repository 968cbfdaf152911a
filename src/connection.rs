use std::{fmt, future::Future, net::SocketAddr, time::Duration};

use actix_codec::{AsyncRead, AsyncWrite, Framed};
use bytestring::ByteString;
use futures_util::{SinkExt as _, StreamExt as _};
use osip_codec::{Telegram, TelegramCodec};
use tokio::{
    net::{lookup_host, TcpStream},
    time,
};
use tracing::{field, Instrument as _, Span};

use crate::connection_id::ConnectionId;
use crate::error::OsipError;
use crate::settings::{ConnectionSettings, Settings};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A framed, bidirectional telegram stream to one OSIP peer.
///
/// Every telegram handed to [`send`](Self::send) is written as `text\r\n` and flushed before the
/// call returns. A failed write is reported to the caller and not retried.
pub struct Connection<Io = TcpStream> {
    framed: Framed<Io, TelegramCodec>,
    id: ConnectionId,
    peer: Option<SocketAddr>,
    span: Span,
}

impl Connection<TcpStream> {
    /// Connects to the peer described by `settings`, framing telegrams with `codec`.
    pub async fn connect(
        settings: &ConnectionSettings,
        codec: TelegramCodec,
    ) -> Result<Self, OsipError> {
        let addr = format!("{}:{}", settings.host, settings.port);
        let timeout = settings.connect_timeout.or(DEFAULT_CONNECT_TIMEOUT);

        let stream = within(timeout, async {
            let resolved = lookup_host(addr.as_str()).await?;
            connect_first(&addr, resolved).await
        })
        .await?;

        stream.set_nodelay(settings.nodelay)?;
        let peer = stream.peer_addr().ok();

        Ok(Self::with_peer(stream, codec, peer))
    }

    /// Connects using the connection and codec sections of `settings`.
    pub async fn connect_with_settings(settings: &Settings) -> Result<Self, OsipError> {
        Self::connect(&settings.connection, settings.codec.codec()).await
    }
}

/// Runs `fut`, failing with [`OsipError::Timeout`] once `timeout` has elapsed.
async fn within<T, F>(timeout: Duration, fut: F) -> Result<T, OsipError>
where
    F: Future<Output = Result<T, OsipError>>,
{
    time::timeout(timeout, fut)
        .await
        .map_err(|_| OsipError::Timeout)?
}

/// Tries each resolved address of `addr` in turn and returns the first stream that connects.
async fn connect_first<I>(addr: &str, resolved: I) -> Result<TcpStream, OsipError>
where
    I: IntoIterator<Item = SocketAddr>,
{
    let mut last_err = None;

    for sock_addr in resolved {
        match TcpStream::connect(sock_addr).await {
            Ok(stream) => return Ok(stream),
            Err(err) => {
                tracing::debug!(%sock_addr, error = %err, "connect attempt failed");
                last_err = Some(err);
            }
        }
    }

    Err(match last_err {
        Some(err) => err.into(),
        None => OsipError::Resolve(addr.to_owned()),
    })
}

impl<Io> Connection<Io>
where
    Io: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps an already established byte stream.
    pub fn from_io(io: Io, codec: TelegramCodec) -> Self {
        Self::with_peer(io, codec, None)
    }

    pub(crate) fn with_peer(io: Io, codec: TelegramCodec, peer: Option<SocketAddr>) -> Self {
        let id = ConnectionId::generate();
        let span = tracing::info_span!(
            "osip.connection",
            connection_id = %id,
            peer = field::Empty,
        );
        if let Some(peer) = peer {
            span.record("peer", field::display(peer));
        }
        tracing::debug!(parent: &span, "connection established");

        Connection {
            framed: Framed::new(io, codec),
            id,
            peer,
            span,
        }
    }

    /// Unique id of this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Address of the remote peer, if the stream is a TCP socket.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// The codec framing this connection.
    pub fn codec(&self) -> &TelegramCodec {
        self.framed.codec_ref()
    }

    /// Writes one telegram and flushes it to the socket.
    pub async fn send<T: Telegram>(&mut self, telegram: T) -> Result<(), OsipError> {
        let span = self.span.clone();

        match self.framed.send(telegram).instrument(span.clone()).await {
            Ok(()) => {
                tracing::trace!(parent: &span, "telegram sent");
                Ok(())
            }
            Err(err) => {
                tracing::debug!(parent: &span, error = %err, "telegram not sent");
                Err(err.into())
            }
        }
    }

    /// Waits for the next telegram.
    ///
    /// Returns `Ok(None)` once the peer has closed the stream on a telegram boundary. A stream
    /// closed part-way through a telegram is an error.
    pub async fn recv(&mut self) -> Result<Option<ByteString>, OsipError> {
        let span = self.span.clone();

        match self.framed.next().instrument(span.clone()).await {
            Some(Ok(telegram)) => {
                tracing::trace!(parent: &span, len = telegram.len(), "telegram received");
                Ok(Some(telegram))
            }
            Some(Err(err)) => {
                tracing::debug!(parent: &span, error = %err, "telegram not received");
                Err(err.into())
            }
            None => {
                tracing::debug!(parent: &span, "peer closed connection");
                Ok(None)
            }
        }
    }

    /// Flushes pending output and shuts down the write side of the stream.
    pub async fn close(mut self) -> Result<(), OsipError> {
        let span = self.span.clone();
        futures_util::SinkExt::<&str>::close(&mut self.framed)
            .instrument(span.clone())
            .await?;
        tracing::debug!(parent: &span, "connection closed");
        Ok(())
    }
}

impl<Io> fmt::Debug for Connection<Io> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .finish()
    }
}
