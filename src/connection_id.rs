use uuid::Uuid;

/// A unique identifier generated for each OSIP connection.
///
/// It is recorded as `connection_id` on the connection's tracing span, so log lines of one peer
/// can be told apart from another's.
///
/// # Usage
/// ```rust
/// use osip::ConnectionId;
/// use uuid::Uuid;
///
/// fn log_target(id: ConnectionId) -> String {
///     let uuid: Uuid = id.into();
///     format!("osip/{}", uuid)
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::ops::Deref for ConnectionId {
    type Target = Uuid;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<ConnectionId> for Uuid {
    fn from(id: ConnectionId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
