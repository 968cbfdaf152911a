//! Echoes every telegram back to the peer that sent it.
//!
//! ```sh
//! RUST_LOG=osip=trace cargo run --example echo
//! printf '###00160MFC__SYS__00001\r\n' | nc 127.0.0.1 30001
//! ```

use osip::{settings::Settings, Listener, OsipError};
use tracing_subscriber::EnvFilter;

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut settings = Settings::from_default_template();
    Settings::override_field_with_env_var(&mut settings.listener.host, "OSIP__LISTENER_HOST")?;
    Settings::override_field_with_env_var(&mut settings.listener.port, "OSIP__LISTENER_PORT")?;

    let listener = Listener::bind_with_settings(&settings)
        .await
        .map_err(std::io::Error::other)?;

    loop {
        let mut conn = match listener.accept().await {
            Ok(conn) => conn,
            Err(err) => {
                tracing::warn!(error = %err, "accept failed");
                continue;
            }
        };

        actix_rt::spawn(async move {
            let res: Result<(), OsipError> = async {
                while let Some(telegram) = conn.recv().await? {
                    conn.send(telegram).await?;
                }
                Ok(())
            }
            .await;

            if let Err(err) = res {
                tracing::warn!(connection_id = %conn.id(), error = %err, "connection dropped");
            }
        });
    }
}
