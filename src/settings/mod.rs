//! Connection, listener and codec settings, read from a TOML file and environment variables.
//!
//! ```
//! use osip::settings::Settings;
//!
//! # fn inner() -> Result<(), osip::settings::Error> {
//! let mut settings = Settings::from_default_template();
//!
//! // If `$OSIP__PORT` is set, its value overrides the port from the file:
//! Settings::override_field_with_env_var(&mut settings.connection.port, "OSIP__PORT")?;
//! # Ok(()) }
//! ```

use std::{
    env,
    fs::File,
    io::{Read as _, Write as _},
    path::Path,
};

use osip_codec::{Charset, TelegramCodec};
use serde::Deserialize;

#[macro_use]
mod error;
mod parse;
mod timeout;

pub use self::error::Error;
pub use self::parse::Parse;
pub use self::timeout::Timeout;

/// Convenience type alias for `Result<T, Error>`.
pub(crate) type AsResult<T> = std::result::Result<T, Error>;

/// All OSIP transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct Settings {
    /// Outbound connection settings.
    pub connection: ConnectionSettings,

    /// Inbound listener settings.
    pub listener: ListenerSettings,

    /// Telegram framing settings, shared by both directions.
    pub codec: CodecSettings,
}

/// Where and how to connect to an OSIP peer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConnectionSettings {
    /// Host name or IP address of the peer.
    pub host: String,

    /// TCP port of the peer.
    pub port: u16,

    /// Timeout for establishing the TCP connection.
    pub connect_timeout: Timeout,

    /// True if `TCP_NODELAY` should be set on the socket.
    pub nodelay: bool,
}

/// Where to accept OSIP peers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ListenerSettings {
    /// Address to bind to.
    pub host: String,

    /// Port to bind to; `0` picks a free one.
    pub port: u16,
}

/// Telegram framing limits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CodecSettings {
    /// Largest telegram body in bytes; `0` is unlimited.
    pub max_size: usize,

    /// Character set telegram bodies are restricted to.
    pub charset: Charset,
}

impl CodecSettings {
    /// Builds a codec honoring these settings.
    pub fn codec(&self) -> TelegramCodec {
        TelegramCodec::new()
            .max_size(self.max_size)
            .charset(self.charset)
    }
}

impl Settings {
    /// Default settings file contents.
    pub(crate) const DEFAULT_TOML_TEMPLATE: &'static str = include_str!("./defaults.toml");

    /// Parse an instance of `Self` from a TOML file located at `filepath`.
    ///
    /// If the file doesn't exist, it is generated from the default TOML template, after which the
    /// newly generated file is read in and parsed.
    pub fn parse_toml<P>(filepath: P) -> AsResult<Self>
    where
        P: AsRef<Path>,
    {
        let filepath = filepath.as_ref();

        if !filepath.exists() {
            Self::write_toml_file(filepath)?;
        }

        let mut f = File::open(filepath)?;
        let len_guess = f.metadata().map(|md| md.len()).unwrap_or(128);

        let mut contents = String::with_capacity(len_guess as usize);
        f.read_to_string(&mut contents)?;

        Self::from_template(&contents)
    }

    /// Parse an instance of `Self` straight from the default TOML template.
    pub fn from_default_template() -> Self {
        Self::from_template(Self::DEFAULT_TOML_TEMPLATE).unwrap()
    }

    /// Parse an instance of `Self` from a TOML string.
    pub fn from_template(template: &str) -> AsResult<Self> {
        Ok(toml::from_str(template)?)
    }

    /// Writes the default TOML template to a new file, located at `filepath`.
    ///
    /// # Errors
    ///
    /// Returns a [`FileExists`](Error::FileExists) error if a file already exists at that
    /// location.
    pub fn write_toml_file<P>(filepath: P) -> AsResult<()>
    where
        P: AsRef<Path>,
    {
        let filepath = filepath.as_ref();

        if filepath.exists() {
            return Err(Error::FileExists(filepath.to_path_buf()));
        }

        let mut file = File::create(filepath)?;
        file.write_all(Self::DEFAULT_TOML_TEMPLATE.trim().as_bytes())?;
        file.flush()?;

        Ok(())
    }

    /// Attempts to parse `value` and override the referenced `field`.
    ///
    /// ```
    /// use osip::settings::Settings;
    /// use osip_codec::Charset;
    ///
    /// # fn inner() -> Result<(), osip::settings::Error> {
    /// let mut settings = Settings::from_default_template();
    /// assert_eq!(settings.codec.charset, Charset::Utf8);
    ///
    /// Settings::override_field(&mut settings.codec.charset, "ascii")?;
    /// assert_eq!(settings.codec.charset, Charset::Ascii);
    /// # Ok(()) }
    /// ```
    pub fn override_field<F, V>(field: &mut F, value: V) -> AsResult<()>
    where
        F: Parse,
        V: AsRef<str>,
    {
        *field = F::parse(value.as_ref())?;
        Ok(())
    }

    /// Attempts to read an environment variable, parse it, and override the referenced `field`.
    ///
    /// A variable that is not set leaves `field` untouched.
    pub fn override_field_with_env_var<F, N>(field: &mut F, var_name: N) -> AsResult<()>
    where
        F: Parse,
        N: AsRef<str>,
    {
        match env::var(var_name.as_ref()) {
            Err(env::VarError::NotPresent) => Ok((/*NOP*/)),
            Err(var_error) => Err(Error::from(var_error)),
            Ok(value) => Self::override_field(field, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn scratch_file() -> std::path::PathBuf {
        env::temp_dir().join(format!("osip-{}.toml", uuid::Uuid::new_v4()))
    }

    #[test]
    fn default_template() {
        let settings = Settings::from_default_template();

        assert_eq!(settings.connection.host, "127.0.0.1");
        assert_eq!(settings.connection.port, 30001);
        assert_eq!(settings.connection.connect_timeout, Timeout::Default);
        assert!(settings.connection.nodelay);
        assert_eq!(settings.listener.host, "0.0.0.0");
        assert_eq!(settings.codec.max_size, 0);
        assert_eq!(settings.codec.charset, Charset::Utf8);
    }

    #[test]
    fn from_template_with_custom_values() {
        let settings = Settings::from_template(
            r#"
            [connection]
            host = "plc-01.local"
            port = 4000
            connect-timeout = "750 milliseconds"
            nodelay = false

            [listener]
            host = "127.0.0.1"
            port = 0

            [codec]
            max-size = 1024
            charset = "ascii"
            "#,
        )
        .unwrap();

        assert_eq!(settings.connection.host, "plc-01.local");
        assert_eq!(
            settings.connection.connect_timeout.or(Duration::ZERO),
            Duration::from_millis(750)
        );
        assert!(!settings.connection.nodelay);

        let codec = settings.codec.codec();
        assert_eq!(codec.get_max_size(), 1024);
        assert_eq!(codec.get_charset(), Charset::Ascii);
    }

    #[test]
    fn from_template_rejects_bad_timeout() {
        let template = Settings::DEFAULT_TOML_TEMPLATE
            .replace(r#"connect-timeout = "default""#, r#"connect-timeout = "soon""#);

        assert!(matches!(
            Settings::from_template(&template),
            Err(Error::TomlError(_))
        ));
    }

    #[test]
    fn parse_toml_writes_missing_file() {
        let path = scratch_file();

        let settings = Settings::parse_toml(&path).unwrap();
        assert_eq!(settings, Settings::from_default_template());
        assert!(path.exists());

        assert!(matches!(
            Settings::write_toml_file(&path),
            Err(Error::FileExists(_))
        ));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn override_field_port() {
        let mut settings = Settings::from_default_template();
        Settings::override_field(&mut settings.connection.port, "4711").unwrap();
        assert_eq!(settings.connection.port, 4711);

        assert!(Settings::override_field(&mut settings.connection.port, "port").is_err());
        assert_eq!(settings.connection.port, 4711);
    }

    #[test]
    fn override_field_with_env_var_timeout() {
        let mut settings = Settings::from_default_template();

        Settings::override_field_with_env_var(
            &mut settings.connection.connect_timeout,
            "OSIP_TEST__UNSET_TIMEOUT",
        )
        .unwrap();
        assert_eq!(settings.connection.connect_timeout, Timeout::Default);

        std::env::set_var("OSIP_TEST__CONNECT_TIMEOUT", "2 seconds");
        Settings::override_field_with_env_var(
            &mut settings.connection.connect_timeout,
            "OSIP_TEST__CONNECT_TIMEOUT",
        )
        .unwrap();
        assert_eq!(settings.connection.connect_timeout, Timeout::Seconds(2));
    }
}
