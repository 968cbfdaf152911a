use std::{env::VarError, io, num::ParseIntError, path::PathBuf, str::ParseBoolError};

use derive_more::{Display, Error as DeriveError};
use toml::de::Error as TomlError;

/// Failure to load, write or override the OSIP [`Settings`](super::Settings).
#[derive(Debug, Display, DeriveError)]
pub enum Error {
    /// Override variable is set but its value is not unicode.
    #[display("cannot read OSIP override variable: {_0}")]
    EnvVarError(VarError),

    /// Refused to overwrite an existing settings file.
    #[display("settings file already exists: {}", _0.display())]
    FileExists(#[error(not(source))] PathBuf),

    /// A setting has a value outside what the transport accepts.
    #[allow(missing_docs)]
    #[display("invalid OSIP setting: expected {expected}, got {got} ({file}:{line}:{column})")]
    InvalidValue {
        expected: &'static str,
        got: String,
        file: &'static str,
        line: u32,
        column: u32,
    },

    /// Reading or writing the settings file failed.
    #[display("settings file I/O failed: {_0}")]
    IoError(io::Error),

    /// Flag such as `nodelay` is not `true` or `false`.
    #[display("invalid flag value: {_0}")]
    ParseBoolError(ParseBoolError),

    /// Port, size or timeout is not a valid number.
    #[display("invalid numeric setting: {_0}")]
    ParseIntError(ParseIntError),

    /// Settings file is not valid TOML or does not match the expected sections.
    #[display("malformed settings file: {_0}")]
    TomlError(TomlError),
}

macro_rules! InvalidValue {
    (expected: $expected:expr, got: $got:expr,) => {
        crate::settings::Error::InvalidValue {
            expected: $expected,
            got: $got.to_string(),
            file: file!(),
            line: line!(),
            column: column!(),
        }
    };
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::IoError(err)
    }
}

impl From<ParseBoolError> for Error {
    fn from(err: ParseBoolError) -> Self {
        Self::ParseBoolError(err)
    }
}

impl From<ParseIntError> for Error {
    fn from(err: ParseIntError) -> Self {
        Self::ParseIntError(err)
    }
}

impl From<TomlError> for Error {
    fn from(err: TomlError) -> Self {
        Self::TomlError(err)
    }
}

impl From<VarError> for Error {
    fn from(err: VarError) -> Self {
        Self::EnvVarError(err)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::FileExists(_) => io::Error::new(io::ErrorKind::AlreadyExists, err.to_string()),
            Error::IoError(io_error) => io_error,
            _ => io::Error::new(io::ErrorKind::InvalidInput, err.to_string()),
        }
    }
}
