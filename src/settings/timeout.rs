use std::{fmt, time::Duration};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de;

use super::{AsResult, Error, Parse};

/// A timeout duration in milliseconds or seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeout {
    /// The default timeout. Depends on context.
    Default,

    /// Timeout in milliseconds.
    Milliseconds(u64),

    /// Timeout in seconds.
    Seconds(u64),
}

impl Timeout {
    /// Resolves the timeout, using `default` for [`Timeout::Default`].
    pub fn or(self, default: Duration) -> Duration {
        match self {
            Timeout::Default => default,
            Timeout::Milliseconds(n) => Duration::from_millis(n),
            Timeout::Seconds(n) => Duration::from_secs(n),
        }
    }
}

impl Parse for Timeout {
    fn parse(string: &str) -> AsResult<Self> {
        static FMT: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"^(?P<digits>\d+) (?P<unit>milliseconds|seconds)$")
                .expect("Failed to compile regex: FMT")
        });

        macro_rules! invalid_value {
            ($got:expr) => {
                Err(InvalidValue! {
                    expected: "a string of the format \"N seconds\" or \"N milliseconds\" where N is an integer > 0",
                    got: $got,
                })
            }
        }

        if string == "default" {
            return Ok(Timeout::Default);
        }

        let Some(caps) = FMT.captures(string) else {
            return invalid_value!(string);
        };

        match (caps["digits"].parse(), &caps["unit"]) {
            (Ok(0), _) => invalid_value!(string),
            (Ok(n), "milliseconds") => Ok(Timeout::Milliseconds(n)),
            (Ok(n), "seconds") => Ok(Timeout::Seconds(n)),
            _ => invalid_value!(string),
        }
    }
}

impl<'de> de::Deserialize<'de> for Timeout {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct TimeoutVisitor;

        impl de::Visitor<'_> for TimeoutVisitor {
            type Value = Timeout;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(
                    "Either \"default\" or a string of the format \"N seconds\" or \"N milliseconds\" where N is an integer > 0",
                )
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                match Timeout::parse(value) {
                    Ok(timeout) => Ok(timeout),
                    Err(Error::InvalidValue { expected, got, .. }) => Err(
                        de::Error::invalid_value(de::Unexpected::Str(&got), &expected),
                    ),
                    Err(err) => Err(de::Error::custom(err)),
                }
            }
        }

        deserializer.deserialize_string(TimeoutVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_units() {
        assert_eq!(Timeout::parse("default").unwrap(), Timeout::Default);
        assert_eq!(Timeout::parse("5 seconds").unwrap(), Timeout::Seconds(5));
        assert_eq!(
            Timeout::parse("250 milliseconds").unwrap(),
            Timeout::Milliseconds(250)
        );
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["", "5", "5 minutes", "0 seconds", "-1 seconds", "5  seconds"] {
            assert!(
                matches!(Timeout::parse(bad), Err(Error::InvalidValue { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn resolves_default() {
        let fallback = Duration::from_secs(3);
        assert_eq!(Timeout::Default.or(fallback), fallback);
        assert_eq!(Timeout::Seconds(1).or(fallback), Duration::from_secs(1));
        assert_eq!(
            Timeout::Milliseconds(20).or(fallback),
            Duration::from_millis(20)
        );
    }
}
