use std::str::FromStr;

use osip_codec::Charset;

use super::{AsResult, Error};

/// A specialized `FromStr` trait that returns settings [`Error`]s.
pub trait Parse: Sized {
    /// Parse `Self` from `string`.
    fn parse(string: &str) -> AsResult<Self>;
}

impl Parse for bool {
    fn parse(string: &str) -> AsResult<Self> {
        Self::from_str(string).map_err(Error::from)
    }
}

macro_rules! impl_parse_for_int_type {
    ($($int_type:ty),+ $(,)?) => {
        $(
            impl Parse for $int_type {
                fn parse(string: &str) -> AsResult<Self> {
                    Self::from_str(string).map_err(Error::from)
                }
            }
        )+
    }
}
impl_parse_for_int_type![u8, u16, u32, u64, usize];

impl Parse for String {
    fn parse(string: &str) -> AsResult<Self> {
        Ok(string.to_string())
    }
}

impl Parse for Charset {
    fn parse(string: &str) -> AsResult<Self> {
        Charset::from_str(string).map_err(|_| {
            InvalidValue! {
                expected: "\"utf8\" | \"ascii\"",
                got: string,
            }
        })
    }
}
