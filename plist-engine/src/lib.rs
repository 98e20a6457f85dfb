#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub mod error;
pub mod formats;
pub mod util;
pub mod value;

pub use error::plist::{CodingKey, CodingPath, PlistError};
pub use formats::{decode, decode_with_options, detect_format, encode, Format};
pub use util::options::DecodeOptions;
pub use value::{
    date::Date, dictionary::Dictionary, integer::Integer, real::Real, uid::Uid, Value,
};
