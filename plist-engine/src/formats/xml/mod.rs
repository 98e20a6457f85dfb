/*!
 XML property lists, as described by the `PropertyList-1.0.dtd` document type.

 ## Overview

 An XML property list is a `<plist>` element holding exactly one value element. Containers are
 `<array>` and `<dict>`, where a dictionary alternates `<key>` elements with values. Leaves are
 `<string>`, `<integer>`, `<real>`, `<true/>`, `<false/>`, `<date>` and base64 `<data>`.

 XML has no UID element, so keyed archives write a UID as a dictionary holding a single
 `CF$UID` integer. The reader turns those dictionaries back into [`Uid`](crate::value::uid::Uid)s.

 ## Decoding

 Text is first converted to UTF-8 by [`encoding::transcode`], then read by [`XmlPlistReader`].

 ## Encoding

 [`XmlPlistWriter`] always emits UTF-8, indenting nested elements with tabs.
*/

pub mod encoding;
pub mod reader;
pub mod writer;

pub use reader::XmlPlistReader;
pub use writer::XmlPlistWriter;

/// The key of the single entry in a dictionary that stands for a UID
pub(crate) const UID_KEY: &str = "CF$UID";

/// Element names understood by the reader and emitted by the writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tag {
    Plist,
    Array,
    Dict,
    Key,
    String,
    Data,
    Date,
    Real,
    Integer,
    True,
    False,
}

impl Tag {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Tag::Plist => "plist",
            Tag::Array => "array",
            Tag::Dict => "dict",
            Tag::Key => "key",
            Tag::String => "string",
            Tag::Data => "data",
            Tag::Date => "date",
            Tag::Real => "real",
            Tag::Integer => "integer",
            Tag::True => "true",
            Tag::False => "false",
        }
    }

    pub(crate) fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"plist" => Some(Tag::Plist),
            b"array" => Some(Tag::Array),
            b"dict" => Some(Tag::Dict),
            b"key" => Some(Tag::Key),
            b"string" => Some(Tag::String),
            b"data" => Some(Tag::Data),
            b"date" => Some(Tag::Date),
            b"real" => Some(Tag::Real),
            b"integer" => Some(Tag::Integer),
            b"true" => Some(Tag::True),
            b"false" => Some(Tag::False),
            _ => None,
        }
    }
}
