/*!
 Contains logic to read and write binary property lists (`bplist00`).

 ## Overview

 A binary property list is a flat table of marshaled objects. Containers refer to their
 children by index into that table, so a single object may be referenced many times. The
 file is laid out as:

 - An 8 byte header, `bplist00`
 - The object table
 - An offset table, mapping each object index to its position in the file
 - A 32 byte trailer that describes the widths and positions of the tables

 ## Decoding

 Shared references are expanded into independent copies, so the decoded
 [`Value`](crate::value::Value) tree never aliases. Every bound in the file is validated before
 it is used, and the expansion is limited by [`DecodeOptions`](crate::util::options::DecodeOptions).

 ## Encoding

 The writer assigns objects in pre-order. Equal scalars, dictionary keys included, share one
 object; arrays and dictionaries are always written out separately.
*/

pub mod reader;
mod tests;
pub mod writer;

/// The magic bytes every binary property list starts with
pub(crate) const MAGIC: &[u8; 6] = b"bplist";
/// The full header written by the encoder
const HEADER: &[u8; 8] = b"bplist00";
/// The size of the header that precedes the object table
const HEADER_LEN: usize = 8;
/// The size of the trailer at the end of the file
const TRAILER_LEN: usize = 32;

/// Marker for `false`
const FALSE: u8 = 0x08;
/// Marker for `true`
const TRUE: u8 = 0x09;
/// Marker for an 8 byte IEEE 754 date, in seconds since 2001-01-01T00:00:00Z
const DATE: u8 = 0x33;
/// Marker for a 4 byte IEEE 754 real
const REAL_32: u8 = 0x22;
/// Marker for an 8 byte IEEE 754 real
const REAL_64: u8 = 0x23;

/// High nibble of an integer marker; the low nibble is the base 2 log of the width
const KIND_INTEGER: u8 = 0x1;
/// High nibble of a real marker
const KIND_REAL: u8 = 0x2;
/// High nibble of a data marker
const KIND_DATA: u8 = 0x4;
/// High nibble of a single byte string marker
const KIND_ASCII_STRING: u8 = 0x5;
/// High nibble of a UTF-16BE string marker
const KIND_UTF16_STRING: u8 = 0x6;
/// High nibble of a UID marker; the low nibble is one less than the width
const KIND_UID: u8 = 0x8;
/// High nibble of an array marker
const KIND_ARRAY: u8 = 0xA;
/// High nibble of a set marker, which is read as an array
const KIND_SET: u8 = 0xC;
/// High nibble of a dictionary marker
const KIND_DICTIONARY: u8 = 0xD;

/// A low nibble that indicates the object's count follows the marker as an integer object
const EXTENDED_COUNT: u8 = 0xF;

pub use reader::BinaryPlistReader;
pub use writer::BinaryPlistWriter;
