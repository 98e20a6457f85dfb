/*!
 Errors that can happen when reading, writing, or coercing property list data.

 Every public operation returns a [`plist::PlistError`]. The format readers each keep a
 private error enum that describes what went wrong in terms of their own wire format,
 which is converted into a [`plist::PlistError`] carrying the [`plist::CodingPath`] of the
 value being read when the failure happened.
*/

pub mod binary;
pub mod openstep;
pub mod plist;
pub mod xml;
