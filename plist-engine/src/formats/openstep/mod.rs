/*!
 OpenStep (ASCII) property lists, the text format that predates XML property lists.

 ## Overview

 - `{ key = value; }` is a dictionary
 - `( a, b )` is an array
 - `"text"`, `'text'` or a bare word is a string
 - `<0fbd 7777>` is data

 Everything else, such as numbers, booleans and dates, is read as a string. `//` and `/* */`
 comments may appear anywhere whitespace is allowed.

 A document that is a bare list of `key = value;` pairs with no enclosing braces, as found in
 `.strings` files, is read as a dictionary.

 This format is read only.
*/

pub mod charset;
pub mod reader;

pub use reader::OpenStepReader;
