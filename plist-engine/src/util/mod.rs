/*!
 This module defines common utilities used across the property list formats.
*/

pub mod coercion;
pub mod options;
