/*!
 Contains logic to serialize a [`Value`] tree as a binary property list.
*/

use std::collections::HashMap;

use crate::{
    error::plist::{CodingPath, PlistError},
    formats::binary::{
        DATE, EXTENDED_COUNT, FALSE, HEADER, KIND_ARRAY, KIND_ASCII_STRING, KIND_DATA,
        KIND_DICTIONARY, KIND_INTEGER, KIND_UID, KIND_UTF16_STRING, REAL_32, REAL_64, TRUE,
    },
    util::options::DEFAULT_MAX_DEPTH,
    value::{integer::Integer, real::Real, uid::Uid, Value},
};

/// A single entry in the object table, with containers pointing at their children by index
#[derive(Debug)]
enum Object {
    /// A scalar, already encoded
    Leaf(Vec<u8>),
    Array(Vec<usize>),
    Dictionary(Vec<usize>, Vec<usize>),
}

/// The number of bytes needed to store `value`, as one of 1, 2, 4, or 8
fn bytes_needed(value: usize) -> usize {
    usize::from(Integer::minimal_width(value as u64))
}

/// Append the low `width` bytes of `value` in big-endian order
fn write_sized(out: &mut Vec<u8>, value: u128, width: usize) {
    out.extend_from_slice(&value.to_be_bytes()[16 - width..]);
}

/// Write a marker for a variable length object, spilling large counts into an integer object
fn write_marker(out: &mut Vec<u8>, kind: u8, count: usize) {
    if count < usize::from(EXTENDED_COUNT) {
        out.push(kind << 4 | count as u8);
    } else {
        out.push(kind << 4 | EXTENDED_COUNT);
        write_integer(out, &Integer::from(count as u64));
    }
}

fn write_integer(out: &mut Vec<u8>, integer: &Integer) {
    if integer.is_negative() {
        out.push(KIND_INTEGER << 4 | 3);
        write_sized(out, integer.bits(), 8);
    } else if integer.bits() <= i64::MAX as u128 {
        let width = Integer::minimal_width(integer.bits() as u64);
        out.push(KIND_INTEGER << 4 | width.trailing_zeros() as u8);
        write_sized(out, integer.bits(), usize::from(width));
    } else {
        out.push(KIND_INTEGER << 4 | 4);
        write_sized(out, integer.bits(), 16);
    }
}

fn encode_string(text: &str) -> Vec<u8> {
    let mut out = vec![];
    if text.is_ascii() {
        write_marker(&mut out, KIND_ASCII_STRING, text.len());
        out.extend_from_slice(text.as_bytes());
    } else {
        let units: Vec<u16> = text.encode_utf16().collect();
        write_marker(&mut out, KIND_UTF16_STRING, units.len());
        units
            .iter()
            .for_each(|unit| out.extend_from_slice(&unit.to_be_bytes()));
    }
    out
}

/// The object table bytes of a scalar value; containers encode to nothing
fn encode_leaf(value: &Value) -> Vec<u8> {
    let mut out = vec![];
    match value {
        Value::Boolean(false) => out.push(FALSE),
        Value::Boolean(true) => out.push(TRUE),
        Value::Integer(integer) => write_integer(&mut out, integer),
        Value::Real(Real::F32(real)) => {
            out.push(REAL_32);
            out.extend_from_slice(&real.to_be_bytes());
        }
        Value::Real(Real::F64(real)) => {
            out.push(REAL_64);
            out.extend_from_slice(&real.to_be_bytes());
        }
        Value::String(text) => return encode_string(text),
        Value::Data(bytes) => {
            write_marker(&mut out, KIND_DATA, bytes.len());
            out.extend_from_slice(bytes);
        }
        Value::Date(date) => {
            out.push(DATE);
            out.extend_from_slice(&date.seconds_since_reference().to_be_bytes());
        }
        Value::Uid(uid) => {
            let width = Uid::minimal_width(uid.get());
            out.push(KIND_UID << 4 | (width - 1));
            write_sized(&mut out, uid.get(), usize::from(width));
        }
        Value::Array(_) | Value::Dictionary(_) => {}
    }
    out
}

/// Contains logic and data used to serialize a [`Value`] tree into a binary property list
#[derive(Debug)]
pub struct BinaryPlistWriter {
    /// Flattened objects, in the order they are written
    objects: Vec<Object>,
    /// Index of the object holding each distinct encoded scalar
    leaves: HashMap<Vec<u8>, usize>,
    /// Location of the value being flattened
    path: CodingPath,
    /// The deepest nesting of containers that may be written
    max_depth: usize,
}

impl Default for BinaryPlistWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryPlistWriter {
    pub fn new() -> Self {
        Self {
            objects: vec![],
            leaves: HashMap::new(),
            path: CodingPath::root(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Reuse the object for an identical scalar written earlier, or append a new one
    fn intern(&mut self, encoded: Vec<u8>) -> usize {
        if let Some(&object_idx) = self.leaves.get(&encoded) {
            return object_idx;
        }
        let object_idx = self.objects.len();
        self.leaves.insert(encoded.clone(), object_idx);
        self.objects.push(Object::Leaf(encoded));
        object_idx
    }

    /// Assign object indices in pre-order, returning the index of `value`
    fn flatten(&mut self, value: &Value, depth: usize) -> Result<usize, PlistError> {
        let object_idx = self.objects.len();
        match value {
            Value::Array(items) => {
                self.check_depth(depth)?;
                self.objects.push(Object::Array(vec![]));
                let mut refs = Vec::with_capacity(items.len());
                for (position, item) in items.iter().enumerate() {
                    self.path.push(position);
                    refs.push(self.flatten(item, depth + 1)?);
                    self.path.pop();
                }
                self.objects[object_idx] = Object::Array(refs);
                Ok(object_idx)
            }
            Value::Dictionary(dictionary) => {
                self.check_depth(depth)?;
                self.objects.push(Object::Dictionary(vec![], vec![]));
                let key_refs = dictionary
                    .keys()
                    .map(|key| self.intern(encode_string(key)))
                    .collect();
                let mut value_refs = Vec::with_capacity(dictionary.len());
                for (key, item) in dictionary.iter() {
                    self.path.push(key.as_str());
                    value_refs.push(self.flatten(item, depth + 1)?);
                    self.path.pop();
                }
                self.objects[object_idx] = Object::Dictionary(key_refs, value_refs);
                Ok(object_idx)
            }
            leaf => Ok(self.intern(encode_leaf(leaf))),
        }
    }

    fn check_depth(&self, depth: usize) -> Result<(), PlistError> {
        if depth >= self.max_depth {
            return Err(PlistError::InvalidValue(
                self.path.clone(),
                format!(
                    "Too many nested arrays or dictionaries (more than {})",
                    self.max_depth
                ),
            ));
        }
        Ok(())
    }

    fn write_object(out: &mut Vec<u8>, object: &Object, ref_size: usize) {
        match object {
            Object::Leaf(encoded) => out.extend_from_slice(encoded),
            Object::Array(refs) => {
                write_marker(out, KIND_ARRAY, refs.len());
                refs.iter()
                    .for_each(|reference| write_sized(out, *reference as u128, ref_size));
            }
            Object::Dictionary(key_refs, value_refs) => {
                write_marker(out, KIND_DICTIONARY, key_refs.len());
                key_refs
                    .iter()
                    .chain(value_refs)
                    .for_each(|reference| write_sized(out, *reference as u128, ref_size));
            }
        }
    }

    /// Serialize `value` and everything beneath it
    pub fn write(mut self, value: &Value) -> Result<Vec<u8>, PlistError> {
        self.flatten(value, 0)?;

        let object_count = self.objects.len();
        let ref_size = bytes_needed(object_count - 1);

        let mut out = HEADER.to_vec();
        let mut offsets = Vec::with_capacity(object_count);
        for object in &self.objects {
            offsets.push(out.len());
            Self::write_object(&mut out, object, ref_size);
        }

        let offset_table_start = out.len();
        let offset_int_size = bytes_needed(offset_table_start);
        offsets
            .iter()
            .for_each(|offset| write_sized(&mut out, *offset as u128, offset_int_size));

        out.extend_from_slice(&[0; 6]);
        out.push(offset_int_size as u8);
        out.push(ref_size as u8);
        out.extend_from_slice(&(object_count as u64).to_be_bytes());
        out.extend_from_slice(&0u64.to_be_bytes());
        out.extend_from_slice(&(offset_table_start as u64).to_be_bytes());

        Ok(out)
    }
}

/// Serialize a [`Value`] tree as a binary property list
pub fn write(value: &Value) -> Result<Vec<u8>, PlistError> {
    BinaryPlistWriter::new().write(value)
}
