/*!
 Contains logic to parse a binary property list into a [`Value`] tree.

 Logic referenced from the public `CFBinaryPList.c` format description.
*/

use tracing::trace;

use crate::{
    error::{
        binary::BinaryPlistError,
        plist::{CodingPath, PlistError},
    },
    formats::binary::{
        DATE, EXTENDED_COUNT, FALSE, HEADER_LEN, KIND_ARRAY, KIND_ASCII_STRING, KIND_DATA,
        KIND_DICTIONARY, KIND_INTEGER, KIND_REAL, KIND_SET, KIND_UID, KIND_UTF16_STRING, MAGIC,
        REAL_32, REAL_64, TRAILER_LEN, TRUE,
    },
    util::options::DecodeOptions,
    value::{date::Date, dictionary::Dictionary, integer::Integer, real::Real, uid::Uid, Value},
};

/// The table layout described by the last 32 bytes of the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
    /// Width of each entry in the offset table
    pub offset_int_size: usize,
    /// Width of each object reference inside of a container
    pub object_ref_size: usize,
    /// Number of objects in the object table
    pub object_count: usize,
    /// Index of the root object
    pub top_object: usize,
    /// Position of the offset table in the file
    pub offset_table_start: usize,
}

/// Read a big-endian unsigned integer of up to 16 bytes
fn read_uint(bytes: &[u8]) -> u128 {
    bytes
        .iter()
        .fold(0, |value, byte| (value << 8) | u128::from(*byte))
}

/// Contains logic and data used to parse data from a binary property list
#[derive(Debug)]
pub struct BinaryPlistReader<'a> {
    /// The property list we want to parse
    stream: &'a [u8],
    /// Limits applied while expanding the object graph
    options: DecodeOptions,
    /// The validated table layout, available once the trailer has been read
    trailer: Option<Trailer>,
    /// Objects on the path from the root to the object being read, used to detect cycles
    visiting: Vec<bool>,
    /// Number of containers currently open
    depth: usize,
    /// Number of values materialized so far
    nodes: usize,
    /// Location of the object being read
    path: CodingPath,
}

impl<'a> BinaryPlistReader<'a> {
    pub fn new(stream: &'a [u8], options: DecodeOptions) -> Self {
        Self {
            stream,
            options,
            trailer: None,
            visiting: vec![],
            depth: 0,
            nodes: 0,
            path: CodingPath::root(),
        }
    }

    /// Read exactly `n` bytes starting at `start`, without crossing into the offset table
    fn read_payload(&self, start: usize, n: usize) -> Result<&'a [u8], BinaryPlistError> {
        let limit = self.object_table_end();
        let end = start
            .checked_add(n)
            .ok_or(BinaryPlistError::OutOfBounds(usize::MAX, limit))?;
        if end > limit {
            return Err(BinaryPlistError::OutOfBounds(end, limit));
        }
        let stream = self.stream;
        stream
            .get(start..end)
            .ok_or(BinaryPlistError::OutOfBounds(end, stream.len()))
    }

    /// Get the byte at a given index, if the index is within the object table
    fn get_byte(&self, byte_idx: usize) -> Result<u8, BinaryPlistError> {
        Ok(self.read_payload(byte_idx, 1)?[0])
    }

    /// The first byte past the object table
    fn object_table_end(&self) -> usize {
        match &self.trailer {
            Some(trailer) => trailer.offset_table_start,
            None => self.stream.len(),
        }
    }

    fn layout(&self) -> Result<Trailer, BinaryPlistError> {
        self.trailer
            .ok_or(BinaryPlistError::InvalidTrailer("the trailer has not been read"))
    }

    /// Ensure the stream starts with the binary property list magic
    fn validate_header(&self) -> Result<(), BinaryPlistError> {
        match self.stream.get(0..MAGIC.len()) {
            Some(magic) if magic == MAGIC => Ok(()),
            _ => Err(BinaryPlistError::InvalidHeader),
        }
    }

    /// Read and validate the trailer, and every bound it implies for the offset table
    fn read_trailer(&mut self) -> Result<Trailer, BinaryPlistError> {
        let len = self.stream.len();
        if len < HEADER_LEN + TRAILER_LEN {
            return Err(BinaryPlistError::InvalidTrailer("the file is too short"));
        }
        let trailer_start = len - TRAILER_LEN;
        let raw = &self.stream[trailer_start..];

        let offset_int_size = usize::from(raw[6]);
        let object_ref_size = usize::from(raw[7]);
        let object_count = read_uint(&raw[8..16]);
        let top_object = read_uint(&raw[16..24]);
        let offset_table_start = read_uint(&raw[24..32]);

        if !matches!(offset_int_size, 1 | 2 | 4 | 8) {
            return Err(BinaryPlistError::InvalidTrailer("invalid offset size"));
        }
        if !matches!(object_ref_size, 1 | 2 | 4 | 8) {
            return Err(BinaryPlistError::InvalidTrailer("invalid object reference size"));
        }
        if object_count == 0 {
            return Err(BinaryPlistError::InvalidTrailer("the object table is empty"));
        }
        if top_object >= object_count {
            return Err(BinaryPlistError::InvalidTrailer(
                "the top object is outside of the object table",
            ));
        }
        if offset_table_start <= HEADER_LEN as u128 || offset_table_start >= trailer_start as u128
        {
            return Err(BinaryPlistError::InvalidTrailer(
                "the offset table starts outside of the file",
            ));
        }

        // All three values are smaller than the file length from here on
        let offset_table_start = offset_table_start as usize;
        let object_count = usize::try_from(object_count)
            .map_err(|_| BinaryPlistError::InvalidTrailer("the object count is too large"))?;
        let top_object = top_object as usize;

        let table_end = object_count
            .checked_mul(offset_int_size)
            .and_then(|table_len| table_len.checked_add(offset_table_start))
            .ok_or(BinaryPlistError::InvalidTrailer("the offset table is too large"))?;
        if table_end > trailer_start {
            return Err(BinaryPlistError::InvalidTrailer(
                "the offset table overlaps the trailer",
            ));
        }
        if object_ref_size < 8 && object_count as u128 > 1 << (8 * object_ref_size) {
            return Err(BinaryPlistError::InvalidTrailer(
                "object references are too narrow for the object count",
            ));
        }

        let trailer = Trailer {
            offset_int_size,
            object_ref_size,
            object_count,
            top_object,
            offset_table_start,
        };
        trace!("Read binary plist trailer: {trailer:?}");
        Ok(trailer)
    }

    /// Find where an object starts by looking it up in the offset table
    fn object_offset(&self, object_idx: usize) -> Result<usize, BinaryPlistError> {
        let trailer = self.layout()?;
        let entry = trailer.offset_table_start + object_idx * trailer.offset_int_size;
        let offset = self
            .stream
            .get(entry..entry + trailer.offset_int_size)
            .map(read_uint)
            .ok_or(BinaryPlistError::OutOfBounds(entry, self.stream.len()))?;

        if offset < HEADER_LEN as u128 || offset >= trailer.offset_table_start as u128 {
            return Err(BinaryPlistError::InvalidOffset(object_idx, offset as u64));
        }
        Ok(offset as usize)
    }

    /// Read the element count of a variable length object
    ///
    /// Returns the count and the position of the first payload byte.
    fn read_count(&self, offset: usize, nibble: u8) -> Result<(usize, usize), BinaryPlistError> {
        if nibble != EXTENDED_COUNT {
            return Ok((usize::from(nibble), offset + 1));
        }

        let marker = self.get_byte(offset + 1)?;
        let width_exponent = marker & 0x0F;
        if marker >> 4 != KIND_INTEGER || width_exponent > 3 {
            return Err(BinaryPlistError::InvalidCount(offset));
        }
        let width = 1 << width_exponent;
        let count = read_uint(self.read_payload(offset + 2, width)?);
        if width == 8 && count > i64::MAX as u128 {
            return Err(BinaryPlistError::InvalidCount(offset));
        }
        let count = usize::try_from(count).map_err(|_| BinaryPlistError::InvalidCount(offset))?;
        Ok((count, offset + 2 + width))
    }

    /// Read a block of object references and ensure each one is in the object table
    fn read_refs(&self, start: usize, count: usize) -> Result<Vec<usize>, BinaryPlistError> {
        let trailer = self.layout()?;
        let len = count
            .checked_mul(trailer.object_ref_size)
            .ok_or(BinaryPlistError::InvalidCount(start))?;
        self.read_payload(start, len)?
            .chunks_exact(trailer.object_ref_size)
            .map(|chunk| {
                let reference = read_uint(chunk);
                if reference >= trailer.object_count as u128 {
                    return Err(BinaryPlistError::InvalidReference(
                        reference as u64,
                        trailer.object_count,
                    ));
                }
                Ok(reference as usize)
            })
            .collect()
    }

    /// Read the object at an index in the object table, expanding any children
    fn read_object(&mut self, object_idx: usize) -> Result<Value, BinaryPlistError> {
        let trailer = self.layout()?;
        if object_idx >= trailer.object_count {
            return Err(BinaryPlistError::InvalidReference(
                object_idx as u64,
                trailer.object_count,
            ));
        }
        if self.visiting[object_idx] {
            return Err(BinaryPlistError::ReferenceCycle(object_idx));
        }
        self.nodes += 1;
        if self.nodes > self.options.max_nodes {
            return Err(BinaryPlistError::TooManyObjects(self.options.max_nodes));
        }

        let offset = self.object_offset(object_idx)?;
        let marker = self.get_byte(offset)?;
        let kind = marker >> 4;
        let nibble = marker & 0x0F;

        match marker {
            0x00 => return Err(BinaryPlistError::UnexpectedNull),
            FALSE => return Ok(Value::Boolean(false)),
            TRUE => return Ok(Value::Boolean(true)),
            DATE => {
                let bytes = self.read_payload(offset + 1, 8)?;
                let seconds =
                    f64::from_be_bytes(bytes.try_into().map_err(BinaryPlistError::SliceError)?);
                return Ok(Value::Date(Date::from_seconds_since_reference(seconds)));
            }
            _ => {}
        }

        match kind {
            KIND_INTEGER if nibble <= 4 => {
                let width = 1usize << nibble;
                let bits = read_uint(self.read_payload(offset + 1, width)?);
                Integer::from_parts(width as u8, width == 8, bits)
                    .map(Value::Integer)
                    .ok_or(BinaryPlistError::InvalidMarker(marker))
            }
            KIND_REAL => match marker {
                REAL_32 => {
                    let bytes = self.read_payload(offset + 1, 4)?;
                    Ok(Value::Real(Real::F32(f32::from_be_bytes(
                        bytes.try_into().map_err(BinaryPlistError::SliceError)?,
                    ))))
                }
                REAL_64 => {
                    let bytes = self.read_payload(offset + 1, 8)?;
                    Ok(Value::Real(Real::F64(f64::from_be_bytes(
                        bytes.try_into().map_err(BinaryPlistError::SliceError)?,
                    ))))
                }
                _ => Err(BinaryPlistError::InvalidMarker(marker)),
            },
            KIND_DATA => {
                let (count, start) = self.read_count(offset, nibble)?;
                Ok(Value::Data(self.read_payload(start, count)?.to_vec()))
            }
            KIND_ASCII_STRING => {
                let (count, start) = self.read_count(offset, nibble)?;
                // Bytes outside of ASCII are read as Latin-1
                Ok(Value::String(
                    self.read_payload(start, count)?
                        .iter()
                        .map(|byte| char::from(*byte))
                        .collect(),
                ))
            }
            KIND_UTF16_STRING => {
                let (count, start) = self.read_count(offset, nibble)?;
                let len = count
                    .checked_mul(2)
                    .ok_or(BinaryPlistError::InvalidCount(offset))?;
                let units: Vec<u16> = self
                    .read_payload(start, len)?
                    .chunks_exact(2)
                    .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16(&units)
                    .map(Value::String)
                    .map_err(BinaryPlistError::StringParseError)
            }
            KIND_UID => {
                let width = usize::from(nibble) + 1;
                let bits = read_uint(self.read_payload(offset + 1, width)?);
                Uid::from_parts(width as u8, bits)
                    .map(Value::Uid)
                    .ok_or(BinaryPlistError::InvalidMarker(marker))
            }
            KIND_ARRAY | KIND_SET => {
                let (count, start) = self.read_count(offset, nibble)?;
                let refs = self.read_refs(start, count)?;
                self.enter(object_idx)?;

                let mut items = Vec::with_capacity(refs.len());
                for (position, reference) in refs.into_iter().enumerate() {
                    self.path.push(position);
                    items.push(self.read_object(reference)?);
                    self.path.pop();
                }

                self.leave(object_idx);
                Ok(Value::Array(items))
            }
            KIND_DICTIONARY => {
                let (count, start) = self.read_count(offset, nibble)?;
                let key_refs = self.read_refs(start, count)?;
                let value_start = start + count * trailer.object_ref_size;
                let value_refs = self.read_refs(value_start, count)?;
                self.enter(object_idx)?;

                let mut dictionary = Dictionary::with_capacity(count);
                for (key_ref, value_ref) in key_refs.into_iter().zip(value_refs) {
                    let key = self.read_key(key_ref)?;
                    self.path.push(key.as_str());
                    let value = self.read_object(value_ref)?;
                    self.path.pop();
                    dictionary.insert(key, value);
                }

                self.leave(object_idx);
                Ok(Value::Dictionary(dictionary))
            }
            _ => Err(BinaryPlistError::InvalidMarker(marker)),
        }
    }

    /// Read a dictionary key, which must be a string object
    fn read_key(&mut self, object_idx: usize) -> Result<String, BinaryPlistError> {
        let offset = self.object_offset(object_idx)?;
        let kind = self.get_byte(offset)? >> 4;
        if kind != KIND_ASCII_STRING && kind != KIND_UTF16_STRING {
            return Err(BinaryPlistError::InvalidDictionaryKey(object_idx));
        }
        match self.read_object(object_idx)? {
            Value::String(key) => Ok(key),
            _ => Err(BinaryPlistError::InvalidDictionaryKey(object_idx)),
        }
    }

    /// Mark a container as open, enforcing the nesting limit
    fn enter(&mut self, object_idx: usize) -> Result<(), BinaryPlistError> {
        if self.depth >= self.options.max_depth {
            return Err(BinaryPlistError::TooDeep(self.options.max_depth));
        }
        self.depth += 1;
        self.visiting[object_idx] = true;
        Ok(())
    }

    fn leave(&mut self, object_idx: usize) {
        self.depth -= 1;
        self.visiting[object_idx] = false;
    }

    /// Parse the whole stream into a [`Value`] tree
    pub fn parse(mut self) -> Result<Value, PlistError> {
        self.validate_header()
            .map_err(|why| why.at(CodingPath::root()))?;
        let trailer = self
            .read_trailer()
            .map_err(|why| why.at(CodingPath::root()))?;
        self.trailer = Some(trailer);
        self.visiting = vec![false; trailer.object_count];

        self.read_object(trailer.top_object)
            .map_err(|why| why.at(self.path.clone()))
    }
}

impl<'a> From<&'a [u8]> for BinaryPlistReader<'a> {
    fn from(stream: &'a [u8]) -> Self {
        Self::new(stream, DecodeOptions::default())
    }
}

/// Parse a binary property list with the default [`DecodeOptions`]
pub fn parse(stream: &[u8]) -> Result<Value, PlistError> {
    BinaryPlistReader::from(stream).parse()
}
