/*!
 Contains logic to parse an XML property list into a [`Value`] tree.

 The reader works on text that has already been converted to UTF-8. Markup is always ASCII, so
 the reader walks bytes and only slices the text between markup.
*/

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use tracing::trace;

use crate::{
    error::{
        plist::{CodingPath, PlistError},
        xml::XmlPlistError,
    },
    formats::xml::{encoding::transcode, Tag, UID_KEY},
    util::options::DecodeOptions,
    value::{
        date::Date, dictionary::Dictionary, integer::Integer, real::Real, uid::Uid, Value,
    },
};

/// Base64 as written inside of `<data>`, where padding is optional
const DATA_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Named entities and the characters they stand for, without the leading `&`
const ENTITIES: [(&[u8], char); 5] = [
    (b"lt;", '<'),
    (b"gt;", '>'),
    (b"amp;", '&'),
    (b"apos;", '\''),
    (b"quot;", '"'),
];

/// The most digits a numeric character reference may have
const MAX_REFERENCE_DIGITS: usize = 8;

/// Whitespace between markup
fn is_xml_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

/// Contains logic and data used to parse data from an XML property list
#[derive(Debug)]
pub struct XmlPlistReader<'a> {
    /// The property list we want to parse
    text: &'a str,
    /// The bytes of `text`
    stream: &'a [u8],
    /// Index of the next byte to read
    idx: usize,
    /// Limits applied while reading nested elements
    options: DecodeOptions,
    /// Number of containers currently open
    depth: usize,
    /// Location of the value being read
    path: CodingPath,
}

impl<'a> XmlPlistReader<'a> {
    pub fn new(text: &'a str, options: DecodeOptions) -> Self {
        Self {
            text,
            stream: text.as_bytes(),
            idx: 0,
            options,
            depth: 0,
            path: CodingPath::root(),
        }
    }

    /// The 1-based line that `idx` falls on
    fn line_at(&self, idx: usize) -> usize {
        let end = idx.min(self.stream.len());
        self.stream[..end].iter().filter(|byte| **byte == b'\n').count() + 1
    }

    fn line(&self) -> usize {
        self.line_at(self.idx)
    }

    fn peek(&self) -> Option<u8> {
        self.stream.get(self.idx).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.stream.get(self.idx + offset).copied()
    }

    fn starts_with(&self, literal: &[u8]) -> bool {
        self.stream
            .get(self.idx..)
            .is_some_and(|rest| rest.starts_with(literal))
    }

    /// Position of the next occurrence of `needle` at or after `idx`
    fn find(&self, needle: &[u8]) -> Option<usize> {
        self.stream
            .get(self.idx..)?
            .windows(needle.len())
            .position(|window| window == needle)
            .map(|position| position + self.idx)
    }

    /// The character starting at `idx`, for error messages
    fn current_char(&self) -> char {
        self.text
            .get(self.idx..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn slice(&self, start: usize, end: usize) -> Result<&'a str, XmlPlistError> {
        self.text.get(start..end).ok_or(XmlPlistError::CannotConvert)
    }

    fn unexpected(&self, context: &'static str) -> XmlPlistError {
        XmlPlistError::UnexpectedCharacter(self.current_char(), self.line(), context)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_xml_whitespace) {
            self.idx += 1;
        }
    }

    /// Skip a `<?...?>` processing instruction, starting at the `?`
    fn skip_processing_instruction(&mut self) -> Result<(), XmlPlistError> {
        match self.find(b"?>") {
            Some(end) => {
                self.idx = end + 2;
                Ok(())
            }
            None => Err(XmlPlistError::UnexpectedEndOfFile(Some(
                "while parsing a processing instruction",
            ))),
        }
    }

    /// Skip a `<!-- ... -->` comment, starting at the `!`
    fn skip_comment(&mut self) -> Result<(), XmlPlistError> {
        let start = self.idx;
        self.idx += 3;
        match self.find(b"-->") {
            Some(end) => {
                self.idx = end + 3;
                Ok(())
            }
            None => Err(XmlPlistError::UnterminatedComment(self.line_at(start))),
        }
    }

    /// Skip a `<!DOCTYPE ...>` declaration, starting at the `!`
    fn skip_document_type(&mut self) -> Result<(), XmlPlistError> {
        if !self.starts_with(b"!DOCTYPE") {
            return Err(XmlPlistError::InvalidDocumentType(self.line()));
        }
        while let Some(byte) = self.peek() {
            match byte {
                b'>' => {
                    self.idx += 1;
                    return Ok(());
                }
                // Internal subsets are not supported
                b'[' => return Err(XmlPlistError::InvalidDocumentType(self.line())),
                _ => self.idx += 1,
            }
        }
        Err(XmlPlistError::UnexpectedEndOfFile(Some(
            "while parsing the DOCTYPE",
        )))
    }

    /// Read the name of an open tag, starting right after the `<`
    ///
    /// Returns the tag and whether it closed itself with `/>`.
    fn read_open_tag(&mut self) -> Result<(Tag, bool), XmlPlistError> {
        let start = self.idx;
        while let Some(byte) = self.peek() {
            if is_xml_whitespace(byte) || byte == b'>' || byte == b'/' {
                break;
            }
            self.idx += 1;
        }
        if self.idx == start {
            return Err(XmlPlistError::MalformedTag(self.line()));
        }

        let name = &self.stream[start..self.idx];
        let tag = Tag::from_name(name).ok_or_else(|| {
            XmlPlistError::UnknownTag(String::from_utf8_lossy(name).into_owned(), self.line())
        })?;

        // Only the root element carries attributes
        if tag == Tag::Plist {
            return match self.find(b">") {
                Some(end) => {
                    self.idx = end + 1;
                    Ok((tag, self.stream[end - 1] == b'/'))
                }
                None => Err(XmlPlistError::UnexpectedEndOfFile(Some(
                    "while reading a tag",
                ))),
            };
        }

        self.skip_whitespace();
        match (self.peek(), self.peek_at(1)) {
            (Some(b'>'), _) => {
                self.idx += 1;
                Ok((tag, false))
            }
            (Some(b'/'), Some(b'>')) => {
                self.idx += 2;
                Ok((tag, true))
            }
            (None, _) | (Some(b'/'), None) => Err(XmlPlistError::UnexpectedEndOfFile(Some(
                "while reading a tag",
            ))),
            _ => Err(XmlPlistError::MalformedTag(self.line())),
        }
    }

    /// Consume `</name>` for `tag`, allowing whitespace before the `>`
    fn check_close_tag(&mut self, tag: Tag) -> Result<(), XmlPlistError> {
        if !self.starts_with(b"</") {
            return match self.peek() {
                None => Err(XmlPlistError::UnexpectedEndOfFile(Some(
                    "while looking for a close tag",
                ))),
                Some(_) => Err(self.unexpected("while looking for close tag")),
            };
        }
        self.idx += 2;
        if !self.starts_with(tag.name().as_bytes()) {
            return Err(XmlPlistError::MismatchedCloseTag(tag.name(), self.line()));
        }
        self.idx += tag.name().len();
        self.skip_whitespace();
        match self.peek() {
            Some(b'>') => {
                self.idx += 1;
                Ok(())
            }
            Some(_) => Err(self.unexpected("while looking for close tag")),
            None => Err(XmlPlistError::UnexpectedEndOfFile(Some(
                "while looking for a close tag",
            ))),
        }
    }

    /// Skip to the next element inside of a container
    ///
    /// Returns `true` positioned after the `<` of an open tag, or `false` positioned at the `<`
    /// of the container's close tag.
    fn next_element(&mut self) -> Result<bool, XmlPlistError> {
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'<') => {}
                Some(_) => return Err(self.unexpected("while looking for open tag")),
                None => {
                    return Err(XmlPlistError::UnexpectedEndOfFile(Some(
                        "while looking for a close tag",
                    )))
                }
            }
            match self.peek_at(1) {
                Some(b'?') => {
                    self.idx += 1;
                    self.skip_processing_instruction()?;
                }
                Some(b'!') if self.starts_with(b"<!--") => {
                    self.idx += 1;
                    self.skip_comment()?;
                }
                Some(b'!') => {
                    self.idx += 1;
                    return Err(self.unexpected("while looking for open tag"));
                }
                Some(b'/') => return Ok(false),
                Some(_) => {
                    self.idx += 1;
                    return Ok(true);
                }
                None => return Err(XmlPlistError::UnexpectedEndOfFile(None)),
            }
        }
    }

    fn enter(&mut self) -> Result<(), XmlPlistError> {
        if self.depth >= self.options.max_depth {
            return Err(XmlPlistError::TooDeep(self.line()));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Read the element whose open tag starts right after the `<` at `idx`
    fn read_element(&mut self) -> Result<Value, XmlPlistError> {
        let (tag, is_empty) = self.read_open_tag()?;
        trace!("Reading <{}>", tag.name());

        match tag {
            Tag::Plist if is_empty => {
                Err(XmlPlistError::UnexpectedEmptyTag(tag.name(), self.line()))
            }
            Tag::Plist => {
                self.enter()?;
                let value = self.read_plist()?;
                self.leave();
                Ok(value)
            }
            Tag::Array if is_empty => Ok(Value::Array(vec![])),
            Tag::Array => self.read_array(),
            Tag::Dict if is_empty => Ok(Value::Dictionary(Dictionary::new())),
            Tag::Dict => self.read_dictionary(),
            // A key in value position is read as a string
            Tag::Key | Tag::String if is_empty => Ok(Value::String(String::new())),
            Tag::Key | Tag::String => {
                let text = self.read_text()?;
                self.check_close_tag(tag)?;
                Ok(Value::String(text))
            }
            Tag::True | Tag::False => {
                if !is_empty {
                    self.read_through_close_tag(tag)?;
                }
                Ok(Value::Boolean(tag == Tag::True))
            }
            Tag::Data | Tag::Date | Tag::Real | Tag::Integer if is_empty => {
                Err(XmlPlistError::UnexpectedEmptyTag(tag.name(), self.line()))
            }
            Tag::Data | Tag::Date | Tag::Real | Tag::Integer => {
                let start = self.idx;
                let content = self.read_through_close_tag(tag)?;
                let line = || self.line_at(start);
                match tag {
                    Tag::Data => parse_data(content)
                        .map(Value::Data)
                        .ok_or_else(|| XmlPlistError::InvalidData(line())),
                    Tag::Date => parse_date(content)
                        .map(Value::Date)
                        .ok_or_else(|| XmlPlistError::InvalidDate(line())),
                    Tag::Real => parse_real(content)
                        .map(Value::Real)
                        .ok_or_else(|| XmlPlistError::InvalidReal(line())),
                    _ => parse_integer(content)
                        .map(Value::Integer)
                        .ok_or_else(|| XmlPlistError::InvalidInteger(line())),
                }
            }
        }
    }

    fn read_plist(&mut self) -> Result<Value, XmlPlistError> {
        if !self.next_element()? {
            return Err(XmlPlistError::UnexpectedEmptyTag(
                Tag::Plist.name(),
                self.line(),
            ));
        }
        let value = self.read_element()?;
        if self.next_element()? {
            return Err(XmlPlistError::ExtraElement(self.line()));
        }
        self.check_close_tag(Tag::Plist)?;
        Ok(value)
    }

    fn read_array(&mut self) -> Result<Value, XmlPlistError> {
        self.enter()?;
        let mut items = vec![];
        while self.next_element()? {
            self.path.push(items.len());
            let item = self.read_element()?;
            self.path.pop();
            items.push(item);
        }
        self.check_close_tag(Tag::Array)?;
        self.leave();
        Ok(Value::Array(items))
    }

    fn read_dictionary(&mut self) -> Result<Value, XmlPlistError> {
        self.enter()?;
        let mut dictionary = Dictionary::new();
        while self.next_element()? {
            let key = self.read_key()?;
            self.path.push(key.as_str());
            if !self.next_element()? {
                return Err(XmlPlistError::MissingValue(self.line()));
            }
            let value = self.read_element()?;
            self.path.pop();
            dictionary.insert(key, value);
        }
        self.check_close_tag(Tag::Dict)?;
        self.leave();
        Ok(as_uid(dictionary))
    }

    fn read_key(&mut self) -> Result<String, XmlPlistError> {
        let start = self.idx;
        let (tag, is_empty) = self.read_open_tag()?;
        if tag != Tag::Key {
            return Err(XmlPlistError::NonKeyInDictionary(self.line_at(start)));
        }
        if is_empty {
            return Ok(String::new());
        }
        let key = self.read_text()?;
        self.check_close_tag(tag)?;
        Ok(key)
    }

    /// Read the text content of a `<string>` or `<key>`, stopping at the close tag
    fn read_text(&mut self) -> Result<String, XmlPlistError> {
        let mut text = String::new();
        loop {
            let start = self.idx;
            while let Some(byte) = self.peek() {
                if byte == b'<' || byte == b'&' {
                    break;
                }
                self.idx += 1;
            }
            text.push_str(self.slice(start, self.idx)?);

            match self.peek() {
                None => {
                    return Err(XmlPlistError::UnexpectedEndOfFile(Some(
                        "while reading a string",
                    )))
                }
                Some(b'&') => text.push(self.read_entity()?),
                _ if self.starts_with(b"<![CDATA[") => self.read_cdata(&mut text)?,
                _ if self.starts_with(b"<!--") => {
                    self.idx += 1;
                    self.skip_comment()?;
                }
                _ if self.starts_with(b"<!") => {
                    return Err(XmlPlistError::InvalidCdata(self.line()))
                }
                _ => return Ok(text),
            }
        }
    }

    /// Append the raw contents of a `<![CDATA[ ... ]]>` section
    fn read_cdata(&mut self, text: &mut String) -> Result<(), XmlPlistError> {
        self.idx += b"<![CDATA[".len();
        let end = self
            .find(b"]]>")
            .ok_or(XmlPlistError::UnexpectedEndOfFile(Some(
                "while reading a CDATA section",
            )))?;
        text.push_str(self.slice(self.idx, end)?);
        self.idx = end + 3;
        Ok(())
    }

    /// Read a named entity or a numeric character reference, starting at the `&`
    fn read_entity(&mut self) -> Result<char, XmlPlistError> {
        self.idx += 1;
        for (name, replacement) in ENTITIES {
            if self.starts_with(name) {
                self.idx += name.len();
                return Ok(replacement);
            }
        }
        if self.peek() != Some(b'#') {
            return Err(XmlPlistError::UnknownEscape(self.line()));
        }
        self.idx += 1;

        let (radix, context) = match self.peek() {
            Some(b'x') => {
                self.idx += 1;
                (16, "while parsing hexadecimal entity")
            }
            _ => (10, "while parsing decimal entity"),
        };

        let mut scalar: u32 = 0;
        let mut digits = 0;
        loop {
            match self.peek() {
                Some(b';') => {
                    self.idx += 1;
                    break;
                }
                Some(byte) => {
                    let digit = char::from(byte)
                        .to_digit(radix)
                        .ok_or_else(|| self.unexpected(context))?;
                    digits += 1;
                    if digits > MAX_REFERENCE_DIGITS {
                        return Err(XmlPlistError::InvalidCharacterReference(
                            self.line(),
                            "too many digits",
                        ));
                    }
                    scalar = scalar * radix + digit;
                    self.idx += 1;
                }
                None => {
                    return Err(XmlPlistError::UnexpectedEndOfFile(Some(
                        "while parsing a character reference",
                    )))
                }
            }
        }

        char::from_u32(scalar).ok_or_else(|| {
            XmlPlistError::InvalidCharacterReference(self.line(), "not a Unicode scalar value")
        })
    }

    /// Read the raw content of a leaf element and consume its close tag
    fn read_through_close_tag(&mut self, tag: Tag) -> Result<&'a str, XmlPlistError> {
        let start = self.idx;
        self.idx = self
            .find(b"<")
            .ok_or(XmlPlistError::UnexpectedEndOfFile(Some(
                "while looking for a close tag",
            )))?;
        let content = self.slice(start, self.idx)?;
        self.check_close_tag(tag)?;
        Ok(content)
    }

    /// Everything after the root element must be whitespace, comments or processing instructions
    fn check_trailing(&mut self) -> Result<(), XmlPlistError> {
        loop {
            self.skip_whitespace();
            if self.peek().is_none() {
                return Ok(());
            }
            if self.starts_with(b"<?") {
                self.idx += 1;
                self.skip_processing_instruction()?;
            } else if self.starts_with(b"<!--") {
                self.idx += 1;
                self.skip_comment()?;
            } else {
                return Err(XmlPlistError::JunkAfterPlist(self.line()));
            }
        }
    }

    fn read_document(&mut self) -> Result<Value, XmlPlistError> {
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'<') => self.idx += 1,
                Some(_) => return Err(self.unexpected("while looking for open tag")),
                None => return Err(XmlPlistError::NoContent),
            }
            match self.peek() {
                Some(b'?') => self.skip_processing_instruction()?,
                Some(b'!') if self.starts_with(b"!--") => self.skip_comment()?,
                Some(b'!') => self.skip_document_type()?,
                Some(_) => break,
                None => return Err(XmlPlistError::UnexpectedEndOfFile(None)),
            }
        }

        // Only a nested <plist> counts toward the nesting limit
        let start = self.idx;
        let value = match self.read_open_tag()? {
            (Tag::Plist, false) => self.read_plist()?,
            _ => {
                self.idx = start;
                self.read_element()?
            }
        };
        self.check_trailing()?;
        Ok(value)
    }

    /// Parse the whole document into a [`Value`] tree
    pub fn parse(mut self) -> Result<Value, PlistError> {
        self.read_document()
            .map_err(|why| why.at(self.path.clone()))
    }
}

impl<'a> From<&'a str> for XmlPlistReader<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text, DecodeOptions::default())
    }
}

/// A dictionary holding only a non-negative `CF$UID` integer is a UID
fn as_uid(dictionary: Dictionary) -> Value {
    if dictionary.len() == 1 {
        if let Some(Value::Integer(integer)) = dictionary.get(UID_KEY) {
            if let Ok(bits) = u64::try_from(integer.bits()) {
                if !integer.is_negative() {
                    return Value::Uid(Uid::new(bits));
                }
            }
        }
    }
    Value::Dictionary(dictionary)
}

/// Whitespace inside `<integer>`, which includes control and Latin-1 filler characters
fn is_integer_whitespace(ch: char) -> bool {
    let point = u32::from(ch);
    point < 0x21 || (0x7F..=0xA0).contains(&point) || ch.is_whitespace()
}

fn parse_integer(content: &str) -> Option<Integer> {
    let rest = content.trim_start_matches(is_integer_whitespace);
    let (negative, rest) = match rest.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, rest.strip_prefix('+').unwrap_or(rest)),
    };
    let rest = rest.trim_start_matches(is_integer_whitespace);
    let (radix, digits) = match rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        Some(hex) => (16, hex),
        None => (10, rest),
    };
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_digit(radix)) {
        return None;
    }

    let magnitude = u64::from_str_radix(digits, radix).ok()?;
    if negative {
        i64::try_from(-i128::from(magnitude))
            .ok()
            .map(Integer::from)
    } else {
        Some(Integer::from(magnitude))
    }
}

fn count_digits(bytes: &[u8], start: usize) -> usize {
    bytes
        .get(start..)
        .map_or(0, |rest| rest.iter().take_while(|byte| byte.is_ascii_digit()).count())
}

/// Whether `text` is exactly `[+-]?(digits[.digits*] | .digits)([eE][+-]?digits)?`
fn is_decimal_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut pos = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    let whole = count_digits(bytes, pos);
    pos += whole;
    let mut fraction = 0;
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        fraction = count_digits(bytes, pos);
        pos += fraction;
    }
    if whole == 0 && fraction == 0 {
        return false;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        pos += 1;
        if matches!(bytes.get(pos), Some(b'+' | b'-')) {
            pos += 1;
        }
        let exponent = count_digits(bytes, pos);
        if exponent == 0 {
            return false;
        }
        pos += exponent;
    }
    pos == bytes.len()
}

fn parse_real(content: &str) -> Option<Real> {
    let text = content.trim_start_matches(|ch: char| {
        matches!(ch, ' ' | '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r')
    });

    let special = match text.to_ascii_lowercase().as_str() {
        "nan" => Some(f64::NAN),
        "inf" | "infinity" | "+inf" | "+infinity" => Some(f64::INFINITY),
        "-inf" | "-infinity" => Some(f64::NEG_INFINITY),
        _ => None,
    };
    if let Some(value) = special {
        return Some(Real::F64(value));
    }

    // Also rejects hexadecimal floats
    if !is_decimal_literal(text) {
        return None;
    }
    text.parse::<f64>().ok().map(Real::F64)
}

/// Read exactly two decimal digits at `pos`
fn two_digits(bytes: &[u8], pos: usize) -> Option<u32> {
    match bytes.get(pos..pos + 2)? {
        [tens @ b'0'..=b'9', ones @ b'0'..=b'9'] => {
            Some(u32::from(tens - b'0') * 10 + u32::from(ones - b'0'))
        }
        _ => None,
    }
}

/// Parse `[-]YYYY-MM-DDTHH:MM:SSZ`, where the year may have any number of digits
fn parse_date(content: &str) -> Option<Date> {
    let bytes = content.as_bytes();
    let mut pos = 0;
    let negative = match bytes.first() {
        Some(b'-') => {
            pos += 1;
            true
        }
        // Years past 9999 are written with a sign
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let mut year: i64 = 0;
    while let Some(byte @ b'0'..=b'9') = bytes.get(pos) {
        year = year.checked_mul(10)?.checked_add(i64::from(byte - b'0'))?;
        pos += 1;
    }

    let mut fields = [0u32; 5];
    for (field, separator) in fields.iter_mut().zip([b'-', b'-', b'T', b':', b':']) {
        if bytes.get(pos) != Some(&separator) {
            return None;
        }
        *field = two_digits(bytes, pos + 1)?;
        pos += 3;
    }
    if bytes.get(pos) != Some(&b'Z') || pos + 1 != bytes.len() {
        return None;
    }

    let [month, day, hour, minute, second] = fields;
    let year = if negative { -year } else { year };
    Date::from_components(year, month, day, hour, minute, second)
}

fn parse_data(content: &str) -> Option<Vec<u8>> {
    let compact: Vec<u8> = content
        .bytes()
        .filter(|byte| !byte.is_ascii_whitespace())
        .collect();
    DATA_ENGINE.decode(compact).ok()
}

/// Parse an XML property list with the default [`DecodeOptions`], detecting its text encoding
pub fn parse(stream: &[u8]) -> Result<Value, PlistError> {
    parse_with_options(stream, DecodeOptions::default())
}

/// Parse an XML property list, detecting its text encoding
pub fn parse_with_options(stream: &[u8], options: DecodeOptions) -> Result<Value, PlistError> {
    let (text, encoding) = transcode(stream).map_err(|why| why.at(CodingPath::root()))?;
    trace!("Reading XML property list encoded as {encoding}");
    XmlPlistReader::new(&text, options).parse()
}
