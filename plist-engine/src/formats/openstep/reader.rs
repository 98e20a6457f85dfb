/*!
 Contains logic to parse an OpenStep property list into a [`Value`] tree.
*/

use tracing::trace;

use crate::{
    error::{
        openstep::OpenStepError,
        plist::{CodingPath, PlistError},
    },
    formats::openstep::charset::from_nextstep,
    util::options::DecodeOptions,
    value::{dictionary::Dictionary, Value},
};

const TAB: u16 = 0x09;
const LINE_FEED: u16 = 0x0A;
const VERTICAL_TAB: u16 = 0x0B;
const FORM_FEED: u16 = 0x0C;
const CARRIAGE_RETURN: u16 = 0x0D;
const SPACE: u16 = 0x20;
const LINE_SEPARATOR: u16 = 0x2028;
const PARAGRAPH_SEPARATOR: u16 = 0x2029;

/// The ASCII code unit for `ch`
const fn unit(ch: u8) -> u16 {
    ch as u16
}

/// Characters that may appear in a string without quotes
fn is_unquoted(ch: u16) -> bool {
    matches!(
        ch,
        0x61..=0x7A | 0x41..=0x5A | 0x30..=0x39 | 0x5F | 0x24 | 0x2F | 0x3A | 0x2E | 0x2D
    )
}

fn is_surrogate(ch: u16) -> bool {
    (0xD800..=0xDFFF).contains(&ch)
}

fn hex_value(ch: u16) -> Option<u8> {
    let byte = u8::try_from(ch).ok()?;
    char::from(byte)
        .to_digit(16)
        .and_then(|digit| u8::try_from(digit).ok())
}

/// Contains logic and data used to parse an OpenStep property list
#[derive(Debug)]
pub struct OpenStepReader<'a> {
    /// The UTF-16 code units of the document
    stream: &'a [u16],
    /// The current index we are at in the stream
    idx: usize,
    /// Limits applied while reading
    options: DecodeOptions,
    /// Number of containers currently open
    depth: usize,
    /// Location of the value being read
    path: CodingPath,
}

impl<'a> OpenStepReader<'a> {
    pub fn new(stream: &'a [u16], options: DecodeOptions) -> Self {
        Self {
            stream,
            idx: 0,
            options,
            depth: 0,
            path: CodingPath::root(),
        }
    }

    /// The 1-based line of `idx`, where `\r\n` ends a single line
    fn line_at(&self, idx: usize) -> usize {
        let end = idx.min(self.stream.len());
        let mut line = 1;
        let mut pos = 0;
        while pos < end {
            match self.stream[pos] {
                CARRIAGE_RETURN => {
                    line += 1;
                    if pos + 1 < end && self.stream[pos + 1] == LINE_FEED {
                        pos += 1;
                    }
                }
                LINE_FEED => line += 1,
                _ => {}
            }
            pos += 1;
        }
        line
    }

    fn line(&self) -> usize {
        self.line_at(self.idx)
    }

    fn peek(&self) -> Option<u16> {
        self.stream.get(self.idx).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u16> {
        self.stream.get(self.idx + offset).copied()
    }

    /// Skip whitespace and comments, returning whether anything is left to read
    fn skip_whitespace(&mut self) -> Result<bool, OpenStepError> {
        while let Some(ch) = self.peek() {
            match ch {
                TAB | LINE_FEED | VERTICAL_TAB | FORM_FEED | CARRIAGE_RETURN | SPACE
                | LINE_SEPARATOR | PARAGRAPH_SEPARATOR => self.idx += 1,
                ch if ch == unit(b'/') => match self.peek_at(1) {
                    Some(next) if next == unit(b'/') => self.skip_line_comment(),
                    Some(next) if next == unit(b'*') => self.skip_block_comment()?,
                    _ => return Ok(true),
                },
                _ => return Ok(true),
            }
        }
        Ok(false)
    }

    /// Skip a `//` comment, leaving the line terminator in place
    fn skip_line_comment(&mut self) {
        self.idx += 2;
        while let Some(ch) = self.peek() {
            if matches!(
                ch,
                LINE_FEED | CARRIAGE_RETURN | LINE_SEPARATOR | PARAGRAPH_SEPARATOR
            ) {
                break;
            }
            self.idx += 1;
        }
    }

    /// Skip a `/* */` comment, which does not nest
    fn skip_block_comment(&mut self) -> Result<(), OpenStepError> {
        let start = self.idx;
        self.idx += 2;
        while let Some(ch) = self.peek() {
            self.idx += 1;
            if ch == unit(b'*') && self.peek() == Some(unit(b'/')) {
                self.idx += 1;
                return Ok(());
            }
        }
        Err(OpenStepError::UnterminatedComment(self.line_at(start)))
    }

    fn enter(&mut self) -> Result<(), OpenStepError> {
        if self.depth >= self.options.max_depth {
            return Err(OpenStepError::TooDeep(self.line()));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Read the next value, or `None` if the next character cannot start one
    ///
    /// When `required` is set, a missing value is an error instead.
    fn read_object(&mut self, required: bool) -> Result<Option<Value>, OpenStepError> {
        if !self.skip_whitespace()? {
            if required {
                return Err(OpenStepError::UnexpectedEof("plist"));
            }
            return Ok(None);
        }

        let ch = match self.peek() {
            Some(ch) => ch,
            None => return Ok(None),
        };
        let value = match ch {
            ch if ch == unit(b'{') => {
                self.idx += 1;
                self.enter()?;
                let dictionary = self.read_dictionary()?;
                self.leave();
                Value::Dictionary(dictionary)
            }
            ch if ch == unit(b'(') => {
                self.idx += 1;
                self.enter()?;
                let array = self.read_array()?;
                self.leave();
                Value::Array(array)
            }
            ch if ch == unit(b'<') => {
                self.idx += 1;
                Value::Data(self.read_data()?)
            }
            ch if ch == unit(b'"') || ch == unit(b'\'') => {
                self.idx += 1;
                Value::String(self.read_quoted_string(ch)?)
            }
            ch if is_unquoted(ch) => Value::String(self.read_unquoted_string()?),
            ch => {
                if required {
                    return Err(OpenStepError::UnexpectedCharacter(ch, self.line()));
                }
                return Ok(None);
            }
        };
        Ok(Some(value))
    }

    /// Read a quoted or unquoted string, or `None` if there isn't one
    fn read_string(&mut self) -> Result<Option<String>, OpenStepError> {
        if !self.skip_whitespace()? {
            return Ok(None);
        }
        match self.peek() {
            Some(quote) if quote == unit(b'"') || quote == unit(b'\'') => {
                self.idx += 1;
                self.read_quoted_string(quote).map(Some)
            }
            Some(ch) if is_unquoted(ch) => self.read_unquoted_string().map(Some),
            _ => Ok(None),
        }
    }

    /// Read `key = value;` pairs until something that is not a key is found
    ///
    /// The `;` after the last pair may be left out before a `}` or the end of input.
    fn read_dictionary_content(&mut self) -> Result<Dictionary, OpenStepError> {
        let mut dictionary = Dictionary::new();

        while let Some(key) = self.read_string()? {
            if !self.skip_whitespace()? {
                return Err(OpenStepError::MissingSemicolon(self.line()));
            }

            let value = match self.peek() {
                // Strings file shorthand, `key;` means `key = key;`
                Some(ch) if ch == unit(b';') => Value::String(key.clone()),
                Some(ch) if ch == unit(b'=') => {
                    self.idx += 1;
                    self.path.push(key.as_str());
                    let value = self.read_object(true)?;
                    self.path.pop();
                    match value {
                        Some(value) => value,
                        None => return Err(OpenStepError::UnexpectedEof("plist")),
                    }
                }
                _ => return Err(OpenStepError::ExpectedSeparator(self.line())),
            };
            dictionary.insert(key, value);

            if !self.skip_whitespace()? {
                break;
            }
            match self.peek() {
                Some(ch) if ch == unit(b';') => self.idx += 1,
                Some(ch) if ch == unit(b'}') => break,
                _ => return Err(OpenStepError::MissingSemicolon(self.line())),
            }
        }

        Ok(dictionary)
    }

    fn read_dictionary(&mut self) -> Result<Dictionary, OpenStepError> {
        let dictionary = self.read_dictionary_content()?;
        if !self.skip_whitespace()? || self.peek() != Some(unit(b'}')) {
            return Err(OpenStepError::UnterminatedDictionary(self.line()));
        }
        self.idx += 1;
        Ok(dictionary)
    }

    fn read_array(&mut self) -> Result<Vec<Value>, OpenStepError> {
        let mut array = vec![];

        loop {
            self.path.push(array.len());
            let item = self.read_object(false)?;
            self.path.pop();

            let Some(item) = item else {
                break;
            };
            array.push(item);

            if !self.skip_whitespace()? {
                return Err(OpenStepError::UnterminatedArray(self.line()));
            }
            if self.peek() != Some(unit(b',')) {
                break;
            }
            self.idx += 1;
        }

        if !self.skip_whitespace()? || self.peek() != Some(unit(b')')) {
            return Err(OpenStepError::UnterminatedArray(self.line()));
        }
        self.idx += 1;
        Ok(array)
    }

    /// Read hex digit pairs up to the closing `>`
    fn read_data(&mut self) -> Result<Vec<u8>, OpenStepError> {
        let mut bytes = vec![];

        while let Some(ch) = self.peek() {
            if ch == unit(b'>') {
                self.idx += 1;
                return Ok(bytes);
            }
            if let Some(high) = hex_value(ch) {
                self.idx += 1;
                let low = self
                    .peek()
                    .and_then(hex_value)
                    .ok_or_else(|| OpenStepError::UnevenData(self.line()))?;
                self.idx += 1;
                bytes.push((high << 4) | low);
            } else if matches!(
                ch,
                SPACE | LINE_FEED | CARRIAGE_RETURN | LINE_SEPARATOR | PARAGRAPH_SEPARATOR
            ) {
                self.idx += 1;
            } else {
                return Err(OpenStepError::InvalidHex(self.line()));
            }
        }

        Err(OpenStepError::UnterminatedData(self.line()))
    }

    fn read_unquoted_string(&mut self) -> Result<String, OpenStepError> {
        let start = self.idx;
        while self.peek().is_some_and(is_unquoted) {
            self.idx += 1;
        }
        if start == self.idx {
            return Err(OpenStepError::UnexpectedEof("string"));
        }
        String::from_utf16(&self.stream[start..self.idx])
            .map_err(|_| OpenStepError::InvalidEscape(self.line_at(start)))
    }

    /// Read up to and including the closing `quote`; the opening quote is already consumed
    fn read_quoted_string(&mut self, quote: u16) -> Result<String, OpenStepError> {
        let start = self.idx;
        let mut units = vec![];

        loop {
            match self.peek() {
                None => return Err(OpenStepError::UnterminatedString(self.line_at(start))),
                Some(ch) if ch == quote => {
                    self.idx += 1;
                    break;
                }
                Some(ch) if ch == unit(b'\\') => {
                    self.idx += 1;
                    units.push(self.read_escape()?);
                }
                Some(ch) => {
                    units.push(ch);
                    self.idx += 1;
                }
            }
        }

        String::from_utf16(&units).map_err(|_| OpenStepError::InvalidEscape(self.line()))
    }

    /// Read the character after a backslash
    fn read_escape(&mut self) -> Result<u16, OpenStepError> {
        let ch = self
            .peek()
            .ok_or_else(|| OpenStepError::UnterminatedEscape(self.line()))?;
        self.idx += 1;

        let escaped = match u8::try_from(ch) {
            Ok(digit @ b'0'..=b'7') => self.read_octal(digit - b'0'),
            Ok(b'U') => self.read_unicode(),
            Ok(b'a') => 0x07,
            Ok(b'b') => 0x08,
            Ok(b'f') => 0x12,
            Ok(b'n') => LINE_FEED,
            Ok(b'r') => CARRIAGE_RETURN,
            Ok(b't') => TAB,
            Ok(b'v') => 0x11,
            _ => ch,
        };

        if is_surrogate(escaped) {
            return Err(OpenStepError::InvalidEscape(self.line()));
        }
        Ok(escaped)
    }

    /// Read up to two more octal digits, truncating the result to a byte
    fn read_octal(&mut self, first: u8) -> u16 {
        let mut value = first;
        for _ in 0..2 {
            match self.peek().and_then(|ch| u8::try_from(ch).ok()) {
                Some(digit @ b'0'..=b'7') => {
                    value = (value << 3).wrapping_add(digit - b'0');
                    self.idx += 1;
                }
                _ => break,
            }
        }
        from_nextstep(value)
    }

    /// Read up to four hex digits of a `\U` escape
    fn read_unicode(&mut self) -> u16 {
        let mut value: u16 = 0;
        for _ in 0..4 {
            match self.peek().and_then(hex_value) {
                Some(digit) => {
                    value = (value << 4) | u16::from(digit);
                    self.idx += 1;
                }
                None => break,
            }
        }
        value
    }

    fn read_document(&mut self) -> Result<Value, OpenStepError> {
        if self.stream.is_empty() {
            return Err(OpenStepError::Empty);
        }
        if !self.skip_whitespace()? {
            return Ok(Value::Dictionary(Dictionary::new()));
        }

        let root = match self.read_object(true)? {
            Some(root) => root,
            None => return Err(OpenStepError::UnexpectedEof("plist")),
        };
        if !self.skip_whitespace()? {
            return Ok(root);
        }

        if !matches!(root, Value::String(_)) {
            return Err(OpenStepError::JunkAfterPlist(self.line()));
        }

        trace!("Reading OpenStep property list as a strings file");
        self.idx = 0;
        let dictionary = self.read_dictionary_content()?;
        if self.skip_whitespace()? {
            return Err(OpenStepError::JunkAfterPlist(self.line()));
        }
        Ok(Value::Dictionary(dictionary))
    }

    /// Parse the whole stream into a [`Value`] tree
    pub fn parse(mut self) -> Result<Value, PlistError> {
        self.read_document()
            .map_err(|why| why.at(self.path.clone()))
    }
}

impl<'a> From<&'a [u16]> for OpenStepReader<'a> {
    fn from(stream: &'a [u16]) -> Self {
        Self::new(stream, DecodeOptions::default())
    }
}

/// Parse OpenStep property list text with the default [`DecodeOptions`]
pub fn parse(stream: &[u16]) -> Result<Value, PlistError> {
    OpenStepReader::from(stream).parse()
}

/// Parse OpenStep property list text, bounded by `options`
pub fn parse_with_options(stream: &[u16], options: DecodeOptions) -> Result<Value, PlistError> {
    OpenStepReader::new(stream, options).parse()
}

/// Parse OpenStep property list text held in a Rust string
pub fn parse_str(text: &str) -> Result<Value, PlistError> {
    let units: Vec<u16> = text.encode_utf16().collect();
    parse(&units)
}
