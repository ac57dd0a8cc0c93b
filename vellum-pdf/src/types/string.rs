use snafu::Snafu;

#[derive(Debug, Snafu)]
pub struct Error(error::Error);
type Result<T> = std::result::Result<T, Error>;

/// String values according to the PDF 2.0 specification.
///
/// PDF knows two string forms:
/// - Literal strings, written in parentheses `(content)` with
///   backslash escapes for `\`, `(`, `)` and control characters
/// - Hexadecimal strings, written in angle brackets `<48656C>`
///
/// Both forms carry raw bytes; the distinction only changes how the
/// bytes are spelled in the file. "Text" strings are literal strings
/// whose payload starts with the UTF-16BE byte-order marker.
#[derive(Debug, PartialEq, Clone)]
pub enum PdfString {
    /// A literal string, stored unescaped.
    Literal(Vec<u8>),
    /// A hexadecimal string, stored as decoded bytes.
    Hexadecimal(Vec<u8>),
}

impl PdfString {
    /// Builds a text string: the UTF-16BE byte-order marker followed by
    /// the big-endian UTF-16 code units of `value`.
    pub fn text(value: &str) -> Self {
        let mut data = Vec::with_capacity(2 + value.len() * 2);
        data.extend_from_slice(&[0xFE, 0xFF]);

        for unit in value.encode_utf16() {
            data.extend_from_slice(&unit.to_be_bytes());
        }

        PdfString::Literal(data)
    }

    /// Decodes the digits of a hexadecimal string body (without the
    /// angle brackets). ASCII whitespace between digits is ignored; an
    /// odd digit count is padded with a trailing zero, so `<486>` reads
    /// as `<4860>`.
    ///
    /// # Errors
    /// Fails on any non-hexadecimal, non-whitespace character.
    pub fn from_hex(digits: &str) -> Result<Self> {
        let mut data = Vec::with_capacity(digits.len() / 2);
        let mut pending: Option<u8> = None;

        for character in digits.chars() {
            if character.is_ascii_whitespace() {
                continue;
            }

            let value = character
                .to_digit(16)
                .ok_or_else(|| Error::from(error::Error::InvalidHexDigit { digit: character }))?
                as u8;

            match pending.take() {
                Some(high) => data.push(high << 4 | value),
                None => pending = Some(value),
            }
        }

        if let Some(high) = pending {
            data.push(high << 4);
        }

        Ok(PdfString::Hexadecimal(data))
    }

    /// The raw byte payload, independent of the spelled form.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PdfString::Literal(data) => data.as_slice(),
            PdfString::Hexadecimal(data) => data.as_slice(),
        }
    }
}

impl From<&str> for PdfString {
    fn from(value: &str) -> Self {
        PdfString::Literal(value.as_bytes().to_vec())
    }
}

impl From<String> for PdfString {
    fn from(value: String) -> Self {
        PdfString::Literal(value.into_bytes())
    }
}

impl From<Vec<u8>> for PdfString {
    fn from(value: Vec<u8>) -> Self {
        PdfString::Literal(value)
    }
}

mod error {
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)), context(suffix(false)))]
    pub(super) enum Error {
        #[snafu(display("Invalid hex digit `{digit}` in hexadecimal string"))]
        InvalidHexDigit { digit: char },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[snafu::report]
    #[test]
    fn hex_decoding() -> Result<()> {
        // Test 1: even digit count
        let string = PdfString::from_hex("48656C6C6F")?;
        assert_eq!(string.as_bytes(), b"Hello");

        // Test 2: odd digit count is zero-padded on the right
        let string = PdfString::from_hex("486")?;
        assert_eq!(string, PdfString::from_hex("4860")?);
        assert_eq!(string.as_bytes(), &[0x48, 0x60]);

        // Test 3: whitespace between digits is ignored
        let string = PdfString::from_hex("4F60 597D")?;
        assert_eq!(string.as_bytes(), &[0x4F, 0x60, 0x59, 0x7D]);

        Ok(())
    }

    #[test]
    fn hex_rejects_bad_digits() {
        assert!(PdfString::from_hex("48zz").is_err());
    }

    #[test]
    fn text_strings_carry_the_bom() {
        let string = PdfString::text("Hi");
        assert_eq!(string.as_bytes(), &[0xFE, 0xFF, 0x00, b'H', 0x00, b'i']);

        // Non-ASCII code points become big-endian UTF-16 pairs.
        let string = PdfString::text("€");
        assert_eq!(string.as_bytes(), &[0xFE, 0xFF, 0x20, 0xAC]);
    }
}
