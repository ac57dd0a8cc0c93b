use smol_str::SmolStr;
use snafu::Snafu;

#[derive(Debug, Snafu)]
pub struct Error(error::Error);
type Result<T> = std::result::Result<T, Error>;

/// A PDF name object.
///
/// Names are atomic identifiers written as `/` followed by a sequence of
/// regular characters. Characters outside printable ASCII, delimiters and
/// `#` itself travel as `#xx` hex escapes; the stored form is always the
/// unescaped one.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub struct Name {
    data: SmolStr,
}

impl Name {
    /// Resolves `#xx` escapes in an encoded name body (without the
    /// leading `/`).
    ///
    /// # Errors
    /// Fails on an escape that runs past the end of the input or carries
    /// a non-hexadecimal digit.
    pub fn decode(raw: &str) -> Result<Self> {
        let bytes = raw.as_bytes();
        let mut data = Vec::with_capacity(bytes.len());
        let mut position = 0;

        while position < bytes.len() {
            if bytes[position] == b'#' {
                if position + 2 >= bytes.len() {
                    return Err(error::Error::TruncatedEscape {
                        name: raw.to_string(),
                    }
                    .into());
                }

                let high = hex_value(bytes[position + 1], raw)?;
                let low = hex_value(bytes[position + 2], raw)?;
                data.push(high << 4 | low);
                position += 3;
            } else {
                data.push(bytes[position]);
                position += 1;
            }
        }

        Ok(Self {
            data: SmolStr::from(String::from_utf8_lossy(&data)),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.data
    }
}

fn hex_value(digit: u8, name: &str) -> Result<u8> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        _ => Err(error::Error::InvalidHexDigit {
            digit: digit as char,
            name: name.to_string(),
        }
        .into()),
    }
}

impl<T: std::convert::Into<SmolStr>> From<T> for Name {
    fn from(value: T) -> Self {
        Self { data: value.into() }
    }
}

impl std::ops::Deref for Name {
    type Target = SmolStr;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

mod error {
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)), context(suffix(false)))]
    pub(super) enum Error {
        #[snafu(display("Name `{name}` ends inside a #-escape"))]
        TruncatedEscape { name: String },

        #[snafu(display("Invalid hex digit `{digit}` in name `{name}`"))]
        InvalidHexDigit { digit: char, name: String },
    }
}
