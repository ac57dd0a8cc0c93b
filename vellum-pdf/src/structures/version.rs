use std::io::Write;

use snafu::Snafu;

use crate::writer::Sink;

#[derive(Debug, Snafu)]
pub struct Error(error::Error);
type Result<T> = std::result::Result<T, Error>;

/// The version declared in a file's header line.
///
/// Versions follow a major.minor scheme: 1.0 through 1.7, then 2.0.
/// Object streams and cross-reference streams require 1.5 or later.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum Version {
    Pdf1_0,
    Pdf1_1,
    Pdf1_2,
    Pdf1_3,
    Pdf1_4,
    Pdf1_5,
    Pdf1_6,
    #[default]
    Pdf1_7,
    Pdf2_0,
}

impl Version {
    pub fn from_str(source: &str) -> Result<Self> {
        match source {
            "1.0" => Ok(Version::Pdf1_0),
            "1.1" => Ok(Version::Pdf1_1),
            "1.2" => Ok(Version::Pdf1_2),
            "1.3" => Ok(Version::Pdf1_3),
            "1.4" => Ok(Version::Pdf1_4),
            "1.5" => Ok(Version::Pdf1_5),
            "1.6" => Ok(Version::Pdf1_6),
            "1.7" => Ok(Version::Pdf1_7),
            "2.0" => Ok(Version::Pdf2_0),
            _ => Err(error::Error::UnknownVersion {
                data: source.to_string(),
            }
            .into()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Version::Pdf1_0 => "1.0",
            Version::Pdf1_1 => "1.1",
            Version::Pdf1_2 => "1.2",
            Version::Pdf1_3 => "1.3",
            Version::Pdf1_4 => "1.4",
            Version::Pdf1_5 => "1.5",
            Version::Pdf1_6 => "1.6",
            Version::Pdf1_7 => "1.7",
            Version::Pdf2_0 => "2.0",
        }
    }

    /// Whether the compressed cross-reference and object stream forms
    /// are allowed under this version.
    pub fn supports_streams(&self) -> bool {
        !matches!(
            self,
            Version::Pdf1_0
                | Version::Pdf1_1
                | Version::Pdf1_2
                | Version::Pdf1_3
                | Version::Pdf1_4
        )
    }

    /// Emits the header line plus the binary-content marker comment:
    /// four bytes above 0x80 so transfer tools treat the file as
    /// binary.
    pub fn write_header<W: Write>(&self, sink: &mut Sink<W>) -> std::io::Result<usize> {
        let mut written = sink.write_bytes(format!("%PDF-{}\r\n", self.as_str()).as_bytes())?;
        written += sink.write_bytes(b"%\xE2\xE3\xCF\xD3\r\n")?;

        Ok(written)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

mod error {
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)))]
    pub(super) enum Error {
        #[snafu(display("Unknown version `{data}`"))]
        UnknownVersion { data: String },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[snafu::report]
    #[test]
    fn header_bytes() -> std::result::Result<(), std::io::Error> {
        let mut sink = Sink::new(Vec::new());
        Version::Pdf1_7.write_header(&mut sink)?;

        assert_eq!(sink.into_inner(), b"%PDF-1.7\r\n%\xE2\xE3\xCF\xD3\r\n");

        Ok(())
    }

    #[test]
    fn parsing_and_stream_support() {
        assert_eq!(Version::from_str("1.5").unwrap(), Version::Pdf1_5);
        assert!(Version::from_str("3.0").is_err());

        assert!(!Version::Pdf1_4.supports_streams());
        assert!(Version::Pdf1_5.supports_streams());
        assert!(Version::Pdf2_0.supports_streams());
    }
}
