use std::borrow::Cow;
use std::io::Write;

use crate::crypt::CryptBinding;
use crate::types::PdfString;
use crate::writer::Sink;

/// Writes a string token in its literal `( ... )` or hexadecimal
/// `< ... >` spelling.
///
/// Under document encryption the raw payload is transformed for the
/// current `(object, generation)` binding first, and the escaped or
/// hex-encoded form is produced from the transformed bytes.
pub fn write_string<W: Write>(
    sink: &mut Sink<W>,
    string: &PdfString,
    crypt: Option<&CryptBinding>,
) -> std::io::Result<usize> {
    let data = match crypt {
        Some(binding) => Cow::Owned(binding.transform(string.as_bytes())),
        None => Cow::Borrowed(string.as_bytes()),
    };

    match string {
        PdfString::Literal(_) => write_literal(sink, &data),
        PdfString::Hexadecimal(_) => write_hexadecimal(sink, &data),
    }
}

fn write_literal<W: Write>(sink: &mut Sink<W>, data: &[u8]) -> std::io::Result<usize> {
    let mut token = Vec::with_capacity(data.len() + 2);
    token.push(b'(');

    for &byte in data {
        match byte {
            b'\\' => token.extend_from_slice(b"\\\\"),
            b'(' => token.extend_from_slice(b"\\("),
            b')' => token.extend_from_slice(b"\\)"),
            b'\n' => token.extend_from_slice(b"\\n"),
            b'\r' => token.extend_from_slice(b"\\r"),
            b'\t' => token.extend_from_slice(b"\\t"),
            0x08 => token.extend_from_slice(b"\\b"),
            0x0C => token.extend_from_slice(b"\\f"),
            byte if byte < 0x20 => token.extend_from_slice(format!("\\{byte:03o}").as_bytes()),
            byte => token.push(byte),
        }
    }

    token.push(b')');

    sink.write_bytes(&token)
}

fn write_hexadecimal<W: Write>(sink: &mut Sink<W>, data: &[u8]) -> std::io::Result<usize> {
    let mut token = Vec::with_capacity(data.len() * 2 + 2);
    token.push(b'<');

    for byte in data {
        token.extend_from_slice(format!("{byte:02X}").as_bytes());
    }

    token.push(b'>');

    sink.write_bytes(&token)
}
