use std::io::Write;

use crate::writer::Sink;

/// Writes a name token: `/` followed by the name's bytes, with every
/// byte that cannot travel plainly spelled as `#` plus two lowercase
/// hex digits. No leading space is needed; `/` self-delimits.
pub fn write_name<W: Write>(sink: &mut Sink<W>, name: &str) -> std::io::Result<usize> {
    let mut token = Vec::with_capacity(name.len() + 1);
    token.push(b'/');

    for byte in name.bytes() {
        if needs_escape(byte) {
            token.extend_from_slice(format!("#{byte:02x}").as_bytes());
        } else {
            token.push(byte);
        }
    }

    sink.write_bytes(&token)
}

/// Whitespace, delimiters, `#`, `%` and anything outside printable
/// ASCII 33..=126 must be escaped inside a name.
fn needs_escape(byte: u8) -> bool {
    if !(33..=126).contains(&byte) {
        return true;
    }

    matches!(
        byte,
        b'#' | b'%' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/'
    )
}
