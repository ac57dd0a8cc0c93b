use std::io::Write;

use snafu::{ResultExt, Snafu};

use crate::crypt::CryptBinding;
use crate::types::{Dictionary, Numeric, Object, Stream};
use crate::writer::name::write_name;
use crate::writer::numeric::{write_integer, write_real};
use crate::writer::string::write_string;
use crate::writer::Sink;

#[derive(Debug, Snafu)]
pub struct Error(error::Error);
type Result<T> = std::result::Result<T, Error>;

/// Settings that apply to every token of one emission pass.
pub struct WriteContext<'a> {
    /// Encryption binding for the indirect object being written, if the
    /// document is encrypted.
    pub crypt: Option<CryptBinding<'a>>,
    /// When set, stream payloads are decoded and written raw with their
    /// `/Filter` entries stripped.
    pub decompress: bool,
}

impl WriteContext<'_> {
    /// A context with no encryption and payloads passed through as-is.
    pub fn plain() -> Self {
        Self {
            crypt: None,
            decompress: false,
        }
    }
}

/// Writes `object` as its token sequence, returning the number of bytes
/// emitted.
///
/// Scalar tokens carry a leading space so that consecutive tokens never
/// fuse; names, strings, arrays and dictionaries start with a delimiter
/// and need none. The output of a full dictionary is therefore valid
/// with no separators inserted between entries.
pub fn write_object<W: Write>(
    sink: &mut Sink<W>,
    object: &Object,
    context: &WriteContext,
) -> Result<usize> {
    let written = match object {
        Object::Boolean(true) => sink.write_bytes(b" true").context(error::Io)?,
        Object::Boolean(false) => sink.write_bytes(b" false").context(error::Io)?,
        Object::Null => sink.write_bytes(b" null").context(error::Io)?,
        Object::Numeric(Numeric::Integer(value)) => {
            write_integer(sink, *value).context(error::Io)?
        }
        Object::Numeric(Numeric::Real(value)) => write_real(sink, *value).context(error::Io)?,
        Object::String(string) => {
            write_string(sink, string, context.crypt.as_ref()).context(error::Io)?
        }
        Object::Name(name) => write_name(sink, name.as_str()).context(error::Io)?,
        Object::Reference(reference) => {
            // An unassigned reference has no defined target yet; it
            // degrades to null rather than pointing at object zero.
            if reference.id <= 0 {
                sink.write_bytes(b" null ").context(error::Io)?
            } else {
                sink.write_bytes(format!(" {} {} R", reference.id, reference.gen_id).as_bytes())
                    .context(error::Io)?
            }
        }
        Object::Array(array) => {
            let mut written = sink.write_bytes(b"[").context(error::Io)?;

            for element in array.iter() {
                written += write_object(sink, element, context)?;
            }

            written + sink.write_bytes(b"]").context(error::Io)?
        }
        Object::Dictionary(dictionary) => write_dictionary(sink, dictionary, context)?,
        Object::Stream(stream) => write_stream(sink, stream, context)?,
    };

    Ok(written)
}

fn write_dictionary<W: Write>(
    sink: &mut Sink<W>,
    dictionary: &Dictionary,
    context: &WriteContext,
) -> Result<usize> {
    let mut written = sink.write_bytes(b"<<").context(error::Io)?;

    for (key, value) in dictionary.iter() {
        written += write_name(sink, key).context(error::Io)?;
        written += write_object(sink, value, context)?;
    }

    Ok(written + sink.write_bytes(b">>").context(error::Io)?)
}

fn write_stream<W: Write>(
    sink: &mut Sink<W>,
    stream: &Stream,
    context: &WriteContext,
) -> Result<usize> {
    let (dictionary, data) = super::stream::prepare(stream, context);

    let mut written = write_dictionary(sink, &dictionary, context)?;
    written += sink.write_bytes(b"\nstream\n").context(error::Io)?;
    written += sink.write_bytes(&data).context(error::Io)?;
    written += sink.write_bytes(b"\nendstream").context(error::Io)?;

    Ok(written)
}

mod error {
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)), context(suffix(false)))]
    pub(super) enum Error {
        #[snafu(display("Error writing object token"))]
        Io { source: std::io::Error },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Array, IndirectReference, PdfString};

    fn emitted(object: Object) -> Vec<u8> {
        let mut sink = Sink::new(Vec::new());
        let written = write_object(&mut sink, &object, &WriteContext::plain()).unwrap();
        let bytes = sink.into_inner();

        assert_eq!(written, bytes.len());
        bytes
    }

    #[test]
    fn scalar_tokens() {
        // Test 1: scalars carry a leading space
        assert_eq!(emitted(Object::from(true)), b" true");
        assert_eq!(emitted(Object::from(false)), b" false");
        assert_eq!(emitted(Object::Null), b" null");
        assert_eq!(emitted(Object::from(42i64)), b" 42");
        assert_eq!(emitted(Object::from(-7i64)), b" -7");
        assert_eq!(emitted(Object::from(3.14)), b" 3.14");
    }

    #[test]
    fn reference_tokens() {
        // Test 1: an assigned reference
        let object = Object::from(IndirectReference::new(12, 0));
        assert_eq!(emitted(object), b" 12 0 R");

        // Test 2: unassigned references degrade to null with a trailing
        // space, so a following token still parses
        let object = Object::from(IndirectReference::new(0, 0));
        assert_eq!(emitted(object), b" null ");
        let object = Object::from(IndirectReference::new(-1, 3));
        assert_eq!(emitted(object), b" null ");
    }

    #[test]
    fn array_tokens_concatenate() {
        let array = Array::from(vec![
            Object::from(1i64),
            Object::from(2i64),
            Object::Name("Three".into()),
        ]);

        assert_eq!(emitted(Object::from(array)), b"[ 1 2/Three]");
    }

    #[test]
    fn dictionary_tokens_self_delimit() {
        let dictionary = Dictionary::from([
            ("Type", Object::Name("Page".into())),
            ("Count", Object::from(3i64)),
        ]);

        // BTreeMap ordering puts Count first
        assert_eq!(emitted(Object::from(dictionary)), b"<</Count 3/Type/Page>>");
    }

    #[test]
    fn nested_structures() {
        let inner = Dictionary::from([("V", Object::Null)]);
        let array = Array::from(vec![Object::from(inner), Object::from(PdfString::from("hi"))]);

        assert_eq!(emitted(Object::from(array)), b"[<</V null>>(hi)]");
    }

    #[snafu::report]
    #[test]
    fn stream_emission() -> Result<()> {
        // The dictionary carries a stale Length; emission recomputes it
        // from the payload.
        let dictionary = Dictionary::from([("Length", Object::from(999i64))]);
        let stream = Stream::new(dictionary, b"BT ET".to_vec());

        let mut sink = Sink::new(Vec::new());
        write_object(&mut sink, &Object::from(stream), &WriteContext::plain())?;

        assert_eq!(
            sink.into_inner(),
            b"<</Length 5>>\nstream\nBT ET\nendstream"
        );

        Ok(())
    }
}
