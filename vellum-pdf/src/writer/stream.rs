use crate::types::{Dictionary, Object, Stream};
use crate::writer::object::WriteContext;

/// Prepares a stream for emission: optionally inverts its filters,
/// applies the bound encryption transform, and recomputes `/Length`
/// from the payload that will actually hit the sink.
///
/// Filter inversion is opportunistic. When it fails the stream is left
/// exactly as it was; the failure is swallowed because a payload we
/// cannot decode is still a valid payload to copy through.
pub fn prepare(stream: &Stream, context: &WriteContext) -> (Dictionary, Vec<u8>) {
    let mut dictionary = stream.dictionary.clone();
    let mut data = stream.data.clone();

    if context.decompress && stream.dictionary.get("Filter").is_some() {
        let mut decoded = stream.clone();

        if decoded.process_filters().is_ok() {
            data = decoded.data;
            let _ = dictionary.remove("Filter");
            let _ = dictionary.remove("DecodeParms");
        }
    }

    if let Some(binding) = &context.crypt {
        data = binding.transform(&data);
    }

    dictionary.set("Length", Object::from(data.len() as i64));

    (dictionary, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[snafu::report]
    #[test]
    fn length_follows_the_payload() -> Result<(), crate::types::StreamError> {
        // Test 1: the recorded Length is whatever will be emitted
        let stream = Stream::new(Dictionary::new(), b"0123456789".to_vec());
        let (dictionary, data) = prepare(&stream, &WriteContext::plain());

        assert_eq!(data, b"0123456789");
        assert_eq!(dictionary.get("Length"), Some(&Object::from(10i64)));

        // Test 2: requested decompression strips the filter and fixes Length
        let stream = Stream::flate(Dictionary::new(), b"0123456789")?;
        let context = WriteContext {
            decompress: true,
            ..WriteContext::plain()
        };
        let (dictionary, data) = prepare(&stream, &context);

        assert_eq!(data, b"0123456789");
        assert!(dictionary.get("Filter").is_none());
        assert_eq!(dictionary.get("Length"), Some(&Object::from(10i64)));

        Ok(())
    }

    #[test]
    fn failed_inversion_is_swallowed() {
        // Claims FlateDecode but carries garbage; the stream must pass
        // through unchanged, filter intact.
        let dictionary = Dictionary::from([("Filter", Object::Name("FlateDecode".into()))]);
        let stream = Stream::new(dictionary, b"not zlib".to_vec());
        let context = WriteContext {
            decompress: true,
            ..WriteContext::plain()
        };

        let (dictionary, data) = prepare(&stream, &context);

        assert_eq!(data, b"not zlib");
        assert!(dictionary.get("Filter").is_some());
    }
}
