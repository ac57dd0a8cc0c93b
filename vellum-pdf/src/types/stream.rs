use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use snafu::{ResultExt, Snafu};

use crate::types::{Dictionary, Object};

#[derive(Debug, Snafu)]
pub struct Error(error::Error);
type Result<T> = std::result::Result<T, Error>;

/// A PDF stream object: a dictionary describing a raw byte payload.
///
/// Streams hold the bulky parts of a document (content streams, packed
/// object containers, cross-reference data). The dictionary's `/Length`
/// is recomputed from the payload actually written, so builders never
/// maintain it by hand.
#[derive(Debug, PartialEq, Clone)]
pub struct Stream {
    pub dictionary: Dictionary,
    pub data: Vec<u8>,
}

/// A filter applied to a stream payload. Filters may be chained; the
/// chain is inverted back-to-front when decoding.
#[derive(Debug, Default)]
enum Filter {
    /// Raw payload
    #[default]
    None,
    /// zlib/deflate compression
    FlateDecode,
    /// Several filters applied in sequence
    Pipeline(Vec<Filter>),
}

impl Stream {
    pub fn new(dictionary: Dictionary, data: Vec<u8>) -> Self {
        Self { dictionary, data }
    }

    /// Builds a flate-compressed stream at maximum compression, with
    /// `/Filter /FlateDecode` already recorded.
    pub fn flate(mut dictionary: Dictionary, data: &[u8]) -> Result<Self> {
        let data = deflate(data)?;
        dictionary.set("Filter", Object::Name("FlateDecode".into()));

        Ok(Self { dictionary, data })
    }

    /// Inverts all filters applied to the payload and replaces it with
    /// the decoded bytes. The `/Filter` entry itself is left to the
    /// caller to strip.
    ///
    /// # Errors
    /// Fails when an unsupported filter is named or the compressed data
    /// is corrupt.
    pub fn process_filters(&mut self) -> Result<()> {
        let content_length = self
            .dictionary
            .get("Length")
            .map(|object| object.as_integer())
            .transpose()
            .context(error::UnexpectedDictionaryValue)?
            .unwrap_or(self.data.len());

        let filter = match self.dictionary.get("Filter") {
            Some(object) => process_filter(object)?,
            None => Filter::default(),
        };

        self.data = apply_filter(&self.data, &filter, content_length)?;

        Ok(())
    }
}

/// Compresses `data` with zlib at the maximum level.
pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::best());

    encoder.write_all(data).context(error::Compression)?;
    Ok(encoder.finish().context(error::Compression)?)
}

fn process_filter(filter: &Object) -> Result<Filter> {
    match filter {
        Object::Name(name) => match name.as_str() {
            "FlateDecode" => Ok(Filter::FlateDecode),
            _ => Err(error::Error::InvalidStreamFilter {
                name: name.to_string(),
            }
            .into()),
        },
        Object::Array(pipeline) => Ok(Filter::Pipeline(
            pipeline
                .iter()
                .map(process_filter)
                .collect::<Result<Vec<_>>>()?,
        )),
        _ => Err(error::Error::InvalidStreamFiltersObject {
            object: filter.clone(),
        }
        .into()),
    }
}

fn apply_filter(data: &[u8], filter: &Filter, content_length: usize) -> Result<Vec<u8>> {
    match filter {
        Filter::None => Ok(data.to_vec()),
        Filter::FlateDecode => {
            let mut decoder = ZlibDecoder::new(data);
            let mut data = Vec::with_capacity(content_length);

            decoder
                .read_to_end(&mut data)
                .context(error::Decompression)?;

            Ok(data)
        }
        Filter::Pipeline(filters) => filters.iter().rev().try_fold(data.to_vec(), |data, filter| {
            apply_filter(&data, filter, content_length)
        }),
    }
}

mod error {
    use snafu::Snafu;

    use crate::types::object::Object;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)), context(suffix(false)))]
    pub(super) enum Error {
        #[snafu(display("Unexpected dictionary value"))]
        UnexpectedDictionaryValue { source: crate::types::object::Error },

        #[snafu(display("Unsupported stream filter {name}"))]
        InvalidStreamFilter { name: String },

        #[snafu(display("Unsupported stream filters object. Object = {object:?}"))]
        InvalidStreamFiltersObject { object: Object },

        #[snafu(display("Error during compression"))]
        Compression { source: std::io::Error },

        #[snafu(display("Error during decompression"))]
        Decompression { source: std::io::Error },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[snafu::report]
    #[test]
    fn flate_round_trip() -> Result<()> {
        // Test 1: flate() records the filter and process_filters undoes it
        let payload = b"BT /F1 24 Tf 100 700 Td (Hello) Tj ET".repeat(8);
        let mut stream = Stream::flate(Dictionary::new(), &payload)?;
        assert_eq!(
            stream.dictionary.get("Filter").and_then(|f| f.as_name().ok()),
            Some("FlateDecode")
        );
        assert_ne!(stream.data, payload);

        stream.process_filters()?;
        assert_eq!(stream.data, payload);

        // Test 2: a filterless stream passes through untouched
        let mut stream = Stream::new(Dictionary::new(), b"raw".to_vec());
        stream.process_filters()?;
        assert_eq!(stream.data, b"raw");

        Ok(())
    }

    #[test]
    fn unknown_filters_are_rejected() {
        let dictionary = Dictionary::from([("Filter", Object::Name("LZWDecode".into()))]);
        let mut stream = Stream::new(dictionary, vec![0x00]);

        assert!(stream.process_filters().is_err());
    }
}
