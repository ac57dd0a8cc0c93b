use core::str;

use nom::{
    character::complete::{digit1, multispace0},
    multi::count,
    sequence::terminated,
    Finish, Parser,
};
use snafu::{ensure, OptionExt, ResultExt, Snafu};

use crate::types::{Dictionary, Object, Stream};
use crate::writer::{write_object, Sink, WriteContext};

#[derive(Debug, Snafu)]
pub struct Error(error::Error);
type Result<T> = std::result::Result<T, Error>;

/// Accumulates the bodies of several non-stream objects into one
/// `/Type /ObjStm` container (PDF 1.5+).
///
/// The finished stream starts with a header of whitespace-separated
/// decimal `number offset` pairs; `/First` points past the header and
/// `/N` counts the packed objects. The whole payload is flate
/// compressed at the maximum level.
#[derive(Debug, Default)]
pub struct ObjectStreamBuilder {
    entries: Vec<(i64, u64)>,
    body: Vec<u8>,
}

impl ObjectStreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Packed object numbers in packing order. An object's position
    /// here is its index for compressed cross-reference entries.
    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    /// Serializes `object` into the container under number `id`.
    ///
    /// Bodies inside an object stream are never encrypted; the
    /// container stream is, as a whole, when the document is.
    ///
    /// # Errors
    /// `StreamNotPackable` for stream objects, which the format
    /// requires to stand alone.
    pub fn add_object(&mut self, id: i64, object: &Object) -> Result<()> {
        ensure!(
            !matches!(object, Object::Stream(_)),
            error::StreamNotPackable { id }
        );

        let mut sink = Sink::new(Vec::new());
        write_object(&mut sink, object, &WriteContext::plain()).context(error::Serialize)?;

        self.entries.push((id, self.body.len() as u64));
        self.body.extend_from_slice(&sink.into_inner());

        Ok(())
    }

    /// Builds the finished `/Type /ObjStm` stream.
    pub fn finish(&self) -> Result<Stream> {
        let mut header = String::new();

        for (id, offset) in &self.entries {
            header.push_str(&format!("{id} {offset} "));
        }

        let dictionary = Dictionary::from([
            ("Type", Object::Name("ObjStm".into())),
            ("N", Object::from(self.entries.len() as i64)),
            ("First", Object::from(header.len() as i64)),
        ]);

        let mut payload = header.into_bytes();
        payload.extend_from_slice(&self.body);

        Ok(Stream::flate(dictionary, &payload).context(error::Compression)?)
    }
}

/// Pulls one object's body back out of a packed container: decodes the
/// stream, linear-scans the header pairs for `id` and slices the body
/// between its offset and the next entry's offset or the payload end.
pub fn extract(stream: &Stream, id: i64) -> Result<Vec<u8>> {
    let mut stream = stream.clone();
    stream.process_filters().context(error::Decompression)?;

    let n: usize = stream
        .dictionary
        .get("N")
        .context(error::FieldNotFound { field: "N" })?
        .as_integer()
        .context(error::InvalidField { field: "N" })?;

    let first: usize = stream
        .dictionary
        .get("First")
        .context(error::FieldNotFound { field: "First" })?
        .as_integer()
        .context(error::InvalidField { field: "First" })?;

    ensure!(first <= stream.data.len(), error::CorruptHeader);

    let pairs = header_pairs(&stream.data[..first], n)
        .ok()
        .context(error::CorruptHeader)?;

    let position = pairs
        .iter()
        .position(|(entry, _)| *entry == id)
        .context(error::UnknownObjectId { id })?;

    let body = &stream.data[first..];
    let from = pairs[position].1;
    let to = pairs
        .get(position + 1)
        .map(|(_, offset)| *offset)
        .unwrap_or(body.len());

    ensure!(from <= to && to <= body.len(), error::CorruptHeader);

    Ok(body[from..to].to_vec())
}

fn header_pairs(
    input: &[u8],
    n: usize,
) -> std::result::Result<Vec<(i64, usize)>, nom::error::Error<&[u8]>> {
    count(
        (
            terminated(digit1.map_res(str::from_utf8), multispace0)
                .map_res(|s: &str| s.parse::<i64>()),
            terminated(digit1.map_res(str::from_utf8), multispace0)
                .map_res(|s: &str| s.parse::<usize>()),
        ),
        n,
    )
    .parse(input)
    .finish()
    .map(|(_, pairs)| pairs)
}

mod error {
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)), context(suffix(false)))]
    pub(super) enum Error {
        #[snafu(display("Object {id} is a stream and cannot be packed"))]
        StreamNotPackable { id: i64 },

        #[snafu(display("Error serializing packed object body"))]
        Serialize { source: crate::writer::ObjectError },

        #[snafu(display("Error compressing object stream payload"))]
        Compression { source: crate::types::StreamError },

        #[snafu(display("Error decoding object stream payload"))]
        Decompression { source: crate::types::StreamError },

        #[snafu(display("Required field `{field}` not found"))]
        FieldNotFound { field: &'static str },

        #[snafu(display("Invalid object type for field `{field}`"))]
        InvalidField {
            field: &'static str,
            source: crate::types::ObjectError,
        },

        #[snafu(display("Corrupt object stream offset header"))]
        CorruptHeader,

        #[snafu(display("Object {id} is not in this object stream"))]
        UnknownObjectId { id: i64 },
    }
}
