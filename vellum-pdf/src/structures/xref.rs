use std::collections::BTreeMap;

use snafu::{ResultExt, Snafu};

use crate::structures::Trailer;
use crate::types::{Array, Object, Stream};

#[derive(Debug, Snafu)]
pub struct Error(error::Error);
type Result<T> = std::result::Result<T, Error>;

/// One cross-reference slot in the compressed (PDF 1.5+) encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrefEntry {
    /// Type 0: the slot is unused.
    Free,
    /// Type 1: the object lives in the file at `offset`.
    InFile { offset: u64, gen_id: u16 },
    /// Type 2: the object lives at position `index` inside the object
    /// stream numbered `container`.
    InStream { container: i64, index: u32 },
}

impl XrefEntry {
    fn fields(self) -> (u64, u64, u64) {
        match self {
            XrefEntry::Free => (0, 0, 65535),
            XrefEntry::InFile { offset, gen_id } => (1, offset, gen_id as u64),
            XrefEntry::InStream { container, index } => (2, container as u64, index as u64),
        }
    }
}

/// Builds the `/Type /XRef` stream: one fixed-width big-endian integer
/// triple per slot, flate compressed, with the trailer's entries folded
/// into the stream dictionary.
#[derive(Debug)]
pub struct CrossRefStream;

impl CrossRefStream {
    /// Encodes slots 0 through `trailer.size - 1`. Slot 0 is always
    /// the fixed free entry; numbers missing from `entries` encode as
    /// free too.
    ///
    /// Field widths in `/W` are the smallest that hold the largest
    /// value in each column, with the type column pinned to one byte.
    pub fn build(entries: &BTreeMap<i64, XrefEntry>, trailer: &Trailer) -> Result<Stream> {
        let size = trailer.size.max(1);

        let rows: Vec<(u64, u64, u64)> = (0..size)
            .map(|id| {
                if id == 0 {
                    XrefEntry::Free.fields()
                } else {
                    entries.get(&id).copied().unwrap_or(XrefEntry::Free).fields()
                }
            })
            .collect();

        let widths = rows.iter().fold((1, 1, 1), |acc, row| {
            (
                acc.0.max(byte_width(row.0)),
                acc.1.max(byte_width(row.1)),
                acc.2.max(byte_width(row.2)),
            )
        });

        let mut payload = Vec::with_capacity(rows.len() * (widths.0 + widths.1 + widths.2));
        for row in &rows {
            push_be(&mut payload, row.0, widths.0);
            push_be(&mut payload, row.1, widths.1);
            push_be(&mut payload, row.2, widths.2);
        }

        let mut dictionary = trailer.to_dictionary();
        dictionary.set("Type", Object::Name("XRef".into()));
        dictionary.set(
            "W",
            Object::from(Array::from([
                Object::from(widths.0 as i64),
                Object::from(widths.1 as i64),
                Object::from(widths.2 as i64),
            ])),
        );
        dictionary.set(
            "Index",
            Object::from(Array::from([Object::from(0i64), Object::from(size)])),
        );

        Ok(Stream::flate(dictionary, &payload).context(error::Compression)?)
    }
}

/// Bytes needed to hold `value` big-endian, at least one.
fn byte_width(value: u64) -> usize {
    ((64 - value.leading_zeros() as usize).div_ceil(8)).max(1)
}

fn push_be(payload: &mut Vec<u8>, value: u64, width: usize) {
    payload.extend_from_slice(&value.to_be_bytes()[8 - width..]);
}

mod error {
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)), context(suffix(false)))]
    pub(super) enum Error {
        #[snafu(display("Error compressing cross-reference payload"))]
        Compression { source: crate::types::StreamError },
    }
}
