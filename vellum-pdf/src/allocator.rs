use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use snafu::{ResultExt, Snafu};

use crate::crypt::{CryptBinding, ObjectCrypt};
use crate::types::{Dictionary, IndirectObject};
use crate::writer::{write_object, Sink, WriteContext};

#[derive(Debug, Snafu)]
pub struct Error(error::Error);
type Result<T> = std::result::Result<T, Error>;

/// Assigns object numbers and tracks where each numbered object landed
/// in the output.
///
/// An allocator lives for exactly one write pass: the flushed set and
/// offset table are never reused across saves. Emission is
/// at-most-once per number, so a graph may reference the same indirect
/// object from many places and hand it to
/// [`ObjectAllocator::write_indirect_object`] each time without
/// duplicating bytes.
#[derive(Debug, Default)]
pub struct ObjectAllocator {
    next_id: i64,
    highest: i64,
    offsets: BTreeMap<i64, (u64, u16)>,
    flushed: BTreeSet<i64>,
}

impl ObjectAllocator {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            highest: 0,
            offsets: BTreeMap::new(),
            flushed: BTreeSet::new(),
        }
    }

    /// Hands out the next free object number.
    pub fn assign(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.highest = self.highest.max(id);

        id
    }

    /// Claims object number 1 specifically, falling back to an ordinary
    /// assignment when 1 is already taken.
    pub fn reserve_first(&mut self) -> i64 {
        if self.next_id == 1 {
            self.next_id = 2;
            self.highest = self.highest.max(1);

            return 1;
        }

        self.assign()
    }

    /// Table size for the trailer's `/Size`: one past the highest
    /// number in use, counting the always-free slot 0.
    pub fn size(&self) -> i64 {
        self.highest + 1
    }

    /// Byte offsets recorded so far, keyed by object number.
    pub fn offsets(&self) -> &BTreeMap<i64, (u64, u16)> {
        &self.offsets
    }

    /// Records that `id` lives at `offset` without emitting it here,
    /// for objects whose bodies go into a packed container.
    pub fn note_offset(&mut self, id: i64, gen_id: u16, offset: u64) {
        self.highest = self.highest.max(id);
        self.offsets.insert(id, (offset, gen_id));
    }

    /// Claims `id` in the flushed set without emitting bytes, for
    /// objects whose bodies go into a packed container. Returns false
    /// when the number was already flushed.
    pub fn mark_flushed(&mut self, id: i64) -> bool {
        self.flushed.insert(id)
    }

    /// Emits `object` as `N G obj` + body + `endobj`, recording its
    /// byte offset, and returns the bytes written.
    ///
    /// An unassigned number (zero or below) and a number already
    /// flushed are both silent no-ops returning 0, so partially built
    /// graphs and repeated references cost nothing.
    pub fn write_indirect_object<W: Write>(
        &mut self,
        sink: &mut Sink<W>,
        object: &IndirectObject,
        crypt: Option<&dyn ObjectCrypt>,
        decompress: bool,
    ) -> Result<usize> {
        if object.id <= 0 || self.flushed.contains(&object.id) {
            return Ok(0);
        }

        self.note_offset(object.id, object.gen_id, sink.position());
        self.flushed.insert(object.id);

        let context = WriteContext {
            crypt: crypt.map(|crypt| CryptBinding {
                crypt,
                id: object.id,
                gen_id: object.gen_id,
            }),
            decompress,
        };

        let mut written = sink
            .write_bytes(format!("{} {} obj\n", object.id, object.gen_id).as_bytes())
            .context(error::Io)?;
        written += write_object(sink, object.get_object(), &context).context(error::Body)?;
        written += sink.write_bytes(b"\nendobj\n").context(error::Io)?;

        Ok(written)
    }

    /// Emits the classic cross-reference table, trailer dictionary and
    /// end-of-file marker.
    ///
    /// Rows are exactly 20 bytes: a 10-digit offset, a 5-digit
    /// generation and the in-use flag, CRLF terminated. Slot 0 is the
    /// fixed free entry; numbers never written are skipped rather than
    /// chained into a free list.
    pub fn write_xref_table<W: Write>(
        &self,
        sink: &mut Sink<W>,
        trailer: &Dictionary,
        start: u64,
    ) -> Result<usize> {
        let mut written = sink
            .write_bytes(format!("xref\n0 {}\n", self.size()).as_bytes())
            .context(error::Io)?;
        written += sink
            .write_bytes(b"0000000000 65535 f\r\n")
            .context(error::Io)?;

        for (offset, gen_id) in self.offsets.values() {
            written += sink
                .write_bytes(format!("{offset:010} {gen_id:05} n\r\n").as_bytes())
                .context(error::Io)?;
        }

        written += sink.write_bytes(b"trailer\n").context(error::Io)?;
        // The trailer itself is never encrypted.
        written += write_object(
            sink,
            &crate::types::Object::Dictionary(trailer.clone()),
            &WriteContext::plain(),
        )
        .context(error::Body)?;
        written += sink
            .write_bytes(format!("\nstartxref\n{start}\n%%EOF\n").as_bytes())
            .context(error::Io)?;

        Ok(written)
    }

    /// Emits a cross-reference stream object followed by the
    /// end-of-file marker.
    pub fn write_cross_ref_stream<W: Write>(
        &mut self,
        sink: &mut Sink<W>,
        stream: &IndirectObject,
        start: u64,
    ) -> Result<usize> {
        let mut written = self.write_indirect_object(sink, stream, None, false)?;
        written += sink
            .write_bytes(format!("\nstartxref\n{start}\n%%EOF\n").as_bytes())
            .context(error::Io)?;

        Ok(written)
    }
}

mod error {
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)), context(suffix(false)))]
    pub(super) enum Error {
        #[snafu(display("Error writing to the output sink"))]
        Io { source: std::io::Error },

        #[snafu(display("Error serializing object body"))]
        Body { source: crate::writer::ObjectError },
    }
}
