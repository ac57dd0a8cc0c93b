use std::collections::BTreeMap;
use std::io::Write;

use snafu::{ensure, ResultExt, Snafu};

use crate::allocator::ObjectAllocator;
use crate::crypt::ObjectCrypt;
use crate::structures::{CrossRefStream, FileId, Info, ObjectStreamBuilder, Trailer, Version, XrefEntry};
use crate::tree::{Outline, PageIndex};
use crate::types::{Dictionary, IndirectObject, IndirectReference, Object};
use crate::writer::Sink;

#[derive(Debug, Snafu)]
pub struct Error(error::Error);
type Result<T> = std::result::Result<T, Error>;

/// How the cross-reference section at the end of the file is encoded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum XrefPolicy {
    /// The classic text table with 20-byte rows.
    #[default]
    Table,
    /// A compressed cross-reference stream, with non-stream objects
    /// packed into an object stream (PDF 1.5+).
    Stream,
}

/// Drives one complete write of a document: header, indirect objects,
/// cross-reference section, trailer.
///
/// The writer owns the allocator and the output sink for the duration
/// of the save; a failed write leaves partial bytes in the sink for the
/// caller to discard. Construction emits the header immediately.
pub struct DocumentWriter<W: Write> {
    sink: Sink<W>,
    allocator: ObjectAllocator,
    policy: XrefPolicy,
    packed: ObjectStreamBuilder,
    crypt: Option<Box<dyn ObjectCrypt>>,
    prev: Option<u64>,
    decompress: bool,
}

impl<W: Write> DocumentWriter<W> {
    /// Starts a document on `writer` and emits the header line.
    ///
    /// # Errors
    /// `PolicyUnsupported` when a cross-reference stream is requested
    /// under a version older than 1.5.
    pub fn new(writer: W, version: Version, policy: XrefPolicy) -> Result<Self> {
        ensure!(
            policy == XrefPolicy::Table || version.supports_streams(),
            error::PolicyUnsupported { version }
        );

        let mut sink = Sink::new(writer);
        version.write_header(&mut sink).context(error::Io)?;

        Ok(Self {
            sink,
            allocator: ObjectAllocator::new(),
            policy,
            packed: ObjectStreamBuilder::new(),
            crypt: None,
            prev: None,
            decompress: false,
        })
    }

    /// Installs the per-object byte transform of an encrypted document.
    /// Strings and stream payloads pass through it from here on; the
    /// trailer and cross-reference data never do.
    pub fn set_crypt(&mut self, crypt: Box<dyn ObjectCrypt>) {
        self.crypt = Some(crypt);
    }

    /// Chains this save onto a previous cross-reference section at
    /// `offset`, for incremental updates of an existing file.
    pub fn set_prev(&mut self, offset: u64) {
        self.prev = Some(offset);
    }

    /// Requests that stream payloads be decoded and written raw.
    pub fn set_decompress(&mut self, decompress: bool) {
        self.decompress = decompress;
    }

    /// Hands out the next free object number.
    pub fn assign(&mut self) -> i64 {
        self.allocator.assign()
    }

    /// Emits one indirect object, routing it into the packed object
    /// stream instead when the policy allows and the body is not itself
    /// a stream. Returns the bytes that reached the sink, which is 0
    /// for packed objects and for numbers already flushed.
    pub fn write_object(&mut self, object: &IndirectObject) -> Result<usize> {
        if self.policy == XrefPolicy::Stream && !matches!(object.get_object(), Object::Stream(_)) {
            // Packing shares the at-most-once guarantee of standalone
            // emission, so repeated references stay one body.
            if object.id <= 0 || !self.allocator.mark_flushed(object.id) {
                return Ok(0);
            }

            self.packed
                .add_object(object.id, object.get_object())
                .context(error::Pack)?;

            return Ok(0);
        }

        self.allocator
            .write_indirect_object(&mut self.sink, object, self.crypt.as_deref(), self.decompress)
            .context(error::Allocator)
            .map_err(Error::from)
    }

    /// Emits an indirect object with encryption bypassed. The
    /// encryption dictionary itself is written this way, since readers
    /// must decode it before any key exists.
    pub fn write_plain_object(&mut self, object: &IndirectObject) -> Result<usize> {
        self.allocator
            .write_indirect_object(&mut self.sink, object, None, false)
            .context(error::Allocator)
            .map_err(Error::from)
    }

    /// Numbers and emits the whole page tree, returning the reference
    /// to its root for the catalog.
    pub fn write_page_tree(
        &mut self,
        pages: &mut PageIndex,
        renumbering: Option<&mut BTreeMap<i64, i64>>,
    ) -> Result<IndirectReference> {
        let produced = pages.write_objects(&mut self.allocator, renumbering);

        for object in &produced.objects {
            self.write_object(object)?;
        }

        Ok(produced.root)
    }

    /// Numbers and emits the bookmark outline, if it has any items.
    /// Under a stream policy the item bodies go into the packed
    /// container instead of standalone objects.
    pub fn write_outline(&mut self, outline: &mut Outline) -> Result<Option<IndirectReference>> {
        if self.policy == XrefPolicy::Stream {
            return Ok(outline
                .write_into(&mut self.allocator, &mut self.packed)
                .context(error::Outline)?);
        }

        let Some((objects, root)) = outline.write_objects(&mut self.allocator) else {
            return Ok(None);
        };

        for object in &objects {
            self.write_object(object)?;
        }

        Ok(Some(root))
    }

    /// Emits the catalog dictionary and returns its reference.
    pub fn write_catalog(
        &mut self,
        pages: IndirectReference,
        outline: Option<IndirectReference>,
    ) -> Result<IndirectReference> {
        let mut catalog = Dictionary::from([
            ("Type", Object::Name("Catalog".into())),
            ("Pages", Object::from(pages)),
        ]);

        if let Some(outline) = outline {
            catalog.set("Outlines", Object::from(outline));
        }

        let id = self.allocator.assign();
        let object = IndirectObject::new(id, 0, Object::from(catalog));
        self.write_object(&object)?;

        Ok(object.reference())
    }

    /// Emits the information dictionary and returns its reference.
    pub fn write_info(&mut self, info: &Info) -> Result<IndirectReference> {
        let id = self.allocator.assign();
        let object = IndirectObject::new(id, 0, Object::from(info.to_dictionary()));
        self.write_object(&object)?;

        Ok(object.reference())
    }

    /// Closes the document: flushes the packed object stream when one
    /// is in use, emits the cross-reference section and trailer, and
    /// returns the underlying writer.
    pub fn finish(
        mut self,
        root: IndirectReference,
        info: Option<IndirectReference>,
        encrypt: Option<IndirectReference>,
        file_id: Option<FileId>,
    ) -> Result<W> {
        match self.policy {
            XrefPolicy::Table => {
                let start = self.sink.position();
                let trailer = Trailer {
                    size: self.allocator.size(),
                    root,
                    info,
                    encrypt,
                    file_id,
                    prev: self.prev,
                };

                self.allocator
                    .write_xref_table(&mut self.sink, &trailer.to_dictionary(), start)
                    .context(error::Allocator)?;
            }
            XrefPolicy::Stream => {
                let mut entries: BTreeMap<i64, XrefEntry> = BTreeMap::new();

                if !self.packed.is_empty() {
                    let container_id = self.allocator.assign();

                    for (index, id) in self.packed.ids().enumerate() {
                        entries.insert(
                            id,
                            XrefEntry::InStream {
                                container: container_id,
                                index: index as u32,
                            },
                        );
                    }

                    let container = self.packed.finish().context(error::Pack)?;
                    let object = IndirectObject::new(container_id, 0, Object::from(container));
                    self.allocator
                        .write_indirect_object(&mut self.sink, &object, None, false)
                        .context(error::Allocator)?;
                }

                for (&id, &(offset, gen_id)) in self.allocator.offsets() {
                    entries.insert(id, XrefEntry::InFile { offset, gen_id });
                }

                let xref_id = self.allocator.assign();
                let start = self.sink.position();
                entries.insert(
                    xref_id,
                    XrefEntry::InFile {
                        offset: start,
                        gen_id: 0,
                    },
                );

                let trailer = Trailer {
                    size: self.allocator.size(),
                    root,
                    info,
                    encrypt,
                    file_id,
                    prev: self.prev,
                };
                let stream = CrossRefStream::build(&entries, &trailer).context(error::Xref)?;
                let object = IndirectObject::new(xref_id, 0, Object::from(stream));

                self.allocator
                    .write_cross_ref_stream(&mut self.sink, &object, start)
                    .context(error::Allocator)?;
            }
        }

        self.sink.flush().context(error::Io)?;

        Ok(self.sink.into_inner())
    }

    /// Bytes emitted so far.
    pub fn position(&self) -> u64 {
        self.sink.position()
    }
}

mod error {
    use snafu::Snafu;

    use crate::structures::Version;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)), context(suffix(false)))]
    pub(super) enum Error {
        #[snafu(display("Cross-reference streams require PDF 1.5 or later. Version = {version}"))]
        PolicyUnsupported { version: Version },

        #[snafu(display("Error writing to the output sink"))]
        Io { source: std::io::Error },

        #[snafu(display("Error emitting indirect object"))]
        Allocator { source: crate::allocator::Error },

        #[snafu(display("Error packing object into object stream"))]
        Pack {
            source: crate::structures::object_stream::Error,
        },

        #[snafu(display("Error packing outline into object stream"))]
        Outline {
            source: crate::tree::outline::Error,
        },

        #[snafu(display("Error building cross-reference stream"))]
        Xref { source: crate::structures::xref::Error },
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::structures::object_stream;
    use crate::types::PdfString;

    fn sample_pages(n: i64) -> PageIndex {
        let mut pages = PageIndex::new();

        for value in 1..=n {
            pages.append(Dictionary::from([("Marker", Object::from(value))]));
        }

        pages
    }

    #[snafu::report]
    #[test]
    fn classic_save_has_table_and_trailer() -> Result<()> {
        let mut writer =
            DocumentWriter::new(Vec::new(), Version::Pdf1_7, XrefPolicy::Table)?;

        let mut pages = sample_pages(3);
        let pages_root = writer.write_page_tree(&mut pages, None)?;
        let root = writer.write_catalog(pages_root, None)?;

        let bytes = writer.finish(root, None, None, Some(FileId::generate(b"test")))?;
        let text = String::from_utf8_lossy(&bytes);

        // Test 1: header first, trailer machinery last
        assert!(bytes.starts_with(b"%PDF-1.7\r\n%\xE2\xE3\xCF\xD3\r\n"));
        assert!(text.contains("xref\n0 6"));
        assert!(text.contains("trailer\n<<"));
        assert!(text.contains("/Type/Catalog"));
        assert!(text.ends_with("%%EOF\n"));

        // Test 2: every object envelope appears exactly once
        for id in 1..=5 {
            assert_eq!(text.matches(&format!("{id} 0 obj\n")).count(), 1);
        }

        Ok(())
    }

    #[snafu::report]
    #[test]
    fn stream_save_packs_non_stream_objects() -> Result<()> {
        let mut writer =
            DocumentWriter::new(Vec::new(), Version::Pdf1_7, XrefPolicy::Stream)?;

        let mut pages = sample_pages(3);
        let pages_root = writer.write_page_tree(&mut pages, None)?;
        let root = writer.write_catalog(pages_root, None)?;

        let bytes = writer.finish(root, None, None, None)?;
        let text = String::from_utf8_lossy(&bytes);

        // Test 1: no classic table, a cross-reference stream instead
        assert!(!text.contains("xref\n0 "));
        assert!(text.contains("/Type/XRef"));
        assert!(text.contains("/Type/ObjStm"));
        assert!(text.ends_with("%%EOF\n"));

        // Test 2: the catalog body lives inside the container, not as
        // a standalone object
        assert!(!text.contains("/Type/Catalog"));

        Ok(())
    }

    #[snafu::report]
    #[test]
    fn packed_catalog_is_recoverable() -> Result<()> {
        let mut writer =
            DocumentWriter::new(Vec::new(), Version::Pdf1_7, XrefPolicy::Stream)?;

        let id = writer.assign();
        let catalog = Object::from(Dictionary::from([(
            "Type",
            Object::Name("Catalog".into()),
        )]));
        writer.write_object(&IndirectObject::new(id, 0, catalog.clone()))?;

        // Reach into the container before it is flushed.
        let stream = writer.packed.finish().unwrap();
        let body = object_stream::extract(&stream, id).unwrap();
        assert_eq!(body, b"<</Type/Catalog>>");

        Ok(())
    }

    #[snafu::report]
    #[test]
    fn stream_save_packs_outline_items() -> Result<()> {
        let mut writer =
            DocumentWriter::new(Vec::new(), Version::Pdf1_7, XrefPolicy::Stream)?;

        let mut outline = Outline::new();
        outline.add_top_level(Dictionary::from([(
            "Title",
            Object::from(crate::types::PdfString::from("Chapter 1")),
        )]));

        let root = writer.write_outline(&mut outline)?.unwrap();

        // The outline root body lives inside the packed container.
        let stream = writer.packed.finish().unwrap();
        let body = object_stream::extract(&stream, root.id).unwrap();
        assert!(String::from_utf8(body).unwrap().contains("/Type/Outlines"));

        Ok(())
    }

    #[snafu::report]
    #[test]
    fn packed_emission_is_at_most_once() -> Result<()> {
        let mut writer =
            DocumentWriter::new(Vec::new(), Version::Pdf1_7, XrefPolicy::Stream)?;

        let id = writer.assign();
        let catalog = Object::from(Dictionary::from([(
            "Type",
            Object::Name("Catalog".into()),
        )]));
        let object = IndirectObject::new(id, 0, catalog);

        // Test 1: handing the same object in twice packs one body
        writer.write_object(&object)?;
        assert_eq!(writer.write_object(&object)?, 0);
        assert_eq!(writer.packed.len(), 1);

        // Test 2: the container declares a single entry and its body
        // survives intact
        let stream = writer.packed.finish().unwrap();
        assert_eq!(stream.dictionary.get("N"), Some(&Object::from(1i64)));
        let body = object_stream::extract(&stream, id).unwrap();
        assert_eq!(body, b"<</Type/Catalog>>");

        Ok(())
    }

    struct Recording {
        seen: Rc<RefCell<Vec<(i64, u16)>>>,
    }

    impl ObjectCrypt for Recording {
        fn transform(&self, id: i64, gen_id: u16, data: &[u8]) -> Vec<u8> {
            self.seen.borrow_mut().push((id, gen_id));
            data.iter().map(|byte| byte ^ 0x5A).collect()
        }
    }

    #[snafu::report]
    #[test]
    fn encryption_covers_objects_but_not_the_trailer() -> Result<()> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut writer =
            DocumentWriter::new(Vec::new(), Version::Pdf1_7, XrefPolicy::Table)?;
        writer.set_crypt(Box::new(Recording {
            seen: Rc::clone(&seen),
        }));

        let id = writer.assign();
        let titled = Dictionary::from([("Title", Object::from(PdfString::from("secret")))]);
        writer.write_object(&IndirectObject::new(id, 0, Object::from(titled)))?;

        let root = writer.write_catalog(IndirectReference::new(id, 0), None)?;
        let bytes = writer.finish(root, None, None, Some(FileId::generate(b"seed")))?;
        let text = String::from_utf8_lossy(&bytes);

        // Test 1: the string body was transformed under its own
        // object's identity; the catalog holds no strings
        assert_eq!(*seen.borrow(), vec![(id, 0)]);
        assert!(!text.contains("(secret)"));

        // Test 2: the trailer and its file identifier are written
        // plain, so the transform count stays where emission left it
        assert!(text.contains("/ID[<"));
        assert_eq!(seen.borrow().len(), 1);

        Ok(())
    }

    #[test]
    fn stream_policy_needs_a_new_enough_version() {
        assert!(DocumentWriter::new(Vec::new(), Version::Pdf1_4, XrefPolicy::Stream).is_err());
        assert!(DocumentWriter::new(Vec::new(), Version::Pdf1_4, XrefPolicy::Table).is_ok());
    }
}
