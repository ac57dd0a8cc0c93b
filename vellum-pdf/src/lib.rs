//! Construction and byte-exact serialization of PDF documents at the
//! object level: the primitive value model, the balanced page index,
//! the bookmark outline, and the allocator that turns a graph of
//! values into a file with either a classic cross-reference table or
//! the compressed cross-reference-stream form.

pub mod allocator;
pub mod crypt;
pub mod document;
pub mod structures;
pub mod tree;
pub mod types;
pub mod writer;

pub use allocator::ObjectAllocator;
pub use crypt::ObjectCrypt;
pub use document::{DocumentWriter, XrefPolicy};
pub use structures::{FileId, Info, Trailer, Version};
pub use tree::{Outline, PageIndex};
pub use types::{
    Array, Dictionary, IndirectObject, IndirectReference, Name, Numeric, Object, PdfString,
    Rectangle, Stream,
};
