pub mod file_id;
pub mod info;
pub mod object_stream;
pub mod trailer;
pub mod version;
pub mod xref;

pub use file_id::FileId;
pub use info::Info;
pub use object_stream::ObjectStreamBuilder;
pub use trailer::Trailer;
pub use version::Version;
pub use xref::{CrossRefStream, XrefEntry};
