pub mod name;
pub mod numeric;
pub mod object;
pub mod sink;
pub mod stream;
pub mod string;

pub use object::{WriteContext, write_object};
pub use sink::Sink;

pub use object::Error as ObjectError;
