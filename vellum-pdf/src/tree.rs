pub mod node;
pub mod outline;
pub mod pages;

pub use node::{Arena, Node, NodeId};
pub use outline::Outline;
pub use pages::{PageIndex, PageTreeObjects};

pub use node::Error as NodeError;
pub use outline::Error as OutlineError;
pub use pages::Error as PagesError;
