use std::{fmt::Display, ops::Deref, sync::Arc};

use crate::types::object::Object;

/// An indirect object: a stable `(number, generation)` identity wrapped
/// around any object body, referenced elsewhere by token instead of
/// being inlined.
///
/// An `id` of zero or below means the identity has not been assigned
/// yet; the writer treats such objects as a no-op rather than an error
/// so partially built graphs can exist mid-construction.
#[derive(Debug, PartialEq, Clone)]
pub struct IndirectObject {
    pub id: i64,
    pub gen_id: u16,
    object: Arc<Object>,
}

/// A reference to an indirect object, written ` N G R`.
///
/// A target `id` of zero or below serializes as ` null ` instead of a
/// reference token.
#[derive(Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Clone, Default, Copy)]
pub struct IndirectReference {
    pub id: i64,
    pub gen_id: u16,
}

impl IndirectObject {
    pub fn new(id: i64, gen_id: u16, object: Object) -> Self {
        Self {
            id,
            gen_id,
            object: Arc::new(object),
        }
    }

    pub fn get_object(&self) -> &Object {
        &self.object
    }

    pub fn reference(&self) -> IndirectReference {
        IndirectReference {
            id: self.id,
            gen_id: self.gen_id,
        }
    }
}

impl IndirectReference {
    pub fn new(id: i64, gen_id: u16) -> Self {
        Self { id, gen_id }
    }
}

impl Deref for IndirectObject {
    type Target = Object;

    fn deref(&self) -> &Self::Target {
        &self.object
    }
}

impl Display for IndirectReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.id, self.gen_id)
    }
}
