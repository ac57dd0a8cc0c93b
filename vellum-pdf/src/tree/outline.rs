use snafu::{ResultExt, Snafu};

use crate::allocator::ObjectAllocator;
use crate::structures::object_stream::ObjectStreamBuilder;
use crate::tree::node::{Arena, NodeId};
use crate::types::{Dictionary, IndirectObject, IndirectReference, Object};

#[derive(Debug, Snafu)]
pub struct Error(error::Error);
type Result<T> = std::result::Result<T, Error>;

/// The bookmark outline: an ordered forest of items under a single
/// `Outlines` root.
///
/// Each item's dictionary carries its title and destination; the
/// linked-list plumbing (`First`, `Last`, `Prev`, `Next`, `Parent`,
/// `Count`) is derived at write time from the live structure.
#[derive(Debug, Clone)]
pub struct Outline {
    arena: Arena,
    root: NodeId,
}

impl Default for Outline {
    fn default() -> Self {
        Self::new()
    }
}

impl Outline {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.alloc(
            Dictionary::from([("Type", Object::Name("Outlines".into()))]),
            false,
        );

        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Appends an item under `parent` and returns its handle.
    pub fn add(&mut self, parent: NodeId, dictionary: Dictionary) -> NodeId {
        let item = self.arena.alloc(dictionary, false);
        self.arena.add_child(parent, item);

        item
    }

    /// Appends a top-level item.
    pub fn add_top_level(&mut self, dictionary: Dictionary) -> NodeId {
        self.add(self.root, dictionary)
    }

    /// Tombstones an item; it and its subtree stop counting and are
    /// skipped at write time.
    pub fn delete(&mut self, item: NodeId) {
        self.arena.node_mut(item).deleted = true;
    }

    /// Appends every live top-level item of `other` onto this root,
    /// copying their subtrees.
    pub fn merge(&mut self, other: &Outline) {
        for &child in other.live_children(other.root).iter() {
            self.copy_subtree(other, child, self.root);
        }
    }

    /// Live descendants of `node`, at every depth below it.
    pub fn count(&self, node: NodeId) -> usize {
        self.live_children(node)
            .iter()
            .map(|&child| 1 + self.count(child))
            .sum()
    }

    /// Assigns numbers and serializes the outline as indirect objects,
    /// children ahead of their parents so every reference a dictionary
    /// holds points at an already numbered node.
    ///
    /// An outline with no live items produces nothing.
    pub fn write_objects(
        &mut self,
        allocator: &mut ObjectAllocator,
    ) -> Option<(Vec<IndirectObject>, IndirectReference)> {
        if self.live_children(self.root).is_empty() {
            return None;
        }

        self.assign_numbers(self.root, allocator);

        let mut objects = Vec::new();
        self.build_node(self.root, None, None, None, &mut objects);

        let root_id = self.arena.node(self.root).object_id.unwrap_or(0);

        Some((objects, IndirectReference::new(root_id, 0)))
    }

    /// Like [`Outline::write_objects`], but accumulates each body into
    /// a packed object-stream container instead of standalone objects.
    pub fn write_into(
        &mut self,
        allocator: &mut ObjectAllocator,
        container: &mut ObjectStreamBuilder,
    ) -> Result<Option<IndirectReference>> {
        let Some((objects, root)) = self.write_objects(allocator) else {
            return Ok(None);
        };

        for object in &objects {
            if !allocator.mark_flushed(object.id) {
                continue;
            }

            container
                .add_object(object.id, object.get_object())
                .context(error::Pack)?;
        }

        Ok(Some(root))
    }

    fn live_children(&self, node: NodeId) -> Vec<NodeId> {
        self.arena
            .children(node)
            .iter()
            .copied()
            .filter(|&child| !self.arena.node(child).deleted)
            .collect()
    }

    fn copy_subtree(&mut self, other: &Outline, node: NodeId, parent: NodeId) {
        let dictionary = other.arena.node(node).dictionary.clone();
        let copy = self.add(parent, dictionary);

        for &child in other.live_children(node).iter() {
            self.copy_subtree(other, child, copy);
        }
    }

    fn assign_numbers(&mut self, node: NodeId, allocator: &mut ObjectAllocator) {
        self.arena.node_mut(node).object_id = Some(allocator.assign());

        for child in self.live_children(node) {
            self.assign_numbers(child, allocator);
        }
    }

    fn reference_of(&self, node: NodeId) -> IndirectReference {
        IndirectReference::new(self.arena.node(node).object_id.unwrap_or(0), 0)
    }

    fn build_node(
        &self,
        node: NodeId,
        parent: Option<NodeId>,
        previous: Option<NodeId>,
        next: Option<NodeId>,
        objects: &mut Vec<IndirectObject>,
    ) {
        let children = self.live_children(node);

        for (position, &child) in children.iter().enumerate() {
            let previous = position.checked_sub(1).map(|p| children[p]);
            let next = children.get(position + 1).copied();
            self.build_node(child, Some(node), previous, next, objects);
        }

        let mut dictionary = self.arena.node(node).dictionary.clone();

        if let (Some(first), Some(last)) = (children.first(), children.last()) {
            dictionary.set("First", Object::from(self.reference_of(*first)));
            dictionary.set("Last", Object::from(self.reference_of(*last)));
            dictionary.set("Count", Object::from(self.count(node) as i64));
        }

        if let Some(parent) = parent {
            dictionary.set("Parent", Object::from(self.reference_of(parent)));
        }
        if let Some(previous) = previous {
            dictionary.set("Prev", Object::from(self.reference_of(previous)));
        }
        if let Some(next) = next {
            dictionary.set("Next", Object::from(self.reference_of(next)));
        }

        let id = self.arena.node(node).object_id.unwrap_or(0);
        objects.push(IndirectObject::new(id, 0, Object::from(dictionary)));
    }
}

mod error {
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)), context(suffix(false)))]
    pub(super) enum Error {
        #[snafu(display("Error packing outline item into object stream"))]
        Pack {
            source: crate::structures::object_stream::Error,
        },
    }
}
