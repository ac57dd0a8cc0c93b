use snafu::{ensure, Snafu};

use crate::types::Dictionary;

#[derive(Debug, Snafu)]
pub struct Error(error::Error);
type Result<T> = std::result::Result<T, Error>;

/// Handle to a node inside an [`Arena`].
///
/// Handles are plain indices, so parent links never form ownership
/// cycles and cloning a whole tree is a `Vec` clone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A tree node: a dictionary payload plus ordered children.
///
/// Deletion is a tombstone. A deleted node stays in the arena and in
/// its parent's child list until a compaction pass removes it, but is
/// skipped by counting walks and by serialization.
#[derive(Debug, Clone)]
pub struct Node {
    pub dictionary: Dictionary,
    pub deleted: bool,
    pub leaf: bool,
    /// Object number assigned at write time, or carried over from a
    /// previously read file. `None` until first assignment.
    pub object_id: Option<i64>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

/// Index-addressed node storage shared by the page and bookmark trees.
///
/// Every structural mutation keeps the invariant that a child's parent
/// link names the node whose child list currently holds it.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, dictionary: Dictionary, leaf: bool) -> NodeId {
        let id = NodeId(self.nodes.len());

        self.nodes.push(Node {
            dictionary,
            deleted: false,
            leaf,
            object_id: None,
            children: Vec::new(),
            parent: None,
        });

        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Appends `child` to `parent`'s child list, detaching it from any
    /// previous parent first.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Inserts `child` at `index` in `parent`'s child list.
    ///
    /// # Errors
    /// `ChildIndexOutOfRange` when `index` exceeds the list length.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        let len = self.nodes[parent.0].children.len();
        ensure!(index <= len, error::ChildIndexOutOfRange { index, len });

        self.detach(child);
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);

        Ok(())
    }

    /// Replaces the child at `index`, returning the node it displaced.
    ///
    /// # Errors
    /// `NoChildren` on an empty list, `ChildIndexOutOfRange` otherwise.
    pub fn set_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<NodeId> {
        let len = self.nodes[parent.0].children.len();
        ensure!(len > 0, error::NoChildren);
        ensure!(index < len, error::ChildIndexOutOfRange { index, len });

        self.detach(child);

        let displaced = self.nodes[parent.0].children[index];
        self.nodes[displaced.0].parent = None;
        self.nodes[parent.0].children[index] = child;
        self.nodes[child.0].parent = Some(parent);

        Ok(displaced)
    }

    /// Removes and returns the child at `index`.
    ///
    /// # Errors
    /// `NoChildren` on an empty list, `ChildIndexOutOfRange` otherwise.
    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> Result<NodeId> {
        let len = self.nodes[parent.0].children.len();
        ensure!(len > 0, error::NoChildren);
        ensure!(index < len, error::ChildIndexOutOfRange { index, len });

        let removed = self.nodes[parent.0].children.remove(index);
        self.nodes[removed.0].parent = None;

        Ok(removed)
    }

    /// Bounds-checked child lookup.
    ///
    /// # Errors
    /// `NoChildren` on an empty list, `ChildIndexOutOfRange` otherwise.
    pub fn child(&self, parent: NodeId, index: usize) -> Result<NodeId> {
        let children = &self.nodes[parent.0].children;
        ensure!(!children.is_empty(), error::NoChildren);
        ensure!(
            index < children.len(),
            error::ChildIndexOutOfRange {
                index,
                len: children.len()
            }
        );

        Ok(children[index])
    }

    /// Position of `child` in `parent`'s child list, if present.
    pub fn position_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.nodes[parent.0].children.iter().position(|&id| id == child)
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes[child.0].parent.take() {
            self.nodes[parent.0].children.retain(|&id| id != child);
        }
    }
}

mod error {
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)), context(suffix(false)))]
    pub(super) enum Error {
        #[snafu(display("Child index {index} out of range for {len} children"))]
        ChildIndexOutOfRange { index: usize, len: usize },

        #[snafu(display("Indexed operation on a node with no children"))]
        NoChildren,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(arena: &mut Arena) -> NodeId {
        arena.alloc(Dictionary::new(), true)
    }

    #[snafu::report]
    #[test]
    fn parent_links_follow_mutations() -> Result<()> {
        let mut arena = Arena::new();
        let root = arena.alloc(Dictionary::new(), false);
        let a = leaf(&mut arena);
        let b = leaf(&mut arena);
        let c = leaf(&mut arena);

        // Test 1: add records the parent
        arena.add_child(root, a);
        arena.add_child(root, b);
        assert_eq!(arena.parent(a), Some(root));
        assert_eq!(arena.children(root), &[a, b]);

        // Test 2: indexed insert shifts siblings
        arena.insert_child(root, 1, c)?;
        assert_eq!(arena.children(root), &[a, c, b]);
        assert_eq!(arena.position_of(root, b), Some(2));

        // Test 3: removal clears the parent link
        let removed = arena.remove_child(root, 0)?;
        assert_eq!(removed, a);
        assert_eq!(arena.parent(a), None);
        assert_eq!(arena.children(root), &[c, b]);

        // Test 4: set displaces and rebinds
        let displaced = arena.set_child(root, 1, a)?;
        assert_eq!(displaced, b);
        assert_eq!(arena.parent(b), None);
        assert_eq!(arena.parent(a), Some(root));

        Ok(())
    }

    #[test]
    fn reattachment_detaches_first() {
        let mut arena = Arena::new();
        let left = arena.alloc(Dictionary::new(), false);
        let right = arena.alloc(Dictionary::new(), false);
        let child = leaf(&mut arena);

        arena.add_child(left, child);
        arena.add_child(right, child);

        assert!(arena.children(left).is_empty());
        assert_eq!(arena.children(right), &[child]);
        assert_eq!(arena.parent(child), Some(right));
    }

    #[test]
    fn indexed_operations_are_bounds_checked() {
        let mut arena = Arena::new();
        let root = arena.alloc(Dictionary::new(), false);
        let a = leaf(&mut arena);

        // Test 1: empty list refuses indexed access
        assert!(arena.child(root, 0).is_err());
        assert!(arena.remove_child(root, 0).is_err());

        // Test 2: out-of-range index refuses too
        arena.add_child(root, a);
        assert!(arena.child(root, 1).is_err());
        let b = arena.alloc(Dictionary::new(), true);
        assert!(arena.set_child(root, 1, b).is_err());
        assert!(arena.insert_child(root, 2, b).is_err());
    }
}
