use std::collections::BTreeMap;

use snafu::{ensure, OptionExt, ResultExt, Snafu};

use crate::allocator::ObjectAllocator;
use crate::tree::node::{Arena, NodeId};
use crate::types::{Array, Dictionary, IndirectObject, IndirectReference, Object};

#[derive(Debug, Snafu)]
pub struct Error(error::Error);
type Result<T> = std::result::Result<T, Error>;

/// The page index: a bounded-fan-out tree of `Pages` nodes over `Page`
/// leaves, kept balanced across sequential appends.
///
/// Pages are addressed 1-based by their position among live leaves in
/// document order. A cursor into the most recently filled node makes
/// sequential append amortized constant; lookups and indexed inserts
/// run a tombstone-skipping counting walk from the root.
#[derive(Debug, Clone)]
pub struct PageIndex {
    arena: Arena,
    root: Option<NodeId>,
    current: Option<NodeId>,
    degree: usize,
    count: usize,
}

/// The indirect objects produced by one write pass over the index,
/// headed by a reference to the root `Pages` node.
#[derive(Debug)]
pub struct PageTreeObjects {
    pub objects: Vec<IndirectObject>,
    pub root: IndirectReference,
}

impl Default for PageIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl PageIndex {
    /// An empty index with the standard branching degree of 10.
    pub fn new() -> Self {
        Self::with_degree(10)
    }

    /// An empty index with the given branching degree, fixed for the
    /// lifetime of the index. Degrees below 2 are raised to 2.
    pub fn with_degree(degree: usize) -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            current: None,
            degree: degree.max(2),
            count: 0,
        }
    }

    /// Number of live pages.
    pub fn count(&self) -> usize {
        self.count
    }

    /// The dictionary behind a node handle, for edits in place.
    pub fn dictionary_mut(&mut self, id: NodeId) -> &mut Dictionary {
        &mut self.arena.node_mut(id).dictionary
    }

    /// Records the object number a page or intermediate node carried in
    /// a previously read file, so a re-save can map old numbers to new.
    pub fn set_object_id(&mut self, id: NodeId, object_id: i64) {
        self.arena.node_mut(id).object_id = Some(object_id);
    }

    /// Appends a page after the last live page.
    pub fn append(&mut self, dictionary: Dictionary) -> NodeId {
        let page = self.arena.alloc(dictionary, true);
        self.attach(page);

        page
    }

    /// Inserts a page so that it becomes page `index` (1-based).
    ///
    /// `index` may be `count + 1` to insert after the last page.
    ///
    /// # Errors
    /// `InvalidInsertPosition` for index 0 or index beyond `count + 1`.
    pub fn insert(&mut self, index: usize, dictionary: Dictionary) -> Result<NodeId> {
        ensure!(
            index >= 1 && index <= self.count + 1,
            error::InvalidInsertPosition {
                index,
                count: self.count
            }
        );

        if index == self.count + 1 {
            return Ok(self.append(dictionary));
        }

        let target = self
            .nth_live_page(index)
            .context(error::PageOutOfRange {
                requested: index,
                count: self.count,
            })?;
        let parent = self.arena.parent(target).context(error::Detached)?;
        let position = self
            .arena
            .position_of(parent, target)
            .context(error::Detached)?;

        let page = self.arena.alloc(dictionary, true);
        self.arena
            .insert_child(parent, position, page)
            .context(error::Structure)?;
        self.count += 1;

        Ok(page)
    }

    /// The page at `number`. Numbers at or below zero read as 1.
    ///
    /// # Errors
    /// `PageOutOfRange` when `number` exceeds the live count.
    pub fn page(&self, number: i64) -> Result<NodeId> {
        let number = number.max(1) as usize;
        ensure!(
            number <= self.count,
            error::PageOutOfRange {
                requested: number,
                count: self.count
            }
        );

        Ok(self.nth_live_page(number).context(error::PageOutOfRange {
            requested: number,
            count: self.count,
        })?)
    }

    /// Tombstones the page at `number` and drops it from the count.
    /// The node stays in the arena until [`PageIndex::compact`] runs.
    pub fn delete(&mut self, number: i64) -> Result<()> {
        let target = self.page(number)?;
        self.arena.node_mut(target).deleted = true;
        self.count -= 1;

        Ok(())
    }

    /// Removes tombstoned pages and any intermediate node whose subtree
    /// no longer holds a live page.
    pub fn compact(&mut self) {
        if let Some(root) = self.root {
            self.compact_node(root);
            // The cursor may have pointed into a pruned subtree.
            self.current = Some(root);
        }
    }

    /// Assigns object numbers to every live node in document preorder
    /// and serializes the tree as indirect objects.
    ///
    /// When exactly two pages survive, the first page is forced to
    /// object number 1 for compatibility with consumers that expect
    /// minimal documents to open with object 1. A legacy quirk, kept
    /// deliberately.
    ///
    /// `renumbering` receives old-number to new-number mappings for
    /// nodes that carried a number from a previously read file, so
    /// destinations and annotations can rewrite their references.
    pub fn write_objects(
        &mut self,
        allocator: &mut ObjectAllocator,
        mut renumbering: Option<&mut BTreeMap<i64, i64>>,
    ) -> PageTreeObjects {
        let root = match self.root {
            Some(root) => root,
            None => {
                let root = self.arena.alloc(Dictionary::new(), false);
                self.root = Some(root);
                self.current = Some(root);
                root
            }
        };

        // Reserve object number 1 ahead of the root's own assignment
        // when the quirk applies, so the first page can claim it.
        let mut reserved = (self.count == 2).then(|| allocator.reserve_first());
        self.assign_numbers(root, allocator, &mut reserved, &mut renumbering);

        let mut objects = Vec::new();
        self.build_objects(root, None, &mut objects);

        let root_id = self.arena.node(root).object_id.unwrap_or(0);

        PageTreeObjects {
            objects,
            root: IndirectReference::new(root_id, 0),
        }
    }

    /// The dictionary skeleton of an intermediate node.
    pub fn pages_dictionary() -> Dictionary {
        Dictionary::from([("Type", Object::Name("Pages".into()))])
    }

    fn attach(&mut self, page: NodeId) {
        let root = match self.root {
            Some(root) => root,
            None => {
                let root = self.arena.alloc(Dictionary::new(), false);
                self.root = Some(root);
                self.current = Some(root);
                root
            }
        };
        let current = self.current.unwrap_or(root);
        let depth = self.edge_depth(current);

        let anchor = if current == root {
            if self.arena.children(root).len() < self.degree {
                self.grow_chain(root, depth.saturating_sub(1))
            } else {
                // The root is full. Grow the tree upward: the old root
                // becomes the first child of a fresh root, and the new
                // page goes down a fresh chain of the same height.
                let new_root = self.arena.alloc(Dictionary::new(), false);
                self.arena.add_child(new_root, root);
                self.root = Some(new_root);

                self.grow_chain(new_root, depth)
            }
        } else {
            self.grow_chain(current, depth.saturating_sub(1))
        };

        self.arena.add_child(anchor, page);
        self.count += 1;

        // Hand the cursor back up while the node it names is full.
        let mut cursor = anchor;
        while self.arena.children(cursor).len() >= self.degree {
            match self.arena.parent(cursor) {
                Some(parent) => cursor = parent,
                None => break,
            }
        }
        self.current = Some(cursor);
    }

    /// Builds a chain of `length` intermediate nodes below `base` and
    /// returns its deepest node (`base` itself for a zero length).
    fn grow_chain(&mut self, base: NodeId, length: usize) -> NodeId {
        let mut bottom = base;

        for _ in 0..length {
            let intermediate = self.arena.alloc(Dictionary::new(), false);
            self.arena.add_child(bottom, intermediate);
            bottom = intermediate;
        }

        bottom
    }

    /// Edges from `node` down to its deepest descendant.
    fn edge_depth(&self, node: NodeId) -> usize {
        self.arena
            .children(node)
            .iter()
            .map(|&child| self.edge_depth(child) + 1)
            .max()
            .unwrap_or(0)
    }

    fn nth_live_page(&self, target: usize) -> Option<NodeId> {
        let mut seen = 0;
        self.walk(self.root?, target, &mut seen)
    }

    fn walk(&self, node: NodeId, target: usize, seen: &mut usize) -> Option<NodeId> {
        let data = self.arena.node(node);

        if data.deleted {
            return None;
        }

        if data.leaf {
            *seen += 1;
            return (*seen == target).then_some(node);
        }

        for &child in self.arena.children(node) {
            if let Some(found) = self.walk(child, target, seen) {
                return Some(found);
            }
        }

        None
    }

    fn has_live_page(&self, node: NodeId) -> bool {
        let data = self.arena.node(node);

        if data.deleted {
            return false;
        }

        if data.leaf {
            return true;
        }

        self.arena
            .children(node)
            .iter()
            .any(|&child| self.has_live_page(child))
    }

    fn compact_node(&mut self, node: NodeId) {
        for child in self.arena.children(node).to_vec() {
            let prune = {
                let data = self.arena.node(child);
                data.deleted || (!data.leaf && !self.has_live_page(child))
            };

            if prune {
                if let Some(position) = self.arena.position_of(node, child) {
                    let _ = self.arena.remove_child(node, position);
                }
            } else if !self.arena.node(child).leaf {
                self.compact_node(child);
            }
        }
    }

    fn assign_numbers(
        &mut self,
        node: NodeId,
        allocator: &mut ObjectAllocator,
        reserved: &mut Option<i64>,
        renumbering: &mut Option<&mut BTreeMap<i64, i64>>,
    ) {
        let (deleted, leaf) = {
            let data = self.arena.node(node);
            (data.deleted, data.leaf)
        };

        if deleted {
            return;
        }

        if !leaf && Some(node) != self.root && !self.has_live_page(node) {
            return;
        }

        let id = match (leaf, reserved.take()) {
            (true, Some(id)) => id,
            (_, taken) => {
                // A reserved number only fits a page; put it back for
                // the first leaf the walk reaches.
                *reserved = taken;
                allocator.assign()
            }
        };

        if let Some(map) = renumbering.as_deref_mut() {
            if let Some(old) = self.arena.node(node).object_id {
                map.insert(old, id);
            }
        }
        self.arena.node_mut(node).object_id = Some(id);

        for child in self.arena.children(node).to_vec() {
            self.assign_numbers(child, allocator, reserved, renumbering);
        }
    }

    fn build_objects(
        &self,
        node: NodeId,
        parent: Option<IndirectReference>,
        objects: &mut Vec<IndirectObject>,
    ) {
        let data = self.arena.node(node);

        if data.deleted {
            return;
        }

        if !data.leaf && Some(node) != self.root && !self.has_live_page(node) {
            return;
        }

        let id = data.object_id.unwrap_or(0);
        let reference = IndirectReference::new(id, 0);
        let mut dictionary = data.dictionary.clone();

        if data.leaf {
            if dictionary.get("Type").is_none() {
                dictionary.set("Type", Object::Name("Page".into()));
            }
        } else {
            let kids: Array = self
                .arena
                .children(node)
                .iter()
                .filter(|&&child| {
                    let child_data = self.arena.node(child);
                    !child_data.deleted && (child_data.leaf || self.has_live_page(child))
                })
                .map(|&child| {
                    Object::from(IndirectReference::new(
                        self.arena.node(child).object_id.unwrap_or(0),
                        0,
                    ))
                })
                .collect();

            dictionary.set("Type", Object::Name("Pages".into()));
            dictionary.set("Kids", Object::from(kids));
            dictionary.set("Count", Object::from(self.live_page_count(node) as i64));
        }

        if let Some(parent) = parent {
            dictionary.set("Parent", Object::from(parent));
        }

        objects.push(IndirectObject::new(id, 0, Object::from(dictionary)));

        for child in self.arena.children(node) {
            self.build_objects(*child, Some(reference), objects);
        }
    }

    fn live_page_count(&self, node: NodeId) -> usize {
        let data = self.arena.node(node);

        if data.deleted {
            return 0;
        }

        if data.leaf {
            return 1;
        }

        self.arena
            .children(node)
            .iter()
            .map(|&child| self.live_page_count(child))
            .sum()
    }
}

mod error {
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)), context(suffix(false)))]
    pub(super) enum Error {
        #[snafu(display("Insert position {index} invalid for {count} pages"))]
        InvalidInsertPosition { index: usize, count: usize },

        #[snafu(display("Page {requested} out of range. Document has {count} pages"))]
        PageOutOfRange { requested: usize, count: usize },

        #[snafu(display("Page is not attached to the index"))]
        Detached,

        #[snafu(display("Invalid tree structure"))]
        Structure { source: crate::tree::node::Error },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::ObjectAllocator;

    fn marked(value: i64) -> Dictionary {
        Dictionary::from([("Marker", Object::from(value))])
    }

    fn marker(index: &PageIndex, id: NodeId) -> i64 {
        index
            .arena
            .node(id)
            .dictionary
            .get("Marker")
            .and_then(|object| object.as_integer().ok())
            .unwrap_or(-1)
    }

    fn max_fan_out(index: &PageIndex, node: NodeId) -> usize {
        let own = index.arena.children(node).len();

        index
            .arena
            .children(node)
            .iter()
            .map(|&child| max_fan_out(index, child))
            .max()
            .unwrap_or(0)
            .max(own)
    }

    #[snafu::report]
    #[test]
    fn sequential_append_preserves_order() -> Result<()> {
        let mut index = PageIndex::new();

        for n in 1..=25 {
            index.append(marked(n));
        }

        // Test 1: every page is found at its insertion position
        assert_eq!(index.count(), 25);
        for n in 1..=25 {
            assert_eq!(marker(&index, index.page(n)?), n);
        }

        // Test 2: numbers at or below zero read as page 1
        assert_eq!(index.page(0)?, index.page(1)?);
        assert_eq!(index.page(-3)?, index.page(1)?);

        // Test 3: past-the-end lookup is a range error
        assert!(index.page(26).is_err());

        Ok(())
    }

    #[test]
    fn fan_out_stays_bounded() {
        // Small degree forces several levels of root growth.
        let mut index = PageIndex::with_degree(3);

        for n in 1..=40 {
            index.append(marked(n));
        }

        let root = index.root.unwrap();
        assert!(max_fan_out(&index, root) <= 3);

        // Order survives the restructuring.
        for n in 1..=40 {
            assert_eq!(marker(&index, index.page(n).unwrap()), n);
        }
    }

    #[snafu::report]
    #[test]
    fn delete_shifts_later_pages() -> Result<()> {
        let mut index = PageIndex::new();

        for n in 1..=5 {
            index.append(marked(n));
        }

        index.delete(3)?;

        // Test 1: the live count drops
        assert_eq!(index.count(), 4);

        // Test 2: pages after the tombstone shift down by one
        assert_eq!(marker(&index, index.page(3)?), 4);
        assert_eq!(marker(&index, index.page(4)?), 5);

        // Test 3: the old last position is now out of range
        assert!(index.page(5).is_err());

        Ok(())
    }

    #[snafu::report]
    #[test]
    fn indexed_insert() -> Result<()> {
        let mut index = PageIndex::new();

        for n in 1..=3 {
            index.append(marked(n));
        }

        // Test 1: insert before page 2
        index.insert(2, marked(10))?;
        assert_eq!(index.count(), 4);
        assert_eq!(marker(&index, index.page(1)?), 1);
        assert_eq!(marker(&index, index.page(2)?), 10);
        assert_eq!(marker(&index, index.page(3)?), 2);

        // Test 2: count + 1 appends
        index.insert(5, marked(11))?;
        assert_eq!(marker(&index, index.page(5)?), 11);

        // Test 3: position 0 and past count + 1 are structure errors
        assert!(index.insert(0, marked(12)).is_err());
        assert!(index.insert(7, marked(12)).is_err());

        Ok(())
    }

    #[test]
    fn compact_prunes_emptied_subtrees() {
        let mut index = PageIndex::with_degree(3);

        for n in 1..=9 {
            index.append(marked(n));
        }

        // Pages 4 to 6 share one intermediate at degree 3. Deleting all
        // three leaves it without a live page.
        for _ in 0..3 {
            index.delete(4).unwrap();
        }
        assert_eq!(index.count(), 6);

        let root = index.root.unwrap();
        let before = index.arena.children(root).len();
        index.compact();
        assert!(index.arena.children(root).len() < before);

        // Remaining pages are still reachable in order.
        let expected = [1, 2, 3, 7, 8, 9];
        for (position, value) in expected.iter().enumerate() {
            let page = index.page(position as i64 + 1).unwrap();
            assert_eq!(marker(&index, page), *value);
        }
    }

    #[test]
    fn write_pass_numbers_in_preorder() {
        let mut index = PageIndex::with_degree(3);

        for n in 1..=4 {
            index.append(marked(n));
        }

        let mut allocator = ObjectAllocator::new();
        let produced = index.write_objects(&mut allocator, None);

        // Root first, then its subtree in document order.
        assert_eq!(produced.root.id, produced.objects[0].id);
        let ids: Vec<i64> = produced.objects.iter().map(|object| object.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);

        // The root carries the live count and one kid per subtree.
        let root_dictionary = produced.objects[0].get_object().as_dictionary().unwrap();
        assert_eq!(root_dictionary.get("Count"), Some(&Object::from(4i64)));
    }

    #[test]
    fn two_survivors_force_first_page_to_object_one() {
        let mut index = PageIndex::new();
        index.append(marked(1));
        index.append(marked(2));

        let mut allocator = ObjectAllocator::new();
        let produced = index.write_objects(&mut allocator, None);

        let first_page = produced
            .objects
            .iter()
            .find(|object| {
                object
                    .get_object()
                    .as_dictionary()
                    .is_ok_and(|dictionary| {
                        dictionary.get("Marker") == Some(&Object::from(1i64))
                    })
            })
            .unwrap();
        assert_eq!(first_page.id, 1);
    }

    #[test]
    fn resave_records_renumbering() {
        let mut index = PageIndex::new();
        let first = index.append(marked(1));
        index.append(marked(2));
        index.append(marked(3));

        // Numbers as a previously read file assigned them.
        index.set_object_id(first, 42);

        let mut allocator = ObjectAllocator::new();
        let mut renumbering = BTreeMap::new();
        index.write_objects(&mut allocator, Some(&mut renumbering));

        let new_id = renumbering.get(&42).copied().unwrap();
        assert!(new_id >= 1);
        assert_ne!(new_id, 42);
    }
}
