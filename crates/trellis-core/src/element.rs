//! The element tree.
//!
//! Widgets in Trellis do not own DOM nodes; they own a subtree of an
//! [`ElementTree`], an arena of lightweight elements with ordered children,
//! class lists, and text labels. Interaction code (hit scoping, drop-target
//! marking, drag-image construction) works purely in terms of [`ElementId`]s
//! and the traversal methods here, so ownership and invariants live on one
//! explicit structure instead of ambient global queries.
//!
//! # Example
//!
//! ```
//! use trellis_core::ElementTree;
//!
//! let mut tree = ElementTree::new();
//! let parent = tree.create();
//! let child = tree.create();
//! tree.append_child(parent, child).unwrap();
//!
//! assert_eq!(tree.parent(child), Some(parent));
//! assert!(tree.is_ancestor_or_self(parent, child));
//! ```

use slotmap::{SlotMap, new_key_type};

use crate::error::{ElementError, ElementResult};

new_key_type! {
    /// A unique identifier for an element in an [`ElementTree`].
    ///
    /// `ElementId`s are stable handles that remain valid as the tree changes.
    /// They become invalid when the element is removed.
    pub struct ElementId;
}

/// Internal per-element data.
#[derive(Debug, Clone, Default)]
struct ElementData {
    /// Parent element (if attached).
    parent: Option<ElementId>,
    /// Child elements, in document order.
    children: Vec<ElementId>,
    /// Class names, in the order they were added.
    classes: Vec<String>,
    /// Text label (header captions, row labels).
    text: String,
}

/// An arena-backed retained tree of elements.
///
/// All structural mutation goes through the tree so parent links and child
/// lists cannot drift apart. Queries on invalid ids answer with `None`,
/// `false`, or an empty slice; mutations answer with [`ElementError`].
#[derive(Debug, Default)]
pub struct ElementTree {
    nodes: SlotMap<ElementId, ElementData>,
}

static_assertions::assert_impl_all!(ElementTree: Send);

impl ElementTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live elements in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree has no elements.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true if `id` refers to a live element.
    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    // -------------------------------------------------------------------------
    // Construction and structure
    // -------------------------------------------------------------------------

    /// Creates a new detached element.
    pub fn create(&mut self) -> ElementId {
        self.nodes.insert(ElementData::default())
    }

    /// Creates a new detached element carrying one class.
    pub fn create_with_class(&mut self, class: impl Into<String>) -> ElementId {
        let id = self.nodes.insert(ElementData::default());
        self.add_class(id, class);
        id
    }

    /// Returns the parent of `id`, if it is attached.
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id).and_then(|d| d.parent)
    }

    /// Returns the children of `id` in document order.
    ///
    /// Invalid ids have no children.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.nodes.get(id).map_or(&[], |d| d.children.as_slice())
    }

    /// Returns the position of `child` within `parent`'s child list.
    pub fn child_index(&self, parent: ElementId, child: ElementId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Appends `child` as the last child of `parent`.
    ///
    /// The child is detached from any previous parent first. Attaching an
    /// element under itself or one of its own descendants is refused.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> ElementResult<()> {
        let len = self.children(parent).len();
        self.insert_child(parent, len, child)
    }

    /// Inserts `child` at `index` within `parent`'s child list.
    ///
    /// The child is detached from any previous parent first; when moving
    /// within the same parent, `index` is interpreted against the list after
    /// removal.
    pub fn insert_child(
        &mut self,
        parent: ElementId,
        index: usize,
        child: ElementId,
    ) -> ElementResult<()> {
        if !self.contains(parent) {
            return Err(ElementError::NotFound(parent));
        }
        if !self.contains(child) {
            return Err(ElementError::NotFound(child));
        }
        if child == parent || self.is_ancestor_or_self(child, parent) {
            return Err(ElementError::Cycle);
        }

        self.detach(child)?;

        let len = self.nodes[parent].children.len();
        if index > len {
            return Err(ElementError::IndexOutOfBounds { index, len });
        }
        self.nodes[parent].children.insert(index, child);
        self.nodes[child].parent = Some(parent);
        Ok(())
    }

    /// Detaches `child` from its parent, keeping it (and its subtree) alive.
    ///
    /// Detaching an already-detached element is a no-op.
    pub fn detach(&mut self, child: ElementId) -> ElementResult<()> {
        let Some(data) = self.nodes.get(child) else {
            return Err(ElementError::NotFound(child));
        };
        if let Some(parent) = data.parent {
            self.nodes[parent].children.retain(|&c| c != child);
            self.nodes[child].parent = None;
        }
        Ok(())
    }

    /// Removes `id` and its entire subtree from the tree.
    ///
    /// All ids within the subtree become invalid.
    pub fn remove(&mut self, id: ElementId) -> ElementResult<()> {
        if !self.contains(id) {
            return Err(ElementError::NotFound(id));
        }
        self.detach(id)?;

        let doomed = self.collect_subtree(id);
        tracing::trace!(
            target: "trellis_core::element",
            ?id,
            subtree_len = doomed.len(),
            "removing element subtree"
        );
        for node in doomed {
            self.nodes.remove(node);
        }
        Ok(())
    }

    /// Collects `root` and all its descendants, depth first.
    fn collect_subtree(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().copied());
        }
        out
    }

    /// Deep-copies the subtree rooted at `id`, returning the detached copy.
    ///
    /// Classes and text are cloned along with structure. This is how drag
    /// images are produced from a drag target.
    pub fn clone_subtree(&mut self, id: ElementId) -> ElementResult<ElementId> {
        if !self.contains(id) {
            return Err(ElementError::NotFound(id));
        }
        Ok(self.clone_node_recursive(id))
    }

    fn clone_node_recursive(&mut self, id: ElementId) -> ElementId {
        let mut data = self.nodes[id].clone();
        data.parent = None;
        let children = std::mem::take(&mut data.children);
        let copy = self.nodes.insert(data);
        for child in children {
            let child_copy = self.clone_node_recursive(child);
            self.nodes[child_copy].parent = Some(copy);
            self.nodes[copy].children.push(child_copy);
        }
        copy
    }

    // -------------------------------------------------------------------------
    // Classes and text
    // -------------------------------------------------------------------------

    /// Adds a class to the element. Adding a class twice is a no-op.
    pub fn add_class(&mut self, id: ElementId, class: impl Into<String>) {
        let class = class.into();
        if let Some(data) = self.nodes.get_mut(id)
            && !data.classes.contains(&class)
        {
            data.classes.push(class);
        }
    }

    /// Removes a class from the element, if present.
    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        if let Some(data) = self.nodes.get_mut(id) {
            data.classes.retain(|c| c != class);
        }
    }

    /// Returns true if the element carries the class.
    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|d| d.classes.iter().any(|c| c == class))
    }

    /// Returns the element's classes in the order they were added.
    pub fn classes(&self, id: ElementId) -> &[String] {
        self.nodes.get(id).map_or(&[], |d| d.classes.as_slice())
    }

    /// Sets the element's text label.
    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        if let Some(data) = self.nodes.get_mut(id) {
            data.text = text.into();
        }
    }

    /// Returns the element's text label (empty for invalid ids).
    pub fn text(&self, id: ElementId) -> &str {
        self.nodes.get(id).map_or("", |d| d.text.as_str())
    }

    // -------------------------------------------------------------------------
    // Traversal
    // -------------------------------------------------------------------------

    /// Iterates from `id` (inclusive) up through its ancestors to the root.
    pub fn ancestors(&self, id: ElementId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            current: self.contains(id).then_some(id),
        }
    }

    /// Returns true if `ancestor` is `node` itself or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: ElementId, node: ElementId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Finds the first element within the subtree rooted at `root` carrying
    /// `class`, in depth-first order.
    pub fn find_by_class(&self, root: ElementId, class: &str) -> Option<ElementId> {
        if !self.contains(root) {
            return None;
        }
        if self.has_class(root, class) {
            return Some(root);
        }
        for &child in self.children(root) {
            if let Some(found) = self.find_by_class(child, class) {
                return Some(found);
            }
        }
        None
    }
}

/// Iterator over an element and its ancestors, from leaf to root.
pub struct Ancestors<'a> {
    tree: &'a ElementTree,
    current: Option<ElementId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.tree.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_attach() {
        let mut tree = ElementTree::new();
        let parent = tree.create();
        let a = tree.create();
        let b = tree.create();

        tree.append_child(parent, a).unwrap();
        tree.append_child(parent, b).unwrap();

        assert_eq!(tree.children(parent), &[a, b]);
        assert_eq!(tree.parent(a), Some(parent));
        assert_eq!(tree.child_index(parent, b), Some(1));
    }

    #[test]
    fn test_insert_child_order() {
        let mut tree = ElementTree::new();
        let parent = tree.create();
        let a = tree.create();
        let b = tree.create();
        let c = tree.create();

        tree.append_child(parent, a).unwrap();
        tree.append_child(parent, c).unwrap();
        tree.insert_child(parent, 1, b).unwrap();

        assert_eq!(tree.children(parent), &[a, b, c]);
    }

    #[test]
    fn test_reattach_moves_element() {
        let mut tree = ElementTree::new();
        let first = tree.create();
        let second = tree.create();
        let child = tree.create();

        tree.append_child(first, child).unwrap();
        tree.append_child(second, child).unwrap();

        assert!(tree.children(first).is_empty());
        assert_eq!(tree.children(second), &[child]);
        assert_eq!(tree.parent(child), Some(second));
    }

    #[test]
    fn test_cycle_refused() {
        let mut tree = ElementTree::new();
        let parent = tree.create();
        let child = tree.create();
        tree.append_child(parent, child).unwrap();

        assert_eq!(tree.append_child(child, parent), Err(ElementError::Cycle));
        assert_eq!(tree.append_child(parent, parent), Err(ElementError::Cycle));
    }

    #[test]
    fn test_invalid_ids() {
        let mut tree = ElementTree::new();
        let id = tree.create();
        tree.remove(id).unwrap();

        assert!(!tree.contains(id));
        assert!(tree.children(id).is_empty());
        assert_eq!(tree.parent(id), None);
        assert_eq!(tree.append_child(id, id), Err(ElementError::NotFound(id)));
    }

    #[test]
    fn test_classes() {
        let mut tree = ElementTree::new();
        let id = tree.create();

        tree.add_class(id, "a");
        tree.add_class(id, "b");
        tree.add_class(id, "a");
        assert_eq!(tree.classes(id), &["a".to_string(), "b".to_string()]);

        tree.remove_class(id, "a");
        assert!(!tree.has_class(id, "a"));
        assert!(tree.has_class(id, "b"));
    }

    #[test]
    fn test_find_by_class_depth_first() {
        let mut tree = ElementTree::new();
        let root = tree.create();
        let left = tree.create();
        let right = tree.create();
        let deep = tree.create();

        tree.append_child(root, left).unwrap();
        tree.append_child(root, right).unwrap();
        tree.append_child(left, deep).unwrap();

        tree.add_class(deep, "marker");
        tree.add_class(right, "marker");

        // Depth-first: the nested element under the first child wins.
        assert_eq!(tree.find_by_class(root, "marker"), Some(deep));
    }

    #[test]
    fn test_ancestors() {
        let mut tree = ElementTree::new();
        let root = tree.create();
        let mid = tree.create();
        let leaf = tree.create();
        tree.append_child(root, mid).unwrap();
        tree.append_child(mid, leaf).unwrap();

        let chain: Vec<_> = tree.ancestors(leaf).collect();
        assert_eq!(chain, vec![leaf, mid, root]);
        assert!(tree.is_ancestor_or_self(root, leaf));
        assert!(tree.is_ancestor_or_self(leaf, leaf));
        assert!(!tree.is_ancestor_or_self(leaf, root));
    }

    #[test]
    fn test_clone_subtree() {
        let mut tree = ElementTree::new();
        let root = tree.create_with_class("row");
        let child = tree.create();
        tree.append_child(root, child).unwrap();
        tree.set_text(child, "label");

        let copy = tree.clone_subtree(root).unwrap();
        assert_ne!(copy, root);
        assert_eq!(tree.parent(copy), None);
        assert!(tree.has_class(copy, "row"));
        assert_eq!(tree.children(copy).len(), 1);
        let child_copy = tree.children(copy)[0];
        assert_eq!(tree.text(child_copy), "label");

        // The copy is independent of the original.
        tree.set_text(child, "changed");
        assert_eq!(tree.text(child_copy), "label");
    }

    #[test]
    fn test_remove_subtree() {
        let mut tree = ElementTree::new();
        let root = tree.create();
        let child = tree.create();
        let grandchild = tree.create();
        tree.append_child(root, child).unwrap();
        tree.append_child(child, grandchild).unwrap();

        tree.remove(child).unwrap();
        assert!(tree.contains(root));
        assert!(!tree.contains(child));
        assert!(!tree.contains(grandchild));
        assert!(tree.children(root).is_empty());
    }
}
