//! Reordering a widget's direct children by dragging handles.
//!
//! Each row carries a grip handle; dragging a row encodes its index among
//! siblings into the mime bundle, and dropping onto another row moves the
//! dragged row immediately before it.

use trellis_core::{ElementId, ElementTree};

use crate::widget::controller::{MoveDelegate, create_default_handle, find_child};
use crate::widget::drag_drop::{DropAction, MimeBundle};

/// The class name marking a reorderable row.
pub const ROW_CLASS: &str = "tr-ReorderList-row";

/// Delegate reordering the direct children of a list root.
#[derive(Debug)]
pub struct ReorderList {
    /// The list root whose children are reordered.
    root: ElementId,
}

impl ReorderList {
    /// Creates a reorder delegate for the list rooted at `root`.
    pub fn new(root: ElementId) -> Self {
        Self { root }
    }

    /// Appends a row with a default grip handle, returning the row.
    pub fn add_row(&self, tree: &mut ElementTree, label: impl Into<String>) -> ElementId {
        let row = tree.create_with_class(ROW_CLASS);
        tree.set_text(row, label);
        let handle = create_default_handle(tree);
        let _ = tree.append_child(row, handle);
        let _ = tree.append_child(self.root, row);
        row
    }

    /// Returns the row labels in display order.
    pub fn rows(&self, tree: &ElementTree) -> Vec<String> {
        tree.children(self.root)
            .iter()
            .map(|&row| tree.text(row).to_string())
            .collect()
    }
}

impl MoveDelegate for ReorderList {
    fn add_mime_data(&mut self, tree: &ElementTree, handle: ElementId, data: &mut MimeBundle) {
        if let Some(row) = self.find_drag_target(tree, handle)
            && let Some(index) = tree.child_index(self.root, row)
        {
            data.set_index(index);
        }
    }

    /// The drag target is the direct child containing the handle, not the
    /// handle itself.
    fn find_drag_target(&self, tree: &ElementTree, handle: ElementId) -> Option<ElementId> {
        find_child(tree, self.root, handle)
    }

    fn move_item(
        &mut self,
        tree: &mut ElementTree,
        data: &MimeBundle,
        target: ElementId,
    ) -> DropAction {
        let Some(from) = data.index() else {
            return DropAction::NONE;
        };
        let Some(row) = tree.children(self.root).get(from).copied() else {
            return DropAction::NONE;
        };
        if row == target {
            return DropAction::NONE;
        }

        // Move the dragged row immediately before the target row.
        if tree.detach(row).is_err() {
            return DropAction::NONE;
        }
        let Some(to) = tree.child_index(self.root, target) else {
            let _ = tree.append_child(self.root, row);
            return DropAction::NONE;
        };
        if tree.insert_child(self.root, to, row).is_err() {
            return DropAction::NONE;
        }
        DropAction::MOVE
    }
}
