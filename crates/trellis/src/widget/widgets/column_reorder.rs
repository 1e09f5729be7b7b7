//! Column reordering by dragging header cells.
//!
//! A header row holds one cell per column; every cell doubles as the drag
//! handle for its column and as a drop point for other columns. Dropping a
//! dragged header onto another cell moves the column immediately before it.
//!
//! The drop-target predicate rejects drops onto anything that is not a
//! header cell, onto the dragged column itself (a same-column drop is a
//! no-op), and onto the pinned column, which keeps its position (the path
//! column of a file listing, by default).

use trellis_core::{ElementId, ElementTree};

use crate::widget::controller::{DragDropDelegate, DropContext, make_handle};
use crate::widget::drag_drop::{DropAction, MimeBundle};
use crate::widget::error::DragDropError;
use crate::widget::events::DropEvent;

/// The class name marking a header cell.
pub const HEADER_CELL_CLASS: &str = "tr-ColumnBar-headerName";

/// Delegate reordering columns through their header cells.
#[derive(Debug)]
pub struct ColumnReorder {
    /// The header row owning the cells.
    header_row: ElementId,
    /// Label of the column that may never be a drop target.
    pinned_label: Option<String>,
}

impl ColumnReorder {
    /// Creates a column-reorder delegate for `header_row`.
    ///
    /// The `"path"` column is pinned by default; see
    /// [`with_pinned_label`](Self::with_pinned_label).
    pub fn new(header_row: ElementId) -> Self {
        Self {
            header_row,
            pinned_label: Some("path".to_string()),
        }
    }

    /// Sets (or clears) the pinned column label.
    pub fn with_pinned_label(mut self, label: Option<String>) -> Self {
        self.pinned_label = label;
        self
    }

    /// Appends a column header cell, marked as a drag handle.
    pub fn add_column(&self, tree: &mut ElementTree, label: impl Into<String>) -> ElementId {
        let cell = tree.create_with_class(HEADER_CELL_CLASS);
        tree.set_text(cell, label);
        make_handle(tree, cell);
        // Header rows only hold cells, so append cannot cycle.
        let _ = tree.append_child(self.header_row, cell);
        cell
    }

    /// Returns the column labels in display order.
    pub fn columns(&self, tree: &ElementTree) -> Vec<String> {
        tree.children(self.header_row)
            .iter()
            .map(|&cell| tree.text(cell).to_string())
            .collect()
    }
}

impl DragDropDelegate for ColumnReorder {
    fn add_mime_data(&mut self, tree: &ElementTree, handle: ElementId, data: &mut MimeBundle) {
        data.set_column_header(tree.text(handle));
    }

    fn is_valid_target(
        &self,
        tree: &ElementTree,
        candidate: ElementId,
        data: &MimeBundle,
    ) -> bool {
        let Some(dragged) = data.column_header() else {
            return false;
        };
        let label = tree.text(candidate);
        tree.has_class(candidate, HEADER_CELL_CLASS)
            && label != dragged
            && Some(label) != self.pinned_label.as_deref()
    }

    fn process_drop(
        &mut self,
        tree: &mut ElementTree,
        _ctx: &DropContext,
        target: ElementId,
        event: &mut DropEvent,
    ) -> Result<(), DragDropError> {
        let Some(label) = event.data().column_header() else {
            event.drop_action = DropAction::NONE;
            event.base.accept();
            return Ok(());
        };
        let dragged = tree
            .children(self.header_row)
            .iter()
            .copied()
            .find(|&cell| tree.text(cell) == label);
        let Some(dragged) = dragged else {
            event.drop_action = DropAction::NONE;
            event.base.accept();
            return Ok(());
        };

        // Move the dragged cell immediately before the target cell.
        tree.detach(dragged)?;
        let Some(to) = tree.child_index(self.header_row, target) else {
            // The target vanished from the row; put the cell back at the end.
            tree.append_child(self.header_row, dragged)?;
            event.drop_action = DropAction::NONE;
            event.base.accept();
            return Ok(());
        };
        tree.insert_child(self.header_row, to, dragged)?;

        event.base.accept();
        event.drop_action = event.proposed_action;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::widget::drag_drop::{MimeBundle, WidgetId};
    use crate::widget::events::DropEvent;

    fn bar_with_columns(tree: &mut ElementTree) -> (ColumnReorder, Vec<ElementId>) {
        let row = tree.create();
        let bar = ColumnReorder::new(row);
        let cells = ["path", "name", "size"]
            .iter()
            .map(|label| bar.add_column(tree, *label))
            .collect();
        (bar, cells)
    }

    #[test]
    fn test_target_predicate() {
        let mut tree = ElementTree::new();
        let (bar, cells) = bar_with_columns(&mut tree);

        let mut data = MimeBundle::new();
        data.set_column_header("name");

        // Another column is fine; self and the pinned column are not.
        assert!(bar.is_valid_target(&tree, cells[2], &data));
        assert!(!bar.is_valid_target(&tree, cells[1], &data));
        assert!(!bar.is_valid_target(&tree, cells[0], &data));

        // Not a header cell at all.
        let stray = tree.create();
        assert!(!bar.is_valid_target(&tree, stray, &data));

        // A bundle with no header payload never matches.
        assert!(!bar.is_valid_target(&tree, cells[2], &MimeBundle::new()));
    }

    #[test]
    fn test_process_drop_reorders() {
        let mut tree = ElementTree::new();
        let (mut bar, cells) = bar_with_columns(&mut tree);

        let mut data = MimeBundle::new();
        data.set_column_header("size");
        let mut event = DropEvent::new(
            cells[1],
            Arc::new(data),
            Some(WidgetId::next()),
            DropAction::ALL,
            DropAction::MOVE,
        );

        let ctx = DropContext {
            widget_id: event.source.unwrap(),
            accepts_external: false,
        };
        bar.process_drop(&mut tree, &ctx, cells[1], &mut event)
            .unwrap();

        assert_eq!(bar.columns(&tree), vec!["path", "size", "name"]);
        assert!(event.base.is_accepted());
        assert_eq!(event.drop_action, DropAction::MOVE);
    }

    #[test]
    fn test_mime_payload() {
        let mut tree = ElementTree::new();
        let (mut bar, cells) = bar_with_columns(&mut tree);

        let mut data = MimeBundle::new();
        bar.add_mime_data(&tree, cells[2], &mut data);
        assert_eq!(data.column_header(), Some("size".to_string()));
    }
}
