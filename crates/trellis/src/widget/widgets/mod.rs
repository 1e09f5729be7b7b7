//! Ready-made delegates for common drag and drop widgets.
//!
//! - [`ColumnReorder`]: reorder table columns by dragging their header cells
//! - [`ReorderList`]: reorder a widget's direct children by dragging handles
//! - [`DropSink`]: a drop-only consumer for externally sourced drags

mod column_reorder;
mod drop_sink;
mod reorder_list;

pub use column_reorder::{ColumnReorder, HEADER_CELL_CLASS};
pub use drop_sink::{DropSink, DroppedPayload};
pub use reorder_list::{ReorderList, ROW_CLASS};
