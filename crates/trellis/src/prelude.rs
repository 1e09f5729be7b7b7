//! Prelude module for Trellis.
//!
//! Re-exports the most commonly used types for convenient importing:
//!
//! ```ignore
//! use trellis::prelude::*;
//! ```

// ============================================================================
// Element Tree
// ============================================================================

pub use trellis_core::{ElementId, ElementTree, Point};

// ============================================================================
// Interaction Engine
// ============================================================================

pub use crate::widget::{
    Capabilities, DragDropController, DragDropDelegate, DragDropError, DropContext, DropOptions,
    MoveDelegate, Reorder, create_default_handle, make_handle, unmake_handle,
};

pub use crate::widget::drag_drop::{DragSession, DropAction, MimeBundle, WidgetId, mime};

pub use crate::widget::events::{
    DragEnterEvent, DragLeaveEvent, DragOverEvent, DropEvent, EventKind, MouseButton,
    MouseMoveEvent, MousePressEvent, MouseReleaseEvent, WidgetEvent,
};

pub use crate::widget::{DispatchResult, EventRouter, EventSink};

// ============================================================================
// Widgets
// ============================================================================

pub use crate::widget::widgets::{ColumnReorder, DropSink, ReorderList};
