//! The Trellis interaction engine.
//!
//! This module provides the drag and drop machinery:
//!
//! - [`DragDropController`]: the concrete engine binding a delegate to an
//!   element subtree, demultiplexing pointer and drag-protocol events
//! - [`DragDropDelegate`] / [`MoveDelegate`]: the hook traits subclass logic
//!   plugs into
//! - [`drag_drop`]: actions, mime bundles, and the drag session
//! - [`events`]: the event structs and the [`WidgetEvent`] envelope
//! - [`dispatcher`]: routing events to controllers the way a DOM would
//! - [`widgets`]: ready-made delegates (column reordering, row reordering,
//!   external drop sinks)
//!
//! # Driving a drag
//!
//! The engine is single-threaded and event-loop driven. A host feeds it
//! events and owns the one asynchronous boundary, session resolution:
//!
//! ```ignore
//! source.handle_event(&mut tree, &mut press)?;
//! source.handle_event(&mut tree, &mut far_enough_move)?;   // session starts
//!
//! let mut enter = source.active_drag().unwrap().drag_enter_event(target_el);
//! target.handle_event(&mut tree, &mut enter)?;
//! // ... over events, then the drop ...
//! source.complete_drag(&mut tree, DropAction::MOVE);
//! ```

mod controller;
mod dispatcher;
pub mod drag_drop;
mod error;
pub mod events;
pub mod widgets;


pub use controller::{
    Capabilities, DRAG_HANDLE_CLASS, DRAG_THRESHOLD, DRAG_WIDGET_CLASS, DEFAULT_HANDLE_CLASS,
    DROP_TARGET_CLASS, DROP_WIDGET_CLASS, DragDropController, DragDropDelegate, DropContext,
    DropOptions, GesturePhase, ListenerSet, MoveDelegate, Reorder, belongs_to,
    create_default_handle, find_child, find_child_among, make_handle, unmake_handle,
};
pub use dispatcher::{DispatchResult, EventRouter, EventSink};
pub use drag_drop::{DragSession, DropAction, MimeBundle, WidgetId, mime};
pub use error::DragDropError;
pub use events::{
    DragEnterEvent, DragLeaveEvent, DragOverEvent, DropEvent, EventKind, KeyboardModifiers,
    MouseButton, MouseMoveEvent, MousePressEvent, MouseReleaseEvent, WidgetEvent,
};
