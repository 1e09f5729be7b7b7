//! Trellis - a drag and drop interaction engine for retained element trees.
//!
//! Trellis turns raw pointer events and drag-protocol events into semantic
//! drag/drop operations over an element tree: handle discovery, drag-threshold
//! detection, mime-data negotiation, drop-target location and marking, and the
//! admissibility rules for copy/move/link actions.
//!
//! # Example
//!
//! ```
//! use trellis::prelude::*;
//!
//! let mut tree = ElementTree::new();
//! let list = tree.create();
//! let row = tree.create();
//! tree.append_child(list, row).unwrap();
//! make_handle(&mut tree, row);
//!
//! let delegate = ReorderList::new(list);
//! let mut widget = DragDropController::new(
//!     &mut tree,
//!     list,
//!     Capabilities::DRAG_DROP,
//!     DropOptions::default().with_accepted_mime_types([mime::CHILD_INDEX]),
//!     Reorder(delegate),
//! );
//! widget.attach();
//! ```

pub use trellis_core::*;

pub mod prelude;
pub mod widget;
