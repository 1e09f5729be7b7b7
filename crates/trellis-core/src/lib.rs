//! Core systems for Trellis.
//!
//! This crate provides the foundational components of the Trellis interaction
//! toolkit:
//!
//! - **Element Tree**: An arena-backed retained tree of elements with ordered
//!   children, class lists, and text labels
//! - **Geometry**: The minimal point type used by pointer events
//! - **Diagnostics**: `tracing` targets and a subtree debug formatter
//!
//! # Element Tree Example
//!
//! ```
//! use trellis_core::ElementTree;
//!
//! let mut tree = ElementTree::new();
//! let list = tree.create();
//! let row = tree.create();
//! tree.append_child(list, row).unwrap();
//! tree.add_class(row, "tr-row");
//!
//! assert_eq!(tree.children(list), &[row]);
//! assert!(tree.has_class(row, "tr-row"));
//! ```

pub mod element;
pub mod error;
pub mod geometry;
pub mod logging;

pub use element::{ElementId, ElementTree};
pub use error::{ElementError, ElementResult};
pub use geometry::Point;
