//! Error types for Trellis core.

use thiserror::Error;

use crate::element::ElementId;

/// Errors that can occur during element tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElementError {
    /// The element ID is invalid or the element has been removed.
    #[error("invalid or removed element ID {0:?}")]
    NotFound(ElementId),

    /// Attempted to attach an element under itself or one of its descendants.
    #[error("cannot attach an element under itself or its own descendant")]
    Cycle,

    /// A child index was out of bounds for the parent's child list.
    #[error("child index {index} out of bounds (parent has {len} children)")]
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The number of children the parent has.
        len: usize,
    },
}

/// Result type for element tree operations.
pub type ElementResult<T> = std::result::Result<T, ElementError>;
