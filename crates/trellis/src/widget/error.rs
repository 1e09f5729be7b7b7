//! Error types for the interaction engine.

use thiserror::Error;

use trellis_core::ElementError;

/// Errors surfaced by the drag and drop engine.
///
/// Declined or invalid drops are not errors: they are handled locally by
/// forcing the drop action to `NONE` or ignoring the event. Only invariant
/// violations and contract misuse reach this type.
#[derive(Debug, Error)]
pub enum DragDropError {
    /// A tracked mouse-move arrived with no press record.
    ///
    /// The press-tracking listeners are only installed between a primary
    /// press on a handle and either release or drag start, so this indicates
    /// a listener-lifecycle bug in the host.
    #[error("tracked mouse move arrived with no press record")]
    MissingPressRecord,

    /// An externally sourced drop reached a move handler even though the
    /// widget does not accept external drops.
    ///
    /// The drop handler screens sources before delegating, so this indicates
    /// the composing widget tree routed a drop around that guard.
    #[error("externally sourced drop reached a move handler with external drops disabled")]
    ExternalDropNotAllowed,

    /// An element tree operation failed underneath the engine.
    #[error(transparent)]
    Element(#[from] ElementError),
}
