//! Event routing for drag/drop widgets.
//!
//! Hosts that own more than one controller can use [`EventRouter`] to deliver
//! events the way a DOM would:
//!
//! 1. **Capture phase**: tracked pointer events (mouse move/release) go to
//!    every sink whose pointer-tracking listeners are installed, regardless
//!    of the event target — the engine's equivalent of document-level capture
//!    listeners.
//! 2. **Bubble phase**: all other events walk the target's ancestor chain
//!    from the innermost element outward; a sink rooted at a chain element
//!    receives the event, and delivery stops once a sink accepts it. This is
//!    what keeps an outer widget from seeing events a nested widget consumed.
//!
//! The router is stateless; sinks are passed per call, so it works with any
//! widget storage the host keeps.

use trellis_core::{ElementId, ElementTree};

use super::error::DragDropError;
use super::events::{EventKind, WidgetEvent};

/// Result of dispatching an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    /// A sink accepted the event.
    Accepted,
    /// The event was delivered but no sink accepted it.
    Ignored,
    /// No sink was eligible for the event.
    NotDelivered,
}

impl DispatchResult {
    /// Check if the event was handled.
    pub fn was_handled(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// A widget that can receive events from the router.
pub trait EventSink {
    /// Root of the subtree the sink owns.
    fn sink_root(&self) -> ElementId;

    /// Whether the sink currently listens for events of `kind`.
    fn listens_for(&self, kind: EventKind) -> bool;

    /// Handles an event.
    fn handle_event(
        &mut self,
        tree: &mut ElementTree,
        event: &mut WidgetEvent,
    ) -> Result<(), DragDropError>;
}

/// Stateless event router over a set of sinks.
pub struct EventRouter;

impl EventRouter {
    /// Delivers `event` to the eligible sinks.
    ///
    /// Errors from a sink abort delivery and propagate to the caller; they
    /// indicate invariant violations, not declined events.
    pub fn dispatch(
        tree: &mut ElementTree,
        sinks: &mut [&mut dyn EventSink],
        event: &mut WidgetEvent,
    ) -> Result<DispatchResult, DragDropError> {
        let kind = event.kind();
        let mut delivered = false;

        if matches!(kind, EventKind::MouseMove | EventKind::MouseRelease) {
            // Capture phase: tracking sinks see the event wherever it lands.
            for sink in sinks.iter_mut() {
                if sink.listens_for(kind) {
                    delivered = true;
                    sink.handle_event(tree, event)?;
                    if event.is_accepted() {
                        return Ok(DispatchResult::Accepted);
                    }
                }
            }
        } else {
            // Bubble phase: innermost sink on the target's ancestor chain
            // first, stopping at the first acceptance.
            let chain: Vec<ElementId> = tree.ancestors(event.target()).collect();
            for node in chain {
                for sink in sinks.iter_mut() {
                    if sink.sink_root() == node && sink.listens_for(kind) {
                        delivered = true;
                        sink.handle_event(tree, event)?;
                        if event.is_accepted() {
                            return Ok(DispatchResult::Accepted);
                        }
                    }
                }
            }
        }

        Ok(if delivered {
            DispatchResult::Ignored
        } else {
            DispatchResult::NotDelivered
        })
    }
}
