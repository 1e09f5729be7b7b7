//! A drop-only consumer for externally sourced drags.
//!
//! A `DropSink` never sources drags; it collects the payloads dropped onto
//! its widget (text and file paths) so the host can process them — the role
//! a file listing plays for drags arriving from elsewhere in the
//! application.

use std::path::PathBuf;

use trellis_core::{ElementId, ElementTree};

use crate::widget::controller::{DragDropDelegate, DropContext};
use crate::widget::drag_drop::{DropAction, MimeBundle};
use crate::widget::error::DragDropError;
use crate::widget::events::DropEvent;

/// One payload received by a [`DropSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedPayload {
    /// The element the drop resolved to.
    pub target: ElementId,
    /// Plain text carried by the bundle, if any.
    pub text: Option<String>,
    /// File paths carried by the bundle.
    pub paths: Vec<PathBuf>,
    /// The action committed for the drop.
    pub action: DropAction,
}

/// Delegate collecting dropped payloads.
#[derive(Debug, Default)]
pub struct DropSink {
    /// Payloads received so far, oldest first.
    received: Vec<DroppedPayload>,
}

impl DropSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the payloads received so far.
    pub fn received(&self) -> &[DroppedPayload] {
        &self.received
    }

    /// Takes the payloads received so far, leaving the sink empty.
    pub fn take_received(&mut self) -> Vec<DroppedPayload> {
        std::mem::take(&mut self.received)
    }
}

impl DragDropDelegate for DropSink {
    fn process_drop(
        &mut self,
        _tree: &mut ElementTree,
        _ctx: &DropContext,
        target: ElementId,
        event: &mut DropEvent,
    ) -> Result<(), DragDropError> {
        let action = event.proposed_action;
        self.received.push(DroppedPayload {
            target,
            text: event.data().text(),
            paths: event.data().paths(),
            action,
        });
        event.base.accept();
        event.drop_action = action;
        Ok(())
    }

    /// A sink never sources drags.
    fn add_mime_data(&mut self, _tree: &ElementTree, _handle: ElementId, _data: &mut MimeBundle) {}
}
