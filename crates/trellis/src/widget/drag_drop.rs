//! Drag and drop data types: actions, mime bundles, and the drag session.
//!
//! A drag source builds a [`MimeBundle`] describing the dragged payload and
//! opens a [`DragSession`] once the pointer crosses the drag threshold. Drop
//! targets inspect the bundle by mime type and negotiate the outcome through
//! [`DropAction`] values: the source declares a *supported* set, the platform
//! *proposes* an action (typically from modifier keys), and the target commits
//! a *resulting* action on the drop event.
//!
//! # Actions
//!
//! ```
//! use trellis::widget::drag_drop::DropAction;
//!
//! let supported = DropAction::COPY | DropAction::MOVE;
//! assert!(supported.admits(DropAction::MOVE));
//! assert!(!supported.admits(DropAction::LINK));
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use trellis_core::{ElementId, Point};

use super::events::{
    DragEnterEvent, DragLeaveEvent, DragOverEvent, DropEvent, WidgetEvent,
};

/// Standard MIME types used in drag and drop operations.
pub mod mime {
    /// Plain text MIME type.
    pub const TEXT_PLAIN: &str = "text/plain";
    /// URI list MIME type (for file paths and URLs).
    pub const TEXT_URI_LIST: &str = "text/uri-list";
    /// Custom application data prefix.
    pub const APPLICATION_PREFIX: &str = "application/x-trellis-";
    /// Payload describing a dragged column header.
    ///
    /// Bundles carrying this type are treated specially by drop-target
    /// location: the candidate element under the cursor is itself the target,
    /// with no direct-child resolution, so header cells can be reordered
    /// cell-to-cell.
    pub const COLUMN_HEADER: &str = "application/x-trellis-column-header";
    /// Payload carrying the index of a dragged direct child.
    pub const CHILD_INDEX: &str = "application/x-trellis-child-index";
}

/// Actions that can be performed during a drop operation.
///
/// These flags express both a drag source's *supported* set and a single
/// chosen action. The eight possible values of the set (none, the three
/// singletons, the three pairs, all) are exactly the supported-action
/// vocabulary of the drag protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DropAction(u8);

impl DropAction {
    /// No action (drop not allowed).
    pub const NONE: Self = Self(0);
    /// Copy the data.
    pub const COPY: Self = Self(1 << 0);
    /// Move the data (source should delete the original).
    pub const MOVE: Self = Self(1 << 1);
    /// Create a link/reference to the data.
    pub const LINK: Self = Self(1 << 2);
    /// All standard actions (copy, move, and link).
    pub const ALL: Self = Self(Self::COPY.0 | Self::MOVE.0 | Self::LINK.0);

    /// Returns true if this action set contains another action.
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Decides whether a supported-action set admits a specific action.
    ///
    /// `ALL` admits anything. `NONE` is admitted only by the `NONE` set
    /// itself. Every other set admits exactly the single actions it
    /// contains: `COPY | MOVE` admits copy and move but not link, and a
    /// singleton set admits only the exact match.
    pub fn admits(self, action: Self) -> bool {
        if self == Self::ALL {
            true
        } else if action == Self::NONE {
            self == Self::NONE
        } else {
            self.contains(action)
        }
    }
}

impl std::ops::BitOr for DropAction {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for DropAction {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl std::ops::BitOrAssign for DropAction {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitAndAssign for DropAction {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

/// Data being transferred in a drag and drop operation.
///
/// A `MimeBundle` holds multiple representations of the same payload, each
/// identified by a MIME type, in the order producers added them. Drop targets
/// query by type and pick the most appropriate format.
#[derive(Debug, Clone, Default)]
pub struct MimeBundle {
    /// Entries in insertion order.
    entries: Vec<(String, Vec<u8>)>,
}

impl MimeBundle {
    /// Creates an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the bundle holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the available MIME formats, in insertion order.
    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    /// Checks if data is available for the given MIME type.
    pub fn has_format(&self, mime_type: &str) -> bool {
        self.entries.iter().any(|(t, _)| t == mime_type)
    }

    /// Gets raw data for a MIME type.
    pub fn get_data(&self, mime_type: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(t, _)| t == mime_type)
            .map(|(_, d)| d.as_slice())
    }

    /// Sets raw data for a MIME type.
    ///
    /// Replacing an existing entry keeps its position in the format order.
    pub fn set_data(&mut self, mime_type: impl Into<String>, data: impl Into<Vec<u8>>) {
        let mime_type = mime_type.into();
        let data = data.into();
        if let Some(entry) = self.entries.iter_mut().find(|(t, _)| *t == mime_type) {
            entry.1 = data;
        } else {
            self.entries.push((mime_type, data));
        }
    }

    // -------------------------------------------------------------------------
    // Text convenience methods
    // -------------------------------------------------------------------------

    /// Returns true if plain text is available.
    pub fn has_text(&self) -> bool {
        self.has_format(mime::TEXT_PLAIN)
    }

    /// Gets the plain text content, if available.
    pub fn text(&self) -> Option<String> {
        self.get_data(mime::TEXT_PLAIN)
            .and_then(|bytes| String::from_utf8(bytes.to_vec()).ok())
    }

    /// Sets the plain text content.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.set_data(mime::TEXT_PLAIN, text.into_bytes());
    }

    // -------------------------------------------------------------------------
    // Child index methods
    // -------------------------------------------------------------------------

    /// Gets the dragged child index, if available.
    pub fn index(&self) -> Option<usize> {
        self.get_data(mime::CHILD_INDEX)
            .and_then(|bytes| bytes.try_into().ok())
            .map(|bytes: [u8; 8]| u64::from_le_bytes(bytes) as usize)
    }

    /// Sets the dragged child index.
    pub fn set_index(&mut self, index: usize) {
        self.set_data(mime::CHILD_INDEX, (index as u64).to_le_bytes());
    }

    // -------------------------------------------------------------------------
    // Column header methods
    // -------------------------------------------------------------------------

    /// Gets the dragged column-header label, if available.
    pub fn column_header(&self) -> Option<String> {
        self.get_data(mime::COLUMN_HEADER)
            .and_then(|bytes| String::from_utf8(bytes.to_vec()).ok())
    }

    /// Sets the dragged column-header label.
    pub fn set_column_header(&mut self, label: impl Into<String>) {
        let label = label.into();
        self.set_data(mime::COLUMN_HEADER, label.into_bytes());
    }

    // -------------------------------------------------------------------------
    // URI list methods
    // -------------------------------------------------------------------------

    /// Returns true if file paths are available.
    pub fn has_paths(&self) -> bool {
        self.has_format(mime::TEXT_URI_LIST)
    }

    /// Gets the file paths, one per line of the URI list.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.get_data(mime::TEXT_URI_LIST)
            .and_then(|bytes| String::from_utf8(bytes.to_vec()).ok())
            .map(|text| text.lines().map(PathBuf::from).collect())
            .unwrap_or_default()
    }

    /// Sets the file paths.
    pub fn set_paths(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        let joined = paths
            .into_iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        self.set_data(mime::TEXT_URI_LIST, joined.into_bytes());
    }
}

/// Process-unique identity of a drag/drop widget.
///
/// Drag sources are compared by identity when drops are screened, so every
/// controller mints one of these at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(u64);

impl WidgetId {
    /// Mints the next widget identity.
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value, for logging and interop.
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

/// An active drag session.
///
/// Created by a drag-capable controller when the pointer crosses the drag
/// threshold; alive until the host resolves it with the action the platform
/// reports (a `NONE` resolution is cleanup-identical to a completed one).
///
/// The session owns the drag image (a detached subtree clone), the mime
/// bundle, the negotiated action sets, and the source identity. The factory
/// methods build the drag-protocol events a host routes to candidate drop
/// targets while the session is in flight.
#[derive(Debug, Clone)]
pub struct DragSession {
    /// The drag image element, if one was produced.
    image: Option<ElementId>,
    /// The payload carried by the session.
    mime: Arc<MimeBundle>,
    /// Actions the source supports.
    supported_actions: DropAction,
    /// The action proposed at session start.
    proposed_action: DropAction,
    /// The widget that opened the session.
    source: WidgetId,
    /// Pointer position at session start, in client coordinates.
    origin: Point,
}

impl DragSession {
    /// Creates a new session.
    pub fn new(
        image: Option<ElementId>,
        mime: MimeBundle,
        supported_actions: DropAction,
        proposed_action: DropAction,
        source: WidgetId,
        origin: Point,
    ) -> Self {
        Self {
            image,
            mime: Arc::new(mime),
            supported_actions,
            proposed_action,
            source,
            origin,
        }
    }

    /// Returns the session's payload.
    pub fn mime_data(&self) -> &MimeBundle {
        &self.mime
    }

    /// Returns the drag image element, if any.
    pub fn drag_image(&self) -> Option<ElementId> {
        self.image
    }

    /// Returns the actions the source supports.
    pub fn supported_actions(&self) -> DropAction {
        self.supported_actions
    }

    /// Returns the proposed action.
    pub fn proposed_action(&self) -> DropAction {
        self.proposed_action
    }

    /// Returns the widget that opened the session.
    pub fn source(&self) -> WidgetId {
        self.source
    }

    /// Returns the pointer position at session start.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Builds a drag-enter event for `target`.
    pub fn drag_enter_event(&self, target: ElementId) -> WidgetEvent {
        WidgetEvent::DragEnter(DragEnterEvent::new(
            target,
            Arc::clone(&self.mime),
            Some(self.source),
            self.supported_actions,
            self.proposed_action,
        ))
    }

    /// Builds a drag-over event for `target`.
    pub fn drag_over_event(&self, target: ElementId) -> WidgetEvent {
        WidgetEvent::DragOver(DragOverEvent::new(
            target,
            Arc::clone(&self.mime),
            Some(self.source),
            self.supported_actions,
            self.proposed_action,
        ))
    }

    /// Builds a drag-leave event for `target`.
    pub fn drag_leave_event(&self, target: ElementId) -> WidgetEvent {
        WidgetEvent::DragLeave(DragLeaveEvent::new(target))
    }

    /// Builds a drop event for `target`.
    pub fn drop_event(&self, target: ElementId) -> WidgetEvent {
        WidgetEvent::Drop(DropEvent::new(
            target,
            Arc::clone(&self.mime),
            Some(self.source),
            self.supported_actions,
            self.proposed_action,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_action_flags() {
        let actions = DropAction::COPY | DropAction::MOVE;
        assert!(actions.contains(DropAction::COPY));
        assert!(actions.contains(DropAction::MOVE));
        assert!(!actions.contains(DropAction::LINK));
    }

    #[test]
    fn test_admissibility_table() {
        let copy_move = DropAction::COPY | DropAction::MOVE;
        let copy_link = DropAction::COPY | DropAction::LINK;
        let link_move = DropAction::LINK | DropAction::MOVE;

        // ALL admits anything, including none.
        for action in [
            DropAction::NONE,
            DropAction::COPY,
            DropAction::MOVE,
            DropAction::LINK,
        ] {
            assert!(DropAction::ALL.admits(action));
        }

        // Pairs admit exactly their two members.
        assert!(copy_move.admits(DropAction::MOVE));
        assert!(copy_move.admits(DropAction::COPY));
        assert!(!copy_move.admits(DropAction::LINK));
        assert!(!copy_move.admits(DropAction::NONE));

        assert!(copy_link.admits(DropAction::LINK));
        assert!(copy_link.admits(DropAction::COPY));
        assert!(!copy_link.admits(DropAction::MOVE));

        assert!(link_move.admits(DropAction::MOVE));
        assert!(link_move.admits(DropAction::LINK));
        assert!(!link_move.admits(DropAction::COPY));

        // Singletons admit only the exact match.
        assert!(DropAction::MOVE.admits(DropAction::MOVE));
        assert!(!DropAction::MOVE.admits(DropAction::COPY));
        assert!(!DropAction::COPY.admits(DropAction::NONE));

        // NONE admits only none.
        assert!(DropAction::NONE.admits(DropAction::NONE));
        assert!(!DropAction::NONE.admits(DropAction::MOVE));
    }

    #[test]
    fn test_bundle_order_preserved() {
        let mut bundle = MimeBundle::new();
        bundle.set_text("hello");
        bundle.set_index(3);
        bundle.set_text("updated");

        let formats: Vec<_> = bundle.formats().collect();
        assert_eq!(formats, vec![mime::TEXT_PLAIN, mime::CHILD_INDEX]);
        assert_eq!(bundle.text(), Some("updated".to_string()));
        assert_eq!(bundle.index(), Some(3));
    }

    #[test]
    fn test_bundle_paths() {
        let mut bundle = MimeBundle::new();
        assert!(!bundle.has_paths());

        bundle.set_paths([PathBuf::from("/tmp/a.txt"), PathBuf::from("/tmp/b.txt")]);
        assert!(bundle.has_paths());
        assert_eq!(
            bundle.paths(),
            vec![PathBuf::from("/tmp/a.txt"), PathBuf::from("/tmp/b.txt")]
        );
    }

    #[test]
    fn test_session_events_carry_identity() {
        let mut bundle = MimeBundle::new();
        bundle.set_text("payload");

        let source = WidgetId::next();
        let session = DragSession::new(
            None,
            bundle,
            DropAction::ALL,
            DropAction::MOVE,
            source,
            Point::new(10.0, 20.0),
        );

        let mut tree = trellis_core::ElementTree::new();
        let target = tree.create();

        match session.drop_event(target) {
            WidgetEvent::Drop(event) => {
                assert_eq!(event.source, Some(source));
                assert_eq!(event.supported_actions, DropAction::ALL);
                assert_eq!(event.proposed_action, DropAction::MOVE);
                assert_eq!(event.drop_action, DropAction::NONE);
                assert_eq!(event.data().text(), Some("payload".to_string()));
            }
            other => panic!("expected drop event, got {other:?}"),
        }
    }
}
