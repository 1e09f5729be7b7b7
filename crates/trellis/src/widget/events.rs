//! Event types for the interaction engine.
//!
//! Every event embeds an [`EventBase`] carrying the accepted flag. Accepting
//! an event is the engine's equivalent of `preventDefault` plus
//! `stopPropagation`: it signals the platform that the event was consumed and
//! stops delivery to outer widgets.
//!
//! Pointer events ([`MousePressEvent`], [`MouseMoveEvent`],
//! [`MouseReleaseEvent`]) feed the drag-source half of the engine. The four
//! drag-protocol events ([`DragEnterEvent`], [`DragOverEvent`],
//! [`DragLeaveEvent`], [`DropEvent`]) feed the drop-target half; they carry
//! the session's mime bundle, the source widget identity, and the
//! supported/proposed/resulting action negotiation described in
//! [`drag_drop`](super::drag_drop).

use std::sync::Arc;

use trellis_core::{ElementId, Point};

use super::drag_drop::{DropAction, MimeBundle, WidgetId};

/// Keyboard modifiers that may be held during input events.
///
/// The engine itself does not branch on modifiers; hosts use them to choose
/// the proposed action for a session (e.g. copy while a modifier is held).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardModifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held (Cmd on macOS).
    pub control: bool,
    /// The Alt key is held (Option on macOS).
    pub alt: bool,
    /// The Meta/Super key is held.
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Check if any modifier is pressed.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MouseButton {
    /// Primary button (usually left).
    Left = 0,
    /// Secondary button (usually right).
    Right = 1,
    /// Middle button (scroll wheel click).
    Middle = 2,
}

impl MouseButton {
    /// Returns true for the primary button, the only one that starts drags.
    pub fn is_primary(self) -> bool {
        self == Self::Left
    }
}

/// Common data for all widget events.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventBase {
    /// Whether the event has been accepted (handled).
    accepted: bool,
}

impl EventBase {
    /// Create a new event base.
    pub fn new() -> Self {
        Self { accepted: false }
    }

    /// Check if the event has been accepted.
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Accept the event, preventing further propagation.
    pub fn accept(&mut self) {
        self.accepted = true;
    }

    /// Ignore the event, allowing further propagation.
    pub fn ignore(&mut self) {
        self.accepted = false;
    }
}

/// Mouse press event.
#[derive(Debug, Clone)]
pub struct MousePressEvent {
    /// Base event data.
    pub base: EventBase,
    /// The deepest element under the pointer.
    pub target: ElementId,
    /// The button that was pressed.
    pub button: MouseButton,
    /// Pointer position in client coordinates.
    pub client_pos: Point,
    /// Keyboard modifiers held during the event.
    pub modifiers: KeyboardModifiers,
}

impl MousePressEvent {
    /// Creates a new mouse press event.
    pub fn new(target: ElementId, button: MouseButton, client_pos: Point) -> Self {
        Self {
            base: EventBase::new(),
            target,
            button,
            client_pos,
            modifiers: KeyboardModifiers::NONE,
        }
    }
}

/// Mouse move event.
///
/// Delivered to a widget only while its press-tracking listeners are
/// installed (between a primary press on a handle and release or drag start).
#[derive(Debug, Clone)]
pub struct MouseMoveEvent {
    /// Base event data.
    pub base: EventBase,
    /// The deepest element under the pointer.
    pub target: ElementId,
    /// Pointer position in client coordinates.
    pub client_pos: Point,
    /// Keyboard modifiers held during the event.
    pub modifiers: KeyboardModifiers,
}

impl MouseMoveEvent {
    /// Creates a new mouse move event.
    pub fn new(target: ElementId, client_pos: Point) -> Self {
        Self {
            base: EventBase::new(),
            target,
            client_pos,
            modifiers: KeyboardModifiers::NONE,
        }
    }
}

/// Mouse release event.
#[derive(Debug, Clone)]
pub struct MouseReleaseEvent {
    /// Base event data.
    pub base: EventBase,
    /// The deepest element under the pointer.
    pub target: ElementId,
    /// The button that was released.
    pub button: MouseButton,
    /// Pointer position in client coordinates.
    pub client_pos: Point,
    /// Keyboard modifiers held during the event.
    pub modifiers: KeyboardModifiers,
}

impl MouseReleaseEvent {
    /// Creates a new mouse release event.
    pub fn new(target: ElementId, button: MouseButton, client_pos: Point) -> Self {
        Self {
            base: EventBase::new(),
            target,
            button,
            client_pos,
            modifiers: KeyboardModifiers::NONE,
        }
    }
}

/// Event sent when a drag enters a widget's subtree.
#[derive(Debug, Clone)]
pub struct DragEnterEvent {
    /// Base event data.
    pub base: EventBase,
    /// The deepest element under the drag cursor.
    pub target: ElementId,
    /// The data being dragged.
    mime: Arc<MimeBundle>,
    /// The widget that initiated the drag, if internal.
    pub source: Option<WidgetId>,
    /// Actions supported by the drag source.
    pub supported_actions: DropAction,
    /// The action the platform proposes.
    pub proposed_action: DropAction,
}

impl DragEnterEvent {
    /// Creates a new drag enter event.
    pub fn new(
        target: ElementId,
        mime: Arc<MimeBundle>,
        source: Option<WidgetId>,
        supported_actions: DropAction,
        proposed_action: DropAction,
    ) -> Self {
        Self {
            base: EventBase::new(),
            target,
            mime,
            source,
            supported_actions,
            proposed_action,
        }
    }

    /// Returns the data being dragged.
    pub fn data(&self) -> &MimeBundle {
        &self.mime
    }
}

/// Event sent as a drag moves within a widget's subtree.
#[derive(Debug, Clone)]
pub struct DragOverEvent {
    /// Base event data.
    pub base: EventBase,
    /// The deepest element under the drag cursor.
    pub target: ElementId,
    /// The data being dragged.
    mime: Arc<MimeBundle>,
    /// The widget that initiated the drag, if internal.
    pub source: Option<WidgetId>,
    /// Actions supported by the drag source.
    pub supported_actions: DropAction,
    /// The action the platform proposes.
    pub proposed_action: DropAction,
    /// The action the widget commits to; echoed back to the platform.
    pub drop_action: DropAction,
}

impl DragOverEvent {
    /// Creates a new drag over event.
    pub fn new(
        target: ElementId,
        mime: Arc<MimeBundle>,
        source: Option<WidgetId>,
        supported_actions: DropAction,
        proposed_action: DropAction,
    ) -> Self {
        Self {
            base: EventBase::new(),
            target,
            mime,
            source,
            supported_actions,
            proposed_action,
            drop_action: DropAction::NONE,
        }
    }

    /// Returns the data being dragged.
    pub fn data(&self) -> &MimeBundle {
        &self.mime
    }
}

/// Event sent when a drag leaves a widget's subtree.
#[derive(Debug, Clone)]
pub struct DragLeaveEvent {
    /// Base event data.
    pub base: EventBase,
    /// The element the drag cursor is leaving from.
    pub target: ElementId,
}

impl DragLeaveEvent {
    /// Creates a new drag leave event.
    pub fn new(target: ElementId) -> Self {
        Self {
            base: EventBase::new(),
            target,
        }
    }
}

/// Event sent when data is dropped onto a widget's subtree.
#[derive(Debug, Clone)]
pub struct DropEvent {
    /// Base event data.
    pub base: EventBase,
    /// The deepest element under the drop point.
    pub target: ElementId,
    /// The dropped data.
    mime: Arc<MimeBundle>,
    /// The widget that initiated the drag, if internal.
    pub source: Option<WidgetId>,
    /// Actions supported by the drag source.
    pub supported_actions: DropAction,
    /// The action the platform proposes.
    pub proposed_action: DropAction,
    /// The action the widget ultimately commits to.
    pub drop_action: DropAction,
}

impl DropEvent {
    /// Creates a new drop event.
    pub fn new(
        target: ElementId,
        mime: Arc<MimeBundle>,
        source: Option<WidgetId>,
        supported_actions: DropAction,
        proposed_action: DropAction,
    ) -> Self {
        Self {
            base: EventBase::new(),
            target,
            mime,
            source,
            supported_actions,
            proposed_action,
            drop_action: DropAction::NONE,
        }
    }

    /// Returns the dropped data.
    pub fn data(&self) -> &MimeBundle {
        &self.mime
    }
}

/// Discriminant for [`WidgetEvent`], used by listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Mouse press.
    MousePress,
    /// Mouse move.
    MouseMove,
    /// Mouse release.
    MouseRelease,
    /// Drag enter.
    DragEnter,
    /// Drag over.
    DragOver,
    /// Drag leave.
    DragLeave,
    /// Drop.
    Drop,
}

/// The envelope over all engine events.
#[derive(Debug, Clone)]
pub enum WidgetEvent {
    /// Mouse press event.
    MousePress(MousePressEvent),
    /// Mouse move event.
    MouseMove(MouseMoveEvent),
    /// Mouse release event.
    MouseRelease(MouseReleaseEvent),
    /// Drag enter event.
    DragEnter(DragEnterEvent),
    /// Drag over event.
    DragOver(DragOverEvent),
    /// Drag leave event.
    DragLeave(DragLeaveEvent),
    /// Drop event.
    Drop(DropEvent),
}

impl WidgetEvent {
    /// Returns the event's kind.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::MousePress(_) => EventKind::MousePress,
            Self::MouseMove(_) => EventKind::MouseMove,
            Self::MouseRelease(_) => EventKind::MouseRelease,
            Self::DragEnter(_) => EventKind::DragEnter,
            Self::DragOver(_) => EventKind::DragOver,
            Self::DragLeave(_) => EventKind::DragLeave,
            Self::Drop(_) => EventKind::Drop,
        }
    }

    /// Returns the element the event targets.
    pub fn target(&self) -> ElementId {
        match self {
            Self::MousePress(e) => e.target,
            Self::MouseMove(e) => e.target,
            Self::MouseRelease(e) => e.target,
            Self::DragEnter(e) => e.target,
            Self::DragOver(e) => e.target,
            Self::DragLeave(e) => e.target,
            Self::Drop(e) => e.target,
        }
    }

    /// Check if the event has been accepted.
    pub fn is_accepted(&self) -> bool {
        self.base().is_accepted()
    }

    /// Accept the event, preventing further propagation.
    pub fn accept(&mut self) {
        self.base_mut().accept();
    }

    /// Whether the event should continue to outer widgets.
    pub fn should_propagate(&self) -> bool {
        match self {
            // Input events propagate while unaccepted.
            Self::MousePress(_) | Self::MouseMove(_) | Self::MouseRelease(_) => !self.is_accepted(),
            // Drag-protocol events stop at the first accepting widget.
            Self::DragEnter(_) | Self::DragOver(_) | Self::DragLeave(_) | Self::Drop(_) => {
                !self.is_accepted()
            }
        }
    }

    fn base(&self) -> &EventBase {
        match self {
            Self::MousePress(e) => &e.base,
            Self::MouseMove(e) => &e.base,
            Self::MouseRelease(e) => &e.base,
            Self::DragEnter(e) => &e.base,
            Self::DragOver(e) => &e.base,
            Self::DragLeave(e) => &e.base,
            Self::Drop(e) => &e.base,
        }
    }

    fn base_mut(&mut self) -> &mut EventBase {
        match self {
            Self::MousePress(e) => &mut e.base,
            Self::MouseMove(e) => &mut e.base,
            Self::MouseRelease(e) => &mut e.base,
            Self::DragEnter(e) => &mut e.base,
            Self::DragOver(e) => &mut e.base,
            Self::DragLeave(e) => &mut e.base,
            Self::Drop(e) => &mut e.base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::ElementTree;

    #[test]
    fn test_accept_flags() {
        let mut tree = ElementTree::new();
        let el = tree.create();

        let mut event = WidgetEvent::MousePress(MousePressEvent::new(
            el,
            MouseButton::Left,
            Point::new(1.0, 2.0),
        ));
        assert!(!event.is_accepted());
        assert!(event.should_propagate());

        event.accept();
        assert!(event.is_accepted());
        assert!(!event.should_propagate());
    }

    #[test]
    fn test_kind_and_target() {
        let mut tree = ElementTree::new();
        let el = tree.create();
        let event = WidgetEvent::DragLeave(DragLeaveEvent::new(el));
        assert_eq!(event.kind(), EventKind::DragLeave);
        assert_eq!(event.target(), el);
    }

    #[test]
    fn test_primary_button() {
        assert!(MouseButton::Left.is_primary());
        assert!(!MouseButton::Right.is_primary());
        assert!(!MouseButton::Middle.is_primary());
    }
}
