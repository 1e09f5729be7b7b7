//! The drag and drop engine.
//!
//! [`DragDropController`] binds a delegate to an element subtree and turns
//! raw pointer and drag-protocol events into semantic drag/drop operations.
//! It is one concrete type covering every widget role through
//! [`Capabilities`] flags and the [`DragDropDelegate`] hook trait:
//!
//! - a pure drop target (`Capabilities::DROP_ONLY`)
//! - a pure drag source (`Capabilities::DRAG_ONLY`; drop-target location
//!   always fails, so the protocol handlers never mark or accept anything)
//! - a full drag-and-drop widget (`Capabilities::DRAG_DROP`), optionally with
//!   reorder-by-drag semantics via the [`Reorder`] adapter over a
//!   [`MoveDelegate`]
//!
//! # Handles and ownership
//!
//! Any descendant carrying the handle marker class serves as a grip that can
//! start a drag. Handles are owned by the *closest* enclosing drag widget:
//! when widgets nest, an outer widget refuses handles (and drops) that belong
//! to an inner one. Use [`make_handle`], [`unmake_handle`], and
//! [`create_default_handle`] to designate handles.
//!
//! # Gesture state
//!
//! The press-move-drag gesture is an explicit state machine
//! ([`GesturePhase`]): a primary press on a handle records the press point
//! and installs the pointer-tracking listeners; movement of at least
//! [`DRAG_THRESHOLD`] pixels on either axis opens a [`DragSession`] and
//! removes them; release before that cancels the gesture. A tracked mouse
//! move with no press record is a listener-lifecycle bug and surfaces as
//! [`DragDropError::MissingPressRecord`].

use trellis_core::logging::targets;
use trellis_core::{ElementId, ElementTree, Point};

use super::dispatcher::EventSink;
use super::drag_drop::{DragSession, DropAction, MimeBundle, WidgetId, mime};
use super::error::DragDropError;
use super::events::{
    DragEnterEvent, DragLeaveEvent, DragOverEvent, DropEvent, EventKind, MouseMoveEvent,
    MousePressEvent, MouseReleaseEvent, WidgetEvent,
};

/// The class name marking a drop-capable widget's root element.
pub const DROP_WIDGET_CLASS: &str = "tr-DropWidget";

/// The class name marking a drag-capable widget's root element.
pub const DRAG_WIDGET_CLASS: &str = "tr-DragWidget";

/// The class name marking an element as a drag handle.
pub const DRAG_HANDLE_CLASS: &str = "tr-mod-dragHandle";

/// The class name of the default drag handle element.
pub const DEFAULT_HANDLE_CLASS: &str = "tr-DragWidget-dragHandle";

/// The class name marking the active drop target.
pub const DROP_TARGET_CLASS: &str = "tr-mod-dropTarget";

/// The threshold in pixels to start a drag, on either axis independently.
pub const DRAG_THRESHOLD: f32 = 5.0;

/// Determines whether `node` belongs to the widget rooted at `root`.
///
/// Walks ancestors from `node` (inclusive) until an element carrying
/// `marker_class` is found; `node` belongs to `root` iff that element is
/// exactly `root`. This is what keeps an outer widget from reacting to
/// events destined for a nested drag/drop widget.
pub fn belongs_to(
    tree: &ElementTree,
    node: ElementId,
    marker_class: &str,
    root: ElementId,
) -> bool {
    tree.ancestors(node)
        .find(|&a| tree.has_class(a, marker_class))
        == Some(root)
}

/// Finds the direct child of `parent` that has `node` as a descendant.
///
/// Returns `node` itself if it is a direct child, and `None` if `node` does
/// not sit below `parent` (or is `parent` itself).
pub fn find_child(tree: &ElementTree, parent: ElementId, node: ElementId) -> Option<ElementId> {
    let mut candidate = Some(node);
    while let Some(c) = candidate {
        if c == parent {
            return None;
        }
        if tree.parent(c) == Some(parent) {
            return Some(c);
        }
        candidate = tree.parent(c);
    }
    None
}

/// Finds the member of `candidates` that is `node` or one of its ancestors.
///
/// The variant of [`find_child`] for callers that supply an explicit list of
/// candidate children instead of a parent element.
pub fn find_child_among(
    tree: &ElementTree,
    candidates: &[ElementId],
    node: ElementId,
) -> Option<ElementId> {
    tree.ancestors(node).find(|c| candidates.contains(c))
}

/// Marks an element as a drag handle.
pub fn make_handle(tree: &mut ElementTree, handle: ElementId) {
    tree.add_class(handle, DRAG_HANDLE_CLASS);
}

/// Unmarks an element as a drag handle.
pub fn unmake_handle(tree: &mut ElementTree, handle: ElementId) {
    tree.remove_class(handle, DRAG_HANDLE_CLASS);
}

/// Creates a detached element pre-styled and pre-marked as a drag handle.
///
/// The caller appends it wherever the grip affordance should live.
pub fn create_default_handle(tree: &mut ElementTree) -> ElementId {
    let handle = tree.create_with_class(DEFAULT_HANDLE_CLASS);
    make_handle(tree, handle);
    handle
}

/// Which halves of the engine a widget participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// The widget can source drags.
    pub drag: bool,
    /// The widget can accept drops.
    pub drop: bool,
}

impl Capabilities {
    /// A pure drop target.
    pub const DROP_ONLY: Self = Self {
        drag: false,
        drop: true,
    };
    /// A pure drag source; drop-target location always fails.
    pub const DRAG_ONLY: Self = Self {
        drag: true,
        drop: false,
    };
    /// A full drag-and-drop widget.
    pub const DRAG_DROP: Self = Self {
        drag: true,
        drop: true,
    };
}

/// The set of event listeners a controller currently has installed.
///
/// Listener lifecycle is explicit so it can be asserted on: attach installs
/// the protocol (and, for drag-capable widgets, mouse-down) listeners exactly
/// once; the pointer-tracking pair exists only between a press on a handle
/// and release or drag start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListenerSet(u8);

impl ListenerSet {
    /// No listeners installed.
    pub const EMPTY: Self = Self(0);
    /// The node-level mouse-down listener.
    pub const MOUSE_DOWN: Self = Self(1 << 0);
    /// The four node-level drag-protocol listeners.
    pub const DRAG_PROTOCOL: Self = Self(1 << 1);
    /// The document-level mouse-move/mouse-up capture pair.
    pub const POINTER_TRACKING: Self = Self(1 << 2);

    /// Returns true if this set contains all listeners in `other`.
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Returns true if no listeners are installed.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Whether events of `kind` are delivered to this listener set.
    pub fn listens_for(self, kind: EventKind) -> bool {
        match kind {
            EventKind::MousePress => self.contains(Self::MOUSE_DOWN),
            EventKind::MouseMove | EventKind::MouseRelease => {
                self.contains(Self::POINTER_TRACKING)
            }
            EventKind::DragEnter
            | EventKind::DragOver
            | EventKind::DragLeave
            | EventKind::Drop => self.contains(Self::DRAG_PROTOCOL),
        }
    }
}

/// The drag-source gesture state machine.
#[derive(Debug, Default)]
pub enum GesturePhase {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A primary press landed on a handle; waiting for the threshold.
    Pressed {
        /// Pointer position at press time.
        press: Point,
        /// The handle under the press.
        handle: ElementId,
    },
    /// A drag session is in flight.
    Dragging(DragSession),
}

/// Construction options for the drop-target half.
#[derive(Debug, Clone, Default)]
pub struct DropOptions {
    /// Whether drops are accepted when the drag's source is another widget
    /// (or no widget at all). When false, only the widget's own drags are
    /// honored.
    pub accept_drops_from_external_source: bool,
    /// Mime types the widget accepts for drops. Empty means nothing is
    /// accepted.
    pub accepted_drop_mime_types: Vec<String>,
}

impl DropOptions {
    /// Enables or disables externally sourced drops.
    pub fn with_external_source(mut self, accept: bool) -> Self {
        self.accept_drops_from_external_source = accept;
        self
    }

    /// Sets the accepted drop mime types.
    pub fn with_accepted_mime_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_drop_mime_types = types.into_iter().map(Into::into).collect();
        self
    }
}

/// Identity and policy handed to delegates during drop processing.
#[derive(Debug, Clone, Copy)]
pub struct DropContext {
    /// The identity of the widget processing the drop.
    pub widget_id: WidgetId,
    /// Whether the widget accepts externally sourced drops.
    pub accepts_external: bool,
}

impl DropContext {
    /// Returns true if a drop from `source` is acceptable under this policy.
    pub fn validate_source(&self, source: Option<WidgetId>) -> bool {
        self.accepts_external || source == Some(self.widget_id)
    }
}

/// The hook set a widget plugs into the engine.
///
/// `process_drop` and `add_mime_data` carry the widget's semantics; the rest
/// have defaults matching the common case. A drag-only widget stubs
/// `process_drop` with a no-op (the engine never reaches it), and a drop-only
/// widget stubs `add_mime_data` likewise.
pub trait DragDropDelegate {
    /// Processes a drop whose target has been located and whose source has
    /// been validated.
    fn process_drop(
        &mut self,
        tree: &mut ElementTree,
        ctx: &DropContext,
        target: ElementId,
        event: &mut DropEvent,
    ) -> Result<(), DragDropError>;

    /// Populates the mime bundle for an about-to-start drag session.
    fn add_mime_data(&mut self, tree: &ElementTree, handle: ElementId, data: &mut MimeBundle);

    /// Decides whether `candidate` is an acceptable drop target for the
    /// bundle, before child resolution. The default accepts every candidate;
    /// widgets with structural requirements (header cells, fixed columns)
    /// override this.
    fn is_valid_target(
        &self,
        _tree: &ElementTree,
        _candidate: ElementId,
        _data: &MimeBundle,
    ) -> bool {
        true
    }

    /// Finds the element to drag from a handle. The default drags the handle
    /// itself.
    fn find_drag_target(&self, _tree: &ElementTree, handle: ElementId) -> Option<ElementId> {
        Some(handle)
    }

    /// The class that designates drag handles for this widget.
    fn drag_handle_class(&self) -> &str {
        DRAG_HANDLE_CLASS
    }

    /// Produces the drag image for a session. The default is a deep clone of
    /// the drag target.
    fn drag_image(&self, tree: &mut ElementTree, handle: ElementId) -> Option<ElementId> {
        let target = self.find_drag_target(tree, handle)?;
        tree.clone_subtree(target).ok()
    }

    /// Called when a drag sourced by this widget resolves, with the action
    /// the platform reports was performed.
    fn on_drag_complete(&mut self, _action: DropAction) {}

    /// The actions sessions sourced by this widget support.
    fn supported_actions(&self) -> DropAction {
        DropAction::ALL
    }

    /// The action proposed when a session starts.
    fn proposed_action(&self) -> DropAction {
        DropAction::MOVE
    }
}

/// The hook set for reorder-by-drag widgets, used through [`Reorder`].
///
/// `move_item` receives the dropped bundle and the resolved target element,
/// performs the semantic move, and returns the action actually taken.
pub trait MoveDelegate {
    /// Populates the mime bundle for an about-to-start drag session.
    ///
    /// Implementations must encode enough to identify the dragged element;
    /// commonly its index among siblings via
    /// [`MimeBundle::set_index`](super::drag_drop::MimeBundle::set_index).
    fn add_mime_data(&mut self, tree: &ElementTree, handle: ElementId, data: &mut MimeBundle);

    /// Performs the move and returns the action taken.
    fn move_item(
        &mut self,
        tree: &mut ElementTree,
        data: &MimeBundle,
        target: ElementId,
    ) -> DropAction;

    /// See [`DragDropDelegate::is_valid_target`].
    fn is_valid_target(
        &self,
        _tree: &ElementTree,
        _candidate: ElementId,
        _data: &MimeBundle,
    ) -> bool {
        true
    }

    /// See [`DragDropDelegate::find_drag_target`].
    fn find_drag_target(&self, _tree: &ElementTree, handle: ElementId) -> Option<ElementId> {
        Some(handle)
    }

    /// See [`DragDropDelegate::drag_handle_class`].
    fn drag_handle_class(&self) -> &str {
        DRAG_HANDLE_CLASS
    }

    /// See [`DragDropDelegate::drag_image`].
    fn drag_image(&self, tree: &mut ElementTree, handle: ElementId) -> Option<ElementId> {
        let target = self.find_drag_target(tree, handle)?;
        tree.clone_subtree(target).ok()
    }

    /// See [`DragDropDelegate::on_drag_complete`].
    fn on_drag_complete(&mut self, _action: DropAction) {}

    /// See [`DragDropDelegate::supported_actions`].
    fn supported_actions(&self) -> DropAction {
        DropAction::ALL
    }

    /// See [`DragDropDelegate::proposed_action`].
    fn proposed_action(&self) -> DropAction {
        DropAction::MOVE
    }
}

/// Adapter giving a [`MoveDelegate`] the standard reorder drop semantics.
///
/// The drop is declined cleanly (action forced to `NONE`, event accepted)
/// when the session does not support a move or the platform proposes none.
/// An externally sourced drop reaching this point is a contract violation:
/// the controller's drop handler screens sources first, so it surfaces as
/// [`DragDropError::ExternalDropNotAllowed`] instead of being recovered.
#[derive(Debug)]
pub struct Reorder<M: MoveDelegate>(pub M);

impl<M: MoveDelegate> DragDropDelegate for Reorder<M> {
    fn process_drop(
        &mut self,
        tree: &mut ElementTree,
        ctx: &DropContext,
        target: ElementId,
        event: &mut DropEvent,
    ) -> Result<(), DragDropError> {
        if !event.supported_actions.admits(DropAction::MOVE)
            || event.proposed_action == DropAction::NONE
        {
            event.drop_action = DropAction::NONE;
            event.base.accept();
            return Ok(());
        }
        if !ctx.validate_source(event.source) {
            return Err(DragDropError::ExternalDropNotAllowed);
        }

        let action = self.0.move_item(tree, event.data(), target);
        event.base.accept();
        event.drop_action = action;
        Ok(())
    }

    fn add_mime_data(&mut self, tree: &ElementTree, handle: ElementId, data: &mut MimeBundle) {
        self.0.add_mime_data(tree, handle, data);
    }

    fn is_valid_target(
        &self,
        tree: &ElementTree,
        candidate: ElementId,
        data: &MimeBundle,
    ) -> bool {
        self.0.is_valid_target(tree, candidate, data)
    }

    fn find_drag_target(&self, tree: &ElementTree, handle: ElementId) -> Option<ElementId> {
        self.0.find_drag_target(tree, handle)
    }

    fn drag_handle_class(&self) -> &str {
        self.0.drag_handle_class()
    }

    fn drag_image(&self, tree: &mut ElementTree, handle: ElementId) -> Option<ElementId> {
        self.0.drag_image(tree, handle)
    }

    fn on_drag_complete(&mut self, action: DropAction) {
        self.0.on_drag_complete(action);
    }

    fn supported_actions(&self) -> DropAction {
        self.0.supported_actions()
    }

    fn proposed_action(&self) -> DropAction {
        self.0.proposed_action()
    }
}

/// The concrete drag and drop engine for one widget subtree.
pub struct DragDropController<D: DragDropDelegate> {
    /// Identity used for source comparison.
    id: WidgetId,
    /// Root of the subtree this widget owns.
    root: ElementId,
    /// Which halves of the engine are active.
    caps: Capabilities,
    /// Drop-target policy.
    options: DropOptions,
    /// The widget's semantics.
    delegate: D,
    /// Installed listeners.
    listeners: ListenerSet,
    /// The drag-source gesture state.
    phase: GesturePhase,
}

impl<D: DragDropDelegate> DragDropController<D> {
    /// Creates a controller for the subtree rooted at `root`.
    ///
    /// The root is marked with the widget classes here (the drop class
    /// always, the drag class when drag-capable) so ownership scoping works
    /// before the controller is attached.
    pub fn new(
        tree: &mut ElementTree,
        root: ElementId,
        caps: Capabilities,
        options: DropOptions,
        delegate: D,
    ) -> Self {
        tree.add_class(root, DROP_WIDGET_CLASS);
        if caps.drag {
            tree.add_class(root, DRAG_WIDGET_CLASS);
        }
        Self {
            id: WidgetId::next(),
            root,
            caps,
            options,
            delegate,
            listeners: ListenerSet::EMPTY,
            phase: GesturePhase::Idle,
        }
    }

    /// Returns the widget's identity.
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// Returns the root of the widget's subtree.
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Returns the widget's capabilities.
    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Returns the widget's delegate.
    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    /// Returns the widget's delegate mutably.
    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    /// Returns the installed listener set.
    pub fn listeners(&self) -> ListenerSet {
        self.listeners
    }

    /// Returns the current gesture phase.
    pub fn gesture_phase(&self) -> &GesturePhase {
        &self.phase
    }

    /// Returns the in-flight drag session, if any.
    pub fn active_drag(&self) -> Option<&DragSession> {
        match &self.phase {
            GesturePhase::Dragging(session) => Some(session),
            _ => None,
        }
    }

    /// Installs the widget's listeners.
    ///
    /// The drag-protocol listeners are installed for every widget (a
    /// drag-only widget still sees the events; its drop-target location just
    /// never succeeds). The mouse-down listener is installed only for
    /// drag-capable widgets. Attaching twice without detaching is a no-op.
    pub fn attach(&mut self) {
        if !self.listeners.is_empty() {
            tracing::warn!(
                target: targets::DRAG_DROP,
                widget = self.id.as_raw(),
                "attach on an already-attached widget ignored"
            );
            return;
        }
        self.listeners.insert(ListenerSet::DRAG_PROTOCOL);
        if self.caps.drag {
            self.listeners.insert(ListenerSet::MOUSE_DOWN);
        }
    }

    /// Removes all listeners and defensively clears any in-flight gesture.
    pub fn detach(&mut self) {
        self.listeners = ListenerSet::EMPTY;
        self.phase = GesturePhase::Idle;
    }

    /// Returns true if the widget's listeners are installed.
    pub fn is_attached(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Resolves the in-flight drag session.
    ///
    /// The drag image is removed from the tree, the delegate's completion
    /// hook runs with the action the platform reports, and the session
    /// reference is cleared. A `NONE` action takes the same path as any
    /// other. Resolving with no session in flight is a no-op.
    pub fn complete_drag(&mut self, tree: &mut ElementTree, action: DropAction) {
        match std::mem::take(&mut self.phase) {
            GesturePhase::Dragging(session) => {
                if let Some(image) = session.drag_image() {
                    let _ = tree.remove(image);
                }
                tracing::trace!(
                    target: targets::DRAG_DROP,
                    widget = self.id.as_raw(),
                    ?action,
                    "drag session resolved"
                );
                self.delegate.on_drag_complete(action);
            }
            other => self.phase = other,
        }
    }

    /// Handles an event.
    ///
    /// This is the sole entry point: it demultiplexes on the event kind and
    /// is a side-effect-free no-op for kinds outside the widget's interest
    /// (pointer events on a widget that cannot source drags).
    pub fn handle_event(
        &mut self,
        tree: &mut ElementTree,
        event: &mut WidgetEvent,
    ) -> Result<(), DragDropError> {
        match event {
            WidgetEvent::MousePress(e) if self.caps.drag => self.evt_mouse_down(tree, e),
            WidgetEvent::MouseMove(e) if self.caps.drag => self.evt_mouse_move(tree, e),
            WidgetEvent::MouseRelease(e) if self.caps.drag => self.evt_mouse_up(e),
            WidgetEvent::DragEnter(e) => self.evt_drag_enter(tree, e),
            WidgetEvent::DragLeave(e) => self.evt_drag_leave(tree, e),
            WidgetEvent::DragOver(e) => self.evt_drag_over(tree, e),
            WidgetEvent::Drop(e) => self.evt_drop(tree, e),
            _ => Ok(()),
        }
    }

    // -------------------------------------------------------------------------
    // Drop-target half
    // -------------------------------------------------------------------------

    /// Returns true if a drop from `source` is acceptable.
    pub fn validate_source(&self, source: Option<WidgetId>) -> bool {
        self.drop_context().validate_source(source)
    }

    fn drop_context(&self) -> DropContext {
        DropContext {
            widget_id: self.id,
            accepts_external: self.options.accept_drops_from_external_source,
        }
    }

    /// Locates a drop target for a candidate element and a bundle.
    ///
    /// Returns `None` unless the widget is drop-capable, the bundle carries
    /// at least one accepted mime type, and the delegate's target predicate
    /// admits the candidate. Column-header payloads target the candidate
    /// itself (header cells are both the hit target and the drop point);
    /// anything else resolves to the direct child of the root containing the
    /// candidate.
    pub fn find_drop_target(
        &self,
        tree: &ElementTree,
        candidate: ElementId,
        data: &MimeBundle,
    ) -> Option<ElementId> {
        if !self.caps.drop {
            return None;
        }
        if !self
            .options
            .accepted_drop_mime_types
            .iter()
            .any(|t| data.has_format(t))
        {
            return None;
        }
        if !self.delegate.is_valid_target(tree, candidate, data) {
            return None;
        }
        if data.has_format(mime::COLUMN_HEADER) {
            Some(candidate)
        } else {
            find_child(tree, self.root, candidate)
        }
    }

    /// Clears the drop indicator anywhere within the widget's subtree.
    ///
    /// Always called before marking a new target, so at most one element in
    /// the subtree carries the indicator class at a time.
    fn clear_drop_indicator(&self, tree: &mut ElementTree) {
        if let Some(marked) = tree.find_by_class(self.root, DROP_TARGET_CLASS) {
            tree.remove_class(marked, DROP_TARGET_CLASS);
        }
    }

    fn evt_drag_enter(
        &mut self,
        tree: &mut ElementTree,
        event: &mut DragEnterEvent,
    ) -> Result<(), DragDropError> {
        if !self.validate_source(event.source) {
            return Ok(());
        }
        let Some(target) = self.find_drop_target(tree, event.target, event.data()) else {
            return Ok(());
        };
        self.clear_drop_indicator(tree);
        tree.add_class(target, DROP_TARGET_CLASS);
        event.base.accept();
        Ok(())
    }

    fn evt_drag_leave(
        &mut self,
        tree: &mut ElementTree,
        event: &mut DragLeaveEvent,
    ) -> Result<(), DragDropError> {
        // Leave is acknowledged unconditionally, source validity aside; the
        // platform always expects leave to be honored, and the indicator
        // must not outlive the cursor.
        event.base.accept();
        self.clear_drop_indicator(tree);
        Ok(())
    }

    fn evt_drag_over(
        &mut self,
        tree: &mut ElementTree,
        event: &mut DragOverEvent,
    ) -> Result<(), DragDropError> {
        if !self.validate_source(event.source) {
            return Ok(());
        }
        // Re-evaluate on every over event: the pointer can move between
        // sibling candidates without an intervening leave.
        self.clear_drop_indicator(tree);
        let Some(target) = self.find_drop_target(tree, event.target, event.data()) else {
            return Ok(());
        };
        tree.add_class(target, DROP_TARGET_CLASS);
        event.base.accept();
        event.drop_action = event.proposed_action;
        Ok(())
    }

    fn evt_drop(
        &mut self,
        tree: &mut ElementTree,
        event: &mut DropEvent,
    ) -> Result<(), DragDropError> {
        // Walk up from the reported target to the element marked as the drop
        // indicator, clearing the mark on the way out.
        let mut found = None;
        let mut candidate = Some(event.target);
        while let Some(node) = candidate {
            if tree.has_class(node, DROP_TARGET_CLASS) {
                tree.remove_class(node, DROP_TARGET_CLASS);
                found = Some(node);
                break;
            }
            candidate = tree.parent(node);
        }

        // No marked ancestor, or one owned by a nested widget: ignore the
        // event entirely and let it keep bubbling.
        let Some(target) = found else {
            return Ok(());
        };
        if !belongs_to(tree, target, DROP_WIDGET_CLASS, self.root) {
            return Ok(());
        }

        // Explicit rejection, not a silent ignore: the platform needs a NONE
        // action to clean up its drag affordances.
        if !self.validate_source(event.source) {
            event.drop_action = DropAction::NONE;
            event.base.accept();
            return Ok(());
        }

        let ctx = self.drop_context();
        self.delegate.process_drop(tree, &ctx, target, event)
    }

    // -------------------------------------------------------------------------
    // Drag-source half
    // -------------------------------------------------------------------------

    /// Finds the drag handle at or above `node`, bounded by the widget root.
    ///
    /// A handle inside a nested drag widget belongs to that widget, not this
    /// one, and is not claimable here.
    fn find_drag_handle(&self, tree: &ElementTree, node: ElementId) -> Option<ElementId> {
        let handle_class = self.delegate.drag_handle_class();
        let mut handle = None;
        let mut candidate = Some(node);
        while let Some(c) = candidate {
            if c == self.root {
                break;
            }
            if tree.has_class(c, handle_class) {
                handle = Some(c);
                break;
            }
            candidate = tree.parent(c);
        }
        let handle = handle?;
        belongs_to(tree, handle, DRAG_WIDGET_CLASS, self.root).then_some(handle)
    }

    fn evt_mouse_down(
        &mut self,
        tree: &mut ElementTree,
        event: &mut MousePressEvent,
    ) -> Result<(), DragDropError> {
        let Some(handle) = self.find_drag_handle(tree, event.target) else {
            return Ok(());
        };

        if event.button.is_primary() {
            self.phase = GesturePhase::Pressed {
                press: event.client_pos,
                handle,
            };
            self.listeners.insert(ListenerSet::POINTER_TRACKING);
            event.base.accept();
        }
        Ok(())
    }

    fn evt_mouse_move(
        &mut self,
        tree: &mut ElementTree,
        event: &mut MouseMoveEvent,
    ) -> Result<(), DragDropError> {
        // Bail if a session is already in flight; the platform owns pointer
        // tracking from here.
        if matches!(self.phase, GesturePhase::Dragging(_)) {
            return Ok(());
        }

        event.base.accept();

        let (press, handle) = match &self.phase {
            GesturePhase::Pressed { press, handle } => (*press, *handle),
            _ => {
                tracing::error!(
                    target: targets::DRAG_DROP,
                    widget = self.id.as_raw(),
                    "tracked mouse move with no press record"
                );
                return Err(DragDropError::MissingPressRecord);
            }
        };

        let dx = (event.client_pos.x - press.x).abs();
        let dy = (event.client_pos.y - press.y).abs();
        if dx < DRAG_THRESHOLD && dy < DRAG_THRESHOLD {
            return Ok(());
        }

        self.start_drag(tree, handle, event.client_pos);
        Ok(())
    }

    fn evt_mouse_up(&mut self, event: &mut MouseReleaseEvent) -> Result<(), DragDropError> {
        if !event.button.is_primary() || !matches!(self.phase, GesturePhase::Dragging(_)) {
            self.listeners.remove(ListenerSet::POINTER_TRACKING);
            self.phase = GesturePhase::Idle;
            return Ok(());
        }
        event.base.accept();
        Ok(())
    }

    /// Opens a drag session from `handle` at the given pointer position.
    ///
    /// Builds the drag image and mime bundle through the delegate, records
    /// the session, and removes the pointer-tracking listeners: once a
    /// session is in flight the platform owns pointer tracking, and the
    /// threshold listeners must not keep firing.
    fn start_drag(&mut self, tree: &mut ElementTree, handle: ElementId, client_pos: Point) {
        let image = self.delegate.drag_image(tree, handle);

        let mut data = MimeBundle::new();
        self.delegate.add_mime_data(tree, handle, &mut data);

        let session = DragSession::new(
            image,
            data,
            self.delegate.supported_actions(),
            self.delegate.proposed_action(),
            self.id,
            client_pos,
        );
        tracing::trace!(
            target: targets::DRAG_DROP,
            widget = self.id.as_raw(),
            origin = %client_pos,
            "drag session started"
        );

        self.phase = GesturePhase::Dragging(session);
        self.listeners.remove(ListenerSet::POINTER_TRACKING);
    }
}

impl<D: DragDropDelegate> EventSink for DragDropController<D> {
    fn sink_root(&self) -> ElementId {
        self.root
    }

    fn listens_for(&self, kind: EventKind) -> bool {
        self.listeners.listens_for(kind)
    }

    fn handle_event(
        &mut self,
        tree: &mut ElementTree,
        event: &mut WidgetEvent,
    ) -> Result<(), DragDropError> {
        DragDropController::handle_event(self, tree, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullDelegate;

    impl DragDropDelegate for NullDelegate {
        fn process_drop(
            &mut self,
            _tree: &mut ElementTree,
            _ctx: &DropContext,
            _target: ElementId,
            _event: &mut DropEvent,
        ) -> Result<(), DragDropError> {
            Ok(())
        }

        fn add_mime_data(
            &mut self,
            _tree: &ElementTree,
            _handle: ElementId,
            _data: &mut MimeBundle,
        ) {
        }
    }

    fn three_level_tree(tree: &mut ElementTree) -> (ElementId, ElementId, ElementId) {
        let root = tree.create();
        let child = tree.create();
        let leaf = tree.create();
        tree.append_child(root, child).unwrap();
        tree.append_child(child, leaf).unwrap();
        (root, child, leaf)
    }

    #[test]
    fn test_belongs_to_scoping() {
        let mut tree = ElementTree::new();
        let (root, child, leaf) = three_level_tree(&mut tree);
        tree.add_class(root, DROP_WIDGET_CLASS);

        assert!(belongs_to(&tree, leaf, DROP_WIDGET_CLASS, root));

        // A nested marked widget captures ownership of its descendants.
        tree.add_class(child, DROP_WIDGET_CLASS);
        assert!(!belongs_to(&tree, leaf, DROP_WIDGET_CLASS, root));
        assert!(belongs_to(&tree, leaf, DROP_WIDGET_CLASS, child));
    }

    #[test]
    fn test_belongs_to_no_marker() {
        let mut tree = ElementTree::new();
        let (root, _, leaf) = three_level_tree(&mut tree);
        assert!(!belongs_to(&tree, leaf, DROP_WIDGET_CLASS, root));
    }

    #[test]
    fn test_find_child() {
        let mut tree = ElementTree::new();
        let (root, child, leaf) = three_level_tree(&mut tree);

        assert_eq!(find_child(&tree, root, leaf), Some(child));
        assert_eq!(find_child(&tree, root, child), Some(child));
        assert_eq!(find_child(&tree, root, root), None);

        let stranger = tree.create();
        assert_eq!(find_child(&tree, root, stranger), None);
    }

    #[test]
    fn test_find_child_among() {
        let mut tree = ElementTree::new();
        let (_, child, leaf) = three_level_tree(&mut tree);
        let other = tree.create();

        assert_eq!(find_child_among(&tree, &[child, other], leaf), Some(child));
        assert_eq!(find_child_among(&tree, &[other], leaf), None);
    }

    #[test]
    fn test_handle_helpers() {
        let mut tree = ElementTree::new();
        let el = tree.create();

        make_handle(&mut tree, el);
        assert!(tree.has_class(el, DRAG_HANDLE_CLASS));
        unmake_handle(&mut tree, el);
        assert!(!tree.has_class(el, DRAG_HANDLE_CLASS));

        let handle = create_default_handle(&mut tree);
        assert!(tree.has_class(handle, DRAG_HANDLE_CLASS));
        assert!(tree.has_class(handle, DEFAULT_HANDLE_CLASS));
    }

    #[test]
    fn test_construction_marks_root() {
        let mut tree = ElementTree::new();
        let drop_root = tree.create();
        let _drop_only = DragDropController::new(
            &mut tree,
            drop_root,
            Capabilities::DROP_ONLY,
            DropOptions::default(),
            NullDelegate,
        );
        assert!(tree.has_class(drop_root, DROP_WIDGET_CLASS));
        assert!(!tree.has_class(drop_root, DRAG_WIDGET_CLASS));

        let drag_root = tree.create();
        let _full = DragDropController::new(
            &mut tree,
            drag_root,
            Capabilities::DRAG_DROP,
            DropOptions::default(),
            NullDelegate,
        );
        assert!(tree.has_class(drag_root, DROP_WIDGET_CLASS));
        assert!(tree.has_class(drag_root, DRAG_WIDGET_CLASS));
    }

    #[test]
    fn test_attach_detach_lifecycle() {
        let mut tree = ElementTree::new();
        let root = tree.create();
        let mut widget = DragDropController::new(
            &mut tree,
            root,
            Capabilities::DRAG_DROP,
            DropOptions::default(),
            NullDelegate,
        );

        assert!(!widget.is_attached());
        widget.attach();
        assert!(widget.listeners().contains(ListenerSet::DRAG_PROTOCOL));
        assert!(widget.listeners().contains(ListenerSet::MOUSE_DOWN));
        assert!(!widget.listeners().contains(ListenerSet::POINTER_TRACKING));

        // Double attach does not change the listener set.
        let before = widget.listeners();
        widget.attach();
        assert_eq!(widget.listeners(), before);

        widget.detach();
        assert!(widget.listeners().is_empty());
    }

    #[test]
    fn test_drop_only_has_no_mouse_listener() {
        let mut tree = ElementTree::new();
        let root = tree.create();
        let mut widget = DragDropController::new(
            &mut tree,
            root,
            Capabilities::DROP_ONLY,
            DropOptions::default(),
            NullDelegate,
        );
        widget.attach();
        assert!(!widget.listeners().listens_for(EventKind::MousePress));
        assert!(widget.listeners().listens_for(EventKind::DragEnter));
    }

    #[test]
    fn test_validate_source() {
        let mut tree = ElementTree::new();
        let root = tree.create();
        let widget = DragDropController::new(
            &mut tree,
            root,
            Capabilities::DROP_ONLY,
            DropOptions::default(),
            NullDelegate,
        );

        assert!(widget.validate_source(Some(widget.id())));
        assert!(!widget.validate_source(None));
        assert!(!widget.validate_source(Some(WidgetId::next())));

        let external_root = tree.create();
        let external = DragDropController::new(
            &mut tree,
            external_root,
            Capabilities::DROP_ONLY,
            DropOptions::default().with_external_source(true),
            NullDelegate,
        );
        assert!(external.validate_source(None));
        assert!(external.validate_source(Some(widget.id())));
    }
}
