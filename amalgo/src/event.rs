//! Event types flowing through the host document and out of the widget.
//!
//! Input reaches the combobox as [`DocumentEvent`]s dispatched on a
//! [`Document`](crate::document::Document). Commits leave the widget as a
//! [`SelectionEvent`] handed to every registered `on_select` handler.

use crate::document::NodeId;

// =============================================================================
// Keys
// =============================================================================

/// Simplified key representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Escape,
    Up,
    Down,
}

/// Key modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Default::default()
        }
    }
}

/// A key press together with the modifiers held at the time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

impl From<Key> for KeyCombo {
    fn from(key: Key) -> Self {
        Self::new(key, Modifiers::new())
    }
}

// =============================================================================
// Document events
// =============================================================================

/// Payload-free event category, used to filter listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    PointerDown,
    TouchStart,
    FocusIn,
    PointerEnter,
    Click,
    Input,
    KeyDown,
}

/// What happened on the target element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Mouse/pen button pressed
    PointerDown,
    /// Finger touched the surface
    TouchStart,
    /// Element received focus
    FocusIn,
    /// Pointer moved onto the element
    PointerEnter,
    /// Element activated (mouse click, or Enter/Space on a button)
    Click,
    /// Text value of an input changed
    Input,
    /// Key pressed while the target had focus
    KeyDown(KeyCombo),
}

impl EventKind {
    /// The listener category of this event.
    pub fn event_type(&self) -> EventType {
        match self {
            EventKind::PointerDown => EventType::PointerDown,
            EventKind::TouchStart => EventType::TouchStart,
            EventKind::FocusIn => EventType::FocusIn,
            EventKind::PointerEnter => EventType::PointerEnter,
            EventKind::Click => EventType::Click,
            EventKind::Input => EventType::Input,
            EventKind::KeyDown(_) => EventType::KeyDown,
        }
    }
}

/// An event targeted at a node of the host document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEvent {
    pub kind: EventKind,
    pub target: NodeId,
    default_prevented: bool,
}

impl DocumentEvent {
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            default_prevented: false,
        }
    }

    pub fn pointer_down(target: NodeId) -> Self {
        Self::new(EventKind::PointerDown, target)
    }

    pub fn touch_start(target: NodeId) -> Self {
        Self::new(EventKind::TouchStart, target)
    }

    pub fn focus_in(target: NodeId) -> Self {
        Self::new(EventKind::FocusIn, target)
    }

    pub fn pointer_enter(target: NodeId) -> Self {
        Self::new(EventKind::PointerEnter, target)
    }

    pub fn click(target: NodeId) -> Self {
        Self::new(EventKind::Click, target)
    }

    pub fn input(target: NodeId) -> Self {
        Self::new(EventKind::Input, target)
    }

    pub fn key_down(target: NodeId, key: impl Into<KeyCombo>) -> Self {
        Self::new(EventKind::KeyDown(key.into()), target)
    }

    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    /// Suppress the host's default action (e.g. scrolling on arrow keys).
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

// =============================================================================
// Event Result
// =============================================================================

/// Result of handling a key command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// Event was ignored.
    Ignored,
    /// Event was acted on; the host's default action still applies.
    Handled,
    /// Event was acted on and the host's default action must be suppressed.
    Consumed,
}

impl EventResult {
    /// Check if the event was acted on.
    pub fn is_handled(&self) -> bool {
        !matches!(self, EventResult::Ignored)
    }
}

// =============================================================================
// Selection
// =============================================================================

/// Emitted once per commit, carrying the chosen option's value.
///
/// Handlers may call [`prevent_default`](Self::prevent_default). The flag is
/// recorded on the event returned from `Combobox::select`, but the widget
/// closes regardless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEvent {
    /// Base identifier of the widget that emitted the event
    pub widget_id: String,
    /// Opaque value of the selected option
    pub value: String,
    default_prevented: bool,
}

impl SelectionEvent {
    pub fn new(widget_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            widget_id: widget_id.into(),
            value: value.into(),
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}
