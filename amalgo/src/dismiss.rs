//! Outside-interaction dismissal.
//!
//! While a widget is open, any pointer-down, touch-start or focus move whose
//! target lies outside the widget's subtree asks it to close.

use log::trace;

use crate::document::{Document, ListenerScope, NodeId, Subscription};
use crate::event::{DocumentEvent, EventType};

/// Event types that count as an interaction.
pub const DISMISS_EVENTS: [EventType; 3] = [
    EventType::PointerDown,
    EventType::TouchStart,
    EventType::FocusIn,
];

/// Whether `event` originated outside `boundary` (inclusive).
pub fn is_outside(document: &Document, boundary: NodeId, event: &DocumentEvent) -> bool {
    !document.contains(boundary, event.target)
}

/// Watch the whole document for interactions outside `boundary`.
///
/// `on_dismiss` runs once per outside event for as long as the returned
/// subscription lives.
pub fn watch<F>(document: &Document, boundary: NodeId, on_dismiss: F) -> Subscription
where
    F: Fn() + Send + Sync + 'static,
{
    let weak = document.downgrade();
    document.add_listener(ListenerScope::Document, &DISMISS_EVENTS, move |event| {
        let Some(document) = weak.upgrade() else {
            return;
        };
        if is_outside(&document, boundary, event) {
            trace!("outside {:?} on {}, dismissing", event.kind, event.target);
            on_dismiss();
        }
    })
}
