//! Event handling for the Combobox widget.

use log::trace;

use crate::event::{DocumentEvent, EventResult, Key, KeyCombo};

use super::Combobox;

impl Combobox {
    /// Handle a key command. Only acts while open. Modifiers are not
    /// consulted.
    ///
    /// Returns `Consumed` for the arrow keys, whose default (scrolling) must be
    /// suppressed by the host.
    pub fn on_key(&self, key: &KeyCombo) -> EventResult {
        if !self.is_open() {
            return EventResult::Ignored;
        }

        match key.key {
            Key::Down => {
                self.cycle_highlight(1);
                EventResult::Consumed
            }
            Key::Up => {
                self.cycle_highlight(-1);
                EventResult::Consumed
            }
            Key::Enter => match self.select_highlighted() {
                Some(_) => EventResult::Handled,
                None => EventResult::Ignored,
            },
            Key::Escape => {
                // No trailing activation to worry about, focus can move now
                self.close();
                self.document().focus(self.parts().trigger);
                EventResult::Handled
            }
            _ => {
                trace!("Combobox::on_key id={} ignoring {:?}", self.id(), key.key);
                EventResult::Ignored
            }
        }
    }

    // -------------------------------------------------------------------------
    // Host input
    //
    // These route through the document so every listener sees the event, the
    // same way a user interaction would.
    // -------------------------------------------------------------------------

    /// Activate the trigger button.
    pub fn activate_trigger(&self) -> DocumentEvent {
        self.document()
            .dispatch(DocumentEvent::click(self.parts().trigger))
    }

    /// Replace the input's text and fire its input event.
    pub fn type_query(&self, text: &str) -> DocumentEvent {
        let input = self.parts().input;
        self.document().set_value(input, text);
        self.document().dispatch(DocumentEvent::input(input))
    }

    /// Move the pointer onto the option at `index`.
    pub fn hover_option(&self, index: usize) -> Option<DocumentEvent> {
        let node = self.option(index)?.node();
        Some(self.document().dispatch(DocumentEvent::pointer_enter(node)))
    }

    /// Click the option at `index`.
    pub fn click_option(&self, index: usize) -> Option<DocumentEvent> {
        let node = self.option(index)?.node();
        Some(self.document().dispatch(DocumentEvent::click(node)))
    }

    /// Press a key on the focused element of the widget (the input when focus
    /// is elsewhere). Check `is_default_prevented` on the result to see
    /// whether the host should skip its default action.
    pub fn press_key(&self, key: impl Into<KeyCombo>) -> DocumentEvent {
        let parts = self.parts();
        let target = self
            .document()
            .active_element()
            .filter(|active| self.document().contains(parts.root, *active))
            .unwrap_or(parts.input);
        self.document().dispatch(DocumentEvent::key_down(target, key))
    }
}
