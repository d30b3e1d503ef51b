//! Event handling - convert crossterm events to demo events.

use amalgo::{Key, KeyCombo, Modifiers};
use crossterm::event::{
    Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
use log::trace;

/// Input the demo reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Key(KeyCombo),
    /// Primary button pressed on a screen row
    PointerDown { row: u16 },
    /// Pointer moved onto a screen row
    PointerMove { row: u16 },
    Resize,
    Quit,
}

fn convert_modifiers(mods: KeyModifiers) -> Modifiers {
    Modifiers {
        ctrl: mods.contains(KeyModifiers::CONTROL),
        shift: mods.contains(KeyModifiers::SHIFT),
        alt: mods.contains(KeyModifiers::ALT),
    }
}

fn convert_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Escape),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        _ => None,
    }
}

pub fn convert_key_event(event: KeyEvent) -> Option<KeyCombo> {
    let key = convert_key(event.code)?;
    Some(KeyCombo::new(key, convert_modifiers(event.modifiers)))
}

pub fn convert_mouse_event(event: MouseEvent) -> Option<Event> {
    let row = event.row;
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Event::PointerDown { row }),
        MouseEventKind::Moved => Some(Event::PointerMove { row }),
        _ => None,
    }
}

pub fn convert_event(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key_event) => {
            trace!(
                "Key event: code={:?}, modifiers={:?}, kind={:?}",
                key_event.code, key_event.modifiers, key_event.kind
            );

            // Only handle key press events, not release or repeat
            if key_event.kind != KeyEventKind::Press {
                return None;
            }

            if key_event.modifiers.contains(KeyModifiers::CONTROL)
                && key_event.code == KeyCode::Char('c')
            {
                return Some(Event::Quit);
            }
            convert_key_event(key_event).map(Event::Key)
        }
        CrosstermEvent::Mouse(mouse_event) => convert_mouse_event(mouse_event),
        CrosstermEvent::Resize(_, _) => Some(Event::Resize),
        _ => None,
    }
}
