//! Headless combobox: a text input paired with a filterable, keyboard
//! navigable option list shown in a popover, producing single selections.
//!
//! The widget is mounted into a [`Document`], a small page model that stands
//! in for the host UI. Hosts feed user input in as document events (or via the
//! `Combobox` convenience methods), render from the document's attributes, and
//! call [`Document::run_frame`] once per frame.

pub mod combobox;
pub mod config;
pub mod dismiss;
pub mod document;
pub mod error;
pub mod event;
pub mod filter;
pub mod highlight;
pub mod ids;
pub mod option;

pub use combobox::{Combobox, ComboboxBuilder, ComboboxParts, WidgetState};
pub use config::{ComboboxConfig, QueryPolicy};
pub use document::{Document, ListenerScope, NodeId, ScrollLock, Subscription};
pub use error::BuildError;
pub use event::{DocumentEvent, EventKind, EventResult, EventType, Key, KeyCombo, Modifiers, SelectionEvent};
pub use option::{ComboOption, OptionItem, OptionRegistry};

pub mod prelude {
    pub use crate::combobox::{Combobox, ComboboxBuilder, WidgetState};
    pub use crate::config::{ComboboxConfig, QueryPolicy};
    pub use crate::document::{Document, NodeId};
    pub use crate::error::BuildError;
    pub use crate::event::{DocumentEvent, EventResult, Key, KeyCombo, Modifiers, SelectionEvent};
    pub use crate::option::{ComboOption, OptionItem};
}
