//! Combobox widget - a text input with a filterable option list in a popover.

mod builder;
mod events;
mod state;

pub use builder::ComboboxBuilder;
pub use state::{Combobox, ComboboxParts, SelectHandler, WidgetState};
