//! Highlight tracking (roving focus) over the visible options.
//!
//! At most one option is highlighted, and only a visible one. Movement clamps
//! at both ends of the visible list rather than wrapping.

use crate::option::OptionRegistry;

/// What a highlight operation did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightChange {
    /// Nothing changed.
    None,
    /// `to` became highlighted; `from` lost it.
    Moved { from: Option<usize>, to: usize },
    /// `from` lost the highlight and nothing replaced it.
    Cleared { from: usize },
}

/// Registry index reached by moving `delta` steps through the visible options.
///
/// With nothing highlighted the walk starts just before the first visible
/// option, so `+1` lands on it. Returns `None` when the step would leave the
/// visible range.
pub fn cycle_target(registry: &OptionRegistry, delta: isize) -> Option<usize> {
    let visible = registry.visible_indices();
    let current = registry
        .highlighted()
        .and_then(|index| visible.iter().position(|v| *v == index))
        .map(|pos| pos as isize)
        .unwrap_or(-1);
    let target = current + delta;
    if target < 0 {
        return None;
    }
    visible.get(target as usize).copied()
}

/// Highlight `index`, clearing any previous highlight.
///
/// Hidden or unknown options are rejected.
pub fn highlight(registry: &mut OptionRegistry, index: usize) -> HighlightChange {
    match registry.get(index) {
        Some(option) if option.is_visible() => {}
        _ => return HighlightChange::None,
    }
    let from = registry.highlighted();
    if from == Some(index) {
        return HighlightChange::None;
    }
    if let Some(from) = from {
        registry.set_highlighted(from, false);
    }
    registry.set_highlighted(index, true);
    HighlightChange::Moved { from, to: index }
}

/// Remove the highlight, if any.
pub fn clear(registry: &mut OptionRegistry) -> HighlightChange {
    match registry.highlighted() {
        Some(from) => {
            registry.set_highlighted(from, false);
            HighlightChange::Cleared { from }
        }
        None => HighlightChange::None,
    }
}

/// Drop the highlight if its option is no longer visible.
pub fn clear_if_hidden(registry: &mut OptionRegistry) -> HighlightChange {
    match registry.highlighted() {
        Some(index) if !registry.get(index).is_some_and(|o| o.is_visible()) => clear(registry),
        _ => HighlightChange::None,
    }
}
