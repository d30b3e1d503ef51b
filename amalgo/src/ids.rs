//! Deterministic identifiers for cross-element linkage.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Unique identifier for a combobox instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(usize);

impl WidgetId {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl std::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "amalgo-{}", self.0)
    }
}

/// Hands out element identifiers derived from a widget's base id.
///
/// Singleton parts get `{base}-{part}`; options use their stable registry
/// index, `{base}-option-{index}`.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    base: String,
}

impl IdAllocator {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn part(&self, part: &str) -> String {
        format!("{}-{}", self.base, part)
    }

    pub fn option(&self, index: usize) -> String {
        format!("{}-option-{}", self.base, index)
    }
}
