//! Combobox configuration.

use serde::Deserialize;

/// What happens to the query text when the widget reopens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryPolicy {
    /// Keep the last query and its filtering.
    #[default]
    Persist,
    /// Clear the query and show every option on each open.
    ResetOnOpen,
}

/// Per-widget behavior.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ComboboxConfig {
    /// Suspend page scrolling while open.
    pub lock_scroll: bool,

    /// Query handling across close/open cycles.
    pub query_policy: QueryPolicy,

    /// After a commit, make the selected value the preferred highlight so
    /// the next open resumes on it.
    pub remember_selection: bool,

    /// Value of the option to highlight when the widget opens.
    pub highlight_value: Option<String>,
}

impl Default for ComboboxConfig {
    fn default() -> Self {
        Self {
            lock_scroll: true,
            query_policy: QueryPolicy::default(),
            remember_selection: false,
            highlight_value: None,
        }
    }
}

impl ComboboxConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave page scrolling alone while open.
    pub fn without_scroll_lock(mut self) -> Self {
        self.lock_scroll = false;
        self
    }

    pub fn query_policy(mut self, policy: QueryPolicy) -> Self {
        self.query_policy = policy;
        self
    }

    pub fn remember_selection(mut self) -> Self {
        self.remember_selection = true;
        self
    }

    pub fn highlight_value(mut self, value: impl Into<String>) -> Self {
        self.highlight_value = Some(value.into());
        self
    }
}
