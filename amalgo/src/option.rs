//! Options and the ordered registry holding them.

use crate::document::NodeId;

/// Trait for items that can be offered by a combobox.
///
/// # Example
///
/// ```
/// use amalgo::OptionItem;
///
/// struct Country {
///     code: String,
///     name: String,
/// }
///
/// impl OptionItem for Country {
///     fn option_value(&self) -> String {
///         self.code.clone()
///     }
///
///     fn option_label(&self) -> String {
///         self.name.clone()
///     }
/// }
/// ```
pub trait OptionItem {
    /// Opaque value emitted on selection.
    fn option_value(&self) -> String;

    /// Display text; also what filtering matches against.
    fn option_label(&self) -> String;
}

// Label doubles as value
impl OptionItem for String {
    fn option_value(&self) -> String {
        self.clone()
    }

    fn option_label(&self) -> String {
        self.clone()
    }
}

impl OptionItem for &str {
    fn option_value(&self) -> String {
        (*self).to_string()
    }

    fn option_label(&self) -> String {
        (*self).to_string()
    }
}

// (value, label) tuples
impl<S1, S2> OptionItem for (S1, S2)
where
    S1: AsRef<str>,
    S2: AsRef<str>,
{
    fn option_value(&self) -> String {
        self.0.as_ref().to_string()
    }

    fn option_label(&self) -> String {
        self.1.as_ref().to_string()
    }
}

/// A selectable entry of a combobox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboOption {
    label: String,
    value: String,
    node: NodeId,
    dom_id: String,
    visible: bool,
    highlighted: bool,
}

impl ComboOption {
    pub(crate) fn new(label: String, value: String, node: NodeId, dom_id: String) -> Self {
        Self {
            label,
            value,
            node,
            dom_id,
            visible: true,
            highlighted: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Element rendering this option.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Generated `id` attribute, referenced by `aria-activedescendant`.
    pub fn dom_id(&self) -> &str {
        &self.dom_id
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }
}

/// Ordered, fixed collection of options.
///
/// Order never changes after construction; filtering and highlighting only
/// flip the derived flags.
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    options: Vec<ComboOption>,
}

impl OptionRegistry {
    pub(crate) fn new(options: Vec<ComboOption>) -> Self {
        Self { options }
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ComboOption> {
        self.options.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComboOption> {
        self.options.iter()
    }

    /// Registry indices of the currently visible options, in order.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, option)| option.visible)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn visible_count(&self) -> usize {
        self.options.iter().filter(|option| option.visible).count()
    }

    /// Index of the highlighted option, if any.
    pub fn highlighted(&self) -> Option<usize> {
        self.options.iter().position(|option| option.highlighted)
    }

    /// First option carrying `value`, regardless of visibility.
    pub fn position_of_value(&self, value: &str) -> Option<usize> {
        self.options.iter().position(|option| option.value == value)
    }

    pub(crate) fn set_visible(&mut self, index: usize, visible: bool) {
        if let Some(option) = self.options.get_mut(index) {
            option.visible = visible;
        }
    }

    pub(crate) fn set_highlighted(&mut self, index: usize, highlighted: bool) {
        if let Some(option) = self.options.get_mut(index) {
            option.highlighted = highlighted;
        }
    }
}
