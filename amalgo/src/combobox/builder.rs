//! Combobox construction and element wiring.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};

use log::debug;

use crate::config::ComboboxConfig;
use crate::document::{Document, ListenerScope, NodeId, Subscription};
use crate::error::BuildError;
use crate::event::EventType;
use crate::ids::{IdAllocator, WidgetId};
use crate::option::{ComboOption, OptionItem, OptionRegistry};

use super::state::{ComboboxInner, Shared};
use super::{Combobox, ComboboxParts};

/// Builder for a [`Combobox`] mounted into a [`Document`].
///
/// # Example
///
/// ```
/// use amalgo::{ComboboxBuilder, ComboboxConfig, Document};
///
/// let document = Document::new();
/// let combobox = ComboboxBuilder::new(&document)
///     .id("country")
///     .option("Belgium", "be")
///     .option("Netherlands", "nl")
///     .config(ComboboxConfig::new().highlight_value("nl"))
///     .mount(document.body())
///     .unwrap();
///
/// assert_eq!(combobox.options().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ComboboxBuilder {
    document: Document,
    id: Option<String>,
    /// (label, value) pairs
    options: Vec<(String, String)>,
    config: ComboboxConfig,
    trigger_label: String,
    placeholder: Option<String>,
}

impl ComboboxBuilder {
    pub fn new(document: &Document) -> Self {
        Self {
            document: document.clone(),
            id: None,
            options: Vec::new(),
            config: ComboboxConfig::default(),
            trigger_label: String::new(),
            placeholder: None,
        }
    }

    /// Base identifier for the widget and its parts. Defaults to a generated
    /// `amalgo-N`.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn option(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((label.into(), value.into()));
        self
    }

    pub fn options<I: OptionItem>(mut self, items: impl IntoIterator<Item = I>) -> Self {
        self.options.extend(
            items
                .into_iter()
                .map(|item| (item.option_label(), item.option_value())),
        );
        self
    }

    pub fn config(mut self, config: ComboboxConfig) -> Self {
        self.config = config;
        self
    }

    /// Shorthand for setting `ComboboxConfig::highlight_value`.
    pub fn highlight_value(mut self, value: impl Into<String>) -> Self {
        self.config.highlight_value = Some(value.into());
        self
    }

    /// Text content of the trigger button.
    pub fn trigger_label(mut self, label: impl Into<String>) -> Self {
        self.trigger_label = label.into();
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Create the widget's elements under `parent` and wire them up.
    pub fn mount(self, parent: NodeId) -> Result<Combobox, BuildError> {
        let doc = self.document;
        if !doc.exists(parent) {
            return Err(BuildError::UnknownParent(parent));
        }

        let base = self.id.unwrap_or_else(|| WidgetId::next().to_string());
        if base.is_empty() || base.chars().any(char::is_whitespace) {
            return Err(BuildError::InvalidId(base));
        }

        let ids = IdAllocator::new(base.clone());
        let trigger_id = ids.part("trigger");
        let input_id = ids.part("input");
        let popover_id = ids.part("popover");
        let menu_id = ids.part("menu");
        let option_ids: Vec<String> = (0..self.options.len()).map(|i| ids.option(i)).collect();

        let taken = [&base, &trigger_id, &input_id, &popover_id, &menu_id]
            .into_iter()
            .chain(option_ids.iter())
            .find(|id| doc.element_by_id(id).is_some());
        if let Some(taken) = taken {
            return Err(BuildError::DuplicateId(taken.clone()));
        }

        let create = |tag: &str| doc.create_element(tag).ok_or(BuildError::DocumentUnavailable);

        // Root
        let root = create("amalgo-box")?;
        doc.set_attribute(root, "id", base.clone());
        if let Some(value) = &self.config.highlight_value {
            doc.set_attribute(root, "highlight", value.clone());
        }

        // Trigger
        let trigger = create("button")?;
        doc.set_attribute(trigger, "id", trigger_id);
        doc.set_attribute(trigger, "aria-haspopup", "menu");
        doc.set_attribute(trigger, "aria-expanded", "false");
        doc.set_attribute(trigger, "aria-controls", popover_id.clone());
        doc.set_text(trigger, self.trigger_label);
        doc.append_child(root, trigger);

        // Popover
        let popover = create("amalgo-popover")?;
        doc.set_attribute(popover, "id", popover_id);
        doc.append_child(root, popover);

        // Input
        let input = create("input")?;
        doc.set_attribute(input, "id", input_id);
        doc.set_attribute(input, "role", "combobox");
        doc.set_attribute(input, "aria-autocomplete", "list");
        doc.set_attribute(input, "aria-expanded", "true");
        doc.set_attribute(input, "aria-controls", menu_id.clone());
        if let Some(placeholder) = self.placeholder {
            doc.set_attribute(input, "placeholder", placeholder);
        }
        doc.append_child(popover, input);

        // Menu and options
        let menu = create("amalgo-menu")?;
        doc.set_attribute(menu, "id", menu_id);
        doc.set_attribute(menu, "role", "listbox");
        doc.append_child(popover, menu);

        let mut options = Vec::with_capacity(self.options.len());
        for ((label, value), dom_id) in self.options.into_iter().zip(option_ids) {
            let node = create("amalgo-option")?;
            doc.set_attribute(node, "id", dom_id.clone());
            doc.set_attribute(node, "role", "option");
            doc.set_attribute(node, "value", value.clone());
            doc.set_text(node, label.clone());
            doc.append_child(menu, node);
            options.push(ComboOption::new(label, value, node, dom_id));
        }

        doc.append_child(parent, root);

        let parts = ComboboxParts {
            root,
            trigger,
            input,
            popover,
            menu,
        };
        let option_count = options.len();
        let shared = Arc::new(Shared {
            id: base,
            parts,
            document: doc,
            is_open: AtomicBool::new(false),
            alive: AtomicBool::new(true),
            inner: RwLock::new(ComboboxInner {
                registry: OptionRegistry::new(options),
                config: self.config,
                ..Default::default()
            }),
        });
        let combobox = Combobox::from_shared(shared);

        let subscriptions = wire_elements(&combobox);
        if let Ok(mut inner) = combobox.shared.inner.write() {
            inner.element_subscriptions = subscriptions;
        }

        debug!(
            "ComboboxBuilder::mount id={} options={}",
            combobox.id(),
            option_count
        );
        Ok(combobox)
    }
}

/// Permanent listeners: trigger click, input changes, option hover and click.
///
/// Each holds only a weak reference to the widget.
fn wire_elements(combobox: &Combobox) -> Vec<Subscription> {
    let doc = combobox.document();
    let parts = combobox.parts();
    let mut subscriptions = Vec::new();

    let weak = combobox.downgrade();
    subscriptions.push(doc.add_listener(
        ListenerScope::Node(parts.trigger),
        &[EventType::Click],
        move |_| {
            if let Some(combobox) = Combobox::upgrade(&weak) {
                combobox.toggle();
            }
        },
    ));

    let weak = combobox.downgrade();
    subscriptions.push(doc.add_listener(
        ListenerScope::Node(parts.input),
        &[EventType::Input],
        move |_| {
            if let Some(combobox) = Combobox::upgrade(&weak) {
                let query = combobox.query();
                combobox.filter(&query);
            }
        },
    ));

    for (index, option) in combobox.options().iter().enumerate() {
        let weak = combobox.downgrade();
        subscriptions.push(doc.add_listener(
            ListenerScope::Node(option.node()),
            &[EventType::PointerEnter],
            move |_| {
                if let Some(combobox) = Combobox::upgrade(&weak) {
                    combobox.highlight_option(index);
                }
            },
        ));

        let weak = combobox.downgrade();
        subscriptions.push(doc.add_listener(
            ListenerScope::Node(option.node()),
            &[EventType::Click],
            move |_| {
                if let Some(combobox) = Combobox::upgrade(&weak) {
                    combobox.select(index);
                }
            },
        ));
    }

    subscriptions
}
