//! Combobox widget state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, Weak};

use log::{debug, trace};

use crate::config::{ComboboxConfig, QueryPolicy};
use crate::dismiss;
use crate::document::{Document, ListenerScope, NodeId, ScrollLock, Subscription};
use crate::event::{EventKind, EventResult, EventType, SelectionEvent};
use crate::filter;
use crate::highlight::{self, HighlightChange};
use crate::option::{ComboOption, OptionRegistry};

/// Callback receiving each selection.
pub type SelectHandler = Arc<dyn Fn(&mut SelectionEvent) + Send + Sync>;

/// Open/closed lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WidgetState {
    #[default]
    Closed,
    Open,
}

/// Elements making up a mounted combobox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboboxParts {
    /// `amalgo-box` element; the dismissal boundary
    pub root: NodeId,
    /// Button toggling the popover
    pub trigger: NodeId,
    /// Text input holding the query
    pub input: NodeId,
    /// Overlay container
    pub popover: NodeId,
    /// Listbox holding the option elements
    pub menu: NodeId,
}

/// Mutable widget internals.
#[derive(Default)]
pub(super) struct ComboboxInner {
    pub(super) registry: OptionRegistry,
    pub(super) config: ComboboxConfig,
    /// Keyboard and dismissal listeners; populated only while open
    pub(super) open_subscriptions: Vec<Subscription>,
    pub(super) scroll_lock: Option<ScrollLock>,
    /// Trigger, input and option wiring; lives until destroy
    pub(super) element_subscriptions: Vec<Subscription>,
    pub(super) handlers: Vec<SelectHandler>,
}

pub(super) struct Shared {
    pub(super) id: String,
    pub(super) parts: ComboboxParts,
    pub(super) document: Document,
    pub(super) is_open: AtomicBool,
    pub(super) alive: AtomicBool,
    pub(super) inner: RwLock<ComboboxInner>,
}

/// An accessible, keyboard-navigable combobox.
///
/// `Combobox` is a cheap handle: clones drive the same widget. Build one with
/// [`ComboboxBuilder`](super::ComboboxBuilder).
///
/// Commands issued in the wrong state (navigating while closed, committing
/// with nothing highlighted, stepping past either end) are silently ignored.
///
/// # Example
///
/// ```
/// use amalgo::{ComboboxBuilder, Document, Key};
///
/// let document = Document::new();
/// let combobox = ComboboxBuilder::new(&document)
///     .id("fruit")
///     .options([("apple", "Apple"), ("banana", "Banana")])
///     .mount(document.body())
///     .unwrap();
///
/// combobox.open();
/// combobox.press_key(Key::Down);
/// let event = combobox.press_key(Key::Enter);
/// assert!(!combobox.is_open());
/// # let _ = event;
/// ```
#[derive(Clone)]
pub struct Combobox {
    pub(super) shared: Arc<Shared>,
}

impl Combobox {
    pub(super) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    pub(super) fn downgrade(&self) -> Weak<Shared> {
        Arc::downgrade(&self.shared)
    }

    pub(super) fn upgrade(weak: &Weak<Shared>) -> Option<Self> {
        weak.upgrade().map(Self::from_shared)
    }

    /// Base identifier; the root element's `id`.
    pub fn id(&self) -> &str {
        &self.shared.id
    }

    pub fn parts(&self) -> ComboboxParts {
        self.shared.parts
    }

    pub fn document(&self) -> &Document {
        &self.shared.document
    }

    // -------------------------------------------------------------------------
    // Open/close state
    // -------------------------------------------------------------------------

    pub fn state(&self) -> WidgetState {
        if self.is_open() {
            WidgetState::Open
        } else {
            WidgetState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.shared.is_open.load(Ordering::SeqCst)
    }

    /// False once [`destroy`](Self::destroy) has run.
    pub fn is_alive(&self) -> bool {
        self.shared.alive.load(Ordering::SeqCst)
    }

    /// Open the popover.
    ///
    /// Attaches keyboard handling and the dismissal watcher, locks page
    /// scrolling, applies the initial highlight and focuses the input.
    pub fn open(&self) {
        if !self.is_alive() || self.shared.is_open.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("Combobox::open id={}", self.id());

        let doc = &self.shared.document;
        let parts = self.shared.parts;
        doc.toggle_attribute(parts.root, "open", true);
        doc.set_attribute(parts.trigger, "aria-expanded", "true");

        let (lock_scroll, policy) = self.read_config(|c| (c.lock_scroll, c.query_policy));
        if policy == QueryPolicy::ResetOnOpen {
            doc.set_value(parts.input, "");
            self.filter("");
        }

        let subscriptions = vec![self.watch_keys(), self.watch_outside()];
        let scroll_lock = lock_scroll.then(|| doc.lock_scroll());
        if let Ok(mut inner) = self.shared.inner.write() {
            inner.open_subscriptions = subscriptions;
            inner.scroll_lock = scroll_lock;
        }

        self.highlight_initial();
        doc.focus(parts.input);
    }

    /// Close the popover.
    ///
    /// Every close path ends here: clears the highlight and releases the
    /// listeners and scroll lock acquired by [`open`](Self::open).
    pub fn close(&self) {
        if !self.shared.is_open.swap(false, Ordering::SeqCst) {
            return;
        }
        debug!("Combobox::close id={}", self.id());

        let doc = &self.shared.document;
        let parts = self.shared.parts;
        doc.toggle_attribute(parts.root, "open", false);
        doc.set_attribute(parts.trigger, "aria-expanded", "false");

        let change = self
            .shared
            .inner
            .write()
            .map(|mut inner| highlight::clear(&mut inner.registry))
            .unwrap_or(HighlightChange::None);
        self.mirror_highlight(change);

        let released = self.shared.inner.write().ok().map(|mut inner| {
            (
                std::mem::take(&mut inner.open_subscriptions),
                inner.scroll_lock.take(),
            )
        });
        drop(released);
    }

    /// Close if open, otherwise open. Bound to the trigger.
    pub fn toggle(&self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    /// Close for good: the widget ignores every later command, pending
    /// deferred work becomes a no-op, and its element wiring is detached.
    pub fn destroy(&self) {
        self.close();
        if self.shared.alive.swap(false, Ordering::SeqCst) {
            let released = self
                .shared
                .inner
                .write()
                .ok()
                .map(|mut inner| std::mem::take(&mut inner.element_subscriptions));
            drop(released);
            debug!("Combobox::destroy id={}", self.id());
        }
    }

    /// Listeners attached by the current open state.
    pub fn open_subscription_count(&self) -> usize {
        self.shared
            .inner
            .read()
            .map(|inner| inner.open_subscriptions.len())
            .unwrap_or(0)
    }

    fn watch_keys(&self) -> Subscription {
        let weak = self.downgrade();
        self.shared.document.add_listener(
            ListenerScope::Node(self.shared.parts.root),
            &[EventType::KeyDown],
            move |event| {
                let Some(combobox) = Combobox::upgrade(&weak) else {
                    return;
                };
                if let EventKind::KeyDown(key) = event.kind
                    && combobox.on_key(&key) == EventResult::Consumed
                {
                    event.prevent_default();
                }
            },
        )
    }

    fn watch_outside(&self) -> Subscription {
        let weak = self.downgrade();
        dismiss::watch(&self.shared.document, self.shared.parts.root, move || {
            if let Some(combobox) = Combobox::upgrade(&weak) {
                combobox.close();
            }
        })
    }

    // -------------------------------------------------------------------------
    // Options and filtering
    // -------------------------------------------------------------------------

    /// Snapshot of every option, in registry order.
    pub fn options(&self) -> Vec<ComboOption> {
        self.shared
            .inner
            .read()
            .map(|inner| inner.registry.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn option(&self, index: usize) -> Option<ComboOption> {
        self.shared
            .inner
            .read()
            .ok()
            .and_then(|inner| inner.registry.get(index).cloned())
    }

    /// Registry indices of the options currently shown.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.shared
            .inner
            .read()
            .map(|inner| inner.registry.visible_indices())
            .unwrap_or_default()
    }

    /// Current text of the input.
    pub fn query(&self) -> String {
        self.shared.document.value(self.shared.parts.input)
    }

    /// Recompute option visibility for `query`.
    ///
    /// Drops the highlight if its option gets hidden. Returns the number of
    /// visible options.
    pub fn filter(&self, query: &str) -> usize {
        let result = self.shared.inner.write().ok().map(|mut inner| {
            let visible = filter::apply(&mut inner.registry, query);
            let change = highlight::clear_if_hidden(&mut inner.registry);
            let flags: Vec<(NodeId, bool)> = inner
                .registry
                .iter()
                .map(|o| (o.node(), o.is_visible()))
                .collect();
            (visible, change, flags)
        });
        let Some((visible, change, flags)) = result else {
            return 0;
        };
        trace!("Combobox::filter id={} query={:?} visible={}", self.id(), query, visible);

        let doc = &self.shared.document;
        for (node, is_visible) in flags {
            doc.toggle_attribute(node, "hidden", !is_visible);
        }
        self.mirror_highlight(change);
        visible
    }

    // -------------------------------------------------------------------------
    // Highlight
    // -------------------------------------------------------------------------

    /// Registry index of the highlighted option.
    pub fn highlighted(&self) -> Option<usize> {
        self.shared
            .inner
            .read()
            .ok()
            .and_then(|inner| inner.registry.highlighted())
    }

    pub fn highlighted_value(&self) -> Option<String> {
        self.shared.inner.read().ok().and_then(|inner| {
            inner
                .registry
                .highlighted()
                .and_then(|i| inner.registry.get(i))
                .map(|o| o.value().to_string())
        })
    }

    /// Step the highlight through the visible options. Stops at either end.
    pub fn cycle_highlight(&self, delta: isize) {
        if !self.is_open() {
            return;
        }
        let target = self
            .shared
            .inner
            .read()
            .ok()
            .and_then(|inner| highlight::cycle_target(&inner.registry, delta));
        match target {
            Some(index) => self.highlight_option(index),
            None => trace!("Combobox::cycle_highlight id={} delta={} at edge", self.id(), delta),
        }
    }

    /// Highlight the option at `index`.
    ///
    /// Ignored while closed and for hidden or unknown options.
    pub fn highlight_option(&self, index: usize) {
        if !self.is_open() {
            return;
        }
        let change = self
            .shared
            .inner
            .write()
            .map(|mut inner| highlight::highlight(&mut inner.registry, index))
            .unwrap_or(HighlightChange::None);
        self.mirror_highlight(change);
    }

    pub fn clear_highlighted(&self) {
        let change = self
            .shared
            .inner
            .write()
            .map(|mut inner| highlight::clear(&mut inner.registry))
            .unwrap_or(HighlightChange::None);
        self.mirror_highlight(change);
    }

    /// Value whose option is highlighted when the widget opens.
    pub fn highlight_value(&self) -> Option<String> {
        self.read_config(|c| c.highlight_value.clone())
    }

    pub fn set_highlight_value(&self, value: Option<String>) {
        let root = self.shared.parts.root;
        match &value {
            Some(v) => self.shared.document.set_attribute(root, "highlight", v.clone()),
            None => self.shared.document.remove_attribute(root, "highlight"),
        }
        if let Ok(mut inner) = self.shared.inner.write() {
            inner.config.highlight_value = value;
        }
    }

    /// Highlight the option matching the preferred value, if it is visible.
    ///
    /// The value is looked up across every option, but a preferred option
    /// hidden by a persisted query gets no highlight.
    fn highlight_initial(&self) {
        let Some(value) = self.highlight_value() else {
            return;
        };
        let index = self
            .shared
            .inner
            .read()
            .ok()
            .and_then(|inner| inner.registry.position_of_value(&value));
        match index {
            Some(index) => self.highlight_option(index),
            None => trace!("Combobox::highlight_initial id={} no option for {:?}", self.id(), value),
        }
    }

    /// Reflect a highlight change onto the option elements and the input's
    /// `aria-activedescendant`.
    fn mirror_highlight(&self, change: HighlightChange) {
        let doc = &self.shared.document;
        let input = self.shared.parts.input;
        let node_of = |index: usize| self.option(index).map(|o| (o.node(), o.dom_id().to_string()));
        match change {
            HighlightChange::None => {}
            HighlightChange::Moved { from, to } => {
                if let Some((node, _)) = from.and_then(node_of) {
                    doc.remove_attribute(node, "highlight");
                }
                if let Some((node, dom_id)) = node_of(to) {
                    doc.toggle_attribute(node, "highlight", true);
                    doc.set_attribute(input, "aria-activedescendant", dom_id);
                }
            }
            HighlightChange::Cleared { from } => {
                if let Some((node, _)) = node_of(from) {
                    doc.remove_attribute(node, "highlight");
                }
                doc.remove_attribute(input, "aria-activedescendant");
            }
        }
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Register a handler for selection events.
    pub fn on_select<F>(&self, handler: F)
    where
        F: Fn(&mut SelectionEvent) + Send + Sync + 'static,
    {
        if let Ok(mut inner) = self.shared.inner.write() {
            inner.handlers.push(Arc::new(handler));
        }
    }

    /// Commit the option at `index`.
    ///
    /// Emits one [`SelectionEvent`] to every handler, closes the widget, and
    /// returns focus to the trigger on the next animation frame. Handlers
    /// calling `prevent_default` do not keep the widget open.
    pub fn select(&self, index: usize) -> Option<SelectionEvent> {
        if !self.is_alive() {
            return None;
        }
        let (value, handlers, remember) = {
            let inner = self.shared.inner.read().ok()?;
            let option = inner.registry.get(index)?;
            (
                option.value().to_string(),
                inner.handlers.clone(),
                inner.config.remember_selection,
            )
        };
        debug!("Combobox::select id={} value={}", self.id(), value);

        let mut event = SelectionEvent::new(self.id(), value.clone());
        for handler in handlers {
            handler(&mut event);
        }
        if event.is_default_prevented() {
            debug!("Selection event for {} was cancelled; closing regardless", value);
        }
        if remember {
            self.set_highlight_value(Some(value));
        }

        self.close();
        self.schedule_trigger_focus();
        Some(event)
    }

    /// Commit the highlighted option, if any.
    pub fn select_highlighted(&self) -> Option<SelectionEvent> {
        let index = self.highlighted()?;
        self.select(index)
    }

    /// Refocus the trigger once the current frame is over, so the key release
    /// that finished a keyboard commit cannot activate it again.
    fn schedule_trigger_focus(&self) {
        let weak = self.downgrade();
        self.shared.document.request_animation_frame(move || {
            match Combobox::upgrade(&weak) {
                Some(combobox) if combobox.is_alive() => {
                    combobox.document().focus(combobox.parts().trigger);
                }
                _ => trace!("Deferred trigger focus skipped; widget is gone"),
            }
        });
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    pub fn config(&self) -> ComboboxConfig {
        self.read_config(|c| c.clone())
    }

    fn read_config<T>(&self, f: impl FnOnce(&ComboboxConfig) -> T) -> T
    where
        T: Default,
    {
        self.shared
            .inner
            .read()
            .map(|inner| f(&inner.config))
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for Combobox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Combobox")
            .field("id", &self.shared.id)
            .field("state", &self.state())
            .field("highlighted", &self.highlighted())
            .field("alive", &self.is_alive())
            .finish()
    }
}
