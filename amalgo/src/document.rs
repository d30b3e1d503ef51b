//! Headless host document.
//!
//! A minimal page model the combobox is mounted in: an element tree with
//! attributes, focus tracking, a reentrant scroll lock, listener registration
//! returning [`Subscription`] handles, and an animation-frame queue.
//!
//! `Document` is a cheap handle; clones share the same page.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use log::trace;

use crate::event::{DocumentEvent, EventType};

/// Attribute mirroring the body's scroll state while a lock is held.
const SCROLL_LOCK_STYLE: &str = "overflow: hidden";

/// Handle to an element of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Debug, Default)]
struct Node {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: BTreeMap<String, String>,
    text: String,
    value: String,
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<Node>,
    /// `id` attribute -> node
    ids: HashMap<String, NodeId>,
    active: Option<NodeId>,
}

impl Tree {
    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// `node` followed by each of its ancestors up to the root.
    fn path(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = self.node(node).map(|_| node);
        while let Some(id) = current {
            path.push(id);
            current = self.node(id).and_then(|n| n.parent);
        }
        path
    }
}

// =============================================================================
// Listeners
// =============================================================================

/// Callback invoked for each matching event.
pub type Listener = Arc<dyn Fn(&mut DocumentEvent) + Send + Sync>;

type FrameCallback = Box<dyn FnOnce() + Send>;

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerScope {
    /// Receives every event dispatched on the document.
    Document,
    /// Receives events targeting this node or one of its descendants.
    Node(NodeId),
}

struct ListenerEntry {
    id: u64,
    scope: ListenerScope,
    types: Vec<EventType>,
    callback: Listener,
}

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    entries: Vec<ListenerEntry>,
}

impl ListenerTable {
    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }
}

/// Registration handle for a listener.
///
/// The listener stays attached for as long as the handle lives. Dropping it
/// (or calling [`cancel`](Self::cancel)) detaches the listener.
#[must_use = "dropping a Subscription detaches its listener"]
pub struct Subscription {
    id: u64,
    table: Weak<RwLock<ListenerTable>>,
}

impl Subscription {
    /// Detach the listener now.
    pub fn cancel(self) {}

    /// Whether the listener is still attached.
    pub fn is_active(&self) -> bool {
        self.table
            .upgrade()
            .and_then(|table| table.read().ok().map(|t| t.contains(self.id)))
            .unwrap_or(false)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade()
            && let Ok(mut guard) = table.write()
        {
            guard.entries.retain(|entry| entry.id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

// =============================================================================
// Scroll lock
// =============================================================================

/// Guard for the page scroll lock.
///
/// The lock is reentrant: the body scrolls again once every guard is gone.
#[must_use = "dropping a ScrollLock releases it"]
#[derive(Debug)]
pub struct ScrollLock {
    document: Document,
}

impl Drop for ScrollLock {
    fn drop(&mut self) {
        if self.document.scroll_locks.fetch_sub(1, Ordering::SeqCst) == 1 {
            let body = self.document.body();
            self.document.remove_attribute(body, "style");
            trace!("scroll lock released");
        }
    }
}

// =============================================================================
// Document
// =============================================================================

/// Shared handle to a headless page.
#[derive(Clone)]
pub struct Document {
    tree: Arc<RwLock<Tree>>,
    listeners: Arc<RwLock<ListenerTable>>,
    frames: Arc<Mutex<VecDeque<FrameCallback>>>,
    scroll_locks: Arc<AtomicUsize>,
}

impl Document {
    /// Create an empty document containing only `body`.
    pub fn new() -> Self {
        let body = Node {
            tag: "body".into(),
            ..Default::default()
        };
        Self {
            tree: Arc::new(RwLock::new(Tree {
                nodes: vec![body],
                ids: HashMap::new(),
                active: None,
            })),
            listeners: Arc::new(RwLock::new(ListenerTable::default())),
            frames: Arc::new(Mutex::new(VecDeque::new())),
            scroll_locks: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle that does not keep the document alive.
    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument {
            tree: Arc::downgrade(&self.tree),
            listeners: Arc::downgrade(&self.listeners),
            frames: Arc::downgrade(&self.frames),
            scroll_locks: Arc::downgrade(&self.scroll_locks),
        }
    }

    /// The root element.
    pub fn body(&self) -> NodeId {
        NodeId(0)
    }

    // -------------------------------------------------------------------------
    // Tree
    // -------------------------------------------------------------------------

    /// Create a detached element.
    ///
    /// Returns `None` if the document's tree lock is poisoned.
    pub fn create_element(&self, tag: impl Into<String>) -> Option<NodeId> {
        let node = Node {
            tag: tag.into(),
            ..Default::default()
        };
        let mut tree = self.tree.write().ok()?;
        tree.nodes.push(node);
        Some(NodeId(tree.nodes.len() - 1))
    }

    /// Attach `child` as the last child of `parent`.
    ///
    /// Returns false if either node is unknown, or if attaching would make a
    /// node its own ancestor.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> bool {
        let Ok(mut tree) = self.tree.write() else {
            return false;
        };
        if tree.node(child).is_none()
            || tree.node(parent).is_none()
            || tree.path(parent).contains(&child)
        {
            return false;
        }
        if let Some(old_parent) = tree.node(child).and_then(|n| n.parent)
            && let Some(old) = tree.node_mut(old_parent)
        {
            old.children.retain(|c| *c != child);
        }
        if let Some(p) = tree.node_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = tree.node_mut(child) {
            c.parent = Some(parent);
        }
        true
    }

    /// Whether `node` exists in this document.
    pub fn exists(&self, node: NodeId) -> bool {
        self.tree
            .read()
            .map(|tree| tree.node(node).is_some())
            .unwrap_or(false)
    }

    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.tree
            .read()
            .ok()
            .and_then(|tree| tree.node(node).map(|n| n.tag.clone()))
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree
            .read()
            .ok()
            .and_then(|tree| tree.node(node).and_then(|n| n.parent))
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree
            .read()
            .ok()
            .and_then(|tree| tree.node(node).map(|n| n.children.clone()))
            .unwrap_or_default()
    }

    /// Inclusive containment: a node contains itself.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.tree
            .read()
            .map(|tree| tree.path(node).contains(&ancestor))
            .unwrap_or(false)
    }

    /// Look up an element by its `id` attribute.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .read()
            .ok()
            .and_then(|tree| tree.ids.get(id).copied())
    }

    // -------------------------------------------------------------------------
    // Attributes and content
    // -------------------------------------------------------------------------

    pub fn set_attribute(&self, node: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Ok(mut tree) = self.tree.write() {
            let Some(n) = tree.node_mut(node) else {
                return;
            };
            let previous = n.attributes.insert(name.to_string(), value.clone());
            if name == "id" {
                if let Some(previous) = previous {
                    tree.ids.remove(&previous);
                }
                tree.ids.insert(value, node);
            }
        }
    }

    pub fn remove_attribute(&self, node: NodeId, name: &str) {
        if let Ok(mut tree) = self.tree.write() {
            let removed = tree
                .node_mut(node)
                .and_then(|n| n.attributes.remove(name));
            if name == "id"
                && let Some(removed) = removed
            {
                tree.ids.remove(&removed);
            }
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree
            .read()
            .ok()
            .and_then(|tree| tree.node(node).and_then(|n| n.attributes.get(name).cloned()))
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.tree
            .read()
            .map(|tree| {
                tree.node(node)
                    .map(|n| n.attributes.contains_key(name))
                    .unwrap_or(false)
            })
            .unwrap_or(false)
    }

    /// Set or remove a boolean attribute.
    pub fn toggle_attribute(&self, node: NodeId, name: &str, present: bool) {
        if present {
            self.set_attribute(node, name, "");
        } else {
            self.remove_attribute(node, name);
        }
    }

    pub fn set_text(&self, node: NodeId, text: impl Into<String>) {
        if let Ok(mut tree) = self.tree.write()
            && let Some(n) = tree.node_mut(node)
        {
            n.text = text.into();
        }
    }

    /// Text of `node` and all of its descendants, in document order.
    pub fn text_content(&self, node: NodeId) -> String {
        let Ok(tree) = self.tree.read() else {
            return String::new();
        };
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(n) = tree.node(id) {
                out.push_str(&n.text);
                stack.extend(n.children.iter().rev());
            }
        }
        out
    }

    /// Set the editable value of an input element.
    pub fn set_value(&self, node: NodeId, value: impl Into<String>) {
        if let Ok(mut tree) = self.tree.write()
            && let Some(n) = tree.node_mut(node)
        {
            n.value = value.into();
        }
    }

    pub fn value(&self, node: NodeId) -> String {
        self.tree
            .read()
            .ok()
            .and_then(|tree| tree.node(node).map(|n| n.value.clone()))
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Focus
    // -------------------------------------------------------------------------

    pub fn active_element(&self) -> Option<NodeId> {
        self.tree.read().ok().and_then(|tree| tree.active)
    }

    /// Move focus to `node` and dispatch `FocusIn` on it.
    ///
    /// Returns false (and dispatches nothing) if the node is unknown or
    /// already focused.
    pub fn focus(&self, node: NodeId) -> bool {
        let changed = match self.tree.write() {
            Ok(mut tree) if tree.node(node).is_some() && tree.active != Some(node) => {
                tree.active = Some(node);
                true
            }
            _ => false,
        };
        if changed {
            self.dispatch(DocumentEvent::focus_in(node));
        }
        changed
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Attach a listener for the given event types.
    pub fn add_listener<F>(&self, scope: ListenerScope, types: &[EventType], callback: F) -> Subscription
    where
        F: Fn(&mut DocumentEvent) + Send + Sync + 'static,
    {
        let id = match self.listeners.write() {
            Ok(mut table) => {
                let id = table.next_id;
                table.next_id += 1;
                table.entries.push(ListenerEntry {
                    id,
                    scope,
                    types: types.to_vec(),
                    callback: Arc::new(callback),
                });
                id
            }
            Err(_) => u64::MAX,
        };
        Subscription {
            id,
            table: Arc::downgrade(&self.listeners),
        }
    }

    /// Number of attached listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .map(|table| table.entries.len())
            .unwrap_or(0)
    }

    /// Deliver an event.
    ///
    /// Node-scoped listeners run first, innermost node first, followed by
    /// document listeners. No internal lock is held while a callback runs, so
    /// callbacks may freely use the document. A listener detached by an earlier
    /// callback is skipped.
    pub fn dispatch(&self, mut event: DocumentEvent) -> DocumentEvent {
        let path = self
            .tree
            .read()
            .map(|tree| tree.path(event.target))
            .unwrap_or_default();
        let ty = event.event_type();

        let batch: Vec<(u64, Listener)> = match self.listeners.read() {
            Ok(table) => {
                let wants = |entry: &&ListenerEntry| entry.types.contains(&ty);
                let mut batch = Vec::new();
                for node in &path {
                    batch.extend(
                        table
                            .entries
                            .iter()
                            .filter(wants)
                            .filter(|e| e.scope == ListenerScope::Node(*node))
                            .map(|e| (e.id, Arc::clone(&e.callback))),
                    );
                }
                batch.extend(
                    table
                        .entries
                        .iter()
                        .filter(wants)
                        .filter(|e| e.scope == ListenerScope::Document)
                        .map(|e| (e.id, Arc::clone(&e.callback))),
                );
                batch
            }
            Err(_) => return event,
        };

        trace!("dispatch {:?} to {} listener(s)", event.kind, batch.len());

        for (id, callback) in batch {
            let attached = self
                .listeners
                .read()
                .map(|table| table.contains(id))
                .unwrap_or(false);
            if attached {
                callback(&mut event);
            }
        }
        event
    }

    // -------------------------------------------------------------------------
    // Scroll lock
    // -------------------------------------------------------------------------

    /// Suspend page scrolling until the returned guard is dropped.
    pub fn lock_scroll(&self) -> ScrollLock {
        if self.scroll_locks.fetch_add(1, Ordering::SeqCst) == 0 {
            self.set_attribute(self.body(), "style", SCROLL_LOCK_STYLE);
            trace!("scroll lock acquired");
        }
        ScrollLock {
            document: self.clone(),
        }
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locks.load(Ordering::SeqCst) > 0
    }

    // -------------------------------------------------------------------------
    // Frames
    // -------------------------------------------------------------------------

    /// Queue `callback` for the next [`run_frame`](Self::run_frame).
    pub fn request_animation_frame<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Ok(mut frames) = self.frames.lock() {
            frames.push_back(Box::new(callback));
        }
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending_frames(&self) -> usize {
        self.frames.lock().map(|frames| frames.len()).unwrap_or(0)
    }

    /// Run every callback queued before this call. Callbacks queued while the
    /// frame runs wait for the following frame.
    pub fn run_frame(&self) -> usize {
        let batch: Vec<FrameCallback> = match self.frames.lock() {
            Ok(mut frames) => frames.drain(..).collect(),
            Err(_) => return 0,
        };
        let count = batch.len();
        for callback in batch {
            callback();
        }
        count
    }
}

/// Non-owning handle to a [`Document`], for callbacks stored inside it.
#[derive(Clone)]
pub struct WeakDocument {
    tree: Weak<RwLock<Tree>>,
    listeners: Weak<RwLock<ListenerTable>>,
    frames: Weak<Mutex<VecDeque<FrameCallback>>>,
    scroll_locks: Weak<AtomicUsize>,
}

impl WeakDocument {
    pub fn upgrade(&self) -> Option<Document> {
        Some(Document {
            tree: self.tree.upgrade()?,
            listeners: self.listeners.upgrade()?,
            frames: self.frames.upgrade()?,
            scroll_locks: self.scroll_locks.upgrade()?,
        })
    }
}

impl std::fmt::Debug for WeakDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakDocument").finish_non_exhaustive()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let nodes = self.tree.read().map(|t| t.nodes.len()).unwrap_or(0);
        f.debug_struct("Document")
            .field("nodes", &nodes)
            .field("listeners", &self.listener_count())
            .field("scroll_locks", &self.scroll_locks.load(Ordering::SeqCst))
            .finish()
    }
}
