use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use amalgo::{
    BuildError, Combobox, ComboboxBuilder, ComboboxConfig, Document, DocumentEvent, Key, KeyCombo,
    Modifiers, NodeId, QueryPolicy, WidgetState,
};

fn fruit(doc: &Document) -> Combobox {
    fruit_with(doc, ComboboxConfig::default())
}

fn fruit_with(doc: &Document, config: ComboboxConfig) -> Combobox {
    ComboboxBuilder::new(doc)
        .id("fruit")
        .option("Apple", "a")
        .option("Banana", "b")
        .option("apple pie", "c")
        .config(config)
        .mount(doc.body())
        .expect("mount")
}

fn outside(doc: &Document) -> NodeId {
    let node = doc.create_element("div").unwrap();
    doc.append_child(doc.body(), node);
    node
}

fn highlighted_flags(cb: &Combobox) -> Vec<bool> {
    cb.options().iter().map(|o| o.is_highlighted()).collect()
}

fn assert_highlight_invariant(cb: &Combobox) {
    let options = cb.options();
    let highlighted: Vec<_> = options.iter().filter(|o| o.is_highlighted()).collect();
    assert!(highlighted.len() <= 1, "more than one option highlighted");
    if let Some(option) = highlighted.first() {
        assert!(option.is_visible(), "hidden option is highlighted");
        assert!(cb.is_open(), "highlight while closed");
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_starts_closed() {
    let doc = Document::new();
    let cb = fruit(&doc);
    assert_eq!(cb.state(), WidgetState::Closed);
    assert_eq!(cb.highlighted(), None);
    assert_eq!(cb.open_subscription_count(), 0);
    assert!(!doc.is_scroll_locked());
}

#[test]
fn test_open_close_symmetry() {
    let doc = Document::new();
    let cb = fruit(&doc);
    let baseline = doc.listener_count();

    for _ in 0..5 {
        cb.open();
        assert_eq!(cb.state(), WidgetState::Open);
        assert_eq!(cb.open_subscription_count(), 2);
        assert_eq!(doc.listener_count(), baseline + 2);

        // Opening twice attaches nothing new
        cb.open();
        assert_eq!(doc.listener_count(), baseline + 2);

        cb.close();
        assert_eq!(cb.state(), WidgetState::Closed);
        assert_eq!(cb.open_subscription_count(), 0);
        assert_eq!(doc.listener_count(), baseline);

        cb.close();
        assert_eq!(doc.listener_count(), baseline);
    }
}

#[test]
fn test_every_close_path_releases_listeners() {
    let doc = Document::new();
    let cb = fruit(&doc);
    let away = outside(&doc);
    let baseline = doc.listener_count();

    // Escape
    cb.open();
    cb.press_key(Key::Escape);
    assert!(!cb.is_open());
    assert_eq!(doc.listener_count(), baseline);

    // Dismissal
    cb.open();
    doc.dispatch(DocumentEvent::pointer_down(away));
    assert!(!cb.is_open());
    assert_eq!(doc.listener_count(), baseline);

    // Selection
    cb.open();
    cb.click_option(0);
    assert!(!cb.is_open());
    assert_eq!(doc.listener_count(), baseline);

    // Trigger
    cb.activate_trigger();
    assert!(cb.is_open());
    cb.activate_trigger();
    assert!(!cb.is_open());
    assert_eq!(doc.listener_count(), baseline);
}

#[test]
fn test_open_focuses_input_and_reflects_state() {
    let doc = Document::new();
    let cb = fruit(&doc);
    let parts = cb.parts();

    cb.open();
    assert_eq!(doc.active_element(), Some(parts.input));
    assert!(doc.has_attribute(parts.root, "open"));
    assert_eq!(doc.attribute(parts.trigger, "aria-expanded").as_deref(), Some("true"));

    cb.close();
    assert!(!doc.has_attribute(parts.root, "open"));
    assert_eq!(doc.attribute(parts.trigger, "aria-expanded").as_deref(), Some("false"));
}

#[test]
fn test_toggle() {
    let doc = Document::new();
    let cb = fruit(&doc);
    cb.toggle();
    assert!(cb.is_open());
    cb.toggle();
    assert!(!cb.is_open());
}

// ============================================================================
// Scroll lock
// ============================================================================

#[test]
fn test_scroll_locked_while_open() {
    let doc = Document::new();
    let cb = fruit(&doc);
    cb.open();
    assert!(doc.is_scroll_locked());
    cb.close();
    assert!(!doc.is_scroll_locked());
}

#[test]
fn test_scroll_lock_can_be_disabled() {
    let doc = Document::new();
    let cb = fruit_with(&doc, ComboboxConfig::new().without_scroll_lock());
    cb.open();
    assert!(!doc.is_scroll_locked());
}

#[test]
fn test_opening_second_widget_dismisses_first() {
    let doc = Document::new();
    let first = fruit(&doc);
    let second = ComboboxBuilder::new(&doc)
        .id("veg")
        .options(["Carrot", "Leek"])
        .mount(doc.body())
        .unwrap();

    first.open();
    second.open();

    // Focus moved into the second widget, which is outside the first
    assert!(!first.is_open());
    assert!(second.is_open());
    assert!(doc.is_scroll_locked());

    second.close();
    assert!(!doc.is_scroll_locked());
}

// ============================================================================
// Keyboard
// ============================================================================

#[test]
fn test_arrow_keys_move_highlight_and_prevent_default() {
    let doc = Document::new();
    let cb = fruit(&doc);
    cb.open();

    let event = cb.press_key(Key::Down);
    assert!(event.is_default_prevented());
    assert_eq!(cb.highlighted(), Some(0));

    cb.press_key(Key::Down);
    assert_eq!(cb.highlighted(), Some(1));

    let event = cb.press_key(Key::Up);
    assert!(event.is_default_prevented());
    assert_eq!(cb.highlighted(), Some(0));
}

#[test]
fn test_highlight_clamps_at_edges() {
    let doc = Document::new();
    let cb = fruit(&doc);
    cb.open();

    cb.highlight_option(0);
    cb.cycle_highlight(-1);
    assert_eq!(cb.highlighted(), Some(0));

    cb.highlight_option(2);
    cb.cycle_highlight(1);
    assert_eq!(cb.highlighted(), Some(2));
    assert_eq!(highlighted_flags(&cb), vec![false, false, true]);
}

#[test]
fn test_keys_ignored_while_closed() {
    let doc = Document::new();
    let cb = fruit(&doc);

    assert!(!cb.on_key(&KeyCombo::from(Key::Down)).is_handled());
    let event = cb.press_key(Key::Down);
    assert!(!event.is_default_prevented());
    assert_eq!(cb.highlighted(), None);
}

#[test]
fn test_modifiers_do_not_change_commands() {
    let doc = Document::new();
    let cb = fruit(&doc);
    cb.open();

    let event = cb.press_key(KeyCombo::new(Key::Down, Modifiers::ctrl()));
    assert!(event.is_default_prevented());
    assert_eq!(cb.highlighted(), Some(0));

    cb.press_key(KeyCombo::new(Key::Escape, Modifiers::ctrl()));
    assert!(!cb.is_open());
}

#[test]
fn test_text_keys_left_to_host() {
    let doc = Document::new();
    let cb = fruit(&doc);
    cb.open();

    let event = cb.press_key(Key::Char('a'));
    assert!(!event.is_default_prevented());
    assert!(!cb.on_key(&KeyCombo::from(Key::Backspace)).is_handled());
    assert!(cb.is_open());
}

#[test]
fn test_enter_without_highlight_is_noop() {
    let doc = Document::new();
    let cb = fruit(&doc);
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = Arc::clone(&count);
    cb.on_select(move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });

    cb.open();
    cb.press_key(Key::Enter);
    assert!(cb.is_open());
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_escape_closes_and_focuses_trigger_immediately() {
    let doc = Document::new();
    let cb = fruit(&doc);
    cb.open();
    cb.press_key(Key::Down);

    cb.press_key(Key::Escape);
    assert!(!cb.is_open());
    assert_eq!(cb.highlighted(), None);
    assert_eq!(doc.active_element(), Some(cb.parts().trigger));
    assert_eq!(doc.pending_frames(), 0);
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_select_emits_once_and_closes() {
    let doc = Document::new();
    let cb = fruit(&doc);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    cb.on_select(move |event| {
        seen_clone.lock().unwrap().push(event.value.clone());
    });

    cb.open();
    cb.highlight_option(1);
    let event = cb.select(1).expect("selection");

    assert_eq!(event.value, "b");
    assert_eq!(event.widget_id, "fruit");
    assert_eq!(*seen.lock().unwrap(), vec!["b".to_string()]);
    assert_eq!(cb.state(), WidgetState::Closed);
    assert_eq!(cb.highlighted(), None);
}

#[test]
fn test_enter_commits_highlighted() {
    let doc = Document::new();
    let cb = fruit(&doc);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    cb.on_select(move |event| {
        seen_clone.lock().unwrap().push(event.value.clone());
    });

    cb.open();
    cb.press_key(Key::Down);
    cb.press_key(Key::Down);
    cb.press_key(Key::Enter);

    assert_eq!(*seen.lock().unwrap(), vec!["b".to_string()]);
    assert!(!cb.is_open());
}

#[test]
fn test_click_option_commits() {
    let doc = Document::new();
    let cb = fruit(&doc);
    cb.open();

    let seen = Arc::new(Mutex::new(None));
    let seen_clone = Arc::clone(&seen);
    cb.on_select(move |event| {
        *seen_clone.lock().unwrap() = Some(event.value.clone());
    });

    cb.click_option(2);
    assert_eq!(seen.lock().unwrap().as_deref(), Some("c"));
    assert!(!cb.is_open());
}

#[test]
fn test_cancelled_selection_still_closes() {
    let doc = Document::new();
    let cb = fruit(&doc);
    cb.on_select(|event| event.prevent_default());

    cb.open();
    let event = cb.select(0).expect("selection");
    assert!(event.is_default_prevented());
    assert!(!cb.is_open());
}

#[test]
fn test_select_out_of_range_is_noop() {
    let doc = Document::new();
    let cb = fruit(&doc);
    cb.open();
    assert!(cb.select(42).is_none());
    assert!(cb.is_open());
}

#[test]
fn test_focus_returns_to_trigger_after_frame() {
    let doc = Document::new();
    let cb = fruit(&doc);
    cb.open();
    cb.press_key(Key::Down);
    cb.press_key(Key::Enter);

    // Not yet: the key that committed is still being processed
    assert_eq!(doc.active_element(), Some(cb.parts().input));
    assert_eq!(doc.pending_frames(), 1);

    assert_eq!(doc.run_frame(), 1);
    assert_eq!(doc.active_element(), Some(cb.parts().trigger));
    assert!(!cb.is_open());
}

#[test]
fn test_deferred_focus_skipped_after_destroy() {
    let doc = Document::new();
    let cb = fruit(&doc);
    cb.open();
    cb.select(0);
    cb.destroy();

    assert_eq!(doc.run_frame(), 1);
    assert_eq!(doc.active_element(), Some(cb.parts().input));
}

#[test]
fn test_deferred_focus_skipped_after_drop() {
    let doc = Document::new();
    let cb = fruit(&doc);
    let input = cb.parts().input;
    cb.open();
    cb.select(0);
    drop(cb);

    assert_eq!(doc.listener_count(), 0);
    assert_eq!(doc.run_frame(), 1);
    assert_eq!(doc.active_element(), Some(input));
}

#[test]
fn test_remember_selection_updates_preferred_value() {
    let doc = Document::new();
    let cb = fruit_with(&doc, ComboboxConfig::new().remember_selection());
    cb.open();
    cb.click_option(2);

    assert_eq!(cb.highlight_value().as_deref(), Some("c"));
    assert_eq!(doc.attribute(cb.parts().root, "highlight").as_deref(), Some("c"));

    cb.open();
    assert_eq!(cb.highlighted(), Some(2));
}

// ============================================================================
// Pointer
// ============================================================================

#[test]
fn test_hover_highlights() {
    let doc = Document::new();
    let cb = fruit(&doc);
    cb.open();
    cb.hover_option(2);
    assert_eq!(cb.highlighted(), Some(2));
    cb.hover_option(0);
    assert_eq!(highlighted_flags(&cb), vec![true, false, false]);
}

#[test]
fn test_hover_ignored_while_closed() {
    let doc = Document::new();
    let cb = fruit(&doc);
    cb.hover_option(1);
    assert_eq!(cb.highlighted(), None);
}

// ============================================================================
// Dismissal
// ============================================================================

#[test]
fn test_outside_pointer_down_closes() {
    let doc = Document::new();
    let cb = fruit(&doc);
    let away = outside(&doc);

    cb.open();
    doc.dispatch(DocumentEvent::pointer_down(cb.parts().menu));
    assert!(cb.is_open());

    doc.dispatch(DocumentEvent::pointer_down(away));
    assert!(!cb.is_open());
}

#[test]
fn test_outside_touch_and_focus_close() {
    let doc = Document::new();
    let cb = fruit(&doc);
    let away = outside(&doc);

    cb.open();
    doc.dispatch(DocumentEvent::touch_start(away));
    assert!(!cb.is_open());

    cb.open();
    doc.focus(cb.parts().trigger);
    assert!(cb.is_open());
    doc.focus(away);
    assert!(!cb.is_open());
}

// ============================================================================
// Filtering and highlight
// ============================================================================

#[test]
fn test_typing_filters_options() {
    let doc = Document::new();
    let cb = fruit(&doc);
    cb.open();
    cb.type_query("app");

    assert_eq!(cb.query(), "app");
    assert_eq!(cb.visible_indices(), vec![0, 2]);
    let hidden: Vec<bool> = cb
        .options()
        .iter()
        .map(|o| doc.has_attribute(o.node(), "hidden"))
        .collect();
    assert_eq!(hidden, vec![false, true, false]);
}

#[test]
fn test_refilter_clears_stale_highlight() {
    let doc = Document::new();
    let cb = fruit(&doc);
    cb.open();
    cb.hover_option(1);
    assert_eq!(cb.highlighted_value().as_deref(), Some("b"));

    cb.type_query("app");
    assert_eq!(cb.highlighted(), None);
    assert!(!doc.has_attribute(cb.parts().input, "aria-activedescendant"));
    assert!(!doc.has_attribute(cb.option(1).unwrap().node(), "highlight"));
}

#[test]
fn test_navigation_only_visits_visible() {
    let doc = Document::new();
    let cb = fruit(&doc);
    cb.open();
    cb.type_query("app");

    cb.press_key(Key::Down);
    assert_eq!(cb.highlighted(), Some(0));
    cb.press_key(Key::Down);
    assert_eq!(cb.highlighted(), Some(2));
    cb.press_key(Key::Down);
    assert_eq!(cb.highlighted(), Some(2));
}

#[test]
fn test_highlight_invariant_holds_through_interaction() {
    let doc = Document::new();
    let cb = fruit(&doc);
    let away = outside(&doc);

    cb.open();
    assert_highlight_invariant(&cb);
    for key in [Key::Down, Key::Down, Key::Down, Key::Down, Key::Up] {
        cb.press_key(key);
        assert_highlight_invariant(&cb);
    }
    for query in ["b", "", "pie", "zzz", "APPLE"] {
        cb.type_query(query);
        assert_highlight_invariant(&cb);
        cb.press_key(Key::Down);
        assert_highlight_invariant(&cb);
    }
    cb.hover_option(1);
    assert_highlight_invariant(&cb);
    doc.dispatch(DocumentEvent::pointer_down(away));
    assert_highlight_invariant(&cb);
    assert_eq!(highlighted_flags(&cb), vec![false, false, false]);
}

// ============================================================================
// Initial highlight and query policy
// ============================================================================

#[test]
fn test_initial_highlight_from_preferred_value() {
    let doc = Document::new();
    let cb = fruit_with(&doc, ComboboxConfig::new().highlight_value("b"));
    cb.open();

    assert_eq!(cb.highlighted(), Some(1));
    assert!(cb.option(1).unwrap().is_highlighted());
    assert_eq!(
        doc.attribute(cb.parts().input, "aria-activedescendant").as_deref(),
        Some("fruit-option-1")
    );
}

#[test]
fn test_initial_highlight_unknown_value() {
    let doc = Document::new();
    let cb = fruit_with(&doc, ComboboxConfig::new().highlight_value("zzz"));
    cb.open();
    assert_eq!(cb.highlighted(), None);
}

#[test]
fn test_query_persists_across_reopen() {
    let doc = Document::new();
    let cb = fruit_with(&doc, ComboboxConfig::new().highlight_value("b"));
    cb.open();
    cb.type_query("app");
    cb.close();
    cb.open();

    assert_eq!(cb.query(), "app");
    assert_eq!(cb.visible_indices(), vec![0, 2]);
    // The preferred option is filtered out, so nothing is highlighted
    assert_eq!(cb.highlighted(), None);
}

#[test]
fn test_query_reset_on_open() {
    let doc = Document::new();
    let config = ComboboxConfig::new()
        .highlight_value("b")
        .query_policy(QueryPolicy::ResetOnOpen);
    let cb = fruit_with(&doc, config);
    cb.open();
    cb.type_query("app");
    cb.close();
    cb.open();

    assert_eq!(cb.query(), "");
    assert_eq!(cb.visible_indices(), vec![0, 1, 2]);
    assert_eq!(cb.highlighted(), Some(1));
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn test_destroy_detaches_everything() {
    let doc = Document::new();
    let cb = fruit(&doc);
    cb.open();
    cb.destroy();

    assert!(!cb.is_alive());
    assert!(!cb.is_open());
    assert_eq!(doc.listener_count(), 0);
    assert!(!doc.is_scroll_locked());

    cb.open();
    assert!(!cb.is_open());
    cb.activate_trigger();
    assert!(!cb.is_open());
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_aria_wiring() {
    let doc = Document::new();
    let cb = fruit(&doc);
    let parts = cb.parts();

    assert_eq!(doc.element_by_id("fruit"), Some(parts.root));
    assert_eq!(doc.attribute(parts.trigger, "aria-haspopup").as_deref(), Some("menu"));
    assert_eq!(doc.attribute(parts.trigger, "aria-controls").as_deref(), Some("fruit-popover"));
    assert_eq!(doc.attribute(parts.popover, "id").as_deref(), Some("fruit-popover"));
    assert_eq!(doc.attribute(parts.input, "role").as_deref(), Some("combobox"));
    assert_eq!(doc.attribute(parts.input, "aria-autocomplete").as_deref(), Some("list"));
    assert_eq!(doc.attribute(parts.input, "aria-controls").as_deref(), Some("fruit-menu"));
    assert_eq!(doc.attribute(parts.menu, "role").as_deref(), Some("listbox"));
    assert_eq!(doc.parent(parts.root), Some(doc.body()));

    for (index, option) in cb.options().iter().enumerate() {
        assert_eq!(option.dom_id(), format!("fruit-option-{index}"));
        assert_eq!(doc.attribute(option.node(), "role").as_deref(), Some("option"));
        assert_eq!(doc.attribute(option.node(), "value").as_deref(), Some(option.value()));
        assert_eq!(doc.text_content(option.node()), option.label());
        assert!(doc.contains(parts.menu, option.node()));
    }
}

#[test]
fn test_generated_id() {
    let doc = Document::new();
    let cb = ComboboxBuilder::new(&doc)
        .options(["x"])
        .mount(doc.body())
        .unwrap();
    assert!(cb.id().starts_with("amalgo-"));
    assert_eq!(cb.options()[0].dom_id(), format!("{}-option-0", cb.id()));
}

#[test]
fn test_duplicate_id_rejected() {
    let doc = Document::new();
    let _first = fruit(&doc);
    let err = ComboboxBuilder::new(&doc)
        .id("fruit")
        .mount(doc.body())
        .unwrap_err();
    assert_eq!(err, BuildError::DuplicateId("fruit".into()));
}

#[test]
fn test_unknown_parent_rejected() {
    let doc = Document::new();
    let other = Document::new();
    let mut stray = other.body();
    for _ in 0..10 {
        stray = other.create_element("div").unwrap();
    }
    let err = ComboboxBuilder::new(&doc).mount(stray).unwrap_err();
    assert_eq!(err, BuildError::UnknownParent(stray));
}

#[test]
fn test_invalid_id_rejected() {
    let doc = Document::new();
    let err = ComboboxBuilder::new(&doc)
        .id("has space")
        .mount(doc.body())
        .unwrap_err();
    assert!(matches!(err, BuildError::InvalidId(_)));
}
