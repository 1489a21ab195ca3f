mod common;

use std::time::{Duration, Instant};

use common::path;
use json_blox::mutate::default_document;
use json_blox::session::NAVIGATION_PROMPT;
use json_blox::{Config, Direction, Press, Session};
use pretty_assertions::assert_eq;
use serde_json::json;

fn session_with(doc: serde_json::Value) -> Session {
    Session::with_document(Config::default(), doc)
}

#[test]
fn reset_requires_confirmation_inside_window() {
    let start = Instant::now();
    let mut session = session_with(json!({"a": 1}));

    assert_eq!(session.reset(start), Press::Armed);
    assert!(session.is_reset_armed(start + Duration::from_millis(500)));
    assert_eq!(session.document(), &json!({"a": 1}));

    // The first arm lapses; pressing again only re-arms.
    let late = start + Duration::from_secs(3);
    assert_eq!(session.reset(late), Press::Armed);
    assert_eq!(session.reset(late + Duration::from_millis(200)), Press::Confirmed);
    assert_eq!(session.document(), &default_document());
    assert!(!session.is_unsaved());
}

#[test]
fn reset_turns_expand_all_off_and_collapses() {
    let start = Instant::now();
    let mut session = session_with(json!({"a": {"b": [1, 2]}}));
    session.set_expand_all(true);
    assert_eq!(session.rows().len(), 5);

    session.reset(start);
    assert_eq!(session.reset(start + Duration::from_millis(100)), Press::Confirmed);
    assert!(!session.is_expand_all());
    let top_level = default_document().as_object().map_or(0, |map| map.len());
    assert_eq!(session.rows().len(), 1 + top_level);
    assert!(session.collapse_state().is_collapsed(&path("root.features")));
    let rows = session.rows();
    let mut containers = rows.iter().skip(1).filter(|row| row.kind().is_container());
    assert!(containers.all(|row| !row.is_expanded()));
}

#[test]
fn unfreeze_needs_a_second_press() {
    let start = Instant::now();
    let mut session = session_with(json!({"n": 1}));
    session.edit_node(&path("root.n"), "n", "2").unwrap();

    assert_eq!(session.toggle_freeze(start), Press::Armed);
    assert!(session.is_frozen());
    assert!(!session.diff_pair().is_identical());

    // A lapsed arm does not count.
    let late = start + Duration::from_secs(3);
    assert_eq!(session.toggle_freeze(late), Press::Armed);
    assert!(session.is_frozen());
    assert_eq!(session.toggle_freeze(late + Duration::from_millis(50)), Press::Confirmed);
    assert!(!session.is_frozen());
    assert!(session.diff_pair().is_identical());

    // Freezing again takes one press and snapshots the live document.
    assert_eq!(session.toggle_freeze(late), Press::Confirmed);
    assert_eq!(session.frozen(), Some(&json!({"n": 2})));
}

#[test]
fn clear_leaves_empty_object_and_marks_unsaved() {
    let start = Instant::now();
    let mut session = session_with(json!({"a": [1, 2]}));
    session.clear(start);
    assert_eq!(session.clear(start + Duration::from_millis(10)), Press::Confirmed);
    assert_eq!(session.document(), &json!({}));
    assert_eq!(session.rows().len(), 1);
    assert_eq!(session.navigation_guard(), Some(NAVIGATION_PROMPT));
}

#[test]
fn confirm_window_comes_from_config() {
    let start = Instant::now();
    let mut config = Config::default();
    config.confirm.window_ms = 100;
    let mut session = Session::with_document(config, json!({"a": 1}));
    session.clear(start);
    assert_eq!(session.clear(start + Duration::from_millis(150)), Press::Armed);
}

#[test]
fn editor_parse_error_keeps_last_valid_document() {
    let mut session = session_with(json!({"keep": true}));
    let err = session.apply_editor_text("{\"keep\": fals").unwrap_err();
    assert_eq!(err.line, 1);
    assert!(err.to_string().starts_with("JSON Error: "));
    assert_eq!(session.document(), &json!({"keep": true}));
    assert!(!session.is_unsaved());

    session.apply_editor_text("{\"z\": 1, \"a\": {\"b\": 2}}").unwrap();
    assert_eq!(session.document().to_string(), r#"{"z":1,"a":{"b":2}}"#);
    assert!(session.collapse_state().is_collapsed(&path("root.a")));
    assert!(session.is_unsaved());
}

#[test]
fn editor_key_reorder_is_applied() {
    let mut session = session_with(json!({"a": 1, "b": 2}));
    session.apply_editor_text("{\"b\": 2, \"a\": 1}").unwrap();
    assert_eq!(session.document().to_string(), r#"{"b":2,"a":1}"#);
}

#[test]
fn search_cycles_through_three_matches() {
    let doc = json!({"x1": "hit", "y": 0, "x2": "HIT", "z": {"deep": "hit"}});
    let mut session = session_with(doc);
    session.set_expand_all(true);
    session.set_search_text("hit");
    assert_eq!(session.search().matches().len(), 3);
    assert_eq!(session.search().current_index(), 0);

    session.next_match();
    session.next_match();
    assert_eq!(session.search().current_match(), Some(&path("root.z.deep")));
    session.next_match().unwrap();
    assert_eq!(session.search().current_index(), 0);
    session.previous_match().unwrap();
    assert_eq!(session.search().current_index(), 2);
}

#[test]
fn committed_keywords_survive_edits() {
    let mut session = session_with(json!({"alpha": 1, "beta": 2}));
    session.set_search_text("alp");
    assert!(session.commit_search_text());
    assert_eq!(session.search().keywords(), &["alp".to_string()]);
    assert_eq!(session.search().matches().len(), 1);

    session.edit_node(&path("root.beta"), "alphabet", "2").unwrap();
    assert_eq!(session.search().matches().len(), 2);

    session.remove_keyword("alp");
    assert!(session.search().matches().is_empty());
    assert_eq!(session.next_match(), None);
}

#[test]
fn matches_inside_collapsed_nodes_are_not_listed() {
    let mut session = session_with(json!({"outer": {"needle": 1}}));
    session.set_search_text("needle");
    assert!(session.search().matches().is_empty());
    session.toggle_expand(&path("root.outer"));
    assert_eq!(session.search().matches(), &[path("root.outer.needle")]);
}

#[test]
fn array_move_keeps_collapse_with_the_element() {
    let mut session = session_with(json!({"list": [{"a": 1}, {"b": 2}]}));
    session.toggle_expand(&path("root.list"));
    session.toggle_expand(&path("root.list.0"));
    assert!(session.move_node(&path("root.list.0"), Direction::Down));
    assert_eq!(session.document(), &json!({"list": [{"b": 2}, {"a": 1}]}));
    assert!(session.collapse_state().is_expanded(&path("root.list.1")));
    assert!(session.collapse_state().is_collapsed(&path("root.list.0")));
}
