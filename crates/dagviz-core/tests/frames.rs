//! Integration tests for `dagviz-core`: raw WebSocket frames in, graph
//! state and render commands out.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::missing_panics_doc,
    clippy::arithmetic_side_effects
)]

use dagviz_core::{DagvizConfig, OperatorCommand, TangleState};
use dagviz_graph::RenderCommand;
use dagviz_types::VertexId;
use serde_json::json;

// =============================================================================
// Helpers
// =============================================================================

fn state_with(yaml: &str) -> TangleState {
    let config = DagvizConfig::parse_yaml(yaml).expect("valid config");
    TangleState::from_config(&config).expect("style tables load")
}

fn vertex_frame(id: &str, strong: &[&str], weak: &[&str]) -> String {
    json!({
        "type": 0,
        "data": {
            "ID": id,
            "strongParentIDs": strong,
            "weakParentIDs": weak,
            "likedParentIDs": [],
            "branchID": "master",
            "isMarker": false,
            "isTx": false,
            "isConfirmed": false,
            "gof": "GoF(None)",
            "confirmedTime": 0
        }
    })
    .to_string()
}

fn feed(state: &mut TangleState, frames: &[String]) {
    for frame in frames {
        state.handle_frame(frame).expect("frame decodes");
    }
}

fn id(raw: &str) -> VertexId {
    VertexId::from(raw)
}

fn op(state: &mut TangleState, line: &str) {
    let command: OperatorCommand = line.parse().expect("operator line parses");
    state.execute(command);
}

// =============================================================================
// Retention
// =============================================================================

#[test]
fn stream_keeps_newest_vertices() {
    let mut state = state_with("graph:\n  max_vertices: 3\n");
    let frames: Vec<String> = (0..10)
        .map(|i| {
            let me = format!("v{i}");
            let parent = if i == 0 { Vec::new() } else { vec![format!("v{}", i - 1)] };
            let parents: Vec<&str> = parent.iter().map(String::as_str).collect();
            vertex_frame(&me, &parents, &[])
        })
        .collect();
    feed(&mut state, &frames);

    let kept: Vec<&str> = state.store().ids_in_order().map(VertexId::as_str).collect();
    assert_eq!(kept, ["v7", "v8", "v9"]);
    assert_eq!(state.graph().node_count(), 3);
    assert_eq!(state.graph().link_count(), 2);
}

#[test]
fn runtime_limit_change_applies_to_later_arrivals() {
    let mut state = state_with("");
    let frames: Vec<String> = (0..5).map(|i| vertex_frame(&format!("v{i}"), &[], &[])).collect();
    feed(&mut state, &frames);
    op(&mut state, "limit 2");
    assert_eq!(state.store().len(), 5);

    // Each arrival evicts only the single oldest vertex.
    feed(&mut state, &[vertex_frame("late", &[], &[])]);
    assert_eq!(state.store().len(), 5);
    let kept: Vec<&str> = state.store().ids_in_order().map(VertexId::as_str).collect();
    assert_eq!(kept, ["v1", "v2", "v3", "v4", "late"]);
    assert!(!state.graph().has_node(&id("v0")));
}

// =============================================================================
// Markers
// =============================================================================

#[test]
fn marker_lifecycle_over_the_wire() {
    let mut state = state_with("graph:\n  max_vertices: 2\n");
    feed(
        &mut state,
        &[
            vertex_frame("mk", &[], &[]),
            json!({"type": 1, "data": {"ID": "mk", "isMarker": true, "branchID": "b"}}).to_string(),
            vertex_frame("a", &["mk"], &[]),
            json!({"type": 3, "data": {"ID": "a", "futureMarkerID": "mk"}}).to_string(),
        ],
    );
    assert_eq!(state.graph().past_cone(&id("mk")), Some([id("a")].as_slice()));
    assert_eq!(
        state.store().get(&id("a")).map(|v| v.future_markers.clone()),
        Some(vec![id("mk")])
    );

    // Third arrival evicts the marker and its index entry.
    feed(&mut state, &[vertex_frame("b", &["a"], &[])]);
    assert!(state.graph().past_cone(&id("mk")).is_none());
    assert_eq!(state.stats().markers, 0);
}

#[test]
fn unknown_ids_are_silent() {
    let mut state = state_with("");
    feed(&mut state, &[vertex_frame("a", &[], &[])]);
    state.take_render_commands();

    let booked = json!({"type": 1, "data": {"ID": "ghost", "isMarker": true}}).to_string();
    let confirmed =
        json!({"type": 2, "data": {"ID": "ghost", "gof": "GoF(High)", "confirmedTime": 5}})
            .to_string();
    assert!(!state.handle_frame(&booked).unwrap());
    assert!(!state.handle_frame(&confirmed).unwrap());
    assert!(state.take_render_commands().is_empty());
    assert_eq!(state.store().len(), 1);
}

#[test]
fn null_parent_lists_still_store_the_vertex() {
    let mut state = state_with("");
    feed(&mut state, &[vertex_frame("p", &[], &[])]);
    let frame = json!({
        "type": 0,
        "data": {"ID": "a", "strongParentIDs": ["p"], "weakParentIDs": null, "likedParentIDs": null}
    })
    .to_string();
    assert!(state.handle_frame(&frame).unwrap());
    assert!(state.store().contains(&id("a")));
    assert!(state.graph().has_link_from(&id("p"), &id("a")));
}

#[test]
fn other_dag_views_are_skipped() {
    let mut state = state_with("");
    let utxo = json!({"type": 5, "data": {"ID": "tx"}}).to_string();
    assert!(!state.handle_frame(&utxo).unwrap());
    assert!(state.handle_frame("{not json").is_err());
    assert_eq!(state.stats().events, 0);
}

// =============================================================================
// Drawing
// =============================================================================

#[test]
fn live_draw_off_then_replay() {
    let mut state = state_with("graph:\n  live_draw: false\n");
    feed(
        &mut state,
        &[
            vertex_frame("a", &[], &[]),
            vertex_frame("b", &["a"], &[]),
            vertex_frame("c", &["b"], &["a"]),
        ],
    );
    assert_eq!(state.graph().node_count(), 0);
    assert_eq!(state.store().len(), 3);

    op(&mut state, "replay");
    assert_eq!(state.graph().node_count(), 3);
    assert_eq!(state.graph().link_count(), 3);

    op(&mut state, "draw on");
    feed(&mut state, &[vertex_frame("d", &["c"], &[])]);
    assert_eq!(state.graph().node_count(), 4);
}

#[test]
fn late_parent_gap_and_backlog() {
    let frames = [vertex_frame("child", &["parent"], &[]), vertex_frame("parent", &[], &[])];

    let mut plain = state_with("");
    feed(&mut plain, &frames);
    assert_eq!(plain.graph().link_count(), 0);

    let mut backlog = state_with("graph:\n  resolve_late_parents: true\n");
    feed(&mut backlog, &frames);
    assert_eq!(backlog.graph().link_count(), 1);
    assert!(backlog.graph().has_link_from(&id("parent"), &id("child")));
}

#[test]
fn clear_graph_keeps_store() {
    let mut state = state_with("");
    feed(&mut state, &[vertex_frame("a", &[], &[]), vertex_frame("b", &["a"], &[])]);
    op(&mut state, "select b");
    op(&mut state, "clear");
    assert_eq!(state.graph().node_count(), 0);
    assert_eq!(state.store().len(), 2);
    assert!(state.selection().selected().is_none());
    assert!(state.take_render_commands().contains(&RenderCommand::Clear));
}

#[test]
fn reset_forgets_everything_but_settings() {
    let mut state = state_with("graph:\n  max_vertices: 10\n");
    feed(&mut state, &[vertex_frame("a", &[], &[])]);
    op(&mut state, "limit 4");
    op(&mut state, "select a");
    state.reset();
    let stats = state.stats();
    assert_eq!(stats.vertices, 0);
    assert_eq!(stats.nodes, 0);
    assert_eq!(stats.limit, 4);
    assert_eq!(stats.selected, None);
    assert_eq!(state.take_render_commands(), [RenderCommand::Clear]);
}

// =============================================================================
// Selection
// =============================================================================

#[test]
fn click_and_search_selection() {
    let mut state = state_with("");
    feed(
        &mut state,
        &[
            vertex_frame("a", &[], &[]),
            vertex_frame("b", &["a"], &[]),
            vertex_frame("c", &["b"], &[]),
        ],
    );

    op(&mut state, "select b");
    let stats = state.stats();
    assert_eq!(stats.selected, Some(id("b")));
    assert_eq!((stats.ancestors, stats.descendants), (2, 2));

    op(&mut state, "unselect");
    assert_eq!(state.stats().selected, Some(id("b")));
    op(&mut state, "unselect force");
    assert_eq!(state.stats().selected, None);

    op(&mut state, "search c");
    assert_eq!(state.stats().selected, Some(id("c")));
    assert_eq!(state.stats().ancestors, 3);
    op(&mut state, "unselect");
    assert_eq!(state.stats().selected, None);

    op(&mut state, "search zzz");
    assert_eq!(state.stats().selected, None);
}

#[test]
fn evicted_selection_resets_links_on_clear() {
    let mut state = state_with("graph:\n  max_vertices: 3\n");
    feed(
        &mut state,
        &[
            vertex_frame("a", &[], &[]),
            vertex_frame("b", &["a"], &[]),
            vertex_frame("c", &["b"], &[]),
        ],
    );
    op(&mut state, "select a");
    feed(&mut state, &[vertex_frame("d", &["c"], &[])]);
    assert!(!state.graph().has_node(&id("a")));

    op(&mut state, "unselect force");
    let palette = *state.graph().palette();
    for link in state.graph().links() {
        assert_eq!(link.ui.color, palette.strong_link);
    }
}

// =============================================================================
// Render output
// =============================================================================

#[test]
fn render_commands_serialize_as_json_lines() {
    let mut state = state_with("");
    feed(&mut state, &[vertex_frame("a", &[], &[]), vertex_frame("b", &["a"], &[])]);
    let lines: Vec<String> = state
        .take_render_commands()
        .iter()
        .map(|c| serde_json::to_string(c).unwrap())
        .collect();
    assert!(lines[0].contains(r#""command":"add_node""#));
    assert!(
        lines
            .iter()
            .any(|l| l.contains(r#""command":"add_link""#) && l.contains(r#""kind":"Strong""#))
    );
}
