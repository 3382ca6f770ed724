//! Integration tests for end-to-end graph scenarios through `GraphEngine`
//!
//! Tests cover:
//! - Custom type registration and paired link halves
//! - Sequential label minting
//! - Link validation failures
//! - Index consistency after mixed creates and deletes
//! - Cascade cleanup on node deletion

use issuegraph_core::{
    CreateLinkRequest, CreateNodeRequest, GraphEngine, GraphErrorKind, NewLinkType, NewNodeType,
    Storage,
};

/// Test helper: engine with only `bug`, `task` and `blocks` registered
async fn create_bug_task_engine() -> GraphEngine {
    let engine = GraphEngine::in_memory();
    assert!(
        engine
            .create_node_type(
                NewNodeType::new("bug", "Bug").with_statuses(&["open", "fixed"], "open")
            )
            .await
            .success
    );
    assert!(
        engine
            .create_node_type(
                NewNodeType::new("task", "Task").with_statuses(&["todo", "done"], "todo")
            )
            .await
            .success
    );
    assert!(
        engine
            .create_link_type(
                NewLinkType::new("blocks", "blocked-by").between(&["bug"], &["task"])
            )
            .await
            .success
    );
    engine
}

#[tokio::test]
async fn test_bug_blocks_task_round_trip() {
    let engine = create_bug_task_engine().await;
    let bug = engine
        .create_node(CreateNodeRequest::new("bug", "Crash on save"))
        .await
        .data
        .unwrap();
    let task = engine
        .create_node(CreateNodeRequest::new("task", "Fix save path"))
        .await
        .data
        .unwrap();
    assert_eq!(bug.label, "Bug-1");
    assert_eq!(task.label, "Task-1");

    let created = engine
        .create_link("bug", "Bug-1", CreateLinkRequest::new("blocks", "Task-1"))
        .await;
    assert!(created.success);

    let bug_links = engine.list_links("bug", "Bug-1").await.data.unwrap();
    assert_eq!(bug_links.len(), 1);
    assert_eq!(bug_links[0].verb, "blocks");
    assert_eq!(bug_links[0].target_label, "Task-1");
    assert_eq!(bug_links[0].target_id, task.node_id);

    let task_links = engine.list_links("task", "Task-1").await.data.unwrap();
    assert_eq!(task_links.len(), 1);
    assert_eq!(task_links[0].verb, "blocked-by");
    assert_eq!(task_links[0].target_label, "Bug-1");
    assert_eq!(task_links[0].target_id, bug.node_id);
    assert_eq!(task_links[0].created_at, bug_links[0].created_at);
    assert_eq!(task_links[0].link_type_id, bug_links[0].link_type_id);

    let deleted = engine.delete_link("bug", "Bug-1", "Task-1").await;
    assert!(deleted.data.unwrap().inverse_removed);
    assert!(engine.list_links("bug", "Bug-1").await.data.unwrap().is_empty());
    assert!(engine.list_links("task", "Task-1").await.data.unwrap().is_empty());
}

#[tokio::test]
async fn test_labels_follow_creation_order() {
    let engine = create_bug_task_engine().await;
    let mut labels = Vec::new();
    for title in ["Zebra", "Aardvark", "Middle"] {
        let node = engine
            .create_node(CreateNodeRequest::new("task", title))
            .await
            .data
            .unwrap();
        labels.push(node.label);
    }
    assert_eq!(labels, vec!["Task-1", "Task-2", "Task-3"]);
}

#[tokio::test]
async fn test_link_rejections() {
    let engine = create_bug_task_engine().await;
    engine.create_node(CreateNodeRequest::new("bug", "One")).await;
    engine.create_node(CreateNodeRequest::new("bug", "Two")).await;
    engine.create_node(CreateNodeRequest::new("task", "Work")).await;

    let wrong_direction = engine
        .create_link("task", "Task-1", CreateLinkRequest::new("blocks", "Bug-1"))
        .await;
    assert_eq!(wrong_direction.error, Some(GraphErrorKind::TypeMismatch));

    let wrong_target = engine
        .create_link("bug", "Bug-1", CreateLinkRequest::new("blocks", "Bug-2"))
        .await;
    assert_eq!(wrong_target.error, Some(GraphErrorKind::TypeMismatch));

    let missing_source = engine
        .create_link("bug", "Bug-7", CreateLinkRequest::new("blocks", "Task-1"))
        .await;
    assert_eq!(missing_source.error, Some(GraphErrorKind::SourceNotFound));

    let bad_label = engine
        .create_link("bug", "Bug-1", CreateLinkRequest::new("blocks", "task1"))
        .await;
    assert_eq!(bad_label.error, Some(GraphErrorKind::InvalidTargetLabel));

    let missing_target = engine
        .create_link("bug", "Bug-1", CreateLinkRequest::new("blocks", "Task-9"))
        .await;
    assert_eq!(missing_target.error, Some(GraphErrorKind::TargetNotFound));

    assert!(
        engine
            .create_link("bug", "Bug-1", CreateLinkRequest::new("blocks", "Task-1"))
            .await
            .success
    );
    let duplicate = engine
        .create_link("bug", "Bug-1", CreateLinkRequest::new("blocks", "Task-1"))
        .await;
    assert_eq!(duplicate.error, Some(GraphErrorKind::DuplicateLink));

    let task_links = engine.list_links("task", "Task-1").await.data.unwrap();
    assert_eq!(task_links.len(), 1);
}

#[tokio::test]
async fn test_global_index_matches_type_counts() {
    let engine = GraphEngine::in_memory();
    engine.initialize_default_types().await;

    for (node_type, title) in [
        ("bug", "a"),
        ("bug", "b"),
        ("task", "c"),
        ("task", "d"),
        ("feature", "e"),
        ("person", "f"),
    ] {
        assert!(
            engine
                .create_node(CreateNodeRequest::new(node_type, title))
                .await
                .success
        );
    }
    engine.delete_node("task", "Task-2").await;
    engine.delete_node("bug", "Bug-1").await;

    let global = engine.global_index().await.data.unwrap();
    let sum: u64 = global
        .type_counts
        .iter()
        .map(|tc| u64::from(tc.count))
        .sum();
    assert_eq!(global.total_nodes, 4);
    assert_eq!(global.total_nodes, sum);
    assert!(global.last_updated.is_some());

    let listed = engine.list_nodes(None).await.data.unwrap();
    assert_eq!(listed.len(), 4);
}

#[tokio::test]
async fn test_node_delete_cleans_symmetric_links() {
    let engine = GraphEngine::in_memory();
    engine.initialize_default_types().await;
    engine.create_node(CreateNodeRequest::new("bug", "Crash")).await;
    engine.create_node(CreateNodeRequest::new("task", "Fix")).await;

    let created = engine
        .create_link("bug", "Bug-1", CreateLinkRequest::new("relates-to", "Task-1"))
        .await
        .data
        .unwrap();
    assert_eq!(created.source_link.verb, "relates-to");
    assert_eq!(created.target_link.verb, "relates-to");

    let deleted = engine.delete_node("bug", "Bug-1").await.data.unwrap();
    assert_eq!(deleted.peers_cleaned, 1);
    assert!(engine.list_links("task", "Task-1").await.data.unwrap().is_empty());

    let next = engine
        .create_node(CreateNodeRequest::new("bug", "Another"))
        .await
        .data
        .unwrap();
    assert_eq!(next.label, "Bug-2");
}

#[tokio::test]
async fn test_reconcile_repairs_drifted_count() {
    let engine = create_bug_task_engine().await;
    for title in ["one", "two", "three"] {
        engine.create_node(CreateNodeRequest::new("task", title)).await;
    }

    // Remove a node document behind the engine's back
    let paths = engine.repository().paths().clone();
    engine
        .repository()
        .storage()
        .delete(&paths.node("task", "Task-2"))
        .await
        .unwrap();

    let repaired = engine.reconcile_type_index("task").await.data.unwrap();
    assert_eq!(repaired.count, 2);
    assert_eq!(repaired.next_index, 4);

    let global = engine.global_index().await.data.unwrap();
    assert_eq!(global.count_for("task"), Some(2));
}
