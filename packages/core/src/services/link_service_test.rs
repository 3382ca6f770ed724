//! Tests for bidirectional link creation, validation order and deletion.

#[cfg(test)]
mod tests {
    use crate::db::{GraphRepository, MemoryStorage, PathResolver};
    use crate::models::{CreateLinkRequest, Node};
    use crate::services::{GraphError, GraphErrorKind, LinkService, TypeService};
    use std::sync::Arc;

    /// Helper to create a link service with the default catalogue
    async fn create_test_service() -> (LinkService, Arc<GraphRepository>) {
        let repository = Arc::new(GraphRepository::new(
            Arc::new(MemoryStorage::new()),
            PathResolver::default(),
        ));
        let types = TypeService::new(repository.clone());
        types.initialize_default_types().await.unwrap();
        (LinkService::new(repository.clone(), types), repository)
    }

    async fn save_node(repo: &GraphRepository, node_type: &str, index: u32) -> Node {
        let node = Node::new(node_type, index, format!("{} {}", node_type, index), "backlog");
        repo.node_save(&node).await.unwrap();
        node
    }

    async fn reload(repo: &GraphRepository, node: &Node) -> Node {
        repo.node_load(&node.node_type, &node.label)
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_link_writes_both_halves() {
        let (links, repo) = create_test_service().await;
        let bug = save_node(&repo, "bug", 1).await;
        let task = save_node(&repo, "task", 1).await;

        let created = links
            .create_link("bug", "Bug-1", &CreateLinkRequest::new("blocks", "Task-1"))
            .await
            .unwrap();
        assert_eq!(created.source_link.verb, "blocks");
        assert_eq!(created.target_link.verb, "blocked-by");
        assert_eq!(created.source_link.created_at, created.target_link.created_at);
        assert_eq!(
            created.source_link.link_type_id,
            created.target_link.link_type_id
        );

        let bug = reload(&repo, &bug).await;
        let task = reload(&repo, &task).await;
        assert_eq!(bug.links, vec![created.source_link]);
        assert_eq!(task.links, vec![created.target_link]);
        assert_eq!(bug.links[0].target_id, task.node_id);
        assert_eq!(task.links[0].target_id, bug.node_id);
        assert_eq!(task.links[0].target_label, "Bug-1");
    }

    #[tokio::test]
    async fn test_symmetric_verb_uses_same_verb_both_ways() {
        let (links, repo) = create_test_service().await;
        save_node(&repo, "bug", 1).await;
        let feature = save_node(&repo, "feature", 1).await;

        links
            .create_link("bug", "Bug-1", &CreateLinkRequest::new("relates-to", "Feature-1"))
            .await
            .unwrap();

        let feature = reload(&repo, &feature).await;
        assert_eq!(feature.links[0].verb, "relates-to");
    }

    #[tokio::test]
    async fn test_failure_kinds_in_validation_order() {
        let (links, repo) = create_test_service().await;
        save_node(&repo, "bug", 1).await;
        save_node(&repo, "person", 1).await;

        let cases = [
            ("Bug-9", "blocks", "Person-1", GraphErrorKind::SourceNotFound),
            ("Bug-1", "blocks", "Person1", GraphErrorKind::InvalidTargetLabel),
            ("Bug-1", "blocks", "Task-7", GraphErrorKind::TargetNotFound),
            ("Bug-1", "haunts", "Person-1", GraphErrorKind::UnknownVerb),
            ("Bug-1", "blocks", "Person-1", GraphErrorKind::TypeMismatch),
        ];
        for (source, verb, target, expected) in cases {
            let err = links
                .create_link("bug", source, &CreateLinkRequest::new(verb, target))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), expected, "{} {} {}", source, verb, target);
        }
    }

    #[tokio::test]
    async fn test_type_mismatch_on_source_side() {
        let (links, repo) = create_test_service().await;
        save_node(&repo, "person", 1).await;
        save_node(&repo, "task", 1).await;

        // person is a valid target of assigned-to but never a source
        let err = links
            .create_link("person", "Person-1", &CreateLinkRequest::new("assigned-to", "Task-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::TypeMismatch { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_link_is_rejected() {
        let (links, repo) = create_test_service().await;
        let bug = save_node(&repo, "bug", 1).await;
        let task = save_node(&repo, "task", 1).await;
        let request = CreateLinkRequest::new("blocks", "Task-1");

        links.create_link("bug", "Bug-1", &request).await.unwrap();
        let err = links.create_link("bug", "Bug-1", &request).await.unwrap_err();
        assert_eq!(err.kind(), GraphErrorKind::DuplicateLink);

        assert_eq!(reload(&repo, &bug).await.links.len(), 1);
        assert_eq!(reload(&repo, &task).await.links.len(), 1);
    }

    #[tokio::test]
    async fn test_same_pair_different_verbs_allowed() {
        let (links, repo) = create_test_service().await;
        let task = save_node(&repo, "task", 1).await;
        save_node(&repo, "feature", 1).await;

        links
            .create_link("task", "Task-1", &CreateLinkRequest::new("blocks", "Feature-1"))
            .await
            .unwrap();
        links
            .create_link("task", "Task-1", &CreateLinkRequest::new("depends-on", "Feature-1"))
            .await
            .unwrap();

        assert_eq!(reload(&repo, &task).await.links.len(), 2);
    }

    #[tokio::test]
    async fn test_self_link_is_rejected() {
        let (links, repo) = create_test_service().await;
        save_node(&repo, "task", 1).await;

        let err = links
            .create_link("task", "Task-1", &CreateLinkRequest::new("depends-on", "Task-1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), GraphErrorKind::Validation);

        // Verb and type checks come first
        let err = links
            .create_link("task", "Task-1", &CreateLinkRequest::new("haunts", "Task-1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), GraphErrorKind::UnknownVerb);

        let err = links
            .create_link("task", "Task-1", &CreateLinkRequest::new("assigned-to", "Task-1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), GraphErrorKind::TypeMismatch);
    }

    #[tokio::test]
    async fn test_malformed_references_are_rejected_before_storage() {
        let (links, repo) = create_test_service().await;
        save_node(&repo, "bug", 1).await;

        let err = links
            .create_link("bug", "Bug-1/../x", &CreateLinkRequest::new("blocks", "Task-1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), GraphErrorKind::Validation);

        let err = links
            .create_link("bug", "Bug-1", &CreateLinkRequest::new("blocks", "Task-1/../../x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), GraphErrorKind::InvalidTargetLabel);

        let err = links.delete_link("../bug", "Bug-1", "Task-1").await.unwrap_err();
        assert_eq!(err.kind(), GraphErrorKind::Validation);

        let err = links.list_links("bug", "bug-1").await.unwrap_err();
        assert_eq!(err.kind(), GraphErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_delete_link_removes_both_halves() {
        let (links, repo) = create_test_service().await;
        let bug = save_node(&repo, "bug", 1).await;
        let task = save_node(&repo, "task", 1).await;
        links
            .create_link("bug", "Bug-1", &CreateLinkRequest::new("blocks", "Task-1"))
            .await
            .unwrap();

        let deleted = links.delete_link("bug", "Bug-1", "Task-1").await.unwrap();
        assert!(deleted.inverse_removed);
        assert!(reload(&repo, &bug).await.links.is_empty());
        assert!(reload(&repo, &task).await.links.is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_link() {
        let (links, repo) = create_test_service().await;
        save_node(&repo, "bug", 1).await;

        let err = links.delete_link("bug", "Bug-1", "Task-1").await.unwrap_err();
        assert_eq!(err.kind(), GraphErrorKind::LinkNotFound);
    }

    #[tokio::test]
    async fn test_delete_with_missing_target_removes_source_half() {
        let (links, repo) = create_test_service().await;
        let bug = save_node(&repo, "bug", 1).await;
        let task = save_node(&repo, "task", 1).await;
        links
            .create_link("bug", "Bug-1", &CreateLinkRequest::new("blocks", "Task-1"))
            .await
            .unwrap();
        repo.node_delete(&task.node_type, &task.label).await.unwrap();

        let deleted = links.delete_link("bug", "Bug-1", "Task-1").await.unwrap();
        assert!(!deleted.inverse_removed);
        assert!(reload(&repo, &bug).await.links.is_empty());
    }

    #[tokio::test]
    async fn test_list_links() {
        let (links, repo) = create_test_service().await;
        save_node(&repo, "feature", 1).await;
        save_node(&repo, "task", 1).await;
        links
            .create_link("feature", "Feature-1", &CreateLinkRequest::new("has-task", "Task-1"))
            .await
            .unwrap();

        let listed = links.list_links("task", "Task-1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].verb, "task-of");

        let err = links.list_links("task", "Task-2").await.unwrap_err();
        assert_eq!(err.kind(), GraphErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_detach_node_cleans_peers() {
        let (links, repo) = create_test_service().await;
        let bug = save_node(&repo, "bug", 1).await;
        let task = save_node(&repo, "task", 1).await;
        let feature = save_node(&repo, "feature", 1).await;
        links
            .create_link("task", "Task-1", &CreateLinkRequest::new("blocks", "Feature-1"))
            .await
            .unwrap();
        links
            .create_link("bug", "Bug-1", &CreateLinkRequest::new("blocks", "Task-1"))
            .await
            .unwrap();

        let task = reload(&repo, &task).await;
        assert_eq!(links.detach_node(&task).await, 2);
        assert!(reload(&repo, &bug).await.links.is_empty());
        assert!(reload(&repo, &feature).await.links.is_empty());
    }
}
