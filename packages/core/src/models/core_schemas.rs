//! Default Type Catalogue
//!
//! The node and link types every fresh tracker starts with.
//!
//! ## Node Types
//!
//! - **bug** - Defect or error in the system
//! - **task** - Unit of work to be completed
//! - **feature** - High-level capability
//! - **person** - Human or agent identity
//!
//! ## Link Types
//!
//! - **blocks** / blocked-by - bug, task → task, feature
//! - **has-task** / task-of - feature → task
//! - **assigned-to** / assignee-of - bug, task, feature → person
//! - **depends-on** / dependency-of - task, feature → task, feature
//! - **relates-to** - symmetric between bug, task, feature
//!
//! ## Usage
//!
//! `TypeService::initialize_default_types()` registers every entry whose name
//! is not already taken.

use crate::models::schema::{NewLinkType, NewNodeType};

/// Default node type definitions, in catalogue order
pub fn default_node_types() -> Vec<NewNodeType> {
    vec![
        NewNodeType::new("bug", "Bug")
            .with_description("Defect or error in the system")
            .with_color("#ef4444")
            .with_statuses(
                &[
                    "backlog",
                    "confirmed",
                    "in-progress",
                    "testing",
                    "resolved",
                    "closed",
                ],
                "backlog",
            ),
        NewNodeType::new("task", "Task")
            .with_description("Unit of work to be completed")
            .with_color("#3b82f6")
            .with_statuses(
                &["backlog", "todo", "in-progress", "review", "done"],
                "backlog",
            ),
        NewNodeType::new("feature", "Feature")
            .with_description("High-level capability")
            .with_color("#22c55e")
            .with_statuses(
                &["proposed", "approved", "in-progress", "released"],
                "proposed",
            ),
        NewNodeType::new("person", "Person")
            .with_description("Human or agent identity")
            .with_color("#8b5cf6")
            .with_statuses(&["active", "inactive"], "active"),
    ]
}

/// Default link type definitions, in catalogue order
pub fn default_link_types() -> Vec<NewLinkType> {
    vec![
        NewLinkType::new("blocks", "blocked-by")
            .with_description("Prevents progress on target")
            .between(&["bug", "task"], &["task", "feature"]),
        NewLinkType::new("has-task", "task-of")
            .with_description("Contains as sub-work")
            .between(&["feature"], &["task"]),
        NewLinkType::new("assigned-to", "assignee-of")
            .with_description("Work assigned to person/agent")
            .between(&["bug", "task", "feature"], &["person"]),
        NewLinkType::new("depends-on", "dependency-of")
            .with_description("Requires target to complete first")
            .between(&["task", "feature"], &["task", "feature"]),
        NewLinkType::symmetric("relates-to")
            .with_description("General association (symmetric)")
            .between(&["bug", "task", "feature"], &["bug", "task", "feature"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::is_valid_token;

    #[test]
    fn test_default_statuses_contain_default() {
        for nt in default_node_types() {
            assert!(
                nt.statuses.contains(&nt.default_status),
                "{} default status missing",
                nt.name
            );
        }
    }

    #[test]
    fn test_default_link_types_reference_default_node_types() {
        let names: Vec<String> = default_node_types().into_iter().map(|nt| nt.name).collect();
        for lt in default_link_types() {
            assert!(is_valid_token(&lt.verb));
            assert!(is_valid_token(&lt.inverse_verb));
            for t in lt.source_types.iter().chain(lt.target_types.iter()) {
                assert!(names.contains(t), "{} references unknown type {}", lt.verb, t);
            }
        }
    }
}
