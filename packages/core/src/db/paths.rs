//! Storage key layout
//!
//! Every document lives under one base folder (default `.issues`):
//!
//! ```text
//! {base}/_index.json                                   global index
//! {base}/config/node-types.json                        node type catalogue
//! {base}/config/link-types.json                        link type catalogue
//! {base}/config/settings.json                          settings
//! {base}/data/{type}/_index.json                       type index
//! {base}/data/{type}/{Label}/node.json                 node document
//! {base}/data/{type}/{Label}/attachments/{filename}    attachments
//! ```

pub const DEFAULT_BASE_PATH: &str = ".issues";

/// Deterministic mapping from entities to storage keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    base_path: String,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_PATH)
    }
}

impl PathResolver {
    /// Leading and trailing slashes are stripped; an empty base puts
    /// documents at the storage root.
    pub fn new(base_path: impl Into<String>) -> Self {
        let base_path = base_path.into().trim_matches('/').to_string();
        Self { base_path }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    fn join(&self, rest: &str) -> String {
        if self.base_path.is_empty() {
            rest.to_string()
        } else {
            format!("{}/{}", self.base_path, rest)
        }
    }

    pub fn node(&self, node_type: &str, label: &str) -> String {
        self.join(&format!("data/{}/{}/node.json", node_type, label))
    }

    pub fn node_folder(&self, node_type: &str, label: &str) -> String {
        self.join(&format!("data/{}/{}", node_type, label))
    }

    pub fn attachment(&self, node_type: &str, label: &str, filename: &str) -> String {
        self.join(&format!(
            "data/{}/{}/attachments/{}",
            node_type, label, filename
        ))
    }

    pub fn attachments_folder(&self, node_type: &str, label: &str) -> String {
        self.join(&format!("data/{}/{}/attachments", node_type, label))
    }

    pub fn type_index(&self, node_type: &str) -> String {
        self.join(&format!("data/{}/_index.json", node_type))
    }

    pub fn type_folder(&self, node_type: &str) -> String {
        self.join(&format!("data/{}", node_type))
    }

    pub fn global_index(&self) -> String {
        self.join("_index.json")
    }

    pub fn node_types(&self) -> String {
        self.join("config/node-types.json")
    }

    pub fn link_types(&self) -> String {
        self.join("config/link-types.json")
    }

    pub fn settings(&self) -> String {
        self.join("config/settings.json")
    }

    pub fn config_folder(&self) -> String {
        self.join("config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let paths = PathResolver::default();
        assert_eq!(paths.node("bug", "Bug-27"), ".issues/data/bug/Bug-27/node.json");
        assert_eq!(paths.node_folder("bug", "Bug-27"), ".issues/data/bug/Bug-27");
        assert_eq!(
            paths.attachment("bug", "Bug-27", "trace.log"),
            ".issues/data/bug/Bug-27/attachments/trace.log"
        );
        assert_eq!(
            paths.attachments_folder("bug", "Bug-27"),
            ".issues/data/bug/Bug-27/attachments"
        );
        assert_eq!(paths.type_index("task"), ".issues/data/task/_index.json");
        assert_eq!(paths.type_folder("task"), ".issues/data/task");
        assert_eq!(paths.global_index(), ".issues/_index.json");
        assert_eq!(paths.node_types(), ".issues/config/node-types.json");
        assert_eq!(paths.link_types(), ".issues/config/link-types.json");
        assert_eq!(paths.settings(), ".issues/config/settings.json");
        assert_eq!(paths.config_folder(), ".issues/config");
    }

    #[test]
    fn test_custom_and_empty_base() {
        assert_eq!(
            PathResolver::new("/tracker/").global_index(),
            "tracker/_index.json"
        );
        assert_eq!(PathResolver::new("").node_types(), "config/node-types.json");
    }
}
