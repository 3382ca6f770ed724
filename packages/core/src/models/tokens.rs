//! Token Validation and Label Formatting
//!
//! Type names, statuses and link verbs share one token grammar: lowercase
//! ASCII, digits and hyphens, starting with a letter (`bug`, `in-progress`,
//! `blocked-by`). Node labels are the human-readable handle derived from a
//! node's type and its per-type index (`Bug-27`).
//!
//! # Examples
//!
//! ```rust
//! use issuegraph_core::models::{label_from_type_and_index, parse_label};
//!
//! let label = label_from_type_and_index("bug", 27);
//! assert_eq!(label, "Bug-27");
//!
//! let (node_type, label) = parse_label("Task-15").unwrap();
//! assert_eq!(node_type, "task");
//! assert_eq!(label, "Task-15");
//! ```

use regex::Regex;
use std::sync::OnceLock;

/// Maximum length of a type name, status or verb token
pub const MAX_TOKEN_LENGTH: usize = 50;

/// Maximum length of a node label
pub const MAX_LABEL_LENGTH: usize = 100;

const TOKEN_PATTERN: &str = r"^[a-z][a-z0-9-]*$";

const LABEL_PATTERN: &str = r"^[A-Z][a-z0-9-]*-[0-9]+$";

fn token_regex() -> &'static Regex {
    static TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();
    TOKEN_REGEX.get_or_init(|| Regex::new(TOKEN_PATTERN).unwrap())
}

fn label_regex() -> &'static Regex {
    static LABEL_REGEX: OnceLock<Regex> = OnceLock::new();
    LABEL_REGEX.get_or_init(|| Regex::new(LABEL_PATTERN).unwrap())
}

/// Whether `value` is a well-formed type name, status or verb
pub fn is_valid_token(value: &str) -> bool {
    !value.is_empty() && value.len() <= MAX_TOKEN_LENGTH && token_regex().is_match(value)
}

/// Whether `value` is a well-formed node label (`Capitalized-digits`)
pub fn is_valid_label(value: &str) -> bool {
    !value.is_empty() && value.len() <= MAX_LABEL_LENGTH && label_regex().is_match(value)
}

/// Capitalize a type name: first character uppercase, the rest lowercase
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Build the label for the `node_index`-th node of `node_type`
///
/// The label is a pure function of type and index: `Capitalize(type)-index`,
/// with no zero padding.
pub fn label_from_type_and_index(node_type: &str, node_index: u32) -> String {
    format!("{}-{}", capitalize(node_type), node_index)
}

/// Split a label into `(node_type, label)`
///
/// The type is the portion before the first `-`, lowercased. Returns `None`
/// when there is no `-` or the prefix is not a valid type token.
pub fn parse_label(label: &str) -> Option<(String, String)> {
    let (prefix, _) = label.split_once('-')?;
    let node_type = prefix.to_lowercase();
    if !is_valid_token(&node_type) {
        return None;
    }
    Some((node_type, label.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_has_no_padding() {
        assert_eq!(label_from_type_and_index("task", 1), "Task-1");
        assert_eq!(label_from_type_and_index("bug", 27), "Bug-27");
        assert_eq!(label_from_type_and_index("feature", 1000), "Feature-1000");
    }

    #[test]
    fn test_capitalize_lowercases_tail() {
        assert_eq!(capitalize("user-story"), "User-story");
        assert_eq!(capitalize("BUG"), "Bug");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_parse_label_splits_on_first_hyphen() {
        assert_eq!(
            parse_label("Bug-27"),
            Some(("bug".to_string(), "Bug-27".to_string()))
        );
        assert_eq!(parse_label("Bug27"), None);
        assert_eq!(parse_label("-27"), None);
        assert_eq!(parse_label("9x-1"), None);
    }

    #[test]
    fn test_token_grammar() {
        assert!(is_valid_token("in-progress"));
        assert!(is_valid_token("bug"));
        assert!(!is_valid_token("Bug"));
        assert!(!is_valid_token("1bug"));
        assert!(!is_valid_token(""));
        assert!(!is_valid_token(&"a".repeat(MAX_TOKEN_LENGTH + 1)));
    }

    #[test]
    fn test_label_grammar() {
        assert!(is_valid_label("Bug-1"));
        assert!(is_valid_label("User-story-12"));
        assert!(!is_valid_label("bug-1"));
        assert!(!is_valid_label("Bug-"));
        assert!(!is_valid_label("Bug"));
    }
}
