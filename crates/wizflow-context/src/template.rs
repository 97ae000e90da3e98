//! `{{dotted.path}}` interpolation
//!
//! Single pass: substituted text is never re-scanned. Whitespace inside the
//! braces is trimmed. A token whose path is missing or does not parse is
//! replaced by the empty string.

use crate::path::ContextPath;
use crate::value::ContextValue;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([^{}]*?)\s*\}\}").expect("token pattern is valid"));

/// Replace every token in `template` with the value it resolves to in `tree`
#[must_use]
pub fn interpolate(template: &str, tree: Option<&ContextValue>) -> String {
    TOKEN
        .replace_all(template, |caps: &Captures<'_>| {
            let Some(tree) = tree else {
                return String::new();
            };
            caps[1]
                .parse::<ContextPath>()
                .ok()
                .and_then(|path| tree.get_path(&path).map(ContextValue::render))
                .unwrap_or_default()
        })
        .into_owned()
}

/// Paths referenced by `template`, in order of appearance
///
/// Tokens that do not parse as paths are skipped.
#[must_use]
pub fn tokens(template: &str) -> Vec<ContextPath> {
    TOKEN
        .captures_iter(template)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tree() -> ContextValue {
        ContextValue::from(json!({
            "campaign": {"name": "Spring", "budget": 1200, "tags": ["a", "b"]},
            "empty": null,
            "raw": "{{campaign.name}}"
        }))
    }

    #[test]
    fn substitutes_strings_raw() {
        assert_eq!(
            interpolate("Hello {{campaign.name}}!", Some(&tree())),
            "Hello Spring!"
        );
    }

    #[test]
    fn trims_whitespace_inside_braces() {
        assert_eq!(
            interpolate("{{ campaign.name }}/{{campaign.budget   }}", Some(&tree())),
            "Spring/1200"
        );
    }

    #[test]
    fn missing_paths_render_empty() {
        assert_eq!(interpolate("[{{nope.here}}]", Some(&tree())), "[]");
        assert_eq!(interpolate("[{{empty}}]", Some(&tree())), "[]");
        assert_eq!(interpolate("[{{a..b}}]", Some(&tree())), "[]");
    }

    #[test]
    fn missing_tree_renders_all_tokens_empty() {
        assert_eq!(interpolate("x{{campaign.name}}y", None), "xy");
    }

    #[test]
    fn containers_render_as_compact_json() {
        assert_eq!(
            interpolate("{{campaign.tags}}", Some(&tree())),
            r#"["a","b"]"#
        );
    }

    #[test]
    fn substituted_text_not_rescanned() {
        assert_eq!(interpolate("{{raw}}", Some(&tree())), "{{campaign.name}}");
    }

    #[test]
    fn text_without_tokens_unchanged() {
        assert_eq!(interpolate("plain {text}", Some(&tree())), "plain {text}");
    }

    #[test]
    fn tokens_lists_paths() {
        let found = tokens("{{a.b}} and {{ c }} and {{bad..path}}");
        let rendered: Vec<String> = found.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["a.b", "c"]);
    }
}
