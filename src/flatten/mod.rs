//! Tree flattening.
//!
//! Flattening walks an [`IncludeTree`] bottom-up and replaces every directive
//! line with the expansion of the file it names. Substitution is by the span
//! recorded at scan time, so two byte-identical directive lines in one file
//! are each replaced at their own position.
//!
//! The result is an [`Expansion`]: literal text interleaved with guarded
//! sections. It can be serialized as a template-literal body whose guards are
//! evaluated by the runtime ([`Expansion::to_template_body`]) or rendered
//! in-process against a JSON options record ([`Expansion::render`]).

use crate::condition::Condition;
use crate::tree::{IncludeNode, IncludeTree};

/// A piece of flattened output.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Text emitted verbatim.
    Text(String),
    /// Content emitted only when `condition` holds.
    Guarded {
        condition: Condition,
        body: Expansion,
    },
}

/// Flattened text with its guarded sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    segments: Vec<Segment>,
}

impl Expansion {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether any section is guarded by a condition.
    pub fn is_conditional(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Guarded { .. }))
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Text(text.to_string()));
        }
    }

    fn append(&mut self, other: Expansion) {
        for segment in other.segments {
            match segment {
                Segment::Text(text) => self.push_text(&text),
                guarded => self.segments.push(guarded),
            }
        }
    }

    /// Serialize as the body of a template literal.
    ///
    /// Guards become `${<condition>?`<body>`:""}` with identifiers read from
    /// `options_ident`. Text is spliced verbatim, so interpolations written in
    /// the templates themselves stay live.
    pub fn to_template_body(&self, options_ident: &str) -> String {
        let mut out = String::new();
        self.write_template_body(options_ident, &mut out);
        out
    }

    fn write_template_body(&self, options_ident: &str, out: &mut String) {
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Guarded {
                    condition,
                    body,
                } => {
                    out.push_str("${");
                    out.push_str(&condition.to_js(options_ident));
                    out.push_str("?`");
                    body.write_template_body(options_ident, out);
                    out.push_str("`:\"\"}");
                }
            }
        }
    }

    /// Produce the final text for `options`, keeping guarded sections whose
    /// condition is truthy.
    pub fn render(&self, options: &serde_json::Value) -> String {
        let mut out = String::new();
        self.render_into(options, &mut out);
        out
    }

    fn render_into(&self, options: &serde_json::Value, out: &mut String) {
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Guarded {
                    condition,
                    body,
                } => {
                    if condition.is_satisfied_by(options) {
                        body.render_into(options, out);
                    }
                }
            }
        }
    }
}

/// Flatten a resolved tree into a single [`Expansion`].
pub fn flatten(tree: &IncludeTree) -> Expansion {
    expand(&tree.root.text, &tree.children)
}

/// Expand `text`, whose directives resolved to `children` in source order.
fn expand(text: &str, children: &[IncludeNode]) -> Expansion {
    let mut expansion = Expansion::default();
    let mut cursor = 0;

    for node in children {
        let span = &node.directive.span;
        expansion.push_text(&text[cursor..span.start]);

        let body = expand(&node.file.text, &node.children);
        match &node.condition {
            None => expansion.append(body),
            Some(condition) => expansion.segments.push(Segment::Guarded {
                condition: condition.clone(),
                body,
            }),
        }

        cursor = span.end;
    }

    expansion.push_text(&text[cursor..]);
    expansion
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::contains_directive;
    use crate::host::MemoryHost;
    use crate::tree::TreeBuilder;
    use serde_json::json;
    use std::path::Path;

    async fn flatten_with(host: &MemoryHost, root: &str) -> Expansion {
        let tree = TreeBuilder::new(host)
            .build(root, Path::new("/p"), Path::new("/p/root.tpl"))
            .await
            .unwrap();
        flatten(&tree)
    }

    #[tokio::test]
    async fn test_text_without_directives_is_unchanged() {
        let host = MemoryHost::new();
        for text in ["", "plain\n", "a\n# include not.tpl\n  #include indented\n"] {
            let expansion = flatten_with(&host, text).await;
            assert_eq!(expansion.to_template_body("options"), text);
            assert_eq!(expansion.render(&json!({})), text);
        }
    }

    #[tokio::test]
    async fn test_unconditional_include_is_spliced() {
        let host = MemoryHost::new().with_file("/p/header.tpl", "<h1>Title</h1>\n");
        let expansion = flatten_with(&host, "<html>\n#include header.tpl\n</html>\n").await;

        assert!(!expansion.is_conditional());
        assert_eq!(expansion.segments().len(), 1);
        assert_eq!(expansion.to_template_body("options"), "<html>\n<h1>Title</h1>\n</html>\n");
    }

    #[tokio::test]
    async fn test_conditional_include_is_guarded() {
        let host = MemoryHost::new().with_file("/p/foo.tpl", "X\n");
        let expansion = flatten_with(&host, "a\n#include foo.tpl if enabled\nb\n").await;

        assert_eq!(
            expansion.to_template_body("options"),
            "a\n${options.enabled?`X\n`:\"\"}b\n"
        );
        assert_eq!(expansion.render(&json!({ "enabled": true })), "a\nX\nb\n");
        assert_eq!(expansion.render(&json!({ "enabled": false })), "a\nb\n");
        assert_eq!(expansion.render(&json!({})), "a\nb\n");
    }

    #[tokio::test]
    async fn test_nested_guards() {
        let host = MemoryHost::new()
            .with_file("/p/outer.tpl", "O[\n#include inner.tpl if b\n]\n")
            .with_file("/p/inner.tpl", "I\n");
        let expansion = flatten_with(&host, "#include outer.tpl if a\n").await;

        assert_eq!(
            expansion.to_template_body("opts"),
            "${opts.a?`O[\n${opts.b?`I\n`:\"\"}]\n`:\"\"}"
        );
        assert_eq!(expansion.render(&json!({ "a": true, "b": false })), "O[\n]\n");
        assert_eq!(expansion.render(&json!({ "a": false, "b": true })), "");
    }

    #[tokio::test]
    async fn test_identical_lines_are_substituted_in_place() {
        let host = MemoryHost::new().with_file("/p/x.tpl", "X\n");
        let expansion = flatten_with(&host, "#include x.tpl\n-\n#include x.tpl\n").await;
        assert_eq!(expansion.render(&json!({})), "X\n-\nX\n");
    }

    #[tokio::test]
    async fn test_same_file_with_different_conditions() {
        let host = MemoryHost::new().with_file("/p/x.tpl", "X\n");
        let expansion =
            flatten_with(&host, "#include x.tpl if a\n#include x.tpl if !a\n#include x.tpl\n").await;

        assert_eq!(expansion.render(&json!({ "a": true })), "X\nX\n");
        assert_eq!(expansion.render(&json!({ "a": false })), "X\nX\n");
        assert_eq!(host.read_count("/p/x.tpl"), 1);
    }

    #[tokio::test]
    async fn test_no_directive_leaks_into_output() {
        let host = MemoryHost::new()
            .with_file("/p/a.tpl", "#include b.tpl if x\n#include c.tpl\n")
            .with_file("/p/b.tpl", "#include c.tpl\nB\n")
            .with_file("/p/c.tpl", "C");
        let expansion = flatten_with(&host, "#include a.tpl\r\n#include a.tpl").await;

        let body = expansion.to_template_body("options");
        assert!(!contains_directive(&body));
        assert!(!contains_directive(&expansion.render(&json!({ "x": true }))));
        assert_eq!(expansion.render(&json!({ "x": true })), "CB\nCCB\nC");
        assert_eq!(expansion.render(&json!({})), "CC");
    }
}
