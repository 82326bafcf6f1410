//! Directive extraction from template text.
//!
//! A directive is a line of the form
//!
//! ```text
//! #include <reference>[ if <expression>]
//! ```
//!
//! The keyword is case-sensitive and must start the line. Everything up to
//! the first ` if ` is the reference (trimmed); everything after it is the raw
//! condition, handed unchanged to [`crate::condition::Condition::compile`].
//!
//! Each match records the byte span of the whole line, including its line
//! terminator, so the flattener can substitute by position instead of
//! searching for the line text again.
//!
//! ```rust
//! use tplinc_cli::directive::scan;
//!
//! let text = "<nav>\n#include menu.tpl if user\n</nav>\n";
//! let directives = scan(text);
//! assert_eq!(directives.len(), 1);
//! assert_eq!(directives[0].reference, "menu.tpl");
//! assert_eq!(directives[0].condition.as_deref(), Some("user"));
//! assert_eq!(&text[directives[0].span.clone()], "#include menu.tpl if user\n");
//! ```

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{CONDITION_SEPARATOR, DIRECTIVE_KEYWORD};

static DIRECTIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?mR)^{} ([^\r\n]+)(\r\n|\r|\n)?", regex::escape(DIRECTIVE_KEYWORD)))
        .unwrap_or_else(|e| panic!("directive pattern must compile: {e}"))
});

/// One `#include` line found in a text buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDirective {
    /// The matched text, line terminator included.
    pub raw_line: String,
    /// Byte range of `raw_line` in the scanned buffer.
    pub span: Range<usize>,
    /// The reference as written, trimmed.
    pub reference: String,
    /// The raw condition after ` if `, if present. Not trimmed or validated.
    pub condition: Option<String>,
}

impl RawDirective {
    /// Whether the directive carries a guard.
    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }
}

/// Extract every directive from `text` in source order.
///
/// Text without directives yields an empty vector. Two byte-identical
/// directive lines produce two entries with distinct spans.
#[must_use]
pub fn scan(text: &str) -> Vec<RawDirective> {
    DIRECTIVE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let argument = caps.get(1)?.as_str();

            let (reference, condition) = match argument.split_once(CONDITION_SEPARATOR) {
                Some((reference, condition)) => (reference, Some(condition.to_string())),
                None => (argument, None),
            };

            let directive = RawDirective {
                raw_line: whole.as_str().to_string(),
                span: whole.range(),
                reference: reference.trim().to_string(),
                condition,
            };
            tracing::trace!(
                "Found include '{}' at {:?}{}",
                directive.reference,
                directive.span,
                directive.condition.as_deref().map(|c| format!(" if {c}")).unwrap_or_default()
            );
            Some(directive)
        })
        .collect()
}

/// Whether `text` still contains anything the scanner would treat as a directive.
#[must_use]
pub fn contains_directive(text: &str) -> bool {
    DIRECTIVE_PATTERN.is_match(text)
}
