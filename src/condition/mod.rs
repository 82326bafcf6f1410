//! Inclusion conditions.
//!
//! A directive such as `#include nav.tpl if user && !embedded` carries a
//! condition written in a small expression language. This module turns the
//! raw condition text into a [`Condition`]: a parsed [`Expr`] tree that can be
//! serialized to the runtime's expression syntax with [`JsEmitter`] or
//! evaluated in-process with [`eval::evaluate`].
//!
//! Conditions are never evaluated while compiling a template; the emitted
//! guard is evaluated by whoever later calls the produced function.
//!
//! # Supported grammar
//!
//! - identifiers (read from the options record: `debug` → `options.debug`)
//! - number, string, `true`/`false` and `null` literals
//! - unary `!`, `-`, `+`, `~`
//! - binary `* / % + - << >> >>> < <= > >= == != === !== & ^ | && ||`
//! - parentheses for grouping
//!
//! Calls, member access, ternaries, assignments and every other construct are
//! rejected with [`ConditionError::Unsupported`].

pub mod ast;
pub mod emit;
pub mod eval;
mod lexer;
mod parser;

pub use ast::{BinaryOperator, Expr, Literal, LiteralValue, UnaryOperator};
pub use emit::JsEmitter;

use thiserror::Error;

/// Reasons a condition fails to compile.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConditionError {
    /// Nothing but whitespace after `if`
    #[error("condition is empty")]
    Empty,

    /// A token that cannot appear at this position
    #[error("unexpected '{found}' at offset {offset}")]
    UnexpectedToken {
        /// The offending token text
        found: String,
        /// Byte offset within the condition
        offset: usize,
    },

    /// A character that starts no token
    #[error("unexpected character '{found}' at offset {offset}")]
    UnexpectedCharacter {
        /// The offending character
        found: char,
        /// Byte offset within the condition
        offset: usize,
    },

    /// Input ended in the middle of an expression
    #[error("unexpected end of condition, expected {expected}")]
    UnexpectedEnd {
        /// What the parser was looking for
        expected: &'static str,
    },

    #[error("unterminated string literal starting at offset {offset}")]
    UnterminatedString {
        /// Byte offset of the opening quote
        offset: usize,
    },

    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscape {
        /// Byte offset of the escape within the condition
        offset: usize,
    },

    #[error("invalid number literal '{literal}'")]
    InvalidNumber {
        /// The literal as written
        literal: String,
    },

    /// Valid expression syntax that conditions do not support
    #[error("unsupported {construct} in '{fragment}'")]
    Unsupported {
        /// Human-readable name of the construct (e.g. "function call")
        construct: &'static str,
        /// The part of the condition that uses it
        fragment: String,
    },
}

/// A compiled inclusion condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    source: String,
    expr: Expr,
}

impl Condition {
    /// Parse and validate a raw condition string.
    ///
    /// # Errors
    ///
    /// Returns [`ConditionError`] when `source` is not exactly one expression
    /// built from the supported constructs.
    pub fn compile(source: &str) -> Result<Self, ConditionError> {
        let expr = parser::Parser::parse(source)?;
        tracing::trace!("Compiled condition '{}' into {:?}", source.trim(), expr);
        Ok(Self {
            source: source.trim().to_string(),
            expr,
        })
    }

    /// The condition as written by the template author (trimmed).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed expression.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Serialize to a runtime boolean expression reading from `options_ident`.
    pub fn to_js(&self, options_ident: &str) -> String {
        JsEmitter::new(options_ident).emit(&self.expr)
    }

    /// Evaluate against a JSON options record.
    pub fn is_satisfied_by(&self, options: &serde_json::Value) -> bool {
        eval::evaluate(&self.expr, options).is_truthy()
    }
}
