//! Serializer from condition ASTs to the runtime expression syntax.
//!
//! Every binary node is emitted as `(left op right)` and every unary node as
//! `op(operand)`, so the emitted string groups exactly like the parse tree no
//! matter how the author spaced or parenthesized the original.

use super::ast::Expr;

/// Emits JavaScript expressions that read identifiers from an options record.
#[derive(Debug, Clone, Copy)]
pub struct JsEmitter<'a> {
    options_ident: &'a str,
}

impl<'a> JsEmitter<'a> {
    /// Create an emitter that rewrites identifiers as `<options_ident>.<name>`.
    pub const fn new(options_ident: &'a str) -> Self {
        Self {
            options_ident,
        }
    }

    /// Emit `expr` as a string.
    pub fn emit(&self, expr: &Expr) -> String {
        let mut out = String::new();
        self.emit_into(expr, &mut out);
        out
    }

    fn emit_into(&self, expr: &Expr, out: &mut String) {
        match expr {
            Expr::Literal(literal) => out.push_str(&literal.raw),
            Expr::Identifier(name) => {
                out.push_str(self.options_ident);
                out.push('.');
                out.push_str(name);
            }
            Expr::Unary {
                operator,
                operand,
            } => {
                out.push_str(operator.symbol());
                out.push('(');
                self.emit_into(operand, out);
                out.push(')');
            }
            Expr::Binary {
                operator,
                left,
                right,
            } => {
                let symbol = operator.symbol();
                out.push('(');
                self.emit_into(left, out);
                out.push_str(symbol);
                let right_start = out.len();
                self.emit_into(right, out);
                if merges_into_one_token(symbol, &out[right_start..]) {
                    out.insert(right_start, ' ');
                }
                out.push(')');
            }
        }
    }
}

/// Whether `symbol` followed directly by `next` would lex as `++` or `--`.
fn merges_into_one_token(symbol: &str, next: &str) -> bool {
    match (symbol.chars().last(), next.chars().next()) {
        (Some(last), Some(first)) => last == first && matches!(last, '+' | '-'),
        _ => false,
    }
}
