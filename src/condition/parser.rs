//! Precedence-climbing parser for condition expressions.
//!
//! Only the constructs in [`Expr`] are accepted. Anything else that is valid
//! expression syntax in the runtime language (calls, member access, ternaries,
//! assignment, ...) is rejected with [`ConditionError::Unsupported`] so the
//! author learns which fragment is the problem rather than seeing a generic
//! syntax error.

use super::ConditionError;
use super::ast::{BinaryOperator, Expr, Literal, LiteralValue, UnaryOperator};
use super::lexer::{Token, TokenKind, tokenize};

/// Reserved words that start constructs conditions cannot express.
const UNSUPPORTED_KEYWORDS: &[(&str, &str)] = &[
    ("typeof", "typeof expression"),
    ("void", "void expression"),
    ("delete", "delete expression"),
    ("new", "new expression"),
    ("this", "this expression"),
    ("function", "function expression"),
    ("class", "class expression"),
    ("await", "await expression"),
    ("yield", "yield expression"),
    ("super", "super expression"),
    ("in", "in expression"),
    ("instanceof", "instanceof expression"),
];

pub(crate) struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    cursor: usize,
}

impl<'a> Parser<'a> {
    /// Parse `source` as exactly one expression.
    pub(crate) fn parse(source: &'a str) -> Result<Expr, ConditionError> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(ConditionError::Empty);
        }

        let mut parser = Self {
            source,
            tokens,
            cursor: 0,
        };

        let expr = parser.parse_expr(0)?;

        match parser.peek().cloned() {
            None => Ok(expr),
            Some(token) => Err(parser.trailing_token_error(&token)),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn parse_expr(&mut self, min_precedence: u8) -> Result<Expr, ConditionError> {
        let mut lhs = self.parse_unary()?;

        loop {
            let Some(operator) = self.peek().and_then(binary_operator) else {
                return Ok(lhs);
            };

            let precedence = operator.precedence();
            if precedence < min_precedence {
                return Ok(lhs);
            }

            self.advance();
            // Left-associative: the right operand only absorbs tighter operators.
            let rhs = self.parse_expr(precedence + 1)?;
            lhs = Expr::binary(operator, lhs, rhs);
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ConditionError> {
        let operator = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Punct("!")) => Some(UnaryOperator::Not),
            Some(TokenKind::Punct("-")) => Some(UnaryOperator::Negate),
            Some(TokenKind::Punct("+")) => Some(UnaryOperator::Plus),
            Some(TokenKind::Punct("~")) => Some(UnaryOperator::BitNot),
            _ => None,
        };

        if let Some(operator) = operator {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::unary(operator, operand));
        }

        let start = self.peek().map_or(self.source.len(), |t| t.start);
        let primary = self.parse_primary()?;
        self.reject_postfix(start)?;
        Ok(primary)
    }

    fn parse_primary(&mut self) -> Result<Expr, ConditionError> {
        let Some(token) = self.advance() else {
            return Err(ConditionError::UnexpectedEnd {
                expected: "an expression",
            });
        };
        let source = self.source;
        let raw = &source[token.start..token.end];

        match token.kind {
            TokenKind::Identifier(name) => {
                let literal = |value| -> Result<Expr, ConditionError> {
                    Ok(Expr::Literal(Literal {
                        raw: raw.to_string(),
                        value,
                    }))
                };
                match name.as_str() {
                    "true" => literal(LiteralValue::Boolean(true)),
                    "false" => literal(LiteralValue::Boolean(false)),
                    "null" => literal(LiteralValue::Null),
                    keyword => {
                        if let Some(&(_, construct)) =
                            UNSUPPORTED_KEYWORDS.iter().find(|(k, _)| *k == keyword)
                        {
                            return Err(ConditionError::Unsupported {
                                construct,
                                fragment: self.fragment_from(token.start),
                            });
                        }
                        Ok(Expr::Identifier(name))
                    }
                }
            }
            TokenKind::Number(value) => Ok(Expr::Literal(Literal {
                raw: raw.to_string(),
                value: LiteralValue::Number(value),
            })),
            TokenKind::String(value) => Ok(Expr::Literal(Literal {
                raw: raw.to_string(),
                value: LiteralValue::String(value),
            })),
            TokenKind::Punct("(") => {
                let inner = self.parse_expr(0)?;
                match self.advance() {
                    Some(Token {
                        kind: TokenKind::Punct(")"),
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(self.trailing_token_error(&other)),
                    None => Err(ConditionError::UnexpectedEnd {
                        expected: "')'",
                    }),
                }
            }
            TokenKind::Punct("[") => Err(ConditionError::Unsupported {
                construct: "array literal",
                fragment: self.fragment_from(token.start),
            }),
            TokenKind::Punct("{") => Err(ConditionError::Unsupported {
                construct: "object literal",
                fragment: self.fragment_from(token.start),
            }),
            TokenKind::Punct("++" | "--") => Err(ConditionError::Unsupported {
                construct: "update expression",
                fragment: self.fragment_from(token.start),
            }),
            TokenKind::Backtick => Err(ConditionError::Unsupported {
                construct: "template literal",
                fragment: self.fragment_from(token.start),
            }),
            TokenKind::Punct(_) => Err(ConditionError::UnexpectedToken {
                found: raw.to_string(),
                offset: token.start,
            }),
        }
    }

    /// Reject call, member and update syntax directly after a primary expression.
    fn reject_postfix(&self, start: usize) -> Result<(), ConditionError> {
        let construct = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Punct("(")) => "function call",
            Some(TokenKind::Punct(".")) | Some(TokenKind::Punct("?.")) => "member access",
            Some(TokenKind::Punct("[")) => "computed member access",
            Some(TokenKind::Punct("++" | "--")) => "update expression",
            Some(TokenKind::Backtick) => "tagged template",
            _ => return Ok(()),
        };

        Err(ConditionError::Unsupported {
            construct,
            fragment: self.fragment_through_next(start),
        })
    }

    fn trailing_token_error(&self, token: &Token) -> ConditionError {
        let construct = match &token.kind {
            TokenKind::Punct("?") => Some("conditional expression"),
            TokenKind::Punct("??") => Some("nullish coalescing"),
            TokenKind::Punct("**") => Some("exponentiation"),
            TokenKind::Punct(",") => Some("sequence expression"),
            TokenKind::Punct("=>") => Some("arrow function"),
            TokenKind::Punct(
                "=" | "+=" | "-=" | "*=" | "/=" | "%=" | "&=" | "|=" | "^=" | "<<=" | ">>="
                | ">>>=" | "**=",
            ) => Some("assignment"),
            TokenKind::Punct(";") => Some("multiple statements"),
            TokenKind::Identifier(word) => UNSUPPORTED_KEYWORDS
                .iter()
                .find(|(k, _)| *k == word.as_str())
                .map(|(_, construct)| *construct),
            _ => None,
        };

        match construct {
            Some(construct) => ConditionError::Unsupported {
                construct,
                fragment: self.source.trim().to_string(),
            },
            None => ConditionError::UnexpectedToken {
                found: self.source[token.start..token.end].to_string(),
                offset: token.start,
            },
        }
    }

    /// Source text from `start` up to and including the token after the next one.
    fn fragment_through_next(&self, start: usize) -> String {
        let end = self
            .tokens
            .get(self.cursor + 1)
            .or_else(|| self.tokens.get(self.cursor))
            .map_or(self.source.len(), |t| t.end);
        self.source[start..end].trim().to_string()
    }

    fn fragment_from(&self, start: usize) -> String {
        self.source[start..].trim().to_string()
    }
}

fn binary_operator(token: &Token) -> Option<BinaryOperator> {
    let TokenKind::Punct(punct) = token.kind else {
        return None;
    };

    Some(match punct {
        "*" => BinaryOperator::Multiply,
        "/" => BinaryOperator::Divide,
        "%" => BinaryOperator::Remainder,
        "+" => BinaryOperator::Add,
        "-" => BinaryOperator::Subtract,
        "<<" => BinaryOperator::ShiftLeft,
        ">>" => BinaryOperator::ShiftRight,
        ">>>" => BinaryOperator::UnsignedShiftRight,
        "<" => BinaryOperator::LessThan,
        "<=" => BinaryOperator::LessThanEq,
        ">" => BinaryOperator::GreaterThan,
        ">=" => BinaryOperator::GreaterThanEq,
        "==" => BinaryOperator::Equals,
        "!=" => BinaryOperator::NotEquals,
        "===" => BinaryOperator::StrictEquals,
        "!==" => BinaryOperator::StrictNotEquals,
        "&" => BinaryOperator::BitAnd,
        "^" => BinaryOperator::BitXor,
        "|" => BinaryOperator::BitOr,
        "&&" => BinaryOperator::LogicalAnd,
        "||" => BinaryOperator::LogicalOr,
        _ => return None,
    })
}
