//! Abstract syntax for inclusion conditions.
//!
//! The tree mirrors the grouping the parser produced; serializers never
//! re-derive precedence from it.

use std::fmt;

/// A parsed condition expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value, kept together with its source spelling.
    Literal(Literal),
    /// A bare identifier, looked up in the options record at runtime.
    Identifier(String),
    /// A prefix operator applied to an operand.
    Unary {
        /// The operator
        operator: UnaryOperator,
        /// The operand
        operand: Box<Expr>,
    },
    /// An infix operator, including the logical `&&` and `||`.
    Binary {
        /// The operator
        operator: BinaryOperator,
        /// Left-hand side
        left: Box<Expr>,
        /// Right-hand side
        right: Box<Expr>,
    },
}

impl Expr {
    pub(crate) fn unary(operator: UnaryOperator, operand: Expr) -> Self {
        Expr::Unary {
            operator,
            operand: Box::new(operand),
        }
    }

    pub(crate) fn binary(operator: BinaryOperator, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Collect the identifiers referenced by this expression, in order of
    /// first appearance.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_identifiers(&mut names);
        names
    }

    fn collect_identifiers<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Identifier(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Expr::Unary {
                operand,
                ..
            } => operand.collect_identifiers(names),
            Expr::Binary {
                left,
                right,
                ..
            } => {
                left.collect_identifiers(names);
                right.collect_identifiers(names);
            }
        }
    }
}

/// A literal together with the exact text it was written as.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// Source spelling, emitted verbatim
    pub raw: String,
    /// Decoded value, used by the evaluator
    pub value: LiteralValue,
}

/// Decoded literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// `!`
    Not,
    /// `-`
    Negate,
    /// `+`
    Plus,
    /// `~`
    BitNot,
}

impl UnaryOperator {
    /// The operator as written in the output syntax.
    pub const fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Negate => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::BitNot => "~",
        }
    }
}

/// Infix operators, ordered loosely by precedence group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Multiply,
    Divide,
    Remainder,
    Add,
    Subtract,
    ShiftLeft,
    ShiftRight,
    UnsignedShiftRight,
    LessThan,
    LessThanEq,
    GreaterThan,
    GreaterThanEq,
    Equals,
    NotEquals,
    StrictEquals,
    StrictNotEquals,
    BitAnd,
    BitXor,
    BitOr,
    LogicalAnd,
    LogicalOr,
}

impl BinaryOperator {
    /// The operator as written in the output syntax.
    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::ShiftLeft => "<<",
            BinaryOperator::ShiftRight => ">>",
            BinaryOperator::UnsignedShiftRight => ">>>",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanEq => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanEq => ">=",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::StrictEquals => "===",
            BinaryOperator::StrictNotEquals => "!==",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitXor => "^",
            BinaryOperator::BitOr => "|",
            BinaryOperator::LogicalAnd => "&&",
            BinaryOperator::LogicalOr => "||",
        }
    }

    /// Binding power; higher binds tighter. All levels are left-associative.
    pub const fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Remainder => 10,
            BinaryOperator::Add | BinaryOperator::Subtract => 9,
            BinaryOperator::ShiftLeft
            | BinaryOperator::ShiftRight
            | BinaryOperator::UnsignedShiftRight => 8,
            BinaryOperator::LessThan
            | BinaryOperator::LessThanEq
            | BinaryOperator::GreaterThan
            | BinaryOperator::GreaterThanEq => 7,
            BinaryOperator::Equals
            | BinaryOperator::NotEquals
            | BinaryOperator::StrictEquals
            | BinaryOperator::StrictNotEquals => 6,
            BinaryOperator::BitAnd => 5,
            BinaryOperator::BitXor => 4,
            BinaryOperator::BitOr => 3,
            BinaryOperator::LogicalAnd => 2,
            BinaryOperator::LogicalOr => 1,
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
