//! In-process evaluation of compiled conditions.
//!
//! The emitted module evaluates conditions inside a JavaScript runtime. To
//! preview output without one (`tplinc render`), conditions can be evaluated
//! here against a JSON options record using the same value semantics:
//! truthiness, loose and strict equality, numeric coercion, string
//! concatenation for `+`, and short-circuiting `&&`/`||` that yield operands.
//! Missing fields read as `undefined`, except names inherited from
//! `Object.prototype` (`constructor`, `toString`, ...), which read as objects
//! just as `options.constructor` does in the emitted module.

use super::ast::{BinaryOperator, Expr, LiteralValue, UnaryOperator};

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    /// Arrays and objects; only their identity-free behaviour is modelled.
    Object,
}

impl Value {
    /// Convert a JSON value read from the options record.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Value::Object,
        }
    }

    /// JavaScript truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Object => true,
        }
    }

    fn to_number(&self) -> f64 {
        match self {
            Value::Undefined | Value::Object => f64::NAN,
            Value::Null => 0.0,
            Value::Boolean(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
        }
    }

    fn to_js_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::String(s) => s.clone(),
            Value::Object => "[object Object]".to_string(),
        }
    }

    fn to_int32(&self) -> i32 {
        to_uint32(self.to_number()) as i32
    }
}

fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&trimmed[2..], radix).map_or(f64::NAN, |v| v as f64);
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        // Rust accepts spellings such as "inf" and "NaN" that JavaScript does not.
        _ if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') => f64::NAN,
        _ => trimmed.parse().unwrap_or(f64::NAN),
    }
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        (if n > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else if n == n.trunc() && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Members every options object inherits from `Object.prototype`.
const INHERITED_MEMBERS: &[&str] = &[
    "constructor",
    "hasOwnProperty",
    "isPrototypeOf",
    "propertyIsEnumerable",
    "toLocaleString",
    "toString",
    "valueOf",
    "__proto__",
    "__defineGetter__",
    "__defineSetter__",
    "__lookupGetter__",
    "__lookupSetter__",
];

/// Evaluate `expr` against `options`.
pub fn evaluate(expr: &Expr, options: &serde_json::Value) -> Value {
    match expr {
        Expr::Literal(literal) => match &literal.value {
            LiteralValue::Number(n) => Value::Number(*n),
            LiteralValue::String(s) => Value::String(s.clone()),
            LiteralValue::Boolean(b) => Value::Boolean(*b),
            LiteralValue::Null => Value::Null,
        },
        Expr::Identifier(name) => match options.get(name) {
            Some(value) => Value::from_json(value),
            None if INHERITED_MEMBERS.contains(&name.as_str()) => Value::Object,
            None => Value::Undefined,
        },
        Expr::Unary {
            operator,
            operand,
        } => {
            let value = evaluate(operand, options);
            match operator {
                UnaryOperator::Not => Value::Boolean(!value.is_truthy()),
                UnaryOperator::Negate => Value::Number(-value.to_number()),
                UnaryOperator::Plus => Value::Number(value.to_number()),
                UnaryOperator::BitNot => Value::Number(f64::from(!value.to_int32())),
            }
        }
        Expr::Binary {
            operator: BinaryOperator::LogicalAnd,
            left,
            right,
        } => {
            let lhs = evaluate(left, options);
            if lhs.is_truthy() { evaluate(right, options) } else { lhs }
        }
        Expr::Binary {
            operator: BinaryOperator::LogicalOr,
            left,
            right,
        } => {
            let lhs = evaluate(left, options);
            if lhs.is_truthy() { lhs } else { evaluate(right, options) }
        }
        Expr::Binary {
            operator,
            left,
            right,
        } => apply_binary(*operator, &evaluate(left, options), &evaluate(right, options)),
    }
}

fn apply_binary(operator: BinaryOperator, lhs: &Value, rhs: &Value) -> Value {
    use BinaryOperator as Op;

    let number = |f: fn(f64, f64) -> f64| Value::Number(f(lhs.to_number(), rhs.to_number()));
    let int32 = |f: fn(i32, i32) -> i32| Value::Number(f64::from(f(lhs.to_int32(), rhs.to_int32())));

    match operator {
        Op::Add => match (lhs, rhs) {
            (Value::String(_) | Value::Object, _) | (_, Value::String(_) | Value::Object) => {
                Value::String(lhs.to_js_string() + &rhs.to_js_string())
            }
            _ => number(|a, b| a + b),
        },
        Op::Subtract => number(|a, b| a - b),
        Op::Multiply => number(|a, b| a * b),
        Op::Divide => number(|a, b| a / b),
        Op::Remainder => number(|a, b| a % b),
        Op::ShiftLeft => int32(|a, b| a.wrapping_shl(b as u32 & 31)),
        Op::ShiftRight => int32(|a, b| a.wrapping_shr(b as u32 & 31)),
        Op::UnsignedShiftRight => {
            let shift = to_uint32(rhs.to_number()) & 31;
            Value::Number(f64::from(to_uint32(lhs.to_number()) >> shift))
        }
        Op::BitAnd => int32(|a, b| a & b),
        Op::BitXor => int32(|a, b| a ^ b),
        Op::BitOr => int32(|a, b| a | b),
        Op::LessThan => Value::Boolean(compare(lhs, rhs, |o| o.is_lt())),
        Op::LessThanEq => Value::Boolean(compare(lhs, rhs, |o| o.is_le())),
        Op::GreaterThan => Value::Boolean(compare(lhs, rhs, |o| o.is_gt())),
        Op::GreaterThanEq => Value::Boolean(compare(lhs, rhs, |o| o.is_ge())),
        Op::Equals => Value::Boolean(loose_equals(lhs, rhs)),
        Op::NotEquals => Value::Boolean(!loose_equals(lhs, rhs)),
        Op::StrictEquals => Value::Boolean(strict_equals(lhs, rhs)),
        Op::StrictNotEquals => Value::Boolean(!strict_equals(lhs, rhs)),
        Op::LogicalAnd | Op::LogicalOr => unreachable!("logical operators short-circuit in evaluate"),
    }
}

fn compare(lhs: &Value, rhs: &Value, accept: fn(std::cmp::Ordering) -> bool) -> bool {
    if let (Value::String(a), Value::String(b)) = (lhs, rhs) {
        return accept(a.encode_utf16().cmp(b.encode_utf16()));
    }
    lhs.to_number().partial_cmp(&rhs.to_number()).is_some_and(accept)
}

fn strict_equals(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => a == b,
        // Distinct objects are never identical.
        (Value::Object, Value::Object) => false,
        _ => lhs == rhs,
    }
}

fn loose_equals(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
        (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
        (Value::Boolean(_), _) => loose_equals(&Value::Number(lhs.to_number()), rhs),
        (_, Value::Boolean(_)) => loose_equals(lhs, &Value::Number(rhs.to_number())),
        (Value::Number(a), Value::String(_)) => *a == rhs.to_number(),
        (Value::String(_), Value::Number(b)) => lhs.to_number() == *b,
        (Value::Object, Value::String(s)) | (Value::String(s), Value::Object) => {
            s == "[object Object]"
        }
        (Value::Object, Value::Number(_)) | (Value::Number(_), Value::Object) => false,
        _ => strict_equals(lhs, rhs),
    }
}
