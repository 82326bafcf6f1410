//! Tokenizer for condition expressions.

use super::ConditionError;

/// Kinds of tokens recognised in a condition.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Identifier(String),
    Number(f64),
    String(String),
    /// Operators and punctuation, including the ones the parser rejects
    /// (`.`, `?`, `=`, `[`, ...) so it can name the unsupported construct.
    Punct(&'static str),
    /// A backtick; template literals are never supported.
    Backtick,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
}

/// Longest match first.
const PUNCTUATORS: &[&str] = &[
    ">>>=", "===", "!==", ">>>", "<<=", ">>=", "**=", "...", "==", "!=", "<=", ">=", "&&", "||",
    "<<", ">>", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "=>", "??", "?.",
    "**", "+", "-", "*", "/", "%", "<", ">", "!", "~", "&", "|", "^", "(", ")", "[", "]", "{",
    "}", ".", ",", "?", ":", "=", ";",
];

/// Split `source` into tokens.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, ConditionError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = source[pos..].chars().next().unwrap_or('\0');

        if c.is_whitespace() {
            pos += c.len_utf8();
            continue;
        }

        let start = pos;
        let kind = if is_identifier_start(c) {
            pos += c.len_utf8();
            while let Some(next) = source[pos..].chars().next() {
                if !is_identifier_part(next) {
                    break;
                }
                pos += next.len_utf8();
            }
            TokenKind::Identifier(source[start..pos].to_string())
        } else if c.is_ascii_digit()
            || (c == '.' && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit))
        {
            let (value, len) = lex_number(&source[pos..])?;
            pos += len;
            TokenKind::Number(value)
        } else if c == '"' || c == '\'' {
            let (value, len) = lex_string(&source[pos..], start)?;
            pos += len;
            TokenKind::String(value)
        } else if c == '`' {
            pos += 1;
            TokenKind::Backtick
        } else if let Some(punct) = PUNCTUATORS.iter().copied().find(|p| source[pos..].starts_with(*p)) {
            pos += punct.len();
            TokenKind::Punct(punct)
        } else {
            return Err(ConditionError::UnexpectedCharacter {
                found: c,
                offset: pos,
            });
        };

        tokens.push(Token {
            kind,
            start,
            end: pos,
        });
    }

    Ok(tokens)
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Lex a numeric literal at the start of `rest`, returning its value and byte length.
fn lex_number(rest: &str) -> Result<(f64, usize), ConditionError> {
    let bytes = rest.as_bytes();

    let radix = match (bytes.first(), bytes.get(1)) {
        (Some(b'0'), Some(b'x' | b'X')) => Some(16),
        (Some(b'0'), Some(b'o' | b'O')) => Some(8),
        (Some(b'0'), Some(b'b' | b'B')) => Some(2),
        _ => None,
    };

    let len = if let Some(radix) = radix {
        2 + rest[2..].chars().take_while(|c| c.is_digit(radix) || *c == '_').count()
    } else {
        let mut len = 0;
        let mut seen_exponent = false;
        while len < bytes.len() {
            let b = bytes[len];
            let accept = b.is_ascii_digit()
                || b == b'.'
                || b == b'_'
                || (!seen_exponent && (b == b'e' || b == b'E'))
                || ((b == b'+' || b == b'-')
                    && len > 0
                    && matches!(bytes[len - 1], b'e' | b'E'));
            if !accept {
                break;
            }
            if b == b'e' || b == b'E' {
                seen_exponent = true;
            }
            len += 1;
        }
        len
    };

    let raw = &rest[..len];
    let invalid = || ConditionError::InvalidNumber {
        literal: raw.to_string(),
    };

    // Identifier characters glued to a number (`1abc`) are not a number.
    if rest[len..].chars().next().is_some_and(is_identifier_start) {
        let glued = rest[len..].chars().take_while(|c| is_identifier_part(*c)).map(char::len_utf8);
        return Err(ConditionError::InvalidNumber {
            literal: rest[..len + glued.sum::<usize>()].to_string(),
        });
    }

    let (body, digit_radix) = match radix {
        Some(radix) => (&raw[2..], radix),
        None => (raw, 10),
    };
    if !separators_are_valid(body, digit_radix) {
        return Err(invalid());
    }
    // Legacy octal (`010`) and zero-prefixed decimals are not valid numbers.
    let zero_prefixed =
        raw.starts_with('0') && raw[1..].starts_with(|c: char| c.is_ascii_digit() || c == '_');
    if radix.is_none() && zero_prefixed {
        return Err(invalid());
    }

    let digits = raw.replace('_', "");
    let value = match radix {
        Some(radix) => {
            let body = &digits[2..];
            if body.is_empty() {
                return Err(invalid());
            }
            u64::from_str_radix(body, radix).map_err(|_| invalid())? as f64
        }
        None => digits.parse::<f64>().map_err(|_| invalid())?,
    };

    Ok((value, len))
}

/// Every `_` must sit between two digits of `radix`.
fn separators_are_valid(body: &str, radix: u32) -> bool {
    let chars: Vec<char> = body.chars().collect();
    chars.iter().enumerate().all(|(i, &c)| {
        c != '_'
            || (i > 0
                && chars[i - 1].is_digit(radix)
                && chars.get(i + 1).is_some_and(|next| next.is_digit(radix)))
    })
}

/// Lex a quoted string at the start of `rest`, returning the decoded value and byte length.
fn lex_string(rest: &str, offset: usize) -> Result<(String, usize), ConditionError> {
    let mut chars = rest.char_indices();
    let Some((_, quote)) = chars.next() else {
        return Err(ConditionError::UnterminatedString {
            offset,
        });
    };
    let mut value = String::new();

    while let Some((i, c)) = chars.next() {
        match c {
            c if c == quote => return Ok((value, i + c.len_utf8())),
            '\n' | '\r' => break,
            '\\' => {
                let Some((_, escaped)) = chars.next() else {
                    break;
                };
                match escaped {
                    'n' => value.push('\n'),
                    't' => value.push('\t'),
                    'r' => value.push('\r'),
                    'b' => value.push('\u{8}'),
                    'f' => value.push('\u{c}'),
                    'v' => value.push('\u{b}'),
                    '0' => value.push('\0'),
                    'x' | 'u' => {
                        let width = if escaped == 'x' { 2 } else { 4 };
                        let hex: String = chars.by_ref().take(width).map(|(_, h)| h).collect();
                        let decoded = u32::from_str_radix(&hex, 16)
                            .ok()
                            .filter(|_| hex.len() == width)
                            .and_then(char::from_u32)
                            .ok_or(ConditionError::InvalidEscape {
                                offset: offset + i,
                            })?;
                        value.push(decoded);
                    }
                    other => value.push(other),
                }
            }
            other => value.push(other),
        }
    }

    Err(ConditionError::UnterminatedString {
        offset,
    })
}
