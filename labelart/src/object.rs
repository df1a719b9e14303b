//! Operand objects of content stream operations.

use std::{borrow::Cow, iter::Peekable};

#[derive(PartialEq, Debug, Clone)]
pub enum Object {
    Null,
    Bool(bool),
    Number(f64),
    Name(Name),
    /// Literal or hex string, escapes decoded.
    String(Vec<u8>),
    Array(Vec<Object>),
    Dictionary(Vec<(Name, Object)>),
}

#[derive(PartialEq, Eq, Hash, Debug, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum ObjectValueError {
    #[error("unexpected type")]
    UnexpectedType,
    #[error("operand missing")]
    OperandMissing,
    #[error("invalid name format")]
    InvalidNameFormat,
    #[error("invalid hex string")]
    InvalidHexString,
}

impl Object {
    pub fn as_number(&self) -> Result<f64, ObjectValueError> {
        match self {
            Self::Number(v) => Ok(*v),
            _ => Err(ObjectValueError::UnexpectedType),
        }
    }

    pub fn name(self) -> Result<Name, ObjectValueError> {
        match self {
            Self::Name(n) => Ok(n),
            _ => Err(ObjectValueError::UnexpectedType),
        }
    }

    pub fn into_string(self) -> Result<Vec<u8>, ObjectValueError> {
        match self {
            Self::String(s) => Ok(s),
            _ => Err(ObjectValueError::UnexpectedType),
        }
    }

    pub fn into_arr(self) -> Result<Vec<Object>, ObjectValueError> {
        match self {
            Self::Array(arr) => Ok(arr),
            _ => Err(ObjectValueError::UnexpectedType),
        }
    }
}

impl From<f64> for Object {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Object {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for Object {
    /// `/foo` converts to Name, other text to literal string bytes.
    fn from(value: &str) -> Self {
        match value.strip_prefix('/') {
            Some(name) => Self::Name(Name::new(name)),
            None => Self::String(value.as_bytes().to_vec()),
        }
    }
}

/// Decode literal string including enclosing '(' and ')'.
pub fn decode_literal_string(s: &[u8]) -> Vec<u8> {
    fn skip_cur_new_line<I: Iterator<Item = u8>>(cur: u8, s: &mut Peekable<I>) -> bool {
        if cur == b'\r' {
            s.next_if_eq(&b'\n');
            true
        } else if cur == b'\n' {
            s.next_if_eq(&b'\r');
            true
        } else {
            false
        }
    }

    fn skip_next_line<I: Iterator<Item = u8>>(s: &mut Peekable<I>) -> bool {
        if s.next_if_eq(&b'\r').is_some() {
            s.next_if_eq(&b'\n');
            true
        } else if s.next_if_eq(&b'\n').is_some() {
            s.next_if_eq(&b'\r');
            true
        } else {
            false
        }
    }

    fn next_oct_byte<I: Iterator<Item = u8>>(s: &mut Peekable<I>) -> Option<u8> {
        let mut result = 0u8;
        let mut hit = false;
        for _ in 0..3 {
            if let Some(c) = s.next_if(|v| matches!(v, b'0'..=b'7')) {
                hit = true;
                // high-order overflow is ignored
                result = result.wrapping_mul(8).wrapping_add(c - b'0');
            }
        }
        hit.then_some(result)
    }

    debug_assert!(s.starts_with(b"(") && s.ends_with(b")"));
    let s = &s[1..s.len() - 1];
    let mut result: Vec<u8> = Vec::with_capacity(s.len());
    let mut iter = s.iter().copied().peekable();

    while let Some(next) = iter.next() {
        match next {
            b'\\' => {
                if skip_next_line(&mut iter) {
                    continue;
                }
                if let Some(b) = next_oct_byte(&mut iter) {
                    result.push(b);
                    continue;
                }

                if let Some(b) = iter.next() {
                    match b {
                        b'r' => result.push(b'\r'),
                        b'n' => result.push(b'\n'),
                        b't' => result.push(b'\t'),
                        b'f' => result.push(b'\x0c'),
                        b'b' => result.push(b'\x08'),
                        _ => result.push(b),
                    }
                }
            }
            _ => {
                if skip_cur_new_line(next, &mut iter) {
                    result.push(b'\n');
                } else {
                    result.push(next);
                }
            }
        }
    }

    result
}

/// Decode hex string including enclosing '<' and '>'.
pub fn decode_hex_string(s: &[u8]) -> Result<Vec<u8>, ObjectValueError> {
    fn filter_whitespace(s: &[u8]) -> Cow<'_, [u8]> {
        if s.iter().copied().any(|b| b.is_ascii_whitespace()) {
            Cow::Owned(
                s.iter()
                    .copied()
                    .filter(|b| !b.is_ascii_whitespace())
                    .collect::<Vec<_>>(),
            )
        } else {
            Cow::Borrowed(s)
        }
    }

    fn append_zero_if_odd(s: &[u8]) -> Cow<'_, [u8]> {
        if s.len() % 2 == 0 {
            Cow::Borrowed(s)
        } else {
            let mut v = Vec::with_capacity(s.len() + 1);
            v.extend_from_slice(s);
            v.push(b'0');
            Cow::Owned(v)
        }
    }

    debug_assert!(s.starts_with(b"<") && s.ends_with(b">"));
    let s = &s[1..s.len() - 1];
    let s = filter_whitespace(s);
    let s = append_zero_if_odd(&s);
    hex::decode(s).map_err(|_| ObjectValueError::InvalidHexString)
}
