use std::fmt;

use itertools::Itertools;

use crate::error::{BindError, Result};
use crate::types::{MISSING, VALUE_SEPARATOR};

/// A value crossing the boundary between the accessors and the expression evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The missing value sentinel, rendered as `.`.
    Missing,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl Value {
    /// Whether writing this value to a field means "remove / clear it":
    /// the sentinel, an empty string or list, or `false`.
    pub fn is_clearing(&self) -> bool {
        match self {
            Value::Missing | Value::Bool(false) => true,
            Value::Text(s) => s.is_empty() || s == MISSING,
            Value::List(v) => v.is_empty(),
            Value::Bool(true) | Value::Number(_) => false,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view; text is parsed, anything else is rejected. NaN and the
    /// infinities have no VCF representation and are rejected too.
    pub fn to_number(&self, field: &str) -> Result<f64> {
        let n = match self {
            Value::Number(n) => *n,
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| BindError::invalid(field, self, "not a number"))?,
            _ => return Err(BindError::invalid(field, self, "not a number")),
        };
        if n.is_finite() {
            Ok(n)
        } else {
            Err(BindError::invalid(field, self, "not a finite number"))
        }
    }

    /// The tokens this value stands for: text is split on `separator`, a list
    /// is taken as is, a number is a single token. Booleans have no tokens.
    pub fn to_tokens(&self, field: &str, separator: char) -> Result<Vec<String>> {
        match self {
            Value::Missing => Ok(Vec::new()),
            Value::Text(s) => Ok(s.split(separator).map(str::to_owned).collect()),
            Value::List(v) => Ok(v.clone()),
            Value::Number(_) => Ok(vec![self.to_number(field)?.to_string()]),
            Value::Bool(_) => Err(BindError::invalid(field, self, "expected text or a list")),
        }
    }

    /// A single scalar token, for fields holding exactly one value.
    pub fn to_scalar(&self, field: &str) -> Result<String> {
        match self {
            Value::Missing => Ok(MISSING.to_owned()),
            Value::Text(s) => Ok(s.clone()),
            Value::Number(_) => Ok(self.to_number(field)?.to_string()),
            Value::List(v) if v.len() == 1 => Ok(v[0].clone()),
            _ => Err(BindError::invalid(field, self, "expected a single value")),
        }
    }
}

/// Fail unless `token` is free of every character in `reserved`.
pub(crate) fn check_reserved(field: &str, token: &str, reserved: &[char]) -> Result<()> {
    match token.chars().find(|c| reserved.contains(c)) {
        Some(c) => Err(BindError::invalid(
            field,
            token,
            format!("{:?} is a separator in this column", c),
        )),
        None => Ok(()),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => f.write_str(MISSING),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::List(v) => write!(f, "{}", v.iter().join(&VALUE_SEPARATOR.to_string())),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::List(v)
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Value::List(v.into_iter().map(str::to_owned).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Missing, Into::into)
    }
}
