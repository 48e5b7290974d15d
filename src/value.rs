//! The data a template is bound against: JSON-shaped, as a closed
//! set of variants.

use std::fmt::{self, Display, Write};

use anyhow::{Result, Context};
use kstring::KString;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(KString),
    Array(Vec<Value>),
    /// Members in source order.
    Object(Vec<(KString, Value)>),
}

impl Value {
    pub fn from_json_str(s: &str) -> Result<Value> {
        let v: serde_json::Value = serde_json::from_str(s)
            .context("parsing JSON data")?;
        Ok(v.into())
    }

    /// The member `key` of an object (the last one, should the same
    /// key appear twice).
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(members) =>
                members.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None
        }
    }

    /// Whether the value counts as "true" in a conditional. Only
    /// `false`, `0`, NaN, the empty string and `null` are false;
    /// empty arrays and objects are true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => !(*n == 0.0 || n.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// The string that is spliced into text and attribute values.
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }
}

/// Truthiness of an optional (possibly undefined) value.
pub fn is_truthy(v: Option<&Value>) -> bool {
    v.map_or(false, Value::is_truthy)
}

fn write_number(n: f64, f: &mut fmt::Formatter) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        // also -0
        f.write_char('0')
    } else {
        // LowerExp gives the shortest round-trip digits, "1.5e-7"
        let sci = format!("{n:e}");
        let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let exp: i32 = exp.parse().unwrap_or(0);
        if (-7 < exp) && (exp < 21) {
            write!(f, "{n}")
        } else if exp < 0 {
            write!(f, "{mantissa}e{exp}")
        } else {
            write!(f, "{mantissa}e+{exp}")
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write_number(*n, f),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    Display::fmt(item, f)?;
                }
                Ok(())
            }
            Value::Object(_) => f.write_str("[object Object]"),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) =>
                // as_f64 only fails for arbitrary precision numbers
                Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(KString::from_string(s)),
            serde_json::Value::Array(items) =>
                Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(members) =>
                Value::Object(members.into_iter().map(
                    |(k, v)| (KString::from_string(k), Value::from(v))).collect()),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(s) => serde_json::Value::String(s.to_string()),
            Value::Array(items) =>
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect()),
            Value::Object(members) =>
                serde_json::Value::Object(members.iter().map(
                    |(k, v)| (k.to_string(), serde_json::Value::from(v))).collect()),
        }
    }
}

impl Value {
    /// Serialize back to JSON text (for the cache).
    pub fn to_json_string(&self) -> String {
        serde_json::Value::from(self).to_string()
    }
}
