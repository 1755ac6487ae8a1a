use crate::ansi;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Maximum number of [`LogValue`] indirections followed when resolving a value.
const MAX_RESOLVE_DEPTH: usize = 100;

/// A value attached to a log record or accumulated on a handler.
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Duration(Duration),
    Time(DateTime<Utc>),
    /// Nested attributes rendered as a group named after the owning key.
    Group(Vec<Attr>),
    /// Arbitrary structured data.
    Json(serde_json::Value),
    /// A value that computes its own representation, see [`LogValue`].
    Any(Arc<dyn LogValue>),
}

/// Capability for values that know how to present themselves.
///
/// `log_value` is what every handler sees by default, including the JSON
/// handler. `terminal_value` is an optional alternative used only by
/// terminal handlers while color output is active; it may carry SGR escape
/// sequences, anything else is removed by the sanitizer before display.
pub trait LogValue: fmt::Debug + Send + Sync {
    fn log_value(&self) -> Value;

    fn terminal_value(&self) -> Option<Value> {
        None
    }
}

impl Value {
    /// Follows [`Value::Any`] indirections until a concrete value is reached.
    ///
    /// When `terminal` is true, a value's terminal representation is preferred.
    /// The second element reports whether any terminal representation was used.
    pub fn resolve(&self, terminal: bool) -> (Value, bool) {
        let mut current = self.clone();
        let mut used_terminal = false;
        for _ in 0..MAX_RESOLVE_DEPTH {
            let Value::Any(inner) = &current else {
                return (current, used_terminal);
            };
            let next = match terminal.then(|| inner.terminal_value()).flatten() {
                Some(value) => {
                    used_terminal = true;
                    value
                }
                None => inner.log_value(),
            };
            current = next;
        }
        (
            Value::String("!ERROR: LogValue resolution too deep".to_string()),
            false,
        )
    }

    pub fn any(value: impl LogValue + 'static) -> Value {
        Value::Any(Arc::new(value))
    }
}

impl fmt::Display for Value {
    /// Unstyled text form. Escape sequences are not removed here.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::I64(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Duration(d) => write!(f, "{d:?}"),
            Value::Time(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Group(attrs) => {
                f.write_str("[")?;
                for (i, attr) in attrs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}={}", attr.key, attr.value)?;
                }
                f.write_str("]")
            }
            Value::Json(v) => write!(f, "{v}"),
            Value::Any(_) => write!(f, "{}", self.resolve(false).0),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::U64(v) => serializer.serialize_u64(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Duration(d) => {
                serializer.serialize_u64(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            }
            Value::Time(t) => t.serialize(serializer),
            Value::Group(attrs) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(attrs.len()))?;
                for attr in attrs {
                    map.serialize_entry(&attr.key, &attr.value)?;
                }
                map.end()
            }
            Value::Json(v) => v.serialize(serializer),
            Value::Any(_) => self.resolve(false).0.serialize(serializer),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v.into())
            }
        })*
    };
}

impl_from! {
    String => String,
    &str => String,
    i64 => I64,
    i32 => I64,
    u64 => U64,
    u32 => U64,
    f64 => F64,
    bool => Bool,
    Duration => Duration,
    DateTime<Utc> => Time,
    serde_json::Value => Json,
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::U64(v as u64)
    }
}

impl From<Vec<Attr>> for Value {
    fn from(attrs: Vec<Attr>) -> Self {
        Value::Group(attrs)
    }
}

/// A key/value pair.
#[derive(Debug, Clone)]
pub struct Attr {
    pub key: String,
    pub value: Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Attr {
            key: key.into(),
            value: value.into(),
        }
    }

    /// An attribute holding nested attributes.
    pub fn group(key: impl Into<String>, attrs: Vec<Attr>) -> Self {
        Attr {
            key: key.into(),
            value: Value::Group(attrs),
        }
    }

    /// True for group attributes without any members, which handlers omit.
    pub(crate) fn is_empty_group(&self) -> bool {
        matches!(&self.value, Value::Group(attrs) if attrs.is_empty())
    }
}

/// Text that may carry SGR escape sequences for terminals.
///
/// Terminal handlers with color enabled display the original text (after
/// sanitization). Everything else sees the text with all escape sequences
/// removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalValue {
    text: String,
}

impl TerminalValue {
    pub fn new(text: impl Into<String>) -> Self {
        TerminalValue { text: text.into() }
    }
}

impl fmt::Display for TerminalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ansi::strip(&self.text))
    }
}

impl Serialize for TerminalValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl LogValue for TerminalValue {
    fn log_value(&self) -> Value {
        Value::String(self.to_string())
    }

    fn terminal_value(&self) -> Option<Value> {
        Some(Value::String(self.text.clone()))
    }
}

impl From<TerminalValue> for Value {
    fn from(v: TerminalValue) -> Self {
        Value::any(v)
    }
}
