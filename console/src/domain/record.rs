//! Named-field access shared by the generic table and selector widgets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Read access to a record's fields by wire name.
///
/// The generic widgets only ever look fields up by the names held in their
/// configuration, so entities expose themselves through this trait rather
/// than through their concrete type.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use user_console::domain::Record;
///
/// let city = json!({ "id": 1, "name": "Springfield" });
/// assert_eq!(city.field("name"), Some(json!("Springfield")));
/// assert_eq!(city.field("zip"), None);
/// ```
pub trait Record {
    /// Return the value stored under `key`, if the record has such a field.
    fn field(&self, key: &str) -> Option<Value>;
}

impl Record for Value {
    fn field(&self, key: &str) -> Option<Value> {
        self.as_object()?.get(key).cloned()
    }
}

/// Render a JSON value as display text.
///
/// Strings are returned unquoted and `null` renders as an empty string; every
/// other value uses its compact JSON form.
pub fn label_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Compare two field values the way the lookup helpers expect.
///
/// Identical values match; scalars also match when their display text is
/// equal, so `7` and `"7"` identify the same record.
pub fn values_match(left: &Value, right: &Value) -> bool {
    if left == right {
        return true;
    }
    let scalar = |value: &Value| matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_));
    scalar(left) && scalar(right) && label_text(left) == label_text(right)
}

/// Validation errors raised while parsing a [`RecordId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordIdError {
    /// The identifier text is not an integer.
    #[error("record id must be an integer, got {raw:?}")]
    NotAnInteger {
        /// Offending input.
        raw: String,
    },
}

/// Backend-assigned primary key.
///
/// The backend assigns ascending integers; identifiers sent as numeric strings
/// are accepted on input and always written back as numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawRecordId", into = "i64")]
pub struct RecordId(i64);

impl RecordId {
    /// Wrap a raw integer identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Underlying integer.
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Interpret a JSON field value as an identifier.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_i64().map(Self),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// JSON representation used for field comparisons.
    pub fn to_value(self) -> Value {
        Value::from(self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = RecordIdError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| RecordIdError::NotAnInteger {
                raw: raw.to_owned(),
            })
    }
}

impl From<RecordId> for i64 {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRecordId {
    Number(i64),
    Text(String),
}

impl TryFrom<RawRecordId> for RecordId {
    type Error = RecordIdError;

    fn try_from(value: RawRecordId) -> Result<Self, Self::Error> {
        match value {
            RawRecordId::Number(raw) => Ok(Self(raw)),
            RawRecordId::Text(raw) => raw.parse(),
        }
    }
}
