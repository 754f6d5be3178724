//! Entity records managed by the console.
//!
//! Field names follow the backend's camelCase JSON. Optional text fields
//! decode `null`, numbers, and absent keys leniently so records written by
//! older clients still load.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::record::{Record, RecordId};

/// City a user lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    /// Primary key.
    pub id: RecordId,
    /// Display name.
    #[serde(default, deserialize_with = "text_or_empty")]
    pub name: String,
}

impl City {
    /// Build a city record.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(id),
            name: name.into(),
        }
    }
}

impl Record for City {
    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(self.id.to_value()),
            "name" => Some(Value::from(self.name.as_str())),
            _ => None,
        }
    }
}

/// Group a user can belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Primary key.
    pub id: RecordId,
    /// Display name.
    #[serde(default, deserialize_with = "text_or_empty")]
    pub group_name: String,
}

impl Group {
    /// Build a group record.
    pub fn new(id: i64, group_name: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(id),
            group_name: group_name.into(),
        }
    }
}

impl Record for Group {
    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(self.id.to_value()),
            "groupName" => Some(Value::from(self.group_name.as_str())),
            _ => None,
        }
    }
}

/// Application user.
///
/// ## Invariants
/// - `id` is `None` only for a draft that the backend has not stored yet.
/// - Each fetch yields a fresh snapshot; edits produce a replacement record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Primary key, assigned by the backend on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// First name.
    #[serde(default, deserialize_with = "text_or_empty")]
    pub first_name: String,
    /// Last name.
    #[serde(default, deserialize_with = "text_or_empty")]
    pub last_name: String,
    /// Email address, unique across users.
    #[serde(default, deserialize_with = "text_or_empty")]
    pub email: String,
    /// Ten-digit phone number.
    #[serde(default, deserialize_with = "text_or_empty")]
    pub phone_number: String,
    /// Postal address.
    #[serde(default, deserialize_with = "text_or_empty")]
    pub address: String,
    /// One of the form's gender options, or empty.
    #[serde(default, deserialize_with = "text_or_empty")]
    pub gender: String,
    /// Home city.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<City>,
    /// Group memberships.
    #[serde(default, deserialize_with = "list_or_empty")]
    pub groups: Vec<Group>,
}

impl Record for User {
    fn field(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(self.id.map_or(Value::Null, RecordId::to_value)),
            "firstName" => Some(Value::from(self.first_name.as_str())),
            "lastName" => Some(Value::from(self.last_name.as_str())),
            "email" => Some(Value::from(self.email.as_str())),
            "phoneNumber" => Some(Value::from(self.phone_number.as_str())),
            "address" => Some(Value::from(self.address.as_str())),
            "gender" => Some(Value::from(self.gender.as_str())),
            "city" => Some(
                self.city
                    .as_ref()
                    .and_then(|city| serde_json::to_value(city).ok())
                    .unwrap_or(Value::Null),
            ),
            "groups" => serde_json::to_value(&self.groups).ok(),
            _ => None,
        }
    }
}

fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected text, found {other}"
        ))),
    }
}

fn list_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
