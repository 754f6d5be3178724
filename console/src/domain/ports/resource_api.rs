//! Port abstraction for the REST resources the console manages.
use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::RecordId;

use super::define_port_error;

/// Backend collection addressed by the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    /// `user/`
    User,
    /// `city/`
    City,
    /// `group/`
    Group,
}

impl Resource {
    /// Every resource the console touches.
    pub const ALL: [Self; 3] = [Self::User, Self::City, Self::Group];

    /// Path segment relative to the API base URL, trailing slash included.
    pub const fn path(self) -> &'static str {
        match self {
            Self::User => "user/",
            Self::City => "city/",
            Self::Group => "group/",
        }
    }

    /// Collection name without the trailing slash.
    pub const fn name(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::City => "city",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

define_port_error! {
    /// Errors raised by resource API adapters.
    pub enum ResourceApiError {
        /// The backend could not be reached.
        Transport => "resource request failed",
        /// The backend did not answer in time.
        Timeout => "resource request timed out",
        /// The addressed record does not exist.
        NotFound => "resource not found",
        /// The backend refused the request.
        Rejected => "resource request rejected",
        /// The response body could not be decoded.
        Decode => "resource response malformed",
    }
}

/// CRUD access to JSON collections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// Fetch every record of `resource`.
    async fn get_all(&self, resource: Resource) -> Result<Value, ResourceApiError>;

    /// Create a record and return the stored form.
    async fn post(&self, resource: Resource, body: Value) -> Result<Value, ResourceApiError>;

    /// Replace the record keyed by `id` and return the stored form.
    async fn put(&self, resource: Resource, id: RecordId, body: Value)
    -> Result<Value, ResourceApiError>;

    /// Delete the record keyed by `id`.
    async fn delete(&self, resource: Resource, id: RecordId) -> Result<Value, ResourceApiError>;
}
