//! Typed access to the backend resources.
//!
//! [`Api`] wraps a [`ResourceApi`] adapter, encodes and decodes entity
//! records, and maps adapter failures onto [`DomainError`].

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::error::DomainError;
use super::models::{City, Group, User};
use super::ports::{Resource, ResourceApi, ResourceApiError};
use super::record::RecordId;

fn map_resource_error(resource: Resource, error: ResourceApiError) -> DomainError {
    match error {
        ResourceApiError::Transport { message } | ResourceApiError::Timeout { message } => {
            DomainError::service_unavailable(format!("{resource} backend unavailable: {message}"))
        }
        ResourceApiError::NotFound { message } => {
            DomainError::not_found(format!("{resource} not found: {message}"))
        }
        ResourceApiError::Rejected { message } => {
            DomainError::invalid_request(format!("{resource} request rejected: {message}"))
        }
        ResourceApiError::Decode { message } => {
            DomainError::internal(format!("{resource} response malformed: {message}"))
        }
    }
}

/// Typed facade over a [`ResourceApi`] adapter.
#[derive(Clone)]
pub struct Api {
    inner: Arc<dyn ResourceApi>,
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api").finish_non_exhaustive()
    }
}

impl Api {
    /// Wrap an adapter.
    pub fn new(inner: Arc<dyn ResourceApi>) -> Self {
        Self { inner }
    }

    /// Fetch and decode every record of `resource`.
    pub async fn get_all<T: DeserializeOwned>(
        &self,
        resource: Resource,
    ) -> Result<Vec<T>, DomainError> {
        let body = self
            .inner
            .get_all(resource)
            .await
            .map_err(|err| map_resource_error(resource, err))?;
        serde_json::from_value(body).map_err(|err| {
            debug!(%resource, error = %err, "collection did not decode");
            DomainError::internal(format!("{resource} collection malformed: {err}"))
        })
    }

    /// Create `record`, returning the stored form as sent back by the backend.
    pub async fn post<T: Serialize + Sync>(
        &self,
        resource: Resource,
        record: &T,
    ) -> Result<Value, DomainError> {
        let body = encode(resource, record)?;
        self.inner
            .post(resource, body)
            .await
            .map_err(|err| map_resource_error(resource, err))
    }

    /// Replace the record keyed by `id` with `record`.
    pub async fn put<T: Serialize + Sync>(
        &self,
        resource: Resource,
        id: RecordId,
        record: &T,
    ) -> Result<Value, DomainError> {
        let body = encode(resource, record)?;
        self.inner
            .put(resource, id, body)
            .await
            .map_err(|err| map_resource_error(resource, err))
    }

    /// Delete the record keyed by `id`.
    pub async fn delete(&self, resource: Resource, id: RecordId) -> Result<(), DomainError> {
        self.inner
            .delete(resource, id)
            .await
            .map(|_| ())
            .map_err(|err| map_resource_error(resource, err))
    }

    /// Every stored user.
    pub async fn users(&self) -> Result<Vec<User>, DomainError> {
        self.get_all(Resource::User).await
    }

    /// Every stored city.
    pub async fn cities(&self) -> Result<Vec<City>, DomainError> {
        self.get_all(Resource::City).await
    }

    /// Every stored group.
    pub async fn groups(&self) -> Result<Vec<Group>, DomainError> {
        self.get_all(Resource::Group).await
    }
}

fn encode<T: Serialize>(resource: Resource, record: &T) -> Result<Value, DomainError> {
    serde_json::to_value(record)
        .map_err(|err| DomainError::internal(format!("{resource} record did not encode: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockResourceApi;
    use mockall::predicate::eq;
    use rstest::rstest;
    use serde_json::json;

    fn api(mock: MockResourceApi) -> Api {
        Api::new(Arc::new(mock))
    }

    #[rstest]
    #[tokio::test]
    async fn get_all_decodes_records() {
        let mut mock = MockResourceApi::new();
        mock.expect_get_all()
            .with(eq(Resource::City))
            .times(1)
            .returning(|_| Ok(json!([{ "id": 1, "name": "Springfield" }])));

        let cities = api(mock).cities().await.expect("cities decode");
        assert_eq!(cities, vec![City::new(1, "Springfield")]);
    }

    #[rstest]
    #[tokio::test]
    async fn non_array_bodies_are_internal_errors() {
        let mut mock = MockResourceApi::new();
        mock.expect_get_all()
            .returning(|_| Ok(json!({ "unexpected": true })));

        let err = api(mock).groups().await.expect_err("object is not a collection");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[case::transport(ResourceApiError::transport("refused"), ErrorCode::ServiceUnavailable)]
    #[case::timeout(ResourceApiError::timeout("10s"), ErrorCode::ServiceUnavailable)]
    #[case::not_found(ResourceApiError::not_found("user/9"), ErrorCode::NotFound)]
    #[case::rejected(ResourceApiError::rejected("400"), ErrorCode::InvalidRequest)]
    #[case::decode(ResourceApiError::decode("eof"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn adapter_errors_map_to_domain_codes(
        #[case] failure: ResourceApiError,
        #[case] expected: ErrorCode,
    ) {
        let mut mock = MockResourceApi::new();
        mock.expect_delete()
            .with(eq(Resource::User), eq(RecordId::new(9)))
            .times(1)
            .returning(move |_, _| Err(failure.clone()));

        let err = api(mock)
            .delete(Resource::User, RecordId::new(9))
            .await
            .expect_err("delete fails");
        assert_eq!(err.code(), expected);
        assert!(err.message().starts_with("user "));
    }

    #[rstest]
    #[tokio::test]
    async fn put_sends_the_encoded_record() {
        let user = User {
            id: Some(RecordId::new(3)),
            first_name: "Al".to_owned(),
            email: "al@x.com".to_owned(),
            ..User::default()
        };
        let mut mock = MockResourceApi::new();
        mock.expect_put()
            .withf(|resource, id, body| {
                *resource == Resource::User
                    && *id == RecordId::new(3)
                    && body["firstName"] == json!("Al")
                    && body["groups"] == json!([])
            })
            .times(1)
            .returning(|_, _, body| Ok(body));

        let stored = api(mock)
            .put(Resource::User, RecordId::new(3), &user)
            .await
            .expect("put succeeds");
        assert_eq!(stored["id"], json!(3));
    }
}
