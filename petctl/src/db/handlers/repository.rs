//! Base store traits for persistence operations.

/// Contains the Repository and CredentialStore traits.
///
/// A repository is the data access layer for one kind of record. It provides methods for
/// creating, reading, updating and deleting entities, as well as listing them with simple
/// filters. Both the Postgres and the in-memory backends implement these traits, so request
/// handlers only ever see `Arc<dyn ...>` trait objects.
use crate::db::errors::Result;
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};
use crate::types::UserId;

/// Base repository trait providing common store operations
///
/// This trait has separate associated types for create requests, update requests, and responses.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    /// The request type for creating entities
    type CreateRequest;

    /// The request type for updating entities
    type UpdateRequest;

    /// The response/DTO type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// The filter type for list operations
    type Filter: Send + Sync;

    /// Create a new entity
    async fn create(&self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID
    async fn get_by_id(&self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// List entities matching the filter
    async fn list(&self, filter: &Self::Filter) -> Result<Vec<Self::Response>>;

    /// Delete an entity by ID. Returns false if nothing was deleted.
    async fn delete(&self, id: Self::Id) -> Result<bool>;

    /// Update an entity by ID
    async fn update(&self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response>;
}

/// Identity persistence used by registration, login and the `/auth` lookup.
///
/// Identities are created once and never mutated or deleted, so this is deliberately
/// narrower than [`Repository`].
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a new identity. A duplicate email yields [`DbError::UniqueViolation`].
    ///
    /// [`DbError::UniqueViolation`]: crate::db::errors::DbError::UniqueViolation
    async fn create(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse>;

    async fn get_by_id(&self, id: UserId) -> Result<Option<UserDBResponse>>;

    /// Exact, case-sensitive match on the stored email
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>>;
}
