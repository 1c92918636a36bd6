//! Database repository for pets.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::pets::{PetCreateDBRequest, PetDBResponse, PetUpdateDBRequest},
};
use crate::types::{PetId, UserId, abbrev_uuid};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing pets
#[derive(Debug, Clone, Default)]
pub struct PetFilter {
    /// Restrict to pets owned by this user
    pub owner: Option<UserId>,
}

impl PetFilter {
    pub fn owned_by(owner: UserId) -> Self {
        Self { owner: Some(owner) }
    }
}

/// The repository shape request handlers depend on, independent of backend.
pub trait PetRepository:
    Repository<
        CreateRequest = PetCreateDBRequest,
        UpdateRequest = PetUpdateDBRequest,
        Response = PetDBResponse,
        Id = PetId,
        Filter = PetFilter,
    >
{
}

impl<T> PetRepository for T where
    T: Repository<
            CreateRequest = PetCreateDBRequest,
            UpdateRequest = PetUpdateDBRequest,
            Response = PetDBResponse,
            Id = PetId,
            Filter = PetFilter,
        >
{
}

/// Postgres-backed pet repository
#[derive(Debug, Clone)]
pub struct Pets {
    pool: PgPool,
}

impl Pets {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PET_COLUMNS: &str = "id, user_id, name, color, last_interaction_date";

#[async_trait::async_trait]
impl Repository for Pets {
    type CreateRequest = PetCreateDBRequest;
    type UpdateRequest = PetUpdateDBRequest;
    type Response = PetDBResponse;
    type Id = PetId;
    type Filter = PetFilter;

    #[instrument(skip(self, request), fields(owner = %abbrev_uuid(&request.user_id)), err)]
    async fn create(&self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let pet_id = Uuid::new_v4();

        let pet = sqlx::query_as::<_, PetDBResponse>(&format!(
            "INSERT INTO pets (id, user_id, name, color, last_interaction_date) VALUES ($1, $2, $3, $4, $5) RETURNING {PET_COLUMNS}"
        ))
        .bind(pet_id)
        .bind(request.user_id)
        .bind(&request.name)
        .bind(&request.color)
        .bind(request.last_interaction_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(pet)
    }

    #[instrument(skip(self), fields(pet_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&self, id: Self::Id) -> Result<Option<Self::Response>> {
        let pet = sqlx::query_as::<_, PetDBResponse>(&format!("SELECT {PET_COLUMNS} FROM pets WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(pet)
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let pets = sqlx::query_as::<_, PetDBResponse>(&format!(
            r#"SELECT {PET_COLUMNS} FROM pets WHERE ($1::uuid IS NULL OR user_id = $1) ORDER BY name COLLATE "C" ASC, id ASC"#
        ))
        .bind(filter.owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(pets)
    }

    #[instrument(skip(self), fields(pet_id = %abbrev_uuid(&id)), err)]
    async fn delete(&self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pets WHERE id = $1").bind(id).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(pet_id = %abbrev_uuid(&id)), err)]
    async fn update(&self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Single statement, so concurrent interactions serialize on the row lock
        let pet = sqlx::query_as::<_, PetDBResponse>(&format!(
            r#"
            UPDATE pets SET
                name = COALESCE($2, name),
                last_interaction_date = CASE
                    WHEN $3::timestamptz IS NULL THEN last_interaction_date
                    ELSE GREATEST($3::timestamptz, last_interaction_date + INTERVAL '1 millisecond')
                END
            WHERE id = $1
            RETURNING {PET_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.name.as_deref())
        .bind(request.interacted_at)
        .fetch_optional(&self.pool)
        .await?;

        pet.ok_or(DbError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{
        handlers::{repository::CredentialStore, users::Users},
        models::users::UserCreateDBRequest,
    };
    use chrono::{DateTime, SubsecRound, TimeDelta, Utc};

    async fn create_owner(pool: &PgPool, email: &str) -> UserId {
        Users::new(pool.clone())
            .create(&UserCreateDBRequest {
                name: "Owner".to_string(),
                email: email.to_string(),
                password_hash: "$argon2id$fake".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    fn pet_request(owner: UserId, name: &str) -> PetCreateDBRequest {
        PetCreateDBRequest {
            user_id: owner,
            name: name.to_string(),
            color: "red".to_string(),
            last_interaction_date: Utc::now().trunc_subsecs(3),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get(pool: PgPool) {
        let repo = Pets::new(pool.clone());
        let owner = create_owner(&pool, "owner@example.com").await;

        let request = pet_request(owner, "Rex");
        let created = repo.create(&request).await.unwrap();
        assert_eq!(created.user_id, owner);
        assert_eq!(created.name, "Rex");
        assert_eq!(created.last_interaction_date, request.last_interaction_date);

        let found = repo.get_by_id(created.id).await.unwrap();
        assert_eq!(found, Some(created));
        assert!(repo.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_filters_by_owner_sorted_by_name(pool: PgPool) {
        let repo = Pets::new(pool.clone());
        let alice = create_owner(&pool, "alice@example.com").await;
        let bob = create_owner(&pool, "bob@example.com").await;

        repo.create(&pet_request(alice, "zed")).await.unwrap();
        repo.create(&pet_request(bob, "Bob's")).await.unwrap();
        repo.create(&pet_request(alice, "Zed")).await.unwrap();
        repo.create(&pet_request(alice, "Ace")).await.unwrap();

        let listed = repo.list(&PetFilter::owned_by(alice)).await.unwrap();
        let names: Vec<_> = listed.iter().map(|p| p.name.as_str()).collect();
        // Byte order, same as the in-memory store: uppercase before lowercase
        assert_eq!(names, vec!["Ace", "Zed", "zed"]);

        assert_eq!(repo.list(&PetFilter::default()).await.unwrap().len(), 4);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_rename_keeps_other_fields(pool: PgPool) {
        let repo = Pets::new(pool.clone());
        let owner = create_owner(&pool, "owner@example.com").await;
        let pet = repo.create(&pet_request(owner, "Rex")).await.unwrap();

        let renamed = repo.update(pet.id, &PetUpdateDBRequest::rename("Max".to_string())).await.unwrap();
        assert_eq!(renamed.name, "Max");
        assert_eq!(renamed.color, pet.color);
        assert_eq!(renamed.last_interaction_date, pet.last_interaction_date);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_interact_never_moves_backwards(pool: PgPool) {
        let repo = Pets::new(pool.clone());
        let owner = create_owner(&pool, "owner@example.com").await;
        let pet = repo.create(&pet_request(owner, "Rex")).await.unwrap();

        let past = DateTime::<Utc>::from_timestamp_millis(0).unwrap();
        let updated = repo.update(pet.id, &PetUpdateDBRequest::interact(past)).await.unwrap();
        assert_eq!(updated.last_interaction_date, pet.last_interaction_date + TimeDelta::milliseconds(1));
        assert_eq!(updated.name, "Rex");

        let later = updated.last_interaction_date + TimeDelta::seconds(5);
        let updated = repo.update(pet.id, &PetUpdateDBRequest::interact(later)).await.unwrap();
        assert_eq!(updated.last_interaction_date, later);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_missing_pet_is_not_found(pool: PgPool) {
        let repo = Pets::new(pool);

        let err = repo
            .update(Uuid::new_v4(), &PetUpdateDBRequest::rename("x".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_reports_whether_removed(pool: PgPool) {
        let repo = Pets::new(pool.clone());
        let owner = create_owner(&pool, "owner@example.com").await;
        let pet = repo.create(&pet_request(owner, "Rex")).await.unwrap();

        assert!(repo.delete(pet.id).await.unwrap());
        assert!(!repo.delete(pet.id).await.unwrap());
        assert!(repo.get_by_id(pet.id).await.unwrap().is_none());
    }
}
