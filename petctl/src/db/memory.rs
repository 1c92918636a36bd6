//! In-memory store backend.
//!
//! Used when `database.type` is `memory` and by the HTTP tests. State lives in [`DashMap`]s
//! and disappears with the process. Single-record updates hold the entry's shard lock for the
//! whole read-modify-write, matching the atomicity of the Postgres `UPDATE ... RETURNING`.

use crate::db::{
    errors::{DbError, Result},
    handlers::{
        pets::PetFilter,
        repository::{CredentialStore, Repository},
    },
    models::{
        pets::{PetCreateDBRequest, PetDBResponse, PetUpdateDBRequest},
        users::{UserCreateDBRequest, UserDBResponse},
    },
};
use crate::types::{PetId, UserId};
use chrono::{TimeDelta, Utc};
use dashmap::{DashMap, mapref::entry::Entry};
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryUsers {
    users: DashMap<UserId, UserDBResponse>,
    by_email: DashMap<String, UserId>,
}

impl MemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CredentialStore for MemoryUsers {
    #[instrument(skip(self, request), fields(email = %request.email), err)]
    async fn create(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        match self.by_email.entry(request.email.clone()) {
            Entry::Occupied(_) => Err(DbError::UniqueViolation {
                constraint: Some("users_email_unique".to_string()),
                table: Some("users".to_string()),
                message: format!("email {} already registered", request.email),
            }),
            Entry::Vacant(slot) => {
                let user = UserDBResponse {
                    id: Uuid::new_v4(),
                    name: request.name.clone(),
                    email: request.email.clone(),
                    password_hash: request.password_hash.clone(),
                    created_at: Utc::now(),
                };
                // Record goes in before the email slot is released
                self.users.insert(user.id, user.clone());
                slot.insert(user.id);
                Ok(user)
            }
        }
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<UserDBResponse>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>> {
        let Some(id) = self.by_email.get(email).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryPets {
    pets: DashMap<PetId, PetDBResponse>,
}

impl MemoryPets {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Repository for MemoryPets {
    type CreateRequest = PetCreateDBRequest;
    type UpdateRequest = PetUpdateDBRequest;
    type Response = PetDBResponse;
    type Id = PetId;
    type Filter = PetFilter;

    async fn create(&self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let pet = PetDBResponse {
            id: Uuid::new_v4(),
            user_id: request.user_id,
            name: request.name.clone(),
            color: request.color.clone(),
            last_interaction_date: request.last_interaction_date,
        };
        self.pets.insert(pet.id, pet.clone());
        Ok(pet)
    }

    async fn get_by_id(&self, id: Self::Id) -> Result<Option<Self::Response>> {
        Ok(self.pets.get(&id).map(|p| p.clone()))
    }

    async fn list(&self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut pets: Vec<PetDBResponse> = self
            .pets
            .iter()
            .filter(|p| filter.owner.is_none_or(|owner| p.user_id == owner))
            .map(|p| p.clone())
            .collect();
        pets.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(pets)
    }

    async fn delete(&self, id: Self::Id) -> Result<bool> {
        Ok(self.pets.remove(&id).is_some())
    }

    async fn update(&self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut pet = self.pets.get_mut(&id).ok_or(DbError::NotFound)?;

        if let Some(name) = &request.name {
            pet.name = name.clone();
        }
        if let Some(at) = request.interacted_at {
            pet.last_interaction_date = at.max(pet.last_interaction_date + TimeDelta::milliseconds(1));
        }

        Ok(pet.clone())
    }
}
