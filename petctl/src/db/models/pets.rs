//! Database models for pets.

use crate::types::{PetId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new pet
#[derive(Debug, Clone)]
pub struct PetCreateDBRequest {
    pub user_id: UserId,
    pub name: String,
    pub color: String,
    pub last_interaction_date: DateTime<Utc>,
}

/// Database request for updating a pet
///
/// `None` fields are left untouched. An interaction timestamp never moves the stored value
/// backwards: the store writes `max(interacted_at, previous + 1ms)`.
#[derive(Debug, Clone, Default)]
pub struct PetUpdateDBRequest {
    pub name: Option<String>,
    pub interacted_at: Option<DateTime<Utc>>,
}

impl PetUpdateDBRequest {
    pub fn rename(name: String) -> Self {
        Self {
            name: Some(name),
            ..Default::default()
        }
    }

    pub fn interact(at: DateTime<Utc>) -> Self {
        Self {
            interacted_at: Some(at),
            ..Default::default()
        }
    }
}

/// Database response for a pet
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PetDBResponse {
    pub id: PetId,
    pub user_id: UserId,
    pub name: String,
    pub color: String,
    pub last_interaction_date: DateTime<Utc>,
}
