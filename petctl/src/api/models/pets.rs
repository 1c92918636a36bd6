//! API request/response models for pets.

use crate::db::models::pets::PetDBResponse;
use crate::errors::{Error, FieldError};
use crate::types::{PetId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PetCreate {
    pub name: String,
    pub color: String,
}

impl PetCreate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }
        if self.color.trim().is_empty() {
            errors.push(FieldError::new("color", "Color is required"));
        }

        if errors.is_empty() { Ok(()) } else { Err(Error::Validation { errors }) }
    }
}

/// Rename request. An empty or missing name leaves the current name in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PetRename {
    pub name: Option<String>,
}

impl PetRename {
    pub fn new_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PetResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: PetId,
    /// Owner id
    #[schema(value_type = String, format = "uuid")]
    pub user: UserId,
    pub name: String,
    pub color: String,
    /// Milliseconds since the Unix epoch
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub last_interaction_date: DateTime<Utc>,
}

impl From<PetDBResponse> for PetResponse {
    fn from(db: PetDBResponse) -> Self {
        Self {
            id: db.id,
            user: db.user_id,
            name: db.name,
            color: db.color,
            last_interaction_date: db.last_interaction_date,
        }
    }
}

/// Plain confirmation body, e.g. after a delete
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub msg: String,
}
