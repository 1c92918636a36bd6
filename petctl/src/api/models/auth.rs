//! API request/response models for registration and login.

use crate::{
    config::PasswordConfig,
    errors::{Error, FieldError},
};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Registration request.
///
/// Missing fields deserialize as empty so they are reported by [`RegisterRequest::validate`]
/// alongside any other problems, instead of failing JSON extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self, password: &PasswordConfig) -> Result<(), Error> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Please enter your name"));
        }
        if !EmailAddress::is_valid(&self.email) {
            errors.push(FieldError::new("email", "Please enter a valid email"));
        }
        let length = self.password.chars().count();
        if length < password.min_length {
            errors.push(FieldError::new(
                "password",
                format!("Please enter a password with {} or more characters", password.min_length),
            ));
        } else if length > password.max_length {
            errors.push(FieldError::new(
                "password",
                format!("Please enter a password with at most {} characters", password.max_length),
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(Error::Validation { errors }) }
    }
}

/// Login request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), Error> {
        let mut errors = Vec::new();

        if !EmailAddress::is_valid(&self.email) {
            errors.push(FieldError::new("email", "Please enter a valid email"));
        }
        if self.password.is_empty() {
            errors.push(FieldError::new("password", "A password is required"));
        }

        if errors.is_empty() { Ok(()) } else { Err(Error::Validation { errors }) }
    }
}

/// Returned by both registration and login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}
