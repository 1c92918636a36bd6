//! HTTP request handlers.
//!
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Authorization checks via [`crate::auth::permissions`] where a single pet is involved
//! - Calling the stores in [`crate::AppState`]
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`auth`]: registration, login, and the current identity
//! - [`pets`]: pet CRUD, rename and interaction
//!
//! Handlers return [`crate::errors::Error`], which converts to the status code and JSON body
//! clients expect.

pub mod auth;
pub mod pets;
