//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Request/response data structures
//! - **[`json`]**: the JSON body extractor used by every handler that takes a body
//!
//! # API Structure
//!
//! Everything is mounted under `/api`:
//!
//! - **Identity** (`/api/users`, `/api/login`, `/api/auth`): registration, login, whoami
//! - **Pets** (`/api/pets/*`): create, list, read, rename, interact, delete
//!
//! The OpenAPI document is served at `/api/openapi.json`.

pub mod handlers;
pub mod json;
pub mod models;
