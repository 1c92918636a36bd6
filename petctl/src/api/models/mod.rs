//! Request and response types for the HTTP API.
//!
//! Each endpoint has explicit request and response structs deriving `serde` and
//! `utoipa::ToSchema`. Conversions from [`crate::db::models`] records live next to the
//! response types.

pub mod auth;
pub mod pets;
pub mod users;
