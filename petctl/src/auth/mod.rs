//! Authentication and authorization.
//!
//! # Flow
//!
//! 1. `POST /api/users` or `POST /api/login` checks credentials against the
//!    [`CredentialStore`](crate::db::handlers::CredentialStore) using [`password`] and returns a
//!    token from [`session::TokenService`].
//! 2. The client sends that token back in the configured header (`x-auth-token` by default).
//! 3. [`middleware::require_session`] (or the [`CurrentUser`](crate::api::models::users::CurrentUser)
//!    extractor directly) verifies it and attaches the caller's identity to the request.
//! 4. Handlers touching a single pet call [`permissions::authorize_pet`] before doing anything.
//!
//! Sessions are stateless. There is no server-side logout or revocation: a token stays valid
//! until it expires.
//!
//! # Modules
//!
//! - [`current_user`]: the auth gate and the `CurrentUser` extractor
//! - [`middleware`]: route protection middleware
//! - [`password`]: password hashing and verification using Argon2
//! - [`permissions`]: per-pet ownership checks
//! - [`session`]: JWT issuance and verification

pub mod current_user;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod session;
