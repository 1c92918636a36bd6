//! Persistence layer.
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers, auth::permissions)
//! └──────┬──────┘
//!        │  Arc<dyn CredentialStore> / Arc<dyn PetRepository>
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers for Postgres, db::memory in-process)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - stored records)
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: store traits and Postgres implementations
//! - [`memory`]: `DashMap`-backed implementations for the `memory` backend and tests
//! - [`models`]: record structures matching the table schemas
//! - [`errors`]: store error type

pub mod errors;
pub mod handlers;
pub mod memory;
pub mod models;
