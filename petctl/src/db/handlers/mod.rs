//! Store contracts and their Postgres implementations.
//!
//! Each repository:
//! - Wraps a shared SQLx connection pool
//! - Provides strongly-typed operations returning [`crate::db::models`] records
//! - Leans on single statements (`INSERT/UPDATE ... RETURNING`) for per-record atomicity
//!
//! # Available Repositories
//!
//! - [`Users`]: identity persistence behind [`CredentialStore`]
//! - [`Pets`]: pet records behind [`Repository`] / [`PetRepository`]
//!
//! The in-memory counterparts live in [`crate::db::memory`].

pub mod pets;
pub mod repository;
pub mod users;

pub use pets::{PetFilter, PetRepository, Pets};
pub use repository::{CredentialStore, Repository};
pub use users::Users;
