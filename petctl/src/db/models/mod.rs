//! Database record models matching table schemas.
//!
//! These are the shapes the store contracts accept and return. They are kept apart from the
//! API models so the wire format and the storage format can change independently; in
//! particular [`users::UserDBResponse`] carries the password hash, which no API model does.
//!
//! - [`users`]: registered identities
//! - [`pets`]: pet records and their single owner

pub mod pets;
pub mod users;
