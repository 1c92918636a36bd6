//! Common type definitions shared by the API, auth and database layers.
//!
//! # ID Types
//!
//! All entity IDs are UUIDs wrapped in type aliases:
//!
//! - [`UserId`]: registered identity
//! - [`PetId`]: pet record
//!
//! # Operations
//!
//! [`Operation`] names what a caller is trying to do with a single pet. It is carried by
//! authorization errors so the server-side log says which operation was refused.

use std::fmt;
use uuid::Uuid;

pub type UserId = Uuid;
pub type PetId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// Operations that can be performed on a single pet record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Rename,
    Interact,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read => write!(f, "read"),
            Operation::Rename => write!(f, "rename"),
            Operation::Interact => write!(f, "interact with"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbrev_uuid() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(abbrev_uuid(&id), "550e8400");
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Interact.to_string(), "interact with");
        assert_eq!(Operation::Delete.to_string(), "delete");
    }
}
