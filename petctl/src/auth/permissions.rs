//! Ownership checks for single-pet operations.
//!
//! Every read, rename, interaction and delete goes through [`authorize_pet`], which loads the
//! record fresh from the store on each call. A missing pet is 404; a pet owned by someone else
//! is refused with a body that does not distinguish it from any other ownership failure.

use crate::{
    api::models::users::CurrentUser,
    db::{handlers::PetRepository, models::pets::PetDBResponse},
    errors::{Error, Result},
    types::{Operation, PetId, abbrev_uuid},
};
use tracing::instrument;
use uuid::Uuid;

pub fn pet_not_found(id: impl ToString) -> Error {
    Error::NotFound {
        resource: "Pet".to_string(),
        id: id.to_string(),
    }
}

/// Path ids that are not UUIDs cannot name a pet, so they are simply not found.
pub fn parse_pet_id(raw: &str) -> Result<PetId> {
    Uuid::parse_str(raw).map_err(|_| pet_not_found(raw))
}

pub fn check_ownership(user: &CurrentUser, pet: &PetDBResponse, action: Operation) -> Result<()> {
    if pet.user_id != user.id {
        return Err(Error::Forbidden {
            action,
            resource: format!("pet {}", abbrev_uuid(&pet.id)),
        });
    }
    Ok(())
}

/// Load a pet and confirm `user` owns it.
#[instrument(skip(pets, user), fields(user_id = %abbrev_uuid(&user.id), pet_id = %abbrev_uuid(&id)))]
pub async fn authorize_pet(pets: &dyn PetRepository, user: &CurrentUser, id: PetId, action: Operation) -> Result<PetDBResponse> {
    let pet = pets.get_by_id(id).await?.ok_or_else(|| pet_not_found(id))?;
    check_ownership(user, &pet, action)?;
    Ok(pet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{handlers::Repository, memory::MemoryPets, models::pets::PetCreateDBRequest};
    use chrono::Utc;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    /// Counts ERROR-level events seen while installed.
    #[derive(Clone, Default)]
    struct ErrorEvents(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for ErrorEvents {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    async fn pet_owned_by(pets: &MemoryPets, owner: Uuid) -> PetDBResponse {
        pets.create(&PetCreateDBRequest {
            user_id: owner,
            name: "Rex".to_string(),
            color: "brown".to_string(),
            last_interaction_date: Utc::now(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_owner_is_allowed() {
        let pets = MemoryPets::new();
        let owner = CurrentUser { id: Uuid::new_v4() };
        let pet = pet_owned_by(&pets, owner.id).await;

        let loaded = authorize_pet(&pets, &owner, pet.id, Operation::Read).await.unwrap();
        assert_eq!(loaded, pet);
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden_for_every_operation() {
        let pets = MemoryPets::new();
        let pet = pet_owned_by(&pets, Uuid::new_v4()).await;
        let intruder = CurrentUser { id: Uuid::new_v4() };

        for op in [Operation::Read, Operation::Rename, Operation::Interact, Operation::Delete] {
            let err = authorize_pet(&pets, &intruder, pet.id, op).await.unwrap_err();
            assert!(matches!(err, Error::Forbidden { action, .. } if action == op));
        }
    }

    #[tokio::test]
    async fn test_missing_pet_is_not_found() {
        let pets = MemoryPets::new();
        let user = CurrentUser { id: Uuid::new_v4() };

        let err = authorize_pet(&pets, &user, Uuid::new_v4(), Operation::Read).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_refusals_are_not_logged_as_errors() {
        let errors = ErrorEvents::default();
        let _guard = tracing_subscriber::registry().with(errors.clone()).set_default();

        let pets = MemoryPets::new();
        let pet = pet_owned_by(&pets, Uuid::new_v4()).await;
        let intruder = CurrentUser { id: Uuid::new_v4() };

        assert!(authorize_pet(&pets, &intruder, pet.id, Operation::Delete).await.is_err());
        assert!(authorize_pet(&pets, &intruder, Uuid::new_v4(), Operation::Read).await.is_err());

        assert_eq!(errors.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_parse_pet_id() {
        assert!(parse_pet_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(matches!(parse_pet_id("123"), Err(Error::NotFound { .. })));
    }
}
