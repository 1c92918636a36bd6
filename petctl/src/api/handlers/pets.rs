use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use chrono::{SubsecRound, Utc};

use crate::{
    AppState,
    api::{
        json::ApiJson,
        models::{
            pets::{MessageResponse, PetCreate, PetRename, PetResponse},
            users::CurrentUser,
        },
    },
    auth::permissions::{authorize_pet, parse_pet_id, pet_not_found},
    db::{
        errors::DbError,
        handlers::PetFilter,
        models::pets::{PetCreateDBRequest, PetUpdateDBRequest},
    },
    errors::Error,
    types::{Operation, PetId},
};

/// Lost a race with a concurrent delete after the ownership check passed
fn vanished(id: PetId) -> impl FnOnce(DbError) -> Error {
    move |e| match e {
        DbError::NotFound => pet_not_found(id),
        other => other.into(),
    }
}

/// Create a pet owned by the caller
#[utoipa::path(
    post,
    path = "/pets",
    request_body = PetCreate,
    tag = "pets",
    responses(
        (status = 200, description = "Pet created", body = PetResponse),
        (status = 400, description = "Name or color missing"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("SessionToken" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_pet(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ApiJson(request): ApiJson<PetCreate>,
) -> Result<Json<PetResponse>, Error> {
    request.validate()?;

    let pet = state
        .pets
        .create(&PetCreateDBRequest {
            user_id: current_user.id,
            name: request.name,
            color: request.color,
            last_interaction_date: Utc::now().trunc_subsecs(3),
        })
        .await?;

    Ok(Json(PetResponse::from(pet)))
}

/// List the caller's pets, sorted by name
#[utoipa::path(
    get,
    path = "/pets",
    tag = "pets",
    responses(
        (status = 200, description = "The caller's pets", body = [PetResponse]),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("SessionToken" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_pets(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<Vec<PetResponse>>, Error> {
    let pets = state.pets.list(&PetFilter::owned_by(current_user.id)).await?;
    Ok(Json(pets.into_iter().map(PetResponse::from).collect()))
}

/// Get one of the caller's pets
#[utoipa::path(
    get,
    path = "/pets/{id}",
    tag = "pets",
    params(("id" = String, Path, description = "Pet ID")),
    responses(
        (status = 200, description = "The pet", body = PetResponse),
        (status = 401, description = "Missing or invalid token, or not the owner"),
        (status = 404, description = "Pet not found"),
    ),
    security(("SessionToken" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_pet(State(state): State<AppState>, current_user: CurrentUser, Path(id): Path<String>) -> Result<Json<PetResponse>, Error> {
    let id = parse_pet_id(&id)?;
    let pet = authorize_pet(state.pets.as_ref(), &current_user, id, Operation::Read).await?;
    Ok(Json(PetResponse::from(pet)))
}

/// Delete one of the caller's pets
#[utoipa::path(
    delete,
    path = "/pets/{id}",
    tag = "pets",
    params(("id" = String, Path, description = "Pet ID")),
    responses(
        (status = 200, description = "Pet removed", body = MessageResponse),
        (status = 401, description = "Missing or invalid token, or not the owner"),
        (status = 404, description = "Pet not found"),
    ),
    security(("SessionToken" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_pet(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, Error> {
    let id = parse_pet_id(&id)?;
    authorize_pet(state.pets.as_ref(), &current_user, id, Operation::Delete).await?;

    if !state.pets.delete(id).await? {
        return Err(pet_not_found(id));
    }

    Ok(Json(MessageResponse {
        msg: "Pet removed".to_string(),
    }))
}

/// Rename one of the caller's pets. An empty or missing name keeps the current one.
///
/// The body is only looked at once the caller is known to own the pet, so a non-owner or an
/// unknown id gets 401/404 whatever was sent.
#[utoipa::path(
    put,
    path = "/pets/{id}/rename",
    request_body = PetRename,
    tag = "pets",
    params(("id" = String, Path, description = "Pet ID")),
    responses(
        (status = 200, description = "The updated pet", body = PetResponse),
        (status = 400, description = "Body is not valid JSON"),
        (status = 401, description = "Missing or invalid token, or not the owner"),
        (status = 404, description = "Pet not found"),
    ),
    security(("SessionToken" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn rename_pet(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
    body: Result<Json<PetRename>, JsonRejection>,
) -> Result<Json<PetResponse>, Error> {
    let id = parse_pet_id(&id)?;
    let pet = authorize_pet(state.pets.as_ref(), &current_user, id, Operation::Rename).await?;

    let request = match body {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => PetRename::default(),
        Err(rejection) => return Err(rejection.into()),
    };

    let Some(name) = request.new_name() else {
        return Ok(Json(PetResponse::from(pet)));
    };

    let pet = state
        .pets
        .update(id, &PetUpdateDBRequest::rename(name.to_string()))
        .await
        .map_err(vanished(id))?;

    Ok(Json(PetResponse::from(pet)))
}

/// Record an interaction with one of the caller's pets
#[utoipa::path(
    put,
    path = "/pets/{id}/interact",
    tag = "pets",
    params(("id" = String, Path, description = "Pet ID")),
    responses(
        (status = 200, description = "The updated pet", body = PetResponse),
        (status = 401, description = "Missing or invalid token, or not the owner"),
        (status = 404, description = "Pet not found"),
    ),
    security(("SessionToken" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn interact_with_pet(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<PetResponse>, Error> {
    let id = parse_pet_id(&id)?;
    authorize_pet(state.pets.as_ref(), &current_user, id, Operation::Interact).await?;

    let pet = state
        .pets
        .update(id, &PetUpdateDBRequest::interact(Utc::now().trunc_subsecs(3)))
        .await
        .map_err(vanished(id))?;

    Ok(Json(PetResponse::from(pet)))
}
