//! OpenAPI documentation for the `/api` surface, served at `/api/openapi.json`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api::{
    handlers::{auth, pets},
    models::{
        auth::{LoginRequest, RegisterRequest, TokenResponse},
        pets::{MessageResponse, PetCreate, PetRename, PetResponse},
        users::UserResponse,
    },
};
use crate::errors::FieldError;

/// Session token header security scheme.
struct SessionTokenAddon;

impl Modify for SessionTokenAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "SessionToken".to_string(),
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "x-auth-token",
                    "Token returned by `POST /users` or `POST /login`. The header name is configurable with `auth.token_header`.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    servers(
        (url = "/api", description = "Pet API")
    ),
    modifiers(&SessionTokenAddon),
    paths(
        auth::register,
        auth::login,
        auth::get_current_user,
        pets::create_pet,
        pets::list_pets,
        pets::get_pet,
        pets::delete_pet,
        pets::rename_pet,
        pets::interact_with_pet,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            TokenResponse,
            UserResponse,
            PetCreate,
            PetRename,
            PetResponse,
            MessageResponse,
            FieldError,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and the current identity"),
        (name = "pets", description = "Pets owned by the authenticated user"),
    )
)]
pub struct ApiDoc;
