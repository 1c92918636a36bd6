use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session::TokenService,
    config::Config,
    errors::{Error, Result},
    types::abbrev_uuid,
};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use tracing::{debug, info, instrument};

pub const NO_TOKEN: &str = "No token, authorization denied";
pub const INVALID_TOKEN: &str = "Token is not valid";

/// Resolve the caller from the session token header.
///
/// Missing and empty headers are both "no token". Any verification failure collapses into
/// the same client-facing message; the specific reason is logged here only.
#[instrument(skip_all)]
pub fn authenticate(headers: &HeaderMap, config: &Config, tokens: &TokenService) -> Result<CurrentUser> {
    let header_name = config.auth.token_header.as_str();

    let Some(value) = headers.get(header_name) else {
        return Err(Error::Unauthenticated {
            message: Some(NO_TOKEN.to_string()),
        });
    };
    if value.is_empty() {
        return Err(Error::Unauthenticated {
            message: Some(NO_TOKEN.to_string()),
        });
    }

    let Ok(token) = value.to_str() else {
        info!(reason = "non-ascii header", "Rejected session token");
        return Err(Error::Unauthenticated {
            message: Some(INVALID_TOKEN.to_string()),
        });
    };

    match tokens.verify(token) {
        Ok(id) => {
            debug!("Authenticated user {}", abbrev_uuid(&id));
            Ok(CurrentUser { id })
        }
        Err(e) => {
            info!(reason = %e, "Rejected session token");
            Err(Error::Unauthenticated {
                message: Some(INVALID_TOKEN.to_string()),
            })
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        // Already resolved by require_session for this route group
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(*user);
        }

        authenticate(&parts.headers, &state.config, &state.tokens)
    }
}
