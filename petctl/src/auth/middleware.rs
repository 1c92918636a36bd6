use crate::{AppState, auth::current_user::authenticate, errors::Error};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Route-group gate: rejects requests without a valid session token and attaches the
/// resolved [`CurrentUser`](crate::api::models::users::CurrentUser) to the request extensions.
pub async fn require_session(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response, Error> {
    let user = authenticate(request.headers(), &state.config, &state.tokens)?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
