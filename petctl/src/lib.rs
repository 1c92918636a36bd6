//! # petctl: Pet Keeper API
//!
//! `petctl` is an HTTP service where people register an identity, sign in with a stateless
//! session token, and manage a private collection of pets. Every pet belongs to exactly one
//! owner and is invisible to everyone else.
//!
//! ## Architecture
//!
//! Requests flow through the following layers:
//!
//! ```text
//! HTTP Request
//!     ↓
//! Trace + CORS layers
//!     ↓
//! Session gate (require_session on /api/pets/*)
//!     ↓
//! API Handlers (src/api/handlers/)
//!     ↓
//! Ownership check (src/auth/permissions.rs)
//!     ↓
//! Store traits (src/db/handlers/)
//!     ↓
//! PostgreSQL or in-memory maps
//! ```
//!
//! ### Core Components
//!
//! - **API layer** ([`api`]): request and response models, handlers, OpenAPI annotations
//! - **Authentication** ([`auth`]): Argon2 password hashing, signed session tokens, ownership checks
//! - **Database layer** ([`db`]): [`CredentialStore`](db::handlers::CredentialStore) and
//!   [`PetRepository`](db::handlers::PetRepository) with Postgres and in-memory backends
//! - **Configuration** ([`config`]): YAML file plus `PETCTL_*` environment overrides
//! - **Telemetry** ([`telemetry`]): tracing subscriber with optional OTLP export
//!
//! ## Quick Start
//!
//! ```no_run
//! use petctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = petctl::config::Args { config: "config.yaml".to_string(), validate: false };
//!     let config = Config::load(&args)?;
//!     petctl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async { tokio::signal::ctrl_c().await.unwrap() }).await
//! }
//! ```
//!
//! ## Routes
//!
//! Everything except `/healthz` lives under `/api`:
//!
//! - `POST /api/users`, `POST /api/login`: issue a session token
//! - `GET /api/auth`: the identity behind the presented token
//! - `/api/pets`, `/api/pets/{id}`, `/api/pets/{id}/rename`, `/api/pets/{id}/interact`:
//!   owner-scoped pet management, gated by [`auth::middleware::require_session`]
//! - `GET /api/openapi.json`: the OpenAPI document

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
#[cfg(test)]
pub mod test_utils;
pub mod types;

use std::sync::Arc;

use axum::{
    Json, Router,
    http::{self, HeaderName, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use bon::Builder;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument};
use utoipa::OpenApi;

use crate::{
    auth::session::TokenService,
    config::{CorsOrigin, DatabaseConfig, PoolSettings},
    db::{
        handlers::{CredentialStore, PetRepository, Pets, Users},
        memory::{MemoryPets, MemoryUsers},
    },
    openapi::ApiDoc,
};

pub use config::Config;
pub use types::{PetId, UserId};

/// Shared state handed to every handler and middleware.
///
/// Stores sit behind trait objects so the same router runs on Postgres or on the in-memory
/// backend.
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .users(users)
///     .pets(pets)
///     .tokens(Arc::new(tokens))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn CredentialStore>,
    pub pets: Arc<dyn PetRepository>,
    pub tokens: Arc<TokenService>,
}

/// Get the petctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Stores selected by `database.type`, plus the pool to close on shutdown when there is one.
struct Stores {
    users: Arc<dyn CredentialStore>,
    pets: Arc<dyn PetRepository>,
    pool: Option<PgPool>,
}

fn pool_options(settings: &PoolSettings) -> PgPoolOptions {
    let non_zero = |secs: u64| (secs > 0).then(|| std::time::Duration::from_secs(secs));

    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(std::time::Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(non_zero(settings.idle_timeout_secs))
        .max_lifetime(non_zero(settings.max_lifetime_secs))
}

#[instrument(skip_all)]
async fn setup_stores(config: &Config) -> anyhow::Result<Stores> {
    match &config.database {
        DatabaseConfig::Memory => {
            info!("Using in-memory store; data will not survive a restart");
            Ok(Stores {
                users: Arc::new(MemoryUsers::new()),
                pets: Arc::new(MemoryPets::new()),
                pool: None,
            })
        }
        DatabaseConfig::External { url, pool } => {
            info!("Connecting to external database");
            let pool = pool_options(pool).connect(url).await?;
            migrator().run(&pool).await?;
            info!("Database migrations applied");

            Ok(Stores {
                users: Arc::new(Users::new(pool.clone())),
                pets: Arc::new(Pets::new(pool.clone())),
                pool: Some(pool),
            })
        }
    }
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;

    // AllowOrigin::list refuses "*", so a wildcard anywhere means any origin
    let allow_origin = if cors_config.allowed_origins.contains(&CorsOrigin::Wildcard) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                // Url serializes a bare origin with a trailing slash; browsers send it without
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let token_header = HeaderName::try_from(config.auth.token_header.as_str())?;

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(cors_config.allow_credentials)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([http::header::CONTENT_TYPE, token_header]);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

async fn healthz() -> &'static str {
    "OK"
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the main application router.
///
/// Public routes (registration, login, identity lookup, the OpenAPI document) and the
/// session-gated pet routes are nested under `/api`. CORS and request tracing wrap the whole
/// router.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let public_routes = Router::new()
        .route("/users", post(api::handlers::auth::register))
        .route("/login", post(api::handlers::auth::login))
        .route("/auth", get(api::handlers::auth::get_current_user))
        .route("/openapi.json", get(openapi_json));

    let pet_routes = Router::new()
        .route("/pets", get(api::handlers::pets::list_pets).post(api::handlers::pets::create_pet))
        .route(
            "/pets/{id}",
            get(api::handlers::pets::get_pet).delete(api::handlers::pets::delete_pet),
        )
        .route("/pets/{id}/rename", put(api::handlers::pets::rename_pet))
        .route("/pets/{id}/interact", put(api::handlers::pets::interact_with_pet))
        .route_layer(from_fn_with_state(state.clone(), auth::middleware::require_session));

    let router = Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", public_routes.merge(pet_routes))
        .with_state(state.clone())
        .layer(create_cors_layer(&state.config)?);

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// A configured server, ready to serve.
pub struct Application {
    router: Router,
    config: Config,
    pool: Option<PgPool>,
}

impl Application {
    /// Connect the configured stores, build the token service and assemble the router.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let stores = setup_stores(&config).await?;
        let tokens = TokenService::from_config(&config)?;

        let state = AppState::builder()
            .config(config.clone())
            .users(stores.users)
            .pets(stores.pets)
            .tokens(Arc::new(tokens))
            .build();

        let router = build_router(&state)?;

        Ok(Self {
            router,
            config,
            pool: stores.pool,
        })
    }

    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "petctl listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::models::{auth::TokenResponse, pets::PetResponse, users::UserResponse},
        test_utils::{TEST_SECRET, create_test_config, create_test_server, create_test_state},
    };
    use axum::http::StatusCode;
    use serde_json::json;

    #[test_log::test(tokio::test)]
    async fn test_healthz() {
        let (server, _) = create_test_server();

        let response = server.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[test_log::test(tokio::test)]
    async fn test_openapi_document_is_served() {
        let (server, _) = create_test_server();

        let response = server.get("/api/openapi.json").await;
        response.assert_status_ok();
        let doc: serde_json::Value = response.json();
        assert!(doc["paths"]["/pets/{id}/interact"]["put"].is_object());
        assert!(doc["components"]["securitySchemes"]["SessionToken"].is_object());
    }

    #[test_log::test(tokio::test)]
    async fn test_cors_preflight_allows_token_header() {
        let (server, _) = create_test_server();

        let response = server
            .method(Method::OPTIONS, "/api/pets")
            .add_header("Origin", "http://localhost:3000")
            .add_header("Access-Control-Request-Method", "POST")
            .add_header("Access-Control-Request-Headers", "x-auth-token")
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header("access-control-allow-origin").to_str().unwrap(),
            "http://localhost:3000"
        );
        let allowed = response.header("access-control-allow-headers");
        assert!(allowed.to_str().unwrap().contains("x-auth-token"));
    }

    #[test]
    fn test_cors_layer_rejects_invalid_token_header() {
        let mut config = create_test_config();
        config.auth.token_header = "not a header".to_string();
        assert!(create_cors_layer(&config).is_err());
    }

    #[test_log::test(tokio::test)]
    async fn test_cors_wildcard_allows_any_origin() {
        let mut state = create_test_state();
        state.config.auth.security.cors.allowed_origins = vec![CorsOrigin::Wildcard];
        let server = axum_test::TestServer::new(build_router(&state).unwrap()).unwrap();

        let response = server
            .get("/healthz")
            .add_header("Origin", "https://anywhere.example.com")
            .await;
        assert_eq!(response.header("access-control-allow-origin").to_str().unwrap(), "*");
    }

    #[test]
    fn test_pool_options_treat_zero_as_unbounded() {
        let settings = PoolSettings {
            idle_timeout_secs: 0,
            max_lifetime_secs: 0,
            ..Default::default()
        };
        let options = pool_options(&settings);
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), None);
        assert_eq!(options.get_max_connections(), 10);
    }

    #[test_log::test(tokio::test)]
    async fn test_application_with_memory_store() {
        let server = Application::new(create_test_config()).await.unwrap().into_test_server();

        let response = server
            .post("/api/users")
            .json(&json!({ "name": "Ann", "email": "ann@example.com", "password": "secret1" }))
            .await;
        response.assert_status_ok();
        let token = response.json::<TokenResponse>().token;

        let response = server
            .post("/api/login")
            .json(&json!({ "email": "ann@example.com", "password": "secret1" }))
            .await;
        response.assert_status_ok();
        let login_token = response.json::<TokenResponse>().token;

        let me: UserResponse = server.get("/api/auth").add_header("x-auth-token", &login_token).await.json();
        assert_eq!(me.email, "ann@example.com");

        let pet: PetResponse = server
            .post("/api/pets")
            .add_header("x-auth-token", &token)
            .json(&json!({ "name": "Rex", "color": "brown" }))
            .await
            .json();
        assert_eq!(pet.user, me.id);

        let renamed: PetResponse = server
            .put(&format!("/api/pets/{}/rename", pet.id))
            .add_header("x-auth-token", &token)
            .json(&json!({ "name": "Max" }))
            .await
            .json();
        assert_eq!(renamed.name, "Max");

        let response = server
            .delete(&format!("/api/pets/{}", pet.id))
            .add_header("x-auth-token", &token)
            .await;
        response.assert_status_ok();
        response.assert_json(&json!({ "msg": "Pet removed" }));

        let response = server.get("/api/pets").add_header("x-auth-token", &token).await;
        response.assert_json(&json!([]));
    }

    #[test_log::test(tokio::test)]
    async fn test_tokens_from_another_secret_are_rejected() {
        let (server, _) = create_test_server();
        let foreign = TokenService::new(&format!("{TEST_SECRET}-other"), std::time::Duration::from_secs(3600)).unwrap();
        let token = foreign.issue(uuid::Uuid::new_v4()).unwrap();

        let response = server.get("/api/pets").add_header("x-auth-token", &token).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({ "msg": "Token is not valid" }));
    }
}
