/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use cotodo_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = cotodo_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use cotodo_shared::{auth::jwt, models::user::User};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Authenticated user, injected into request extensions by [`jwt_auth_layer`]
#[derive(Clone)]
pub struct CurrentUser(pub User);

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /
/// ├── /health                    # Health check (public)
/// └── /api/
///     ├── /auth/                 # Authentication (public)
///     │   ├── POST /signup
///     │   └── POST /login
///     ├── /todos/                # Todos (authenticated)
///     │   ├── GET    /           # List visible todos, filterable
///     │   ├── POST   /           # Create todo
///     │   ├── GET    /:id
///     │   ├── PATCH  /:id
///     │   ├── DELETE /:id
///     │   └── POST   /:id/notes  # Append a note
///     ├── /tags/                 # Tags (authenticated)
///     │   ├── GET    /
///     │   ├── POST   /
///     │   ├── PATCH  /:id
///     │   └── DELETE /:id
///     └── /users/                # Users (authenticated)
///         ├── GET /
///         ├── GET /me
///         └── GET /:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login));

    // Everything below requires a valid token
    let todo_routes = Router::new()
        .route("/", get(routes::todos::list_todos))
        .route("/", post(routes::todos::create_todo))
        .route("/:id", get(routes::todos::get_todo))
        .route("/:id", patch(routes::todos::update_todo))
        .route("/:id", delete(routes::todos::delete_todo))
        .route("/:id/notes", post(routes::todos::add_note));

    let tag_routes = Router::new()
        .route("/", get(routes::tags::list_tags))
        .route("/", post(routes::tags::create_tag))
        .route("/:id", patch(routes::tags::update_tag))
        .route("/:id", delete(routes::tags::delete_tag));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/me", get(routes::users::get_me))
        .route("/:id", get(routes::users::get_user));

    let protected = Router::new()
        .nest("/todos", todo_routes)
        .nest("/tags", tag_routes)
        .nest("/users", user_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new().nest("/auth", auth_routes).merge(protected);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the Bearer token from the Authorization header,
/// loads the account it names, and injects [`CurrentUser`] into request
/// extensions. A token whose account no longer exists is rejected.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::Unauthorized("Expected Bearer token".to_string())
    })?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Account no longer exists".to_string())
        })?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
