/// Application state and router builder
///
/// This module defines the shared application state and provides a
/// function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::AppState, config::Config};
/// use taskboard_api::{mail::NoopMailer, media::NoopMediaStore};
/// use std::sync::Arc;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config, Arc::new(NoopMailer), Arc::new(NoopMediaStore));
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, mail::Mailer, media::MediaStore};
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::auth::{jwt, reset::ResetTokenStore};
use taskboard_shared::realtime::{broadcast::EventBroadcaster, registry::ConnectionRegistry};
use taskboard_shared::tasks::TaskService;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Maximum accepted avatar upload size
const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State`
/// extractor. Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Registry of live WebSocket connections
    pub registry: ConnectionRegistry,

    /// Task directory (mutate, re-read, publish)
    pub tasks: TaskService,

    /// Outstanding password-reset tokens
    pub reset_tokens: ResetTokenStore,

    /// Outbound mail boundary
    pub mailer: Arc<dyn Mailer>,

    /// Media host boundary
    pub media: Arc<dyn MediaStore>,
}

impl AppState {
    /// Creates new application state
    ///
    /// The registry, broadcaster, and task service are wired together
    /// here: the task service publishes through the broadcaster, which
    /// fans out over the registry.
    pub fn new(
        db: PgPool,
        config: Config,
        mailer: Arc<dyn Mailer>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        let registry = ConnectionRegistry::new();
        let broadcaster = EventBroadcaster::new(registry.clone());
        let tasks = TaskService::new(db.clone(), broadcaster);

        Self {
            db,
            config: Arc::new(config),
            registry,
            tasks,
            reset_tokens: ResetTokenStore::new(),
            mailer,
            media,
        }
    }

    /// Gets the JWT secret for session operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Authenticated user injected into request extensions
///
/// Handlers extract it with Axum's `Extension` extractor after the
/// authentication middleware has run.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Authenticated user ID
    pub id: i64,

    /// Email recorded in the session credential
    pub email: String,
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// ├── /ws                              # Live updates (token query param)
/// └── /api/
///     ├── /auth/                       # Public
///     │   ├── POST /register
///     │   ├── POST /login
///     │   ├── POST /forgot-password
///     │   └── POST /reset-password
///     ├── /tasks/                      # Authenticated
///     │   ├── GET    /
///     │   ├── POST   /
///     │   ├── PATCH  /:id/status
///     │   └── DELETE /:id
///     └── /users/                      # Authenticated
///         ├── GET   /
///         └── PATCH /me/profile-image
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/forgot-password", post(routes::auth::forgot_password))
        .route("/reset-password", post(routes::auth::reset_password));

    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks).post(routes::tasks::create_task))
        .route("/:id/status", patch(routes::tasks::update_status))
        .route("/:id", delete(routes::tasks::delete_task))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route(
            "/me/profile-image",
            patch(routes::users::upload_profile_image)
                .layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES)),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes)
        .nest("/users", user_routes);

    // Admission to /ws authenticates via query parameter, not headers
    let ws_routes = Router::new().route("/ws", get(routes::ws::ws_upgrade));

    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
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

    Router::new()
        .merge(health_routes)
        .merge(ws_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Session authentication middleware layer
///
/// Extracts and validates the Bearer token from the Authorization
/// header, then injects [`CurrentUser`] into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| crate::error::ApiError::BadRequest("Expected Bearer token".to_string()))?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;

    req.extensions_mut().insert(CurrentUser {
        id: claims.sub,
        email: claims.email,
    });

    Ok(next.run(req).await)
}
