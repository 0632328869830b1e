/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use meetuj_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiError,
    storage::{ProfilePictureStore, MAX_IMAGE_BYTES},
    ws::registry::SessionRegistry,
};
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use chrono::Duration;
use meetuj_shared::auth::{credentials::CredentialManager, middleware::authenticate};
use meetuj_shared::scheduling::SchedulingPolicy;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,

    pub config: Arc<Config>,

    /// Owns the token signing secret
    pub credentials: Arc<CredentialManager>,

    /// Live WebSocket sessions
    pub sessions: Arc<SessionRegistry>,

    pub pictures: Arc<ProfilePictureStore>,

    pub scheduling: SchedulingPolicy,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let credentials = CredentialManager::with_token_ttl(
            config.auth.jwt_secret.clone(),
            Duration::minutes(config.auth.access_token_expire_minutes),
        );
        let pictures = ProfilePictureStore::new(config.images_dir.clone());
        let scheduling = config.scheduling;

        Self {
            db,
            config: Arc::new(config),
            credentials: Arc::new(credentials),
            sessions: Arc::new(SessionRegistry::new()),
            pictures: Arc::new(pictures),
            scheduling,
        }
    }
}

/// Builds the complete router
///
/// ```text
/// /health                                   public
/// /v1/auth/register, /v1/auth/login         public
/// /v1/ws                                    token in header or ?token=
/// /v1/users/...                             bearer token
/// /v1/contacts/...                          bearer token
/// /v1/meetings/...                          bearer token
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route(
            "/me",
            get(routes::users::get_me)
                .put(routes::users::update_me)
                .delete(routes::users::delete_me),
        )
        .route(
            "/me/picture",
            put(routes::pictures::upload_picture).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        .route("/by-email/:email", get(routes::users::get_user_by_email))
        .route("/:id", get(routes::users::get_user))
        .route("/:id/picture", get(routes::pictures::get_picture));

    let contact_routes = Router::new()
        .route(
            "/",
            get(routes::contacts::list_contacts).post(routes::contacts::add_contact),
        )
        .route("/:contact_id", delete(routes::contacts::remove_contact));

    let meeting_routes = Router::new()
        .route(
            "/",
            get(routes::meetings::list_meetings).post(routes::meetings::create_meeting),
        )
        .route(
            "/:id",
            get(routes::meetings::get_meeting)
                .put(routes::meetings::update_meeting)
                .delete(routes::meetings::delete_meeting),
        )
        .route("/:id/participants", get(routes::meetings::list_participants))
        .route(
            "/:id/participants/:account_id",
            post(routes::meetings::add_participant).delete(routes::meetings::remove_participant),
        );

    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/contacts", contact_routes)
        .nest("/meetings", meeting_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .route("/ws", get(routes::ws::upgrade))
        .merge(protected);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
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
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Verifies the bearer token and inserts the `AuthContext` extension
async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(&state.credentials, req.headers())?;
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
