/// Application state and router builder
///
/// The router is generic over the [`Store`] backend: the server runs on
/// [`PgStore`](taskpad_shared::store::PgStore) and the integration tests on
/// [`MemoryStore`](taskpad_shared::store::MemoryStore).
///
/// # Example
///
/// ```no_run
/// use taskpad_api::{app::{build_router, AppState}, config::Config};
/// use taskpad_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskpad_shared::store::PgStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let app = build_router(AppState::new(PgStore::new(pool), config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use taskpad_shared::auth::middleware::create_jwt_middleware;
use taskpad_shared::store::Store;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState<S: Store> {
    pub store: S,
    pub config: Arc<Config>,
}

impl<S: Store> AppState<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete router
///
/// ```text
/// /health                              GET   public
/// /v1/auth/{register,login,refresh}    POST  public
/// /v1/users/me                         GET, PUT
/// /v1/tasks                            GET (?status=), POST
/// /v1/tasks/:id                        PUT, DELETE
/// /v1/tasks/:id/toggle                 POST  (:id may be search text)
/// /v1/tasks/delete-by-search           POST
/// /v1/tasks/complete-pending           POST
/// /v1/assistant/tools                  GET
/// /v1/assistant/tools/call             POST
/// ```
///
/// Everything under `/v1` except `/auth` requires a bearer access token.
pub fn build_router<S: Store>(state: AppState<S>) -> Router {
    use crate::routes;

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register::<S>))
        .route("/login", post(routes::auth::login::<S>))
        .route("/refresh", post(routes::auth::refresh::<S>));

    let protected = Router::new()
        .route(
            "/users/me",
            get(routes::users::get_profile::<S>).put(routes::users::update_profile::<S>),
        )
        .route(
            "/tasks",
            get(routes::tasks::list_tasks::<S>).post(routes::tasks::create_task::<S>),
        )
        .route(
            "/tasks/delete-by-search",
            post(routes::tasks::delete_by_search::<S>),
        )
        .route(
            "/tasks/complete-pending",
            post(routes::tasks::complete_pending::<S>),
        )
        .route(
            "/tasks/:id",
            put(routes::tasks::update_task::<S>).delete(routes::tasks::delete_task::<S>),
        )
        .route("/tasks/:id/toggle", post(routes::tasks::toggle_task::<S>))
        .route("/assistant/tools", get(routes::assistant::list_tools))
        .route("/assistant/tools/call", post(routes::assistant::call_tool::<S>))
        .layer(from_fn(create_jwt_middleware(state.jwt_secret().to_string())));

    let v1_routes = Router::new().nest("/auth", auth_routes).merge(protected);

    Router::new()
        .route("/health", get(routes::health::health_check::<S>))
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config.api.cors_origins))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
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
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
