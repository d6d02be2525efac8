use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers, AppState};

/// Upper bound on any request body, ciphertext included.
pub const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/notes", get(handlers::notes::list).post(handlers::notes::create))
        .route("/notes/:id", delete(handlers::notes::delete));

    Router::new()
        .route("/", get(handlers::index))
        .nest("/api", api)
        .fallback(handlers::fallback)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
