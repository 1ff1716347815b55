pub mod health;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};

use crate::auth::handlers::handle_secret_login;
use crate::catalog::handlers;
use crate::config::ProxyConfig;
use crate::errors::AppError;
use crate::middleware::{validate_host, AllowedHosts, ProxyHostConfig, ProxyHostLayer};
use crate::state::AppState;

/// Largest accepted request body, uploads included.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

pub fn build_router(state: AppState, proxy: &ProxyConfig) -> Router {
    let allowed = Arc::new(AllowedHosts::new(&proxy.allowed_hosts));

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/hello/", get(health::hello_handler))
        .route(
            "/api/secret-login/",
            post(handle_secret_login).fallback(method_not_allowed),
        )
        // Listings
        .route("/api/projects/", get(handlers::handle_list_projects))
        .route("/api/skills/", get(handlers::handle_list_skills))
        .route("/api/skills/grouped/", get(handlers::handle_list_skill_groups))
        .route("/api/books/", get(handlers::handle_list_books))
        .route("/api/photos/", get(handlers::handle_list_photos))
        .route("/api/hobbies/", get(handlers::handle_list_hobbies))
        .route("/api/countries/", get(handlers::handle_list_countries))
        .route("/api/posts/", get(handlers::handle_list_posts))
        .route("/api/contributions/", get(handlers::handle_contributions))
        // Page contexts
        .route("/api/pages/home/", get(handlers::handle_home_page))
        .route("/api/pages/skills/", get(handlers::handle_skills_page))
        .route("/api/pages/library/", get(handlers::handle_library_page))
        // Admin creation
        .route(
            "/api/projects/create/",
            post(handlers::handle_create_project).fallback(method_not_allowed),
        )
        .route(
            "/api/projects/:id/",
            delete(handlers::handle_delete_project).fallback(method_not_allowed),
        )
        .route(
            "/api/skills/create/",
            post(handlers::handle_create_skill).fallback(method_not_allowed),
        )
        .route(
            "/api/books/create/",
            post(handlers::handle_create_book).fallback(method_not_allowed),
        )
        .route(
            "/api/photos/create/",
            post(handlers::handle_create_photo).fallback(method_not_allowed),
        )
        .route(
            "/api/hobbies/create/",
            post(handlers::handle_create_hobby).fallback(method_not_allowed),
        )
        .route(
            "/api/countries/create/",
            post(handlers::handle_create_country).fallback(method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
        .layer(from_fn_with_state(allowed, validate_host))
        // Outermost, so the rewrite happens before validation sees the host.
        .layer(ProxyHostLayer::new(ProxyHostConfig::from(proxy)))
}
