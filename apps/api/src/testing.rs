//! Shared fixtures for handler and router tests.

use std::sync::{Arc, OnceLock};

use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use serde_json::Value;

use crate::auth::password::hash_password;
use crate::auth::{AuthSettings, SessionKeys};
use crate::config::ProxyConfig;
use crate::contributions::{ContributionFetcher, MemoryCache};
use crate::media::memory::MemoryMediaStore;
use crate::media::MediaUrls;
use crate::models::{NewBook, NewProject};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::memory::MemoryRecordStore;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// Argon2 is slow in debug builds; hash once per test binary.
fn admin_password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(ADMIN_PASSWORD)).clone()
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryRecordStore>,
    pub media: Arc<MemoryMediaStore>,
}

impl TestApp {
    /// In-memory stores, no GitHub token.
    pub fn new() -> Self {
        Self::with_contributions(ContributionFetcher::new(
            Arc::new(MemoryCache::new()),
            None,
            "octocat",
        ))
    }

    pub fn with_contributions(contributions: ContributionFetcher) -> Self {
        let store = Arc::new(MemoryRecordStore::new());
        let media = Arc::new(MemoryMediaStore::new());
        let state = AppState {
            store: store.clone(),
            media: media.clone(),
            media_urls: MediaUrls::new("https://cdn.test/media"),
            contributions,
            auth: AuthSettings {
                admin_username: ADMIN_USERNAME.to_string(),
                admin_password_hash: admin_password_hash(),
                keys: SessionKeys::new("test-session-secret"),
            },
        };
        Self {
            state,
            store,
            media,
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &ProxyConfig::default())
    }

    pub fn admin_cookie(&self) -> String {
        let token = self.state.auth.keys.issue(ADMIN_USERNAME).unwrap();
        format!("session={token}")
    }

    pub fn get(&self, uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::HOST, "localhost")
            .body(Body::empty())
            .unwrap()
    }

    /// Authenticated JSON POST.
    pub fn post_json(&self, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::HOST, "localhost")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, self.admin_cookie())
            .body(Body::from(body.to_string()))
            .unwrap()
    }
}

pub async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn new_project(title: &str, image: &str) -> NewProject {
    NewProject {
        title: title.to_string(),
        description: format!("{title} description"),
        technologies: "Rust".to_string(),
        start_date: None,
        end_date: None,
        github_url: None,
        live_url: None,
        image: image.to_string(),
        featured: false,
    }
}

pub fn new_book(title: &str, project_id: Option<uuid::Uuid>) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: "Frank Herbert".to_string(),
        rating: Some(5),
        read_date: None,
        cover_image: format!("books/{}.jpg", title.to_lowercase()),
        project_id,
    }
}
