use std::sync::Arc;

use crate::auth::AuthSettings;
use crate::contributions::ContributionFetcher;
use crate::media::{MediaStore, MediaUrls};
use crate::store::RecordStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub media: Arc<dyn MediaStore>,
    pub media_urls: MediaUrls,
    /// GitHub calendar for the home page; never fails.
    pub contributions: ContributionFetcher,
    pub auth: AuthSettings,
}
