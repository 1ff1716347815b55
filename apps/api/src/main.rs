mod auth;
mod catalog;
mod config;
mod contributions;
mod db;
mod errors;
mod media;
mod middleware;
mod models;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::{AuthSettings, SessionKeys};
use crate::config::Config;
use crate::contributions::{
    Cache, ContributionFetcher, GithubTransport, GraphqlTransport, MemoryCache, RedisCache,
};
use crate::db::create_pool;
use crate::media::{MediaUrls, S3MediaStore};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgRecordStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting portfolio API v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;

    let media = S3MediaStore::from_config(&config).await;
    info!("S3 media store initialized (bucket: {})", config.s3_bucket);

    let cache: Arc<dyn Cache> = match &config.redis_url {
        Some(url) => {
            info!("Contribution cache: Redis");
            Arc::new(RedisCache::new(redis::Client::open(url.as_str())?))
        }
        None => {
            info!("Contribution cache: in-process (REDIS_URL not set)");
            Arc::new(MemoryCache::new())
        }
    };

    let transport: Option<Arc<dyn GraphqlTransport>> = match &config.github_token {
        Some(token) => Some(Arc::new(GithubTransport::new(token.clone())?)),
        None => {
            warn!("GITHUB_TOKEN not set; contribution calendar disabled");
            None
        }
    };

    let state = AppState {
        store: Arc::new(PgRecordStore::new(db)),
        media: Arc::new(media),
        media_urls: MediaUrls::new(config.media_base_url.clone()),
        contributions: ContributionFetcher::new(cache, transport, config.github_username.clone()),
        auth: AuthSettings {
            admin_username: config.admin_username.clone(),
            admin_password_hash: config.admin_password_hash.clone(),
            keys: SessionKeys::new(&config.session_secret),
        },
    };

    if config.proxy.proxy_hosted {
        info!(
            "Proxy host rewrite enabled (safe host: {})",
            config.proxy.safe_host
        );
    }

    let app = build_router(state, &config.proxy)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
