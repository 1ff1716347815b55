//! GitHub contribution calendar behind a look-aside cache.
//!
//! Only complete, non-empty calendars are cached. Every failure yields an
//! empty calendar and leaves the cache untouched; the next miss fetches again.

pub mod cache;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use cache::{Cache, MemoryCache, RedisCache};
pub use transport::{GithubTransport, GraphqlRequest, GraphqlTransport, TransportResponse};

pub const CACHE_KEY: &str = "github_contributions";
pub const CACHE_TTL: Duration = Duration::from_secs(3600);

const CONTRIBUTIONS_QUERY: &str = r#"
query($login: String!) {
  user(login: $login) {
    contributionsCollection {
      contributionCalendar {
        totalContributions
        weeks {
          contributionDays {
            contributionLevel
            contributionCount
            date
          }
        }
      }
    }
  }
}
"#;

#[derive(Debug, Error)]
pub enum ContributionError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected status {status}")]
    Status { status: u16 },

    #[error("GraphQL errors: {0}")]
    Graphql(String),

    #[error("user not found in response")]
    MissingUser,

    #[error("contributions collection missing from response")]
    MissingCollection,

    #[error("contribution calendar has no weeks")]
    EmptyCalendar,

    #[error("invalid response body: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionDay {
    pub contribution_level: String,
    pub contribution_count: u32,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionWeek {
    pub contribution_days: Vec<ContributionDay>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contributions {
    pub weeks: Vec<ContributionWeek>,
    pub total: u64,
}

impl Contributions {
    pub fn empty() -> Self {
        Self::default()
    }
}

// GitHub response envelope. Every level is optional so that missing pieces
// map onto specific errors rather than a generic parse failure.

#[derive(Debug, Deserialize)]
struct GraphqlEnvelope {
    data: Option<GraphqlData>,
    #[serde(default)]
    errors: Vec<GraphqlErrorItem>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorItem {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphqlData {
    user: Option<GraphqlUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlUser {
    contributions_collection: Option<GraphqlCollection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlCollection {
    contribution_calendar: GraphqlCalendar,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlCalendar {
    #[serde(default)]
    total_contributions: u64,
    #[serde(default)]
    weeks: Vec<ContributionWeek>,
}

/// Fetches the contribution calendar for one configured user.
#[derive(Clone)]
pub struct ContributionFetcher {
    cache: Arc<dyn Cache>,
    /// `None` when no API token is configured.
    transport: Option<Arc<dyn GraphqlTransport>>,
    username: String,
    ttl: Duration,
}

impl ContributionFetcher {
    pub fn new(
        cache: Arc<dyn Cache>,
        transport: Option<Arc<dyn GraphqlTransport>>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            transport,
            username: username.into(),
            ttl: CACHE_TTL,
        }
    }

    /// Never fails: upstream problems are logged and yield an empty calendar.
    pub async fn get_contributions(&self) -> Contributions {
        if let Some(hit) = self.cached().await {
            return hit;
        }

        let Some(transport) = &self.transport else {
            debug!("No GitHub token configured; contributions disabled");
            return Contributions::empty();
        };

        match self.fetch(transport.as_ref()).await {
            Ok(contributions) => {
                self.remember(&contributions).await;
                contributions
            }
            Err(e) => {
                warn!("GitHub contributions unavailable: {e}");
                Contributions::empty()
            }
        }
    }

    async fn cached(&self) -> Option<Contributions> {
        match self.cache.get(CACHE_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Discarding unreadable cached contributions: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Contribution cache read failed: {e}");
                None
            }
        }
    }

    async fn remember(&self, contributions: &Contributions) {
        let raw = match serde_json::to_string(contributions) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Could not serialize contributions for cache: {e}");
                return;
            }
        };
        if let Err(e) = self.cache.set(CACHE_KEY, raw, self.ttl).await {
            warn!("Contribution cache write failed: {e}");
        }
    }

    async fn fetch(&self, transport: &dyn GraphqlTransport) -> Result<Contributions, ContributionError> {
        let request = GraphqlRequest {
            query: CONTRIBUTIONS_QUERY,
            variables: serde_json::json!({ "login": self.username }),
        };

        let response = transport.execute(&request).await?;
        if response.status != 200 {
            log_status(response.status);
            return Err(ContributionError::Status {
                status: response.status,
            });
        }

        let contributions = parse_calendar(&response.body)?;
        info!(
            "Fetched {} weeks of GitHub contributions ({} total)",
            contributions.weeks.len(),
            contributions.total
        );
        Ok(contributions)
    }
}

fn log_status(status: u16) {
    match status {
        401 => warn!("GitHub rejected the token (401); check GITHUB_TOKEN"),
        403 => warn!("GitHub denied access (403); token scope or secondary rate limit"),
        429 => warn!("GitHub rate limit hit (429)"),
        other => warn!("GitHub GraphQL returned status {other}"),
    }
}

fn parse_calendar(body: &str) -> Result<Contributions, ContributionError> {
    let envelope: GraphqlEnvelope = serde_json::from_str(body)?;
    if !envelope.errors.is_empty() {
        let messages: Vec<_> = envelope.errors.into_iter().map(|e| e.message).collect();
        return Err(ContributionError::Graphql(messages.join("; ")));
    }

    let user = envelope
        .data
        .and_then(|d| d.user)
        .ok_or(ContributionError::MissingUser)?;
    let calendar = user
        .contributions_collection
        .ok_or(ContributionError::MissingCollection)?
        .contribution_calendar;

    if calendar.weeks.is_empty() {
        return Err(ContributionError::EmptyCalendar);
    }

    Ok(Contributions {
        weeks: calendar.weeks,
        total: calendar.total_contributions,
    })
}
