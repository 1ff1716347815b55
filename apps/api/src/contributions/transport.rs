use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::contributions::ContributionError;

const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("portfolio-api/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Serialize)]
pub struct GraphqlRequest {
    pub query: &'static str,
    pub variables: serde_json::Value,
}

/// Raw HTTP outcome; interpretation is left to the fetcher.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    async fn execute(&self, request: &GraphqlRequest) -> Result<TransportResponse, ContributionError>;
}

/// Bearer-authenticated transport for the GitHub GraphQL API.
#[derive(Clone)]
pub struct GithubTransport {
    client: Client,
    token: String,
}

impl GithubTransport {
    pub fn new(token: String) -> Result<Self, ContributionError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ContributionError::Transport(e.to_string()))?;
        Ok(Self { client, token })
    }
}

#[async_trait]
impl GraphqlTransport for GithubTransport {
    async fn execute(&self, request: &GraphqlRequest) -> Result<TransportResponse, ContributionError> {
        let response = self
            .client
            .post(GITHUB_GRAPHQL_URL)
            .bearer_auth(&self.token)
            .json(request)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(classify)?;
        Ok(TransportResponse { status, body })
    }
}

fn classify(err: reqwest::Error) -> ContributionError {
    if err.is_timeout() {
        ContributionError::Timeout
    } else {
        ContributionError::Transport(err.to_string())
    }
}
