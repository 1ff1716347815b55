use anyhow::{Context, Result};

const DEFAULT_GITHUB_USERNAME: &str = "ElSancturioDeThomas";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Optional. Without it the contribution cache lives in process memory.
    pub redis_url: Option<String>,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub media_base_url: String,
    pub session_secret: String,
    pub admin_username: String,
    /// Argon2 PHC string for the admin password.
    pub admin_password_hash: String,
    pub github_token: Option<String>,
    pub github_username: String,
    pub proxy: ProxyConfig,
    pub port: u16,
    pub rust_log: String,
}

/// Host handling for deployments behind a rewriting proxy.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Set when the service is hosted behind the proxy (`PROXY_HOSTED` or `VERCEL`).
    pub proxy_hosted: bool,
    pub allowed_hosts: Vec<String>,
    /// Host substituted for forwarded hosts that are not on the allow-list.
    pub safe_host: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            proxy_hosted: false,
            allowed_hosts: vec!["localhost".to_string(), "127.0.0.1".to_string()],
            safe_host: "localhost".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = ProxyConfig::default();
        let proxy = ProxyConfig {
            proxy_hosted: env_flag("PROXY_HOSTED") || env_flag("VERCEL"),
            allowed_hosts: optional_env("ALLOWED_HOSTS")
                .map(|hosts| parse_host_list(&hosts))
                .unwrap_or(defaults.allowed_hosts),
            safe_host: optional_env("SAFE_HOST").unwrap_or(defaults.safe_host),
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: optional_env("REDIS_URL"),
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            media_base_url: optional_env("MEDIA_BASE_URL").unwrap_or_else(|| "/media".to_string()),
            session_secret: require_env("SESSION_SECRET")?,
            admin_username: require_env("ADMIN_USERNAME")?,
            admin_password_hash: require_env("ADMIN_PASSWORD_HASH")?,
            github_token: optional_env("GITHUB_TOKEN"),
            github_username: optional_env("GITHUB_USERNAME")
                .unwrap_or_else(|| DEFAULT_GITHUB_USERNAME.to_string()),
            proxy,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_flag(key: &str) -> bool {
    optional_env(key)
        .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no"))
        .unwrap_or(false)
}

/// Splits a comma-separated host list, dropping empty entries.
pub fn parse_host_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(String::from)
        .collect()
}
