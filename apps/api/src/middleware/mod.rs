pub mod host;
pub mod proxy;

pub use host::{validate_host, AllowedHosts};
pub use proxy::{ProxyHostConfig, ProxyHostLayer};
