//! Configuration for the labeler, read from environment variables.

use std::env;

use crate::resolver::ResolverConfig;

/// Default GitHub REST API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Labeler configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub token for API calls.
    pub github_token: Option<String>,
    /// Base URL of the GitHub REST API.
    pub api_url: String,
    /// Label resolution settings.
    pub resolver: ResolverConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            api_url: DEFAULT_API_URL.to_string(),
            resolver: ResolverConfig::default(),
        }
    }
}

impl Config {
    /// Build the configuration from `GITHUB_TOKEN`, `GITHUB_API_URL` and
    /// `MAX_LABELS_LIMIT`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            github_token: env::var("GITHUB_TOKEN").ok().filter(|s| !s.is_empty()),
            api_url: env::var("GITHUB_API_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .map_or_else(
                    || DEFAULT_API_URL.to_string(),
                    |s| s.trim_end_matches('/').to_string(),
                ),
            resolver: ResolverConfig::from_env(),
        }
    }
}
