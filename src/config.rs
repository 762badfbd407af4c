//! Client configuration
//!
//! [`ClientConfig`] collects everything the books client and the search
//! controller need to know about the environment: API key, endpoint, timeout,
//! rate limit, and how an empty search is handled.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::books::OrderBy;
use crate::error::BookshelfError;
use crate::rate_limit::RateLimiter;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/books/v1";
const DEFAULT_RATE_LIMIT: f64 = 10.0;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// What the controller does when a search has no term and no active filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptySearchPolicy {
    /// Load the default browse results instead
    #[default]
    Fallback,
    /// Leave the results alone and ask the user for a term
    Prompt,
}

impl EmptySearchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmptySearchPolicy::Fallback => "fallback",
            EmptySearchPolicy::Prompt => "prompt",
        }
    }
}

impl fmt::Display for EmptySearchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmptySearchPolicy {
    type Err = BookshelfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fallback" => Ok(EmptySearchPolicy::Fallback),
            "prompt" => Ok(EmptySearchPolicy::Prompt),
            other => Err(BookshelfError::InvalidConfig(format!(
                "unknown empty search policy '{}', expected 'fallback' or 'prompt'",
                other
            ))),
        }
    }
}

/// Configuration for [`BooksClient`](crate::BooksClient) and
/// [`SearchController`](crate::SearchController)
///
/// # Example
///
/// ```
/// use bookshelf_client::{ClientConfig, EmptySearchPolicy};
///
/// let config = ClientConfig::new()
///     .with_api_key("your_api_key_here")
///     .with_empty_search_policy(EmptySearchPolicy::Prompt);
///
/// assert_eq!(config.empty_search_policy, EmptySearchPolicy::Prompt);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Google Books API key, sent as `key`
    pub api_key: Option<String>,
    /// Override for the volumes API base URL
    pub base_url: Option<String>,
    /// Requests per second; defaults to 10
    pub rate_limit: Option<f64>,
    /// HTTP request timeout
    pub timeout: Duration,
    /// Override for the User-Agent header
    pub user_agent: Option<String>,
    /// Sort order for searches; the browse load always uses relevance
    pub order_by: Option<OrderBy>,
    pub empty_search_policy: EmptySearchPolicy,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: None,
            rate_limit: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            order_by: None,
            empty_search_policy: EmptySearchPolicy::default(),
        }
    }

    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Point the client at a different endpoint (mock servers, proxies)
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: f64) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn with_empty_search_policy(mut self, policy: EmptySearchPolicy) -> Self {
        self.empty_search_policy = policy;
        self
    }

    pub fn effective_rate_limit(&self) -> f64 {
        self.rate_limit.unwrap_or(DEFAULT_RATE_LIMIT)
    }

    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("bookshelf-client/{}", env!("CARGO_PKG_VERSION")))
    }

    /// Parameters appended to every request
    pub fn build_api_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(key) = &self.api_key {
            params.push(("key".to_string(), key.clone()));
        }
        params
    }

    pub fn create_rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(self.effective_rate_limit())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
