use std::time::Duration;

use crate::books::models::{Volume, VolumesPage};
use crate::books::query::{CLAUSE_SEPARATOR, VolumeQuery};
use crate::books::responses::{ErrorResponse, VolumesResponse};
use crate::books::source::VolumeSource;
use crate::config::ClientConfig;
use crate::error::{BookshelfError, Result};
use crate::rate_limit::RateLimiter;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info, instrument, warn};

/// Client for the Google Books volumes API
#[derive(Clone)]
pub struct BooksClient {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
    config: ClientConfig,
}

impl BooksClient {
    /// Create a new client with default configuration
    ///
    /// No API key is sent, so requests count against the anonymous quota.
    ///
    /// # Example
    ///
    /// ```
    /// use bookshelf_client::BooksClient;
    ///
    /// let client = BooksClient::new();
    /// ```
    pub fn new() -> Self {
        Self::with_config(ClientConfig::new())
    }

    /// Create a new client with custom configuration
    ///
    /// # Example
    ///
    /// ```
    /// use bookshelf_client::{BooksClient, ClientConfig};
    ///
    /// let config = ClientConfig::new()
    ///     .with_api_key("your_api_key_here")
    ///     .with_rate_limit(5.0);
    ///
    /// let client = BooksClient::with_config(config);
    /// ```
    pub fn with_config(config: ClientConfig) -> Self {
        let client = Client::builder()
            .user_agent(config.effective_user_agent())
            .timeout(Duration::from_secs(config.timeout.as_secs()))
            .build()
            .expect("Failed to create HTTP client");

        Self::with_client(client, config)
    }

    /// Create a client around an existing HTTP client
    ///
    /// The user agent and timeout set on `client` are kept. The base URL, API
    /// key and rate limit come from `config`.
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        let rate_limiter = config.create_rate_limiter();
        let base_url = config.effective_base_url().to_string();

        Self {
            client,
            base_url,
            rate_limiter,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Search the catalog
    ///
    /// A response without `items` is a valid empty page, not an error.
    ///
    /// # Errors
    ///
    /// * `BookshelfError::RequestError` - If the HTTP request fails
    /// * `BookshelfError::ApiError` - If the API answers with a non-2xx status
    /// * `BookshelfError::JsonError` - If the body is not a volumes response
    ///
    /// # Example
    ///
    /// ```no_run
    /// use bookshelf_client::BooksClient;
    /// use bookshelf_client::books::{Genre, FilterValue, SearchRequest};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = BooksClient::new();
    ///     let query = SearchRequest::new()
    ///         .term("dune")
    ///         .filter(FilterValue::Genre(Genre::ScienceFiction))
    ///         .to_volume_query(None);
    ///
    ///     let page = client.search_volumes(&query).await?;
    ///     for volume in &page.items {
    ///         println!("{}: {}", volume.id, volume.volume_info.title);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip(self, query), fields(q = %query.q, start_index = query.start_index))]
    pub async fn search_volumes(&self, query: &VolumeQuery) -> Result<VolumesPage> {
        let mut url = format!(
            "{}/volumes?q={}&startIndex={}&maxResults={}",
            self.base_url,
            encode_clauses(&query.q),
            query.start_index,
            query.max_results
        );

        if let Some(order_by) = query.order_by {
            url.push_str(&format!("&orderBy={}", order_by.as_api_param()));
        }
        if let Some(lang) = query.lang_restrict {
            url.push_str(&format!("&langRestrict={}", lang));
        }

        debug!("Making volumes search request");
        let response = self.make_request(&url).await?;
        let body: VolumesResponse = serde_json::from_str(&response.text().await?)?;
        let page = VolumesPage::from(body);

        info!(
            returned = page.items.len(),
            total_items = page.total_items,
            "Search completed successfully"
        );

        Ok(page)
    }

    /// Fetch a single volume by its catalog id
    ///
    /// # Errors
    ///
    /// * `BookshelfError::InvalidVolumeId` - If the id is blank or contains a `/`
    /// * `BookshelfError::VolumeNotFound` - If the catalog has no such volume
    #[instrument(skip(self), fields(id = %id))]
    pub async fn fetch_volume(&self, id: &str) -> Result<Volume> {
        if id.trim().is_empty() || id.contains('/') {
            warn!("Invalid volume id provided");
            return Err(BookshelfError::InvalidVolumeId { id: id.to_string() });
        }

        let url = format!("{}/volumes/{}", self.base_url, urlencoding::encode(id));

        let response = match self.make_request(&url).await {
            Err(BookshelfError::ApiError { status, .. }) if status == 404 => {
                return Err(BookshelfError::VolumeNotFound { id: id.to_string() });
            }
            other => other?,
        };

        let volume: Volume = serde_json::from_str(&response.text().await?)?;
        debug!(title = %volume.volume_info.title, "Fetched volume");
        Ok(volume)
    }

    /// Send a GET after acquiring a rate limit token
    ///
    /// API parameters (the key) are appended here. There is no retry.
    async fn make_request(&self, url: &str) -> Result<Response> {
        let mut final_url = url.to_string();
        let api_params = self.config.build_api_params();

        if !api_params.is_empty() {
            let separator = if url.contains('?') { '&' } else { '?' };
            final_url.push(separator);

            let param_strings: Vec<String> = api_params
                .into_iter()
                .map(|(key, value)| format!("{}={}", key, urlencoding::encode(&value)))
                .collect();
            final_url.push_str(&param_strings.join("&"));
        }

        self.rate_limiter.acquire().await;
        let response = self.client.get(&final_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("API request failed with status: {}", status);
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        Ok(response)
    }
}

impl Default for BooksClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VolumeSource for BooksClient {
    async fn search(&self, query: &VolumeQuery) -> Result<VolumesPage> {
        self.search_volumes(query).await
    }
}

/// Percent-encode each clause while keeping the `+` separators literal
fn encode_clauses(q: &str) -> String {
    q.split(CLAUSE_SEPARATOR)
        .map(|clause| urlencoding::encode(clause).into_owned())
        .collect::<Vec<_>>()
        .join(CLAUSE_SEPARATOR)
}

fn api_error(status: StatusCode, body: &str) -> BookshelfError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    BookshelfError::ApiError {
        status: status.as_u16(),
        message,
    }
}
