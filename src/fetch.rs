//! Plain HTTP fetching of pages and sitemaps.

use log::debug;
use url::Url;

use crate::constants::USER_AGENT;
use crate::error::{PipelineError, Result};

/// Thin wrapper over a shared `reqwest` client. One request per call, no retries.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Creates a fetcher with the policylens user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialised.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    /// Issues a GET request and returns the response whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent.
    pub async fn get(&self, url: &Url) -> Result<reqwest::Response> {
        debug!("GET {url}");
        Ok(self.client.get(url.as_str()).send().await?)
    }

    /// Fetches a document body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server answers with a non-success status.
    pub async fn fetch_text(&self, url: &Url) -> Result<String> {
        let response = self.get(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Serialized origin of a URL, the cache partition key (`https://example.com`).
///
/// # Errors
///
/// Returns an error if the URL has an opaque origin (e.g. `data:` URLs).
pub fn origin_of(url: &Url) -> Result<String> {
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(PipelineError::Parse(format!("URL {url} has no origin")));
    }

    Ok(origin.ascii_serialization())
}

/// Parses a user supplied site (URL or bare origin) into its origin.
///
/// # Errors
///
/// Returns an error if the input is not an absolute URL with an origin.
pub fn parse_origin(site: &str) -> Result<String> {
    origin_of(&Url::parse(site)?)
}
