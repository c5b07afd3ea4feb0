//! Bounding-box notes fetcher.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use mapnotes_core::{defaults, Error, LatLonBounds, NoteRecord, NoteSource, Result};

use crate::config::FeedConfig;
use crate::parser::parse_notes;

/// Fetches the notes inside a region from the notes service.
///
/// [`NoteFetcher::fetch`] never fails: transport, HTTP, and parse errors are
/// logged and turn into an empty list, so a flaky network cannot break the
/// render loop. Use [`NoteFetcher::try_fetch`] to see the error.
#[derive(Debug, Clone)]
pub struct NoteFetcher {
    client: Client,
    api_url: String,
}

impl NoteFetcher {
    /// Create a fetcher from a validated config.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(api_url = %config.api_url, timeout_secs = config.timeout_secs, "Initializing notes fetcher");

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(&FeedConfig::from_env())
    }

    /// Base URL requests are sent to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Feed URL for a region; the bbox is `left,bottom,right,top`.
    pub fn notes_url(&self, top: f64, left: f64, bottom: f64, right: f64) -> String {
        format!(
            "{}/{}?bbox={},{},{},{}",
            self.api_url,
            defaults::NOTES_PATH,
            left,
            bottom,
            right,
            top
        )
    }

    /// Fetch the notes in a region, or an empty list on any failure.
    #[instrument(skip(self), fields(subsystem = "feed", component = "fetcher", op = "fetch"))]
    pub async fn fetch(&self, top: f64, left: f64, bottom: f64, right: f64) -> Vec<NoteRecord> {
        match self.try_fetch(top, left, bottom, right).await {
            Ok(notes) => notes,
            Err(e) => {
                warn!(error = %e, "Error loading notes");
                Vec::new()
            }
        }
    }

    /// Fetch the notes in a region, reporting the first failure.
    pub async fn try_fetch(
        &self,
        top: f64,
        left: f64,
        bottom: f64,
        right: f64,
    ) -> Result<Vec<NoteRecord>> {
        let url = self.notes_url(top, left, bottom, right);
        let start = Instant::now();
        debug!(url = %url, "Loading notes");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Request(format!(
                "notes service returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body = response.bytes().await?;
        let notes = parse_notes(body.as_ref())?;

        info!(
            result_count = notes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Loaded notes"
        );
        Ok(notes)
    }
}

#[async_trait]
impl NoteSource for NoteFetcher {
    async fn fetch_notes(&self, bounds: LatLonBounds) -> Vec<NoteRecord> {
        self.fetch(bounds.top, bounds.left, bounds.bottom, bounds.right)
            .await
    }
}
