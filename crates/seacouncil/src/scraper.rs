use std::time::Duration;

use reqwest::Client;

use crate::config::ScrapeConfig;
use crate::parser::{map_event, parse_member_list};
use crate::types::{Event, EventRecord, Person};

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Malformed event payload: {0}")]
    PayloadError(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    config: ScrapeConfig,
}

impl WebScraper {
    pub fn new(config: ScrapeConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Fetch the members page and return every entry that parses.
    pub async fn fetch_councilmembers(&self) -> Result<Vec<Person>, ScraperError> {
        log::info!("Fetching council members from {}...", self.config.council_url);
        let url = self.config.council_url.clone();
        let html = self.get_text(&url, &[]).await?;
        let members = parse_member_list(&html, &self.config);
        log::info!("Scraped {} council members", members.len());
        Ok(members)
    }

    /// Fetch events from the Legistar API, date-bounded to the configured
    /// start year and ordered newest first, and normalize each record.
    /// Unusable records are skipped; upstream order is preserved.
    pub async fn fetch_events(&self) -> Result<Vec<Event>, ScraperError> {
        let url = format!("{}/events", self.config.legistar_base);
        // OData filter, same protocol Legistar documents.
        let filter = format!("EventDate ge datetime'{}-01-01'", self.config.start_year);
        let params = [("$filter", filter.as_str()), ("$orderby", "EventDate desc")];

        log::info!("Fetching events from {}...", url);
        let body = self.get_text(&url, &params).await?;
        let records: Vec<EventRecord> = serde_json::from_str(&body)?;
        log::info!("Fetched {} events from Legistar API", records.len());

        Ok(records
            .iter()
            .filter_map(|record| map_event(record, &self.config))
            .collect())
    }

    async fn get_text(&self, url: &str, params: &[(&str, &str)]) -> Result<String, ScraperError> {
        Ok(self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?
            .error_for_status()?
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?)
    }
}
