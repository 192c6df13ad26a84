use crate::config::ScrapeConfig;
use crate::scraper::{ScraperError, WebScraper};
use crate::types::{COUNCILMEMBER_ROLE, Event, Organization, Person, Post};

pub const ORGANIZATION_NAME: &str = "Seattle City Council";
pub const ORGANIZATION_CLASSIFICATION: &str = "legislature";

/// Producer surface for the harvesting command: one entry point per
/// scrape target, plus the statically known council organization.
#[derive(Debug, Clone)]
pub struct Jurisdiction {
    scraper: WebScraper,
}

impl Jurisdiction {
    pub fn new(config: ScrapeConfig) -> Result<Self, ScraperError> {
        Ok(Self {
            scraper: WebScraper::new(config)?,
        })
    }

    pub fn config(&self) -> &ScrapeConfig {
        self.scraper.config()
    }

    /// Scrape councilmembers in page order. A transport failure is logged
    /// and yields an empty batch so a scheduled run keeps going; the same
    /// policy applies to both scrape paths.
    pub async fn scrape_people(&self) -> Vec<Person> {
        match self.scraper.fetch_councilmembers().await {
            Ok(people) => people,
            Err(e) => {
                log::error!("Failed to fetch council members: {}", e);
                Vec::new()
            }
        }
    }

    /// Scrape events in upstream order (newest first). Same recovery
    /// policy as `scrape_people`.
    pub async fn scrape_events(&self) -> Vec<Event> {
        match self.scraper.fetch_events().await {
            Ok(events) => events,
            Err(e) => {
                log::error!("Failed to fetch events from Legistar: {}", e);
                Vec::new()
            }
        }
    }

    /// The council organization is fixed by city charter, not scraped:
    /// seven district seats plus two at-large positions.
    pub fn organization(&self) -> Organization {
        let mut posts: Vec<Post> = (1..8)
            .map(|i| Post {
                label: format!("District {}", i),
                role: COUNCILMEMBER_ROLE.to_string(),
            })
            .collect();
        posts.extend((8..10).map(|i| Post {
            label: format!("Position {}", i),
            role: COUNCILMEMBER_ROLE.to_string(),
        }));

        Organization {
            name: ORGANIZATION_NAME.to_string(),
            classification: ORGANIZATION_CLASSIFICATION.to_string(),
            posts,
        }
    }
}
