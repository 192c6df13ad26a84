use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub const COUNCILMEMBER_ROLE: &str = "Councilmember";

#[derive(Debug, thiserror::Error)]
#[error("Invalid scrape target '{0}'. Accepted values: 'people', 'events', 'all'")]
pub struct TargetParseError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeTarget {
    People,
    Events,
    All,
}

impl FromStr for ScrapeTarget {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "people" => Ok(ScrapeTarget::People),
            "events" => Ok(ScrapeTarget::Events),
            "all" => Ok(ScrapeTarget::All),
            _ => Err(TargetParseError(s.to_string())),
        }
    }
}

impl Display for ScrapeTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrapeTarget::People => write!(f, "people"),
            ScrapeTarget::Events => write!(f, "events"),
            ScrapeTarget::All => write!(f, "all"),
        }
    }
}

/// A sitting councilmember scraped from the seattle.gov members page.
///
/// `district_label` is always of the form "District N" or "Position N";
/// page entries that do not carry such a label are dropped at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub district_label: String,
    pub role: String,
    /// Best-guess address derived from the display name. Not validated
    /// against any directory.
    pub email: String,
    pub links: Vec<String>,
    pub sources: Vec<String>,
}

impl Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.district_label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub scheme: String,
    pub value: String,
}

/// A council meeting from the Legistar API, normalized into canonical form.
///
/// `start_time` always carries the zone offset that was in effect at the
/// meeting's local time; records whose date cannot be parsed never become
/// an `Event`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub external_id: String,
    pub name: String,
    pub start_time: DateTime<FixedOffset>,
    /// IANA zone name the offset was derived from, e.g. "America/Los_Angeles".
    pub timezone: String,
    pub location: String,
    pub sources: Vec<String>,
    pub identifiers: Vec<Identifier>,
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} — {}",
            self.start_time.format("%Y-%m-%d %H:%M"),
            self.name,
            self.location
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub label: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
    pub classification: String,
    pub posts: Vec<Post>,
}

impl Display for Organization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} ({})", self.name, self.classification)?;
        for post in &self.posts {
            writeln!(f, "  {} — {}", post.label, post.role)?;
        }
        Ok(())
    }
}

/// One raw event object as returned by the Legistar web API. Every field
/// is optional; the upstream payload routinely omits or nulls them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "EventId")]
    pub event_id: Option<i64>,
    #[serde(rename = "EventBodyName")]
    pub body_name: Option<String>,
    #[serde(rename = "EventDate")]
    pub date: Option<String>,
    #[serde(rename = "EventLocation")]
    pub location: Option<String>,
    #[serde(rename = "EventInSiteURL")]
    pub insite_url: Option<String>,
}
