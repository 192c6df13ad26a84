use chrono_tz::Tz;

/// Everything the pipeline needs to know about its upstream sources.
///
/// Passed in at construction time instead of living in module-level
/// constants, so tests and other jurisdictions can swap values without
/// touching process-wide state.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Council members page, scraped as HTML.
    pub council_url: String,
    /// Legistar web API root, e.g. "https://webapi.legistar.com/v1/seattle".
    pub legistar_base: String,
    /// Domain used when deriving councilmember email addresses.
    pub email_domain: String,
    /// Zone the Legistar naive timestamps are localized into.
    pub timezone: Tz,
    /// Events are fetched from January 1st of this year onwards.
    pub start_year: i32,
    /// Procedural agenda items to skip. Agenda fetching is not implemented
    /// upstream yet, so nothing applies these today; see `is_procedural`.
    pub ignore_patterns: Vec<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            council_url: "https://www.seattle.gov/council/members".to_string(),
            legistar_base: "https://webapi.legistar.com/v1/seattle".to_string(),
            email_domain: "seattle.gov".to_string(),
            timezone: chrono_tz::America::Los_Angeles,
            start_year: 2019,
            ignore_patterns: [
                "CALL TO ORDER",
                "ROLL CALL",
                "APPROVAL OF",
                "ADJOURNMENT",
                "RECESS",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

impl ScrapeConfig {
    /// Whether an agenda item title matches one of the configured
    /// procedural patterns. Extension point for agenda-item scraping;
    /// currently nothing calls this outside of tests.
    pub fn is_procedural(&self, title: &str) -> bool {
        let title = title.to_uppercase();
        self.ignore_patterns.iter().any(|p| title.contains(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_seattle() {
        let config = ScrapeConfig::default();
        assert_eq!(config.council_url, "https://www.seattle.gov/council/members");
        assert_eq!(config.legistar_base, "https://webapi.legistar.com/v1/seattle");
        assert_eq!(config.timezone, chrono_tz::America::Los_Angeles);
        assert_eq!(config.start_year, 2019);
        assert_eq!(config.ignore_patterns.len(), 5);
    }

    #[test]
    fn test_is_procedural_matches_case_insensitively() {
        let config = ScrapeConfig::default();
        assert!(config.is_procedural("Call to Order"));
        assert!(config.is_procedural("APPROVAL OF THE AGENDA"));
        assert!(!config.is_procedural("Public Comment"));
        assert!(!config.is_procedural("CB 120001: Land Use"));
    }
}
