use std::sync::LazyLock;

use chrono::{LocalResult, NaiveDateTime, TimeZone};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::config::ScrapeConfig;
use crate::types::{COUNCILMEMBER_ROLE, Event, EventRecord, Identifier, Person};

/// Timestamp format used by the Legistar API, naive local time.
pub(crate) const LEGISTAR_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub(crate) const LEGISTAR_ID_SCHEME: &str = "legistar_event_id";

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
}

static RE_MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(District|Position) (\d+):\s*(.+)$").expect("invalid regex: member entry")
});

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract councilmembers from the seattle.gov members page.
///
/// The page lists members as plain `<li>` text in the form
/// "District 3: Jane Q. Public". List items mentioning a district or
/// position that do not fit that shape are logged and skipped; the rest of
/// the batch is unaffected.
pub fn parse_member_list(html: &str, config: &ScrapeConfig) -> Vec<Person> {
    let document = Html::parse_document(html);
    let item_selector = Selector::parse("ul li").unwrap();
    let mut members = Vec::new();

    for element in document.select(&item_selector) {
        let text = normalize_whitespace(&elem_text(element));
        if !text.contains("District") && !text.contains("Position") {
            continue;
        }

        match RE_MEMBER.captures(text.trim()) {
            Some(caps) => members.push(build_person(&caps[1], &caps[2], caps[3].trim(), config)),
            None => log::warn!("Could not parse council member info from text: {}", text),
        }
    }

    members
}

fn build_person(kind: &str, number: &str, name: &str, config: &ScrapeConfig) -> Person {
    let district_label = format!("{} {}", kind, number);

    // Best-effort guess at the official address; the page does not
    // publish one per member.
    let email = format!(
        "{}@{}",
        name.replace(' ', ".").to_lowercase(),
        config.email_domain
    );

    let profile_url = format!("{}#{}", config.council_url, name.replace(' ', ""));

    Person {
        name: name.to_string(),
        district_label,
        role: COUNCILMEMBER_ROLE.to_string(),
        email,
        links: vec![profile_url],
        sources: vec![config.council_url.clone()],
    }
}

/// Normalize one Legistar event record, or `None` if it is unusable.
///
/// Records missing an id or date, or carrying a date that does not match
/// [`LEGISTAR_DATE_FORMAT`], are logged and skipped so the surrounding
/// batch keeps going.
pub fn map_event(record: &EventRecord, config: &ScrapeConfig) -> Option<Event> {
    match build_event(record, config) {
        Ok(event) => {
            log::info!(
                "Parsed event: {} on {}",
                event.name,
                event.start_time.date_naive()
            );
            Some(event)
        }
        Err(e) => {
            log::warn!("Failed to parse event {:?}: {}", record.event_id, e);
            None
        }
    }
}

fn build_event(record: &EventRecord, config: &ScrapeConfig) -> Result<Event, ParseError> {
    let event_id = record.event_id.ok_or(ParseError::MissingField("EventId"))?;
    let date_str = record
        .date
        .as_deref()
        .ok_or(ParseError::MissingField("EventDate"))?;

    let naive = NaiveDateTime::parse_from_str(date_str, LEGISTAR_DATE_FORMAT)
        .map_err(|_| ParseError::DateParseError(date_str.to_string()))?;

    let start_time = match config.timezone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        // Fall-back transition repeats an hour; take the earlier offset.
        LocalResult::Ambiguous(earlier, _) => earlier,
        // Spring-forward gap: no such local time, drop the record.
        LocalResult::None => {
            return Err(ParseError::DateParseError(format!(
                "{} does not exist in {}",
                date_str, config.timezone
            )));
        }
    }
    .fixed_offset();

    let name = record
        .body_name
        .clone()
        .unwrap_or_else(|| "Meeting".to_string());
    let location = record
        .location
        .clone()
        .unwrap_or_else(|| "Location TBD".to_string());

    Ok(Event {
        external_id: event_id.to_string(),
        name,
        start_time,
        timezone: config.timezone.name().to_string(),
        location,
        sources: record.insite_url.iter().cloned().collect(),
        identifiers: vec![Identifier {
            scheme: LEGISTAR_ID_SCHEME.to_string(),
            value: event_id.to_string(),
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScrapeConfig {
        ScrapeConfig::default()
    }

    #[test]
    fn test_parse_member_list() {
        let html = r#"
            <ul>
                <li>District 1: Lisa Herbold</li>
                <li>District 3: Jane Q. Public</li>
                <li>Position 8: Teresa Mosqueda</li>
            </ul>
        "#;

        let members = parse_member_list(html, &config());

        assert_eq!(members.len(), 3);
        assert_eq!(members[0].name, "Lisa Herbold");
        assert_eq!(members[0].district_label, "District 1");
        assert_eq!(members[0].role, "Councilmember");
        assert_eq!(members[2].district_label, "Position 8");
    }

    #[test]
    fn test_parse_member_derives_email_and_link() {
        let html = "<ul><li>District 3: Jane Q. Public</li></ul>";

        let members = parse_member_list(html, &config());

        assert_eq!(members.len(), 1);
        let person = &members[0];
        assert_eq!(person.email, "jane.q..public@seattle.gov");
        assert_eq!(
            person.links,
            vec!["https://www.seattle.gov/council/members#JaneQ.Public".to_string()]
        );
        assert_eq!(
            person.sources,
            vec!["https://www.seattle.gov/council/members".to_string()]
        );
    }

    #[test]
    fn test_parse_member_list_skips_unmatched_entries() {
        let html = r#"
            <ul>
                <li>Council Resources</li>
                <li>District information and maps</li>
                <li>District 5: Cathy Moore</li>
            </ul>
        "#;

        let members = parse_member_list(html, &config());

        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "Cathy Moore");
    }

    #[test]
    fn test_parse_member_list_reads_nested_markup() {
        // The live page wraps names in anchors; text content still matches.
        let html = r#"<ul><li>District 2: <a href="/council/smith">Tammy Smith</a></li></ul>"#;

        let members = parse_member_list(html, &config());

        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "Tammy Smith");
        assert_eq!(members[0].district_label, "District 2");
    }

    #[test]
    fn test_map_event_complete_record() {
        let record = EventRecord {
            event_id: Some(42),
            body_name: Some("Finance Committee".to_string()),
            date: Some("2023-05-01T10:00:00".to_string()),
            location: None,
            insite_url: Some("https://seattle.legistar.com/MeetingDetail.aspx?ID=42".to_string()),
        };

        let event = map_event(&record, &config()).expect("record should map");

        assert_eq!(event.external_id, "42");
        assert_eq!(event.name, "Finance Committee");
        assert_eq!(event.location, "Location TBD");
        assert_eq!(event.timezone, "America/Los_Angeles");
        // May 1st is PDT.
        assert_eq!(event.start_time.offset().local_minus_utc(), -7 * 3600);
        assert_eq!(
            event.sources,
            vec!["https://seattle.legistar.com/MeetingDetail.aspx?ID=42".to_string()]
        );
        assert_eq!(event.identifiers.len(), 1);
        assert_eq!(event.identifiers[0].scheme, "legistar_event_id");
        assert_eq!(event.identifiers[0].value, "42");
    }

    #[test]
    fn test_map_event_winter_offset() {
        let record = EventRecord {
            event_id: Some(7),
            date: Some("2023-01-15T09:30:00".to_string()),
            ..Default::default()
        };

        let event = map_event(&record, &config()).expect("record should map");

        assert_eq!(event.start_time.offset().local_minus_utc(), -8 * 3600);
        assert_eq!(event.name, "Meeting");
    }

    #[test]
    fn test_map_event_missing_id_is_skipped() {
        let record = EventRecord {
            date: Some("2023-05-01T10:00:00".to_string()),
            ..Default::default()
        };

        assert!(map_event(&record, &config()).is_none());
    }

    #[test]
    fn test_map_event_missing_date_is_skipped() {
        let record = EventRecord {
            event_id: Some(42),
            ..Default::default()
        };

        assert!(map_event(&record, &config()).is_none());
    }

    #[test]
    fn test_map_event_bad_date_is_skipped() {
        for bad in ["2023-05-01", "05/01/2023 10:00", "not a date"] {
            let record = EventRecord {
                event_id: Some(42),
                date: Some(bad.to_string()),
                ..Default::default()
            };
            assert!(
                map_event(&record, &config()).is_none(),
                "'{}' should not parse",
                bad
            );
        }
    }

    #[test]
    fn test_event_start_time_round_trips_to_upstream_string() {
        let upstream = "2023-05-01T10:00:00";
        let record = EventRecord {
            event_id: Some(42),
            date: Some(upstream.to_string()),
            ..Default::default()
        };

        let event = map_event(&record, &config()).expect("record should map");

        let round_tripped = event
            .start_time
            .naive_local()
            .format(LEGISTAR_DATE_FORMAT)
            .to_string();
        assert_eq!(round_tripped, upstream);
    }

    #[test]
    fn test_event_record_deserializes_legistar_fields() {
        let json = r#"[
            {
                "EventId": 42,
                "EventBodyName": "Finance Committee",
                "EventDate": "2023-05-01T10:00:00",
                "EventLocation": "Council Chambers",
                "EventInSiteURL": "https://seattle.legistar.com/MeetingDetail.aspx?ID=42"
            },
            {"EventId": 43, "EventDate": null}
        ]"#;

        let records: Vec<EventRecord> = serde_json::from_str(json).expect("payload should parse");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].event_id, Some(42));
        assert_eq!(records[0].location.as_deref(), Some("Council Chambers"));
        assert_eq!(records[1].event_id, Some(43));
        assert!(records[1].date.is_none());
    }
}
