use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use rusqlite::{Connection, params};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Bad timestamp in canonical row {0}: {1}")]
    Timestamp(String, chrono::ParseError),
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid sync model '{0}'. Accepted values: 'people', 'events', 'organizations', 'all'")]
pub struct ModelParseError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncModel {
    People,
    Events,
    Organizations,
    All,
}

impl FromStr for SyncModel {
    type Err = ModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "people" => Ok(SyncModel::People),
            "events" => Ok(SyncModel::Events),
            "organizations" => Ok(SyncModel::Organizations),
            "all" => Ok(SyncModel::All),
            _ => Err(ModelParseError(s.to_string())),
        }
    }
}

impl SyncModel {
    pub fn includes(&self, other: SyncModel) -> bool {
        *self == SyncModel::All || *self == other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub total: i64,
}

impl Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} created, {} total", self.created, self.total)
    }
}

static RE_NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]+").expect("invalid regex: slug"));

/// Lower-case a name and collapse every run of non-alphanumerics into a
/// single hyphen. Leading/trailing punctuation still leaves a hyphen,
/// matching what the councilmatic tables already contain.
pub fn slugify(name: &str) -> String {
    RE_NON_ALNUM.replace_all(name, "-").to_lowercase()
}

/// Event slugs append the local start timestamp so recurring meetings
/// with the same body name stay distinct.
pub fn event_slug(name: &str, start_time: &DateTime<FixedOffset>) -> String {
    format!(
        "{}-{}",
        slugify(name),
        start_time.format("%Y-%m-%d-%H-%M-%S")
    )
}

/// Project canonical people into councilmatic_person. Only ids not yet
/// present are inserted; existing rows are never touched, so re-running
/// against an unchanged canonical table is a no-op.
pub fn sync_people(conn: &Connection) -> Result<SyncReport, SyncError> {
    let missing: Vec<(String, String)> = conn
        .prepare(
            r#"
            SELECT id, name FROM ocd_person
            WHERE id NOT IN (SELECT person_id FROM councilmatic_person)
            "#,
        )?
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<_, _>>()?;

    let mut created = 0;
    for (id, name) in missing {
        created += conn.execute(
            r#"
            INSERT INTO councilmatic_person (person_id, slug, headshot, biography)
            VALUES (?1, ?2, '', NULL)
            ON CONFLICT(person_id) DO NOTHING
            "#,
            params![id, slugify(&name)],
        )?;
    }

    let total = conn.query_row("SELECT COUNT(*) FROM councilmatic_person", [], |row| {
        row.get(0)
    })?;
    Ok(SyncReport { created, total })
}

/// Same contract as `sync_people` for councilmatic_event.
pub fn sync_events(conn: &Connection) -> Result<SyncReport, SyncError> {
    let missing: Vec<(String, String, String)> = conn
        .prepare(
            r#"
            SELECT id, name, start_time FROM ocd_event
            WHERE id NOT IN (SELECT event_id FROM councilmatic_event)
            "#,
        )?
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<Result<_, _>>()?;

    let mut created = 0;
    for (id, name, start_time) in missing {
        let start = DateTime::parse_from_rfc3339(&start_time)
            .map_err(|e| SyncError::Timestamp(id.clone(), e))?;
        created += conn.execute(
            r#"
            INSERT INTO councilmatic_event (event_id, slug)
            VALUES (?1, ?2)
            ON CONFLICT(event_id) DO NOTHING
            "#,
            params![id, event_slug(&name, &start)],
        )?;
    }

    let total = conn.query_row("SELECT COUNT(*) FROM councilmatic_event", [], |row| {
        row.get(0)
    })?;
    Ok(SyncReport { created, total })
}
