use rusqlite::{Connection, params};

use crate::sync::slugify;
use crate::types::{Event, Organization, Person};

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Open (or create) the store and ensure both schemas exist: the
/// canonical ocd_* tables written by the scrapers and the
/// councilmatic_* tables populated by sync.
pub fn open(db_path: &str) -> Result<Connection, DbError> {
    let conn = Connection::open(db_path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    init(&conn)?;
    Ok(conn)
}

pub fn init(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS ocd_person (
          id TEXT PRIMARY KEY,
          name TEXT NOT NULL,
          district_label TEXT NOT NULL,
          role TEXT NOT NULL,
          email TEXT NOT NULL,
          links_json TEXT NOT NULL,
          sources_json TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS ocd_event (
          id TEXT PRIMARY KEY,
          name TEXT NOT NULL,
          start_time TEXT NOT NULL,
          timezone TEXT NOT NULL,
          location TEXT NOT NULL,
          sources_json TEXT NOT NULL,
          identifiers_json TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS ocd_organization (
          id TEXT PRIMARY KEY,
          name TEXT NOT NULL,
          classification TEXT NOT NULL,
          posts_json TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS councilmatic_person (
          person_id TEXT PRIMARY KEY,
          slug TEXT NOT NULL,
          headshot TEXT NOT NULL DEFAULT '',
          biography TEXT
        );

        CREATE TABLE IF NOT EXISTS councilmatic_event (
          event_id TEXT PRIMARY KEY,
          slug TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Canonical ids are deterministic so re-running a scrape upserts the
/// same rows instead of accumulating duplicates.
pub fn person_id(person: &Person) -> String {
    format!("ocd-person/{}", slugify(&person.name))
}

pub fn event_id(event: &Event) -> String {
    format!("ocd-event/{}", event.external_id)
}

pub fn organization_id(org: &Organization) -> String {
    format!("ocd-organization/{}", slugify(&org.name))
}

pub fn upsert_person(conn: &Connection, person: &Person) -> Result<(), DbError> {
    conn.execute(
        r#"
        INSERT INTO ocd_person (id, name, district_label, role, email, links_json, sources_json)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(id) DO UPDATE SET
          name=excluded.name,
          district_label=excluded.district_label,
          role=excluded.role,
          email=excluded.email,
          links_json=excluded.links_json,
          sources_json=excluded.sources_json
        "#,
        params![
            person_id(person),
            person.name,
            person.district_label,
            person.role,
            person.email,
            serde_json::to_string(&person.links)?,
            serde_json::to_string(&person.sources)?,
        ],
    )?;
    Ok(())
}

pub fn upsert_event(conn: &Connection, event: &Event) -> Result<(), DbError> {
    conn.execute(
        r#"
        INSERT INTO ocd_event (id, name, start_time, timezone, location, sources_json, identifiers_json)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(id) DO UPDATE SET
          name=excluded.name,
          start_time=excluded.start_time,
          timezone=excluded.timezone,
          location=excluded.location,
          sources_json=excluded.sources_json,
          identifiers_json=excluded.identifiers_json
        "#,
        params![
            event_id(event),
            event.name,
            event.start_time.to_rfc3339(),
            event.timezone,
            event.location,
            serde_json::to_string(&event.sources)?,
            serde_json::to_string(&event.identifiers)?,
        ],
    )?;
    Ok(())
}

pub fn upsert_organization(conn: &Connection, org: &Organization) -> Result<(), DbError> {
    conn.execute(
        r#"
        INSERT INTO ocd_organization (id, name, classification, posts_json)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(id) DO UPDATE SET
          name=excluded.name,
          classification=excluded.classification,
          posts_json=excluded.posts_json
        "#,
        params![
            organization_id(org),
            org.name,
            org.classification,
            serde_json::to_string(&org.posts)?,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Identifier, Person};
    use chrono::DateTime;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory db");
        init(&conn).expect("schema");
        conn
    }

    fn sample_person() -> Person {
        Person {
            name: "Jane Q. Public".to_string(),
            district_label: "District 3".to_string(),
            role: "Councilmember".to_string(),
            email: "jane.q..public@seattle.gov".to_string(),
            links: vec!["https://www.seattle.gov/council/members#JaneQ.Public".to_string()],
            sources: vec!["https://www.seattle.gov/council/members".to_string()],
        }
    }

    fn sample_event(id: &str, rfc3339: &str) -> Event {
        Event {
            external_id: id.to_string(),
            name: "Finance Committee".to_string(),
            start_time: DateTime::parse_from_rfc3339(rfc3339).expect("valid timestamp"),
            timezone: "America/Los_Angeles".to_string(),
            location: "Council Chambers".to_string(),
            sources: Vec::new(),
            identifiers: vec![Identifier {
                scheme: "legistar_event_id".to_string(),
                value: id.to_string(),
            }],
        }
    }

    #[test]
    fn test_ids_are_deterministic() {
        let person = sample_person();
        assert_eq!(person_id(&person), "ocd-person/jane-q-public");
        assert_eq!(person_id(&person), person_id(&sample_person()));

        let event = sample_event("42", "2023-05-01T10:00:00-07:00");
        assert_eq!(event_id(&event), "ocd-event/42");
    }

    #[test]
    fn test_upsert_person_is_idempotent() {
        let conn = test_conn();
        let person = sample_person();

        upsert_person(&conn, &person).expect("first upsert");
        upsert_person(&conn, &person).expect("second upsert");

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM ocd_person", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_upsert_event_updates_in_place() {
        let conn = test_conn();
        upsert_event(&conn, &sample_event("42", "2023-05-01T10:00:00-07:00")).expect("insert");

        let mut moved = sample_event("42", "2023-05-01T10:00:00-07:00");
        moved.location = "Remote".to_string();
        upsert_event(&conn, &moved).expect("update");

        let (count, location): (i64, String) = conn
            .query_row(
                "SELECT COUNT(*), MAX(location) FROM ocd_event",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .expect("row");
        assert_eq!(count, 1);
        assert_eq!(location, "Remote");
    }
}
