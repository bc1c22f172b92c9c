// Preference store: the `dining_preferences` table in SQLite.
//
// Every operation opens its own connection, runs one statement and drops the
// connection again. Opening never creates the database file unless the store
// was configured to bootstrap, so a missing or unreachable database surfaces
// as `StorageError::Unreachable` and a database without the table as
// `StorageError::SchemaMissing`. All statements are parameterized.

use std::fs;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OpenFlags, OptionalExtension, Row};
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::StorageError;
use crate::model::{ChoiceKind, PreferenceRecord};
use crate::secrets::DbCredentials;

/// Longest instructions text kept per record, in characters.
pub const MAX_INSTRUCTIONS_CHARS: usize = 3999;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS dining_preferences (
    identifier    TEXT    NOT NULL,
    choice_id     INTEGER NOT NULL,
    display_name  TEXT    NOT NULL,
    choice_kind   TEXT    NOT NULL CHECK (choice_kind IN ('eat_in', 'eat_out')),
    time_stamp    TEXT    NOT NULL,  -- RFC3339 UTC, fixed width
    dish_name     TEXT,
    ingredients   TEXT,              -- newline separated
    instructions  TEXT,
    location_name TEXT,
    PRIMARY KEY (identifier, choice_id),
    CHECK (
        (choice_kind = 'eat_in' AND dish_name IS NOT NULL AND location_name IS NULL)
        OR
        (choice_kind = 'eat_out' AND location_name IS NOT NULL AND dish_name IS NULL
            AND ingredients IS NULL AND instructions IS NULL)
    )
);

CREATE INDEX IF NOT EXISTS idx_preferences_identifier_time
    ON dining_preferences(identifier, time_stamp);

-- Highest choice_id ever handed out per identifier, so ids of deleted
-- records are never given out again.
CREATE TABLE IF NOT EXISTS preference_counters (
    identifier     TEXT    PRIMARY KEY,
    last_choice_id INTEGER NOT NULL
);
"#;

const SELECT_COLUMNS: &str = "SELECT choice_id, identifier, display_name, choice_kind, time_stamp, \
     dish_name, ingredients, instructions, location_name FROM dining_preferences";

#[derive(Debug)]
pub struct PreferenceStore {
    config: StoreConfig,
    credentials: DbCredentials,
}

/// Column values for one insert; which optional fields are set follows
/// from `kind`.
struct NewRecord<'a> {
    identifier: &'a str,
    display_name: &'a str,
    kind: ChoiceKind,
    dish_name: Option<&'a str>,
    ingredients: Option<&'a str>,
    instructions: Option<&'a str>,
    location_name: Option<&'a str>,
}

/// Row as stored, before the kind and timestamp text are parsed.
struct RawRecord {
    choice_id: i64,
    identifier: String,
    display_name: String,
    choice_kind: String,
    time_stamp: String,
    dish_name: Option<String>,
    ingredients: Option<String>,
    instructions: Option<String>,
    location_name: Option<String>,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            choice_id: row.get(0)?,
            identifier: row.get(1)?,
            display_name: row.get(2)?,
            choice_kind: row.get(3)?,
            time_stamp: row.get(4)?,
            dish_name: row.get(5)?,
            ingredients: row.get(6)?,
            instructions: row.get(7)?,
            location_name: row.get(8)?,
        })
    }
}

impl TryFrom<RawRecord> for PreferenceRecord {
    type Error = StorageError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let choice_kind = raw
            .choice_kind
            .parse::<ChoiceKind>()
            .map_err(|e| {
                StorageError::CorruptRecord(format!("choice_kind {:?}: {e}", raw.choice_kind))
            })?;
        let timestamp = DateTime::parse_from_rfc3339(&raw.time_stamp)
            .map_err(|e| StorageError::CorruptRecord(format!("time_stamp {:?}: {e}", raw.time_stamp)))?
            .with_timezone(&Utc);
        Ok(PreferenceRecord {
            choice_id: raw.choice_id,
            identifier: raw.identifier,
            display_name: raw.display_name,
            choice_kind,
            timestamp,
            dish_name: raw.dish_name,
            ingredients: raw.ingredients,
            instructions: raw.instructions,
            location_name: raw.location_name,
        })
    }
}

/// Sort the two connectivity failure classes out of a driver error.
fn classify(err: rusqlite::Error) -> StorageError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if matches!(
                e.code,
                ErrorCode::CannotOpen | ErrorCode::PermissionDenied | ErrorCode::NotADatabase
            ) =>
        {
            StorageError::Unreachable(err.to_string())
        }
        rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.starts_with("no such table") => {
            StorageError::SchemaMissing(msg.clone())
        }
        _ => StorageError::Query(err),
    }
}

/// First `max` characters of `s`, never splitting a character.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl PreferenceStore {
    /// Prepare a store for the database at `config.path`. With
    /// `config.bootstrap` set the file and table are created now; otherwise
    /// nothing is touched until the first operation.
    pub fn open(config: StoreConfig, credentials: DbCredentials) -> Result<Self, StorageError> {
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(StorageError::Unreachable(
                "database credentials are incomplete".into(),
            ));
        }
        let store = Self {
            config,
            credentials,
        };
        if store.config.bootstrap {
            store.bootstrap()?;
        }
        Ok(store)
    }

    fn bootstrap(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.config.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::Unreachable(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        let conn = Connection::open(&self.config.path).map_err(classify)?;
        conn.execute_batch(SCHEMA).map_err(classify)?;
        info!(path = %self.config.path.display(), "preferences schema ready");
        Ok(())
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        debug!(
            path = %self.config.path.display(),
            user = %self.credentials.username,
            "opening database connection"
        );
        Connection::open_with_flags(
            &self.config.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(classify)
    }

    /// Connectivity probe: the database opens and the table is present.
    pub fn ping(&self) -> Result<(), StorageError> {
        let conn = self.connect()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(classify)?;
        conn.prepare("SELECT 1 FROM dining_preferences LIMIT 1")
            .map_err(classify)?;
        conn.prepare("SELECT 1 FROM preference_counters LIMIT 1")
            .map_err(classify)?;
        Ok(())
    }

    fn insert(&self, record: NewRecord<'_>, at: DateTime<Utc>) -> Result<i64, StorageError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction().map_err(classify)?;
        // Seeded from existing rows the first time an identifier is counted.
        let choice_id: i64 = tx
            .query_row(
                r#"
                INSERT INTO preference_counters (identifier, last_choice_id)
                VALUES (?1, COALESCE(
                    (SELECT MAX(choice_id) FROM dining_preferences WHERE identifier = ?1), 0) + 1)
                ON CONFLICT (identifier) DO UPDATE SET last_choice_id = last_choice_id + 1
                RETURNING last_choice_id
                "#,
                params![record.identifier],
                |row| row.get(0),
            )
            .map_err(classify)?;
        tx.execute(
            r#"
            INSERT INTO dining_preferences (identifier, choice_id, display_name, choice_kind,
                time_stamp, dish_name, ingredients, instructions, location_name)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.identifier,
                choice_id,
                record.display_name,
                record.kind.to_string(),
                format_timestamp(at),
                record.dish_name,
                record.ingredients,
                record.instructions,
                record.location_name,
            ],
        )
        .map_err(classify)?;
        tx.commit().map_err(classify)?;
        info!(identifier = record.identifier, choice_id, kind = %record.kind, "preference saved");
        Ok(choice_id)
    }

    /// Save an eat-in choice. Instructions longer than
    /// [`MAX_INSTRUCTIONS_CHARS`] are cut to fit.
    pub fn insert_recipe(
        &self,
        identifier: &str,
        display_name: &str,
        dish_name: &str,
        ingredients: &str,
        instructions: &str,
    ) -> Result<i64, StorageError> {
        let record = NewRecord {
            identifier,
            display_name,
            kind: ChoiceKind::EatIn,
            dish_name: Some(dish_name),
            ingredients: Some(ingredients),
            instructions: Some(truncate_chars(instructions, MAX_INSTRUCTIONS_CHARS)),
            location_name: None,
        };
        self.insert(record, Utc::now())
    }

    /// Save an eat-out choice.
    pub fn insert_location(
        &self,
        identifier: &str,
        display_name: &str,
        location_name: &str,
    ) -> Result<i64, StorageError> {
        let record = NewRecord {
            identifier,
            display_name,
            kind: ChoiceKind::EatOut,
            dish_name: None,
            ingredients: None,
            instructions: None,
            location_name: Some(location_name),
        };
        self.insert(record, Utc::now())
    }

    /// All records for `identifier`, newest first. Empty means no history.
    pub fn list_by_identifier(&self, identifier: &str) -> Result<Vec<PreferenceRecord>, StorageError> {
        let conn = self.connect()?;
        let sql = format!(
            "{SELECT_COLUMNS} WHERE identifier = ?1 ORDER BY time_stamp DESC, choice_id DESC"
        );
        let mut stmt = conn.prepare(&sql).map_err(classify)?;
        let rows = stmt
            .query_map([identifier], RawRecord::from_row)
            .map_err(classify)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(classify)?;
        debug!(identifier, count = rows.len(), "preferences listed");
        rows.into_iter().map(PreferenceRecord::try_from).collect()
    }

    pub fn get_one(
        &self,
        identifier: &str,
        choice_id: i64,
    ) -> Result<Option<PreferenceRecord>, StorageError> {
        let conn = self.connect()?;
        let sql = format!("{SELECT_COLUMNS} WHERE identifier = ?1 AND choice_id = ?2");
        let raw = conn
            .query_row(&sql, params![identifier, choice_id], RawRecord::from_row)
            .optional()
            .map_err(classify)?;
        raw.map(PreferenceRecord::try_from).transpose()
    }

    /// Returns the number of rows removed (0 or 1).
    pub fn delete_one(&self, identifier: &str, choice_id: i64) -> Result<usize, StorageError> {
        let conn = self.connect()?;
        let removed = conn
            .execute(
                "DELETE FROM dining_preferences WHERE identifier = ?1 AND choice_id = ?2",
                params![identifier, choice_id],
            )
            .map_err(classify)?;
        info!(identifier, choice_id, removed, "preference deleted");
        Ok(removed)
    }

    pub fn delete_all(&self, identifier: &str) -> Result<usize, StorageError> {
        let conn = self.connect()?;
        let removed = conn
            .execute(
                "DELETE FROM dining_preferences WHERE identifier = ?1",
                [identifier],
            )
            .map_err(classify)?;
        info!(identifier, removed, "all preferences deleted");
        Ok(removed)
    }
}
