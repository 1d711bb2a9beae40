//! SQLite-backed local store for the CLI.
//!
//! Provides persistent storage for:
//! - Skin profiles (newest is authoritative)
//! - Logged sunscreen applications
//! - Key-value store for application state (the serialized decision engine)

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{CoreError, DatabaseError};
use crate::exposure::{FitzpatrickType, SkinProfile};
use crate::sunscreen::{ActivityLevel, Quantity, SunscreenApplication};

use super::data_dir;

/// SQLite database for profiles, applications and engine state.
pub struct Database {
    conn: Connection,
}

fn timestamp(at: DateTime<Utc>) -> String {
    // Fixed width so text ordering matches time ordering.
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn corrupt(table: &str, message: impl ToString) -> DatabaseError {
    DatabaseError::CorruptRow {
        table: table.to_string(),
        message: message.to_string(),
    }
}

fn parse_timestamp(table: &str, raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt(table, e))
}

fn parse_uuid(table: &str, raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| corrupt(table, e))
}

impl Database {
    /// Open the database at `~/.config/sunguard/sunguard.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("sunguard.db");
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS profiles (
                    id          TEXT PRIMARY KEY,
                    skin_type   INTEGER NOT NULL,
                    created_at  TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS applications (
                    id          TEXT PRIMARY KEY,
                    spf         REAL NOT NULL,
                    quantity    TEXT NOT NULL,
                    activity    TEXT NOT NULL,
                    applied_at  TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_profiles_created_at ON profiles(created_at);
                CREATE INDEX IF NOT EXISTS idx_applications_applied_at ON applications(applied_at);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    // ── Profiles ─────────────────────────────────────────────────────

    pub fn create_profile(&self, profile: &SkinProfile) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO profiles (id, skin_type, created_at) VALUES (?1, ?2, ?3)",
            params![
                profile.id.to_string(),
                profile.skin_type.as_u8(),
                timestamp(profile.created_at),
            ],
        )?;
        Ok(())
    }

    /// The most recently created profile.
    pub fn current_profile(&self) -> Result<Option<SkinProfile>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, skin_type, created_at FROM profiles
             ORDER BY created_at DESC, id DESC LIMIT 1",
        )?;
        let result = stmt.query_row([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u8>(1)?,
                row.get::<_, String>(2)?,
            ))
        });
        let (id, skin_type, created_at) = match result {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(SkinProfile {
            id: parse_uuid("profiles", &id)?,
            skin_type: FitzpatrickType::from_u8(skin_type)
                .ok_or_else(|| corrupt("profiles", format!("skin type {skin_type}")))?,
            created_at: parse_timestamp("profiles", &created_at)?,
        }))
    }

    // ── Applications ─────────────────────────────────────────────────

    pub fn log_application(&self, application: &SunscreenApplication) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO applications (id, spf, quantity, activity, applied_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                application.id.to_string(),
                application.spf,
                application.quantity.as_str(),
                application.activity.as_str(),
                timestamp(application.applied_at),
            ],
        )?;
        Ok(())
    }

    /// Applications, newest first. `limit` of `None` returns all of them.
    pub fn applications(&self, limit: Option<u32>) -> Result<Vec<SunscreenApplication>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, spf, quantity, activity, applied_at FROM applications
             ORDER BY applied_at DESC, id DESC
             LIMIT ?1",
        )?;
        let limit = limit.map_or(-1, i64::from);
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut applications = Vec::new();
        for row in rows {
            let (id, spf, quantity, activity, applied_at) = row?;
            applications.push(SunscreenApplication {
                id: parse_uuid("applications", &id)?,
                spf,
                quantity: Quantity::from_str(&quantity).map_err(|e| corrupt("applications", e))?,
                activity: ActivityLevel::from_str(&activity)
                    .map_err(|e| corrupt("applications", e))?,
                applied_at: parse_timestamp("applications", &applied_at)?,
            });
        }
        Ok(applications)
    }

    /// Delete one application. Returns whether a row was removed.
    pub fn delete_application(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let removed = self
            .conn
            .execute("DELETE FROM applications WHERE id = ?1", params![id.to_string()])?;
        Ok(removed > 0)
    }

    // ── Key-value ────────────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}
