mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior};
use uuid::Uuid;

use crate::error::TrackerError;
use crate::models::*;

const KID_COLUMNS: &str = "id, name, level, photo_url, created_at, updated_at";
const WORKSHOP_COLUMNS: &str = "id, name, created_at, updated_at";
const PROGRESS_COLUMNS: &str = "id, kid_id, workshop_id, bookmarked_at, presented_at, validated_at";

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "montesuivi")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("montesuivi.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Kid operations
    // ============================================================

    pub fn get_all_kids(&self) -> Result<Vec<Kid>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM kids ORDER BY name, created_at",
            KID_COLUMNS
        ))?;

        let kids = stmt
            .query_map([], kid_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(kids)
    }

    pub fn get_kid(&self, id: Uuid) -> Result<Option<Kid>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let kid = conn
            .query_row(
                &format!("SELECT {} FROM kids WHERE id = ?", KID_COLUMNS),
                [id.to_string()],
                kid_from_row,
            )
            .optional()?;
        Ok(kid)
    }

    pub fn create_kid(&self, input: CreateKidInput) -> Result<Kid> {
        let name = required_name(input.name)?;
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();
        let level = input.level.unwrap_or_default();

        conn.execute(
            "INSERT INTO kids (id, name, level, photo_url, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &name,
                level.as_str(),
                &input.photo_url,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        tracing::debug!(kid_id = %id, "Created kid");

        Ok(Kid {
            id,
            name,
            level,
            photo_url: input.photo_url,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_kid(&self, id: Uuid, input: UpdateKidInput) -> Result<Option<Kid>> {
        let Some(existing) = self.get_kid(id)? else {
            return Ok(None);
        };

        let name = match input.name {
            Some(name) => required_name(name)?,
            None => existing.name,
        };
        let level = input.level.unwrap_or(existing.level);
        let now = Utc::now();

        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "UPDATE kids SET name = ?, level = ?, updated_at = ? WHERE id = ?",
            (&name, level.as_str(), now.to_rfc3339(), id.to_string()),
        )?;

        Ok(Some(Kid {
            id,
            name,
            level,
            photo_url: existing.photo_url,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    /// Replace the kid's photo reference. `None` clears it.
    pub fn set_kid_photo(&self, id: Uuid, photo_url: Option<String>) -> Result<Option<Kid>> {
        let Some(existing) = self.get_kid(id)? else {
            return Ok(None);
        };

        let now = Utc::now();
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "UPDATE kids SET photo_url = ?, updated_at = ? WHERE id = ?",
            (&photo_url, now.to_rfc3339(), id.to_string()),
        )?;

        Ok(Some(Kid {
            photo_url,
            updated_at: now,
            ..existing
        }))
    }

    pub fn delete_kid(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM kids WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Workshop operations
    // ============================================================

    pub fn get_all_workshops(&self) -> Result<Vec<Workshop>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM workshops ORDER BY name, created_at",
            WORKSHOP_COLUMNS
        ))?;

        let workshops = stmt
            .query_map([], workshop_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(workshops)
    }

    pub fn get_workshop(&self, id: Uuid) -> Result<Option<Workshop>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let workshop = conn
            .query_row(
                &format!("SELECT {} FROM workshops WHERE id = ?", WORKSHOP_COLUMNS),
                [id.to_string()],
                workshop_from_row,
            )
            .optional()?;
        Ok(workshop)
    }

    pub fn create_workshop(&self, input: CreateWorkshopInput) -> Result<Workshop> {
        let name = required_name(input.name)?;
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO workshops (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)",
            (id.to_string(), &name, now.to_rfc3339(), now.to_rfc3339()),
        )?;

        tracing::debug!(workshop_id = %id, "Created workshop");

        Ok(Workshop {
            id,
            name,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_workshop(&self, id: Uuid, input: UpdateWorkshopInput) -> Result<Option<Workshop>> {
        let Some(existing) = self.get_workshop(id)? else {
            return Ok(None);
        };

        let name = match input.name {
            Some(name) => required_name(name)?,
            None => existing.name,
        };
        let now = Utc::now();

        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "UPDATE workshops SET name = ?, updated_at = ? WHERE id = ?",
            (&name, now.to_rfc3339(), id.to_string()),
        )?;

        Ok(Some(Workshop {
            id,
            name,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    pub fn delete_workshop(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM workshops WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Progress operations
    // ============================================================

    /// All progress records of a kid, in the order they were first created.
    pub fn get_progresses_for_kid(&self, kid_id: Uuid) -> Result<Vec<Progress>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM progresses WHERE kid_id = ? ORDER BY rowid",
            PROGRESS_COLUMNS
        ))?;

        let progresses = stmt
            .query_map([kid_id.to_string()], progress_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(progresses)
    }

    pub fn get_progresses_for_workshop(&self, workshop_id: Uuid) -> Result<Vec<Progress>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM progresses WHERE workshop_id = ? ORDER BY rowid",
            PROGRESS_COLUMNS
        ))?;

        let progresses = stmt
            .query_map([workshop_id.to_string()], progress_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(progresses)
    }

    pub fn get_progress(&self, kid_id: Uuid, workshop_id: Uuid) -> Result<Option<Progress>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let progress = conn
            .query_row(
                &format!(
                    "SELECT {} FROM progresses WHERE kid_id = ? AND workshop_id = ?",
                    PROGRESS_COLUMNS
                ),
                [kid_id.to_string(), workshop_id.to_string()],
                progress_from_row,
            )
            .optional()?;
        Ok(progress)
    }

    /// Apply an action to the (kid, workshop) record, creating it on first use.
    ///
    /// The existence checks, the read and the upsert run in one transaction
    /// under a single lock, so concurrent actions on the same pair compose.
    pub fn apply_progress_action(
        &self,
        kid_id: Uuid,
        workshop_id: Uuid,
        action: ProgressAction,
        at: DateTime<Utc>,
    ) -> Result<Progress> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !row_exists(&tx, "SELECT 1 FROM kids WHERE id = ?", kid_id)? {
            return Err(TrackerError::NotFound("Kid").into());
        }
        if !row_exists(&tx, "SELECT 1 FROM workshops WHERE id = ?", workshop_id)? {
            return Err(TrackerError::NotFound("Workshop").into());
        }

        let existing = tx
            .query_row(
                &format!(
                    "SELECT {} FROM progresses WHERE kid_id = ? AND workshop_id = ?",
                    PROGRESS_COLUMNS
                ),
                [kid_id.to_string(), workshop_id.to_string()],
                progress_from_row,
            )
            .optional()?;

        let mut progress = existing.unwrap_or(Progress {
            id: Uuid::new_v4(),
            kid_id,
            workshop_id,
            bookmarked_at: None,
            presented_at: None,
            validated_at: None,
        });
        action.apply(&mut progress, at);

        tx.execute(
            "INSERT INTO progresses (id, kid_id, workshop_id, bookmarked_at, presented_at, validated_at, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (kid_id, workshop_id) DO UPDATE SET
                bookmarked_at = excluded.bookmarked_at,
                presented_at = excluded.presented_at,
                validated_at = excluded.validated_at",
            (
                progress.id.to_string(),
                kid_id.to_string(),
                workshop_id.to_string(),
                progress.bookmarked_at.map(|t| t.to_rfc3339()),
                progress.presented_at.map(|t| t.to_rfc3339()),
                progress.validated_at.map(|t| t.to_rfc3339()),
                Utc::now().to_rfc3339(),
            ),
        )?;
        tx.commit()?;

        tracing::debug!(
            kid_id = %kid_id,
            workshop_id = %workshop_id,
            action = action.as_str(),
            "Applied progress action"
        );

        Ok(progress)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn row_exists(conn: &Connection, sql: &str, id: Uuid) -> Result<bool> {
    let found = conn
        .query_row(sql, [id.to_string()], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn required_name(name: String) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::Invalid("name must not be empty".to_string()).into());
    }
    Ok(trimmed.to_string())
}

fn kid_from_row(row: &Row<'_>) -> rusqlite::Result<Kid> {
    Ok(Kid {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        level: KidLevel::from_str(&row.get::<_, String>(2)?).unwrap_or_default(),
        photo_url: row.get(3)?,
        created_at: parse_datetime(row.get::<_, String>(4)?),
        updated_at: parse_datetime(row.get::<_, String>(5)?),
    })
}

fn workshop_from_row(row: &Row<'_>) -> rusqlite::Result<Workshop> {
    Ok(Workshop {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        created_at: parse_datetime(row.get::<_, String>(2)?),
        updated_at: parse_datetime(row.get::<_, String>(3)?),
    })
}

fn progress_from_row(row: &Row<'_>) -> rusqlite::Result<Progress> {
    Ok(Progress {
        id: parse_uuid(row.get::<_, String>(0)?),
        kid_id: parse_uuid(row.get::<_, String>(1)?),
        workshop_id: parse_uuid(row.get::<_, String>(2)?),
        bookmarked_at: parse_timestamp(row.get(3)?),
        presented_at: parse_timestamp(row.get(4)?),
        validated_at: parse_timestamp(row.get(5)?),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Milestone timestamps that fail to parse count as unset.
fn parse_timestamp(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
