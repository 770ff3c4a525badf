// src/database.rs

use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Result};

pub fn init_db(conn: &Connection) -> Result<()> {
    debug!("init_db: Checking database schema...");

    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        CREATE TABLE IF NOT EXISTS profiles (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL DEFAULT '',
            birth_date TEXT,
            current_level INTEGER NOT NULL DEFAULT 1,
            total_practice_time REAL NOT NULL DEFAULT 0.0,
            last_session_date TEXT,
            daily_practice_goal REAL NOT NULL DEFAULT 600.0,
            streak_days INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS skill_mastery (
            profile_id INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            skill_id TEXT NOT NULL,
            level INTEGER NOT NULL,
            correct_streak INTEGER NOT NULL DEFAULT 0,
            total_attempts INTEGER NOT NULL DEFAULT 0,
            correct_attempts INTEGER NOT NULL DEFAULT 0,
            average_response_time REAL NOT NULL DEFAULT 0.0,
            last_practiced_ms INTEGER,
            ease_factor REAL NOT NULL DEFAULT 2.5,
            interval_days INTEGER NOT NULL DEFAULT 1,
            next_review_ms INTEGER,
            PRIMARY KEY (profile_id, skill_id)
        );
        CREATE TABLE IF NOT EXISTS attempts (
            id INTEGER PRIMARY KEY,
            profile_id INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            skill_id TEXT NOT NULL,
            question_kind TEXT NOT NULL,
            correct INTEGER NOT NULL,
            response_time REAL NOT NULL,
            timestamp INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_skill_mastery_review
            ON skill_mastery (profile_id, next_review_ms);
        ",
    )?;

    Ok(())
}

/// Id of the first profile, creating one named `name` when the table is empty.
pub fn ensure_profile(conn: &Connection, name: &str, now: DateTime<Utc>) -> Result<i64> {
    let existing: Option<i64> = conn
        .query_row("SELECT id FROM profiles ORDER BY id ASC LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(
        "INSERT INTO profiles (name, created_at) VALUES (?, ?)",
        params![name, now.timestamp_millis()],
    )?;
    let id = conn.last_insert_rowid();
    info!("init_db: Created profile {} ({:?})", id, name);
    Ok(id)
}
