// src/repository.rs

use crate::mastery::SkillMastery;
use crate::profile::ChildProfile;
use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One answered question, kept for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub skill_id: String,
    pub question_kind: String,
    pub correct: bool,
    pub response_time: f64,
    pub timestamp: DateTime<Utc>,
}

/// Storage for a single child's profile and its skill records.
pub trait ProfileRepository {
    /// The profile with all of its skills attached.
    fn load_profile(&self) -> StoreResult<Option<ChildProfile>>;

    /// Writes profile fields and every attached skill.
    fn save_profile(&mut self, profile: &ChildProfile) -> StoreResult<()>;

    fn find(&self, skill_id: &str) -> StoreResult<Option<SkillMastery>>;

    fn upsert(&mut self, skill: &SkillMastery) -> StoreResult<()>;

    fn skills(&self) -> StoreResult<Vec<SkillMastery>>;

    fn log_attempt(&mut self, record: &AttemptRecord) -> StoreResult<()>;

    /// Bulk reset: profile, skills and attempt history.
    fn delete_all(&mut self) -> StoreResult<()>;

    /// Skills whose review date has passed, earliest first.
    fn due_skills(&self, now: DateTime<Utc>) -> StoreResult<Vec<SkillMastery>> {
        let mut due: Vec<SkillMastery> = self
            .skills()?
            .into_iter()
            .filter(|s| s.is_due_for_review(now))
            .collect();
        due.sort_by_key(|s| s.next_review_date);
        Ok(due)
    }
}

// --- SQLite ---

pub struct SqliteRepository {
    conn: Connection,
    profile_id: i64,
}

impl SqliteRepository {
    /// `conn` must already carry the schema from `database::init_db`.
    pub fn new(conn: Connection, profile_id: i64) -> Self {
        SqliteRepository { conn, profile_id }
    }

    pub fn profile_id(&self) -> i64 {
        self.profile_id
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn attempt_count(&self, skill_id: &str) -> StoreResult<i64> {
        let count = self.conn.query_row(
            "SELECT count(*) FROM attempts WHERE profile_id = ? AND skill_id = ?",
            params![self.profile_id, skill_id],
            |r| r.get(0),
        )?;
        Ok(count)
    }
}

const SKILL_COLUMNS: &str = "skill_id, level, correct_streak, total_attempts, correct_attempts,
     average_response_time, last_practiced_ms, ease_factor, interval_days, next_review_ms";

fn skill_from_row(row: &Row) -> rusqlite::Result<SkillMastery> {
    Ok(SkillMastery {
        skill_id: row.get(0)?,
        level: row.get(1)?,
        correct_streak: row.get(2)?,
        total_attempts: row.get(3)?,
        correct_attempts: row.get(4)?,
        average_response_time: row.get(5)?,
        last_practiced: from_ms(row.get(6)?),
        ease_factor: row.get(7)?,
        interval: row.get(8)?,
        next_review_date: from_ms(row.get(9)?),
    })
}

fn from_ms(ms: Option<i64>) -> Option<DateTime<Utc>> {
    ms.and_then(DateTime::<Utc>::from_timestamp_millis)
}

fn to_date_text(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

fn from_date_text(text: Option<String>) -> Option<NaiveDate> {
    text.and_then(|t| NaiveDate::parse_from_str(&t, DATE_FORMAT).ok())
}

impl ProfileRepository for SqliteRepository {
    fn load_profile(&self) -> StoreResult<Option<ChildProfile>> {
        let profile = self
            .conn
            .query_row(
                "SELECT id, name, birth_date, current_level, total_practice_time,
                        last_session_date, daily_practice_goal, streak_days, created_at
                 FROM profiles WHERE id = ?",
                [self.profile_id],
                |row| {
                    Ok(ChildProfile {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        birth_date: from_date_text(row.get(2)?),
                        current_level: row.get(3)?,
                        skills: Vec::new(), // Filled below
                        total_practice_time: row.get(4)?,
                        last_session_date: from_date_text(row.get(5)?),
                        daily_practice_goal: row.get(6)?,
                        streak_days: row.get(7)?,
                        created_at: from_ms(row.get(8)?).unwrap_or_default(),
                    })
                },
            )
            .optional()?;

        match profile {
            Some(mut p) => {
                p.skills = self.skills()?;
                Ok(Some(p))
            }
            None => Ok(None),
        }
    }

    fn save_profile(&mut self, profile: &ChildProfile) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO profiles (id, name, birth_date, current_level, total_practice_time,
                                   last_session_date, daily_practice_goal, streak_days, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                birth_date = excluded.birth_date,
                current_level = excluded.current_level,
                total_practice_time = excluded.total_practice_time,
                last_session_date = excluded.last_session_date,
                daily_practice_goal = excluded.daily_practice_goal,
                streak_days = excluded.streak_days",
            params![
                self.profile_id,
                profile.name,
                to_date_text(profile.birth_date),
                profile.current_level,
                profile.total_practice_time,
                to_date_text(profile.last_session_date),
                profile.daily_practice_goal,
                profile.streak_days,
                profile.created_at.timestamp_millis()
            ],
        )?;
        for skill in &profile.skills {
            upsert_skill(&tx, self.profile_id, skill)?;
        }
        tx.commit()?;

        debug!(
            "[DB] Saved profile {} with {} skills",
            self.profile_id,
            profile.skills.len()
        );
        Ok(())
    }

    fn find(&self, skill_id: &str) -> StoreResult<Option<SkillMastery>> {
        let sql = format!(
            "SELECT {} FROM skill_mastery WHERE profile_id = ? AND skill_id = ?",
            SKILL_COLUMNS
        );
        let skill = self
            .conn
            .query_row(&sql, params![self.profile_id, skill_id], skill_from_row)
            .optional()?;
        Ok(skill)
    }

    fn upsert(&mut self, skill: &SkillMastery) -> StoreResult<()> {
        upsert_skill(&self.conn, self.profile_id, skill)?;
        Ok(())
    }

    fn skills(&self) -> StoreResult<Vec<SkillMastery>> {
        let sql = format!(
            "SELECT {} FROM skill_mastery WHERE profile_id = ? ORDER BY skill_id ASC",
            SKILL_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let skills = stmt
            .query_map([self.profile_id], skill_from_row)?
            .collect::<Result<Vec<SkillMastery>, _>>()?;
        Ok(skills)
    }

    fn log_attempt(&mut self, record: &AttemptRecord) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO attempts (profile_id, skill_id, question_kind, correct, response_time, timestamp)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                self.profile_id,
                record.skill_id,
                record.question_kind,
                record.correct,
                record.response_time,
                record.timestamp.timestamp_millis()
            ],
        )?;
        Ok(())
    }

    fn delete_all(&mut self) -> StoreResult<()> {
        // Skills and attempts go with the profile (ON DELETE CASCADE).
        self.conn
            .execute("DELETE FROM profiles WHERE id = ?", [self.profile_id])?;
        debug!("[DB] Reset profile {}", self.profile_id);
        Ok(())
    }

    fn due_skills(&self, now: DateTime<Utc>) -> StoreResult<Vec<SkillMastery>> {
        let sql = format!(
            "SELECT {} FROM skill_mastery
             WHERE profile_id = ? AND next_review_ms IS NOT NULL AND next_review_ms <= ?
             ORDER BY next_review_ms ASC",
            SKILL_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let skills = stmt
            .query_map(params![self.profile_id, now.timestamp_millis()], skill_from_row)?
            .collect::<Result<Vec<SkillMastery>, _>>()?;
        Ok(skills)
    }
}

fn upsert_skill(conn: &Connection, profile_id: i64, skill: &SkillMastery) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO skill_mastery (profile_id, skill_id, level, correct_streak,
            total_attempts, correct_attempts, average_response_time, last_practiced_ms,
            ease_factor, interval_days, next_review_ms)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            profile_id,
            skill.skill_id,
            skill.level,
            skill.correct_streak,
            skill.total_attempts,
            skill.correct_attempts,
            skill.average_response_time,
            skill.last_practiced.map(|d| d.timestamp_millis()),
            skill.ease_factor,
            skill.interval,
            skill.next_review_date.map(|d| d.timestamp_millis())
        ],
    )?;
    Ok(())
}

// --- In-memory ---

/// Repository kept entirely in memory, for tests and free play.
#[derive(Default)]
pub struct MemoryRepository {
    profile: Option<ChildProfile>,
    skills: BTreeMap<String, SkillMastery>,
    pub attempts: Vec<AttemptRecord>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileRepository for MemoryRepository {
    fn load_profile(&self) -> StoreResult<Option<ChildProfile>> {
        Ok(self.profile.clone().map(|mut p| {
            p.skills = self.skills.values().cloned().collect();
            p
        }))
    }

    fn save_profile(&mut self, profile: &ChildProfile) -> StoreResult<()> {
        for skill in &profile.skills {
            self.skills.insert(skill.skill_id.clone(), skill.clone());
        }
        let mut stored = profile.clone();
        stored.skills.clear();
        self.profile = Some(stored);
        Ok(())
    }

    fn find(&self, skill_id: &str) -> StoreResult<Option<SkillMastery>> {
        Ok(self.skills.get(skill_id).cloned())
    }

    fn upsert(&mut self, skill: &SkillMastery) -> StoreResult<()> {
        self.skills.insert(skill.skill_id.clone(), skill.clone());
        Ok(())
    }

    fn skills(&self) -> StoreResult<Vec<SkillMastery>> {
        Ok(self.skills.values().cloned().collect())
    }

    fn log_attempt(&mut self, record: &AttemptRecord) -> StoreResult<()> {
        self.attempts.push(record.clone());
        Ok(())
    }

    fn delete_all(&mut self) -> StoreResult<()> {
        self.profile = None;
        self.skills.clear();
        self.attempts.clear();
        Ok(())
    }
}
