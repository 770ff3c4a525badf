// src/profile.rs

use crate::constants::DAILY_PRACTICE_GOAL_SECONDS;
use crate::mastery::SkillMastery;
use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

/// One child's learning record. Owns the per-skill mastery entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildProfile {
    pub id: i64,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub current_level: u32,
    pub skills: Vec<SkillMastery>,
    /// Seconds.
    pub total_practice_time: f64,
    /// Local calendar day of the last session.
    pub last_session_date: Option<NaiveDate>,
    /// Seconds.
    pub daily_practice_goal: f64,
    pub streak_days: u32,
    pub created_at: DateTime<Utc>,
}

impl ChildProfile {
    pub fn new(name: &str, created_at: DateTime<Utc>) -> Self {
        ChildProfile {
            id: 0,
            name: name.to_string(),
            birth_date: None,
            current_level: 1,
            skills: Vec::new(),
            total_practice_time: 0.0,
            last_session_date: None,
            daily_practice_goal: DAILY_PRACTICE_GOAL_SECONDS,
            streak_days: 0,
            created_at,
        }
    }

    pub fn age(&self, today: NaiveDate) -> Option<u32> {
        self.birth_date.and_then(|birth| today.years_since(birth))
    }

    /// Practice time credited to today; zero unless the last session was today.
    pub fn today_practice_time(&self, today: NaiveDate) -> f64 {
        match self.last_session_date {
            Some(last) if last == today => self.total_practice_time,
            _ => 0.0,
        }
    }

    pub fn skill(&self, skill_id: &str) -> Option<&SkillMastery> {
        self.skills.iter().find(|s| s.skill_id == skill_id)
    }

    pub fn skill_mut(&mut self, skill_id: &str) -> Option<&mut SkillMastery> {
        self.skills.iter_mut().find(|s| s.skill_id == skill_id)
    }

    pub fn add_skill(&mut self, skill: SkillMastery) {
        self.skills.push(skill);
    }

    /// Existing record for `skill_id`, or a fresh one at `level`.
    pub fn skill_or_insert(&mut self, skill_id: &str, level: u32) -> &mut SkillMastery {
        let index = match self.skills.iter().position(|s| s.skill_id == skill_id) {
            Some(i) => i,
            None => {
                debug!("[Profile] Tracking new skill {}", skill_id);
                self.skills.push(SkillMastery::new(skill_id, level));
                self.skills.len() - 1
            }
        };
        &mut self.skills[index]
    }

    pub fn add_practice_time(&mut self, seconds: f64) {
        self.total_practice_time += seconds;
    }

    /// Consecutive-day counter: yesterday extends it, a gap restarts it.
    pub fn update_streak(&mut self, today: NaiveDate) {
        self.streak_days = match self.last_session_date {
            Some(last) if today.pred_opt() == Some(last) => self.streak_days + 1,
            Some(last) if last == today => self.streak_days,
            _ => 1,
        };
        self.last_session_date = Some(today);
    }
}
