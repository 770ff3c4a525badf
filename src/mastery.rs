// src/mastery.rs

use crate::constants::*;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MasteryLevel {
    Introduced,
    Learning,
    Practicing,
    Mastered,
}

impl MasteryLevel {
    pub fn label(self) -> &'static str {
        match self {
            MasteryLevel::Introduced => "はじめまして",
            MasteryLevel::Learning => "れんしゅうちゅう",
            MasteryLevel::Practicing => "もうすこし",
            MasteryLevel::Mastered => "できた",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            MasteryLevel::Introduced => "🌱",
            MasteryLevel::Learning => "🌿",
            MasteryLevel::Practicing => "🌳",
            MasteryLevel::Mastered => "🌸",
        }
    }
}

impl fmt::Display for MasteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.emoji(), self.label())
    }
}

/// Review state for one skill id, e.g. `hour_7`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMastery {
    pub skill_id: String,
    pub level: u32,
    pub correct_streak: u32,
    pub total_attempts: u32,
    pub correct_attempts: u32,
    /// Seconds.
    pub average_response_time: f64,
    pub last_practiced: Option<DateTime<Utc>>,
    pub ease_factor: f64,
    /// Days.
    pub interval: i64,
    pub next_review_date: Option<DateTime<Utc>>,
}

impl SkillMastery {
    pub fn new(skill_id: &str, level: u32) -> Self {
        SkillMastery {
            skill_id: skill_id.to_string(),
            level,
            correct_streak: 0,
            total_attempts: 0,
            correct_attempts: 0,
            average_response_time: 0.0,
            last_practiced: None,
            ease_factor: EASE_FACTOR_DEFAULT,
            interval: INTERVAL_DEFAULT,
            next_review_date: None,
        }
    }

    /// Fraction of attempts answered correctly, 0 before the first one.
    pub fn accuracy(&self) -> f64 {
        if self.total_attempts > 0 {
            self.correct_attempts as f64 / self.total_attempts as f64
        } else {
            0.0
        }
    }

    pub fn mastery_level(&self) -> MasteryLevel {
        let accuracy = self.accuracy();
        let streak = self.correct_streak;

        if accuracy >= MASTERED_ACCURACY && streak >= MASTERED_STREAK {
            MasteryLevel::Mastered
        } else if accuracy >= PRACTICING_ACCURACY && streak >= PRACTICING_STREAK {
            MasteryLevel::Practicing
        } else if accuracy >= LEARNING_ACCURACY {
            MasteryLevel::Learning
        } else {
            MasteryLevel::Introduced
        }
    }

    pub fn is_due_for_review(&self, now: DateTime<Utc>) -> bool {
        self.next_review_date.is_some_and(|next| now >= next)
    }

    /// Folds one answer into the record and schedules the next review.
    /// Response times are taken as given, negative values included.
    /// Timestamps are kept to the millisecond.
    pub fn record_attempt(&mut self, correct: bool, response_time: f64, now: DateTime<Utc>) {
        let now = now.trunc_subsecs(3);
        let old_ease = self.ease_factor;
        let old_interval = self.interval;

        self.total_attempts += 1;

        if correct {
            self.correct_attempts += 1;
            self.correct_streak += 1;

            // Fixed adjustment; it nets to zero.
            let adjustment = EASE_FACTOR_BASE_INCREMENT
                - EASE_FACTOR_QUALITY_PENALTY
                - EASE_FACTOR_QUALITY_PENALTY_SQ;
            self.ease_factor = (self.ease_factor + adjustment).max(EASE_FACTOR_MIN);

            self.interval = match self.correct_streak {
                1 => INTERVAL_FIRST_CORRECT,
                2 => INTERVAL_SECOND_CORRECT,
                _ => (self.interval as f64 * self.ease_factor) as i64,
            };
            debug!("[SRS logic] Branch: Correct (streak {})", self.correct_streak);
        } else {
            debug!("[SRS logic] Branch: Miss");
            self.correct_streak = 0;
            self.interval = INTERVAL_DEFAULT;
        }

        let total_time =
            self.average_response_time * (self.total_attempts - 1) as f64 + response_time;
        self.average_response_time = total_time / self.total_attempts as f64;

        self.last_practiced = Some(now);
        self.next_review_date = Some(
            Duration::try_days(self.interval)
                .and_then(|d| now.checked_add_signed(d))
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
                .trunc_subsecs(3),
        );

        info!(
            "[SRS Result] Skill {}: Ease {:.2} -> {:.2}, Interval {}d -> {}d, {}",
            self.skill_id,
            old_ease,
            self.ease_factor,
            old_interval,
            self.interval,
            self.mastery_level()
        );
    }
}
