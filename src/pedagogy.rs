// src/pedagogy.rs

use crate::constants::REPORT_WEAKEST_LIMIT;
use crate::feedback::{Feedback, FeedbackEvent};
use crate::level::LevelConfig;
use crate::mastery::{MasteryLevel, SkillMastery};
use crate::profile::ChildProfile;
use crate::question::{Answer, Question};
use crate::repository::{AttemptRecord, ProfileRepository, StoreResult};
use chrono::{DateTime, Local, NaiveDate, Utc};
use log::{debug, info, warn};
use serde::Serialize;

// --- Public Interface ---

#[derive(Debug, Clone, PartialEq)]
pub struct AttemptOutcome {
    pub correct: bool,
    pub skill: SkillMastery,
    pub newly_tracked: bool,
}

impl AttemptOutcome {
    pub fn mastery_level(&self) -> MasteryLevel {
        self.skill.mastery_level()
    }
}

/// Judges `answer`, plays the matching cue and folds the result into the
/// question's skill record.
pub fn process_attempt(
    repo: &mut dyn ProfileRepository,
    feedback: &dyn Feedback,
    question: &Question,
    answer: &Answer,
    config: &LevelConfig,
    response_time: f64,
    now: DateTime<Utc>,
) -> StoreResult<AttemptOutcome> {
    let correct = question.is_correct(answer, config);
    info!(
        "Processing {} answer for {} ({}): {:?}",
        if correct { "correct" } else { "wrong" },
        question.skill_id,
        question.kind.name(),
        answer
    );

    // 1. Feedback first, it never waits on storage
    if correct {
        feedback.haptic(FeedbackEvent::Success);
        feedback.speak_correct();
    } else {
        feedback.haptic(FeedbackEvent::Hint);
        feedback.speak_try_again();
    }

    // 2. Update Skill Mastery
    let existing = repo.find(&question.skill_id)?;
    let newly_tracked = existing.is_none();
    let mut skill =
        existing.unwrap_or_else(|| SkillMastery::new(&question.skill_id, question.level));
    skill.record_attempt(correct, response_time, now);
    repo.upsert(&skill)?;

    // 3. Log Attempt
    repo.log_attempt(&AttemptRecord {
        skill_id: question.skill_id.clone(),
        question_kind: question.kind.name().to_string(),
        correct,
        response_time,
        timestamp: now,
    })?;

    Ok(AttemptOutcome {
        correct,
        skill,
        newly_tracked,
    })
}

/// Skills that should be revisited, most overdue first.
pub fn due_reviews(repo: &dyn ProfileRepository, now: DateTime<Utc>) -> StoreResult<Vec<SkillMastery>> {
    let due = repo.due_skills(now)?;
    debug!("[Review] {} skills due", due.len());
    Ok(due)
}

/// Stamps the day streak and practice time once a level session ends.
pub fn finish_session(
    repo: &mut dyn ProfileRepository,
    practice_seconds: f64,
    today: NaiveDate,
) -> StoreResult<Option<ChildProfile>> {
    let Some(mut profile) = repo.load_profile()? else {
        warn!("No profile to credit practice time to");
        return Ok(None);
    };

    let old_streak = profile.streak_days;
    profile.update_streak(today);
    profile.add_practice_time(practice_seconds);
    repo.save_profile(&profile)?;

    info!(
        "[Profile] {}: streak {} -> {} days, practice {:.0}s",
        profile.name, old_streak, profile.streak_days, profile.total_practice_time
    );
    Ok(Some(profile))
}

// --- Reporting ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillSummary {
    pub skill_id: String,
    pub level: u32,
    pub accuracy: f64,
    pub mastery: MasteryLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressReport {
    pub profile_name: Option<String>,
    pub streak_days: u32,
    pub today_practice_time: f64,
    pub daily_practice_goal: f64,
    pub tracked_skills: usize,
    pub introduced: usize,
    pub learning: usize,
    pub practicing: usize,
    pub mastered: usize,
    pub total_attempts: u32,
    pub overall_accuracy: f64,
    pub average_response_time: f64,
    pub due_for_review: usize,
    /// Lowest accuracy first.
    pub weakest: Vec<SkillSummary>,
}

impl ProgressReport {
    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn progress_report(repo: &dyn ProfileRepository, now: DateTime<Utc>) -> StoreResult<ProgressReport> {
    let today = now.with_timezone(&Local).date_naive();
    let profile = repo.load_profile()?;
    let skills = match &profile {
        Some(p) => p.skills.clone(),
        None => repo.skills()?,
    };

    let count = |level: MasteryLevel| skills.iter().filter(|s| s.mastery_level() == level).count();

    let total_attempts: u32 = skills.iter().map(|s| s.total_attempts).sum();
    let correct_attempts: u32 = skills.iter().map(|s| s.correct_attempts).sum();
    let (overall_accuracy, average_response_time) = if total_attempts > 0 {
        let weighted: f64 = skills
            .iter()
            .map(|s| s.average_response_time * s.total_attempts as f64)
            .sum();
        (
            correct_attempts as f64 / total_attempts as f64,
            weighted / total_attempts as f64,
        )
    } else {
        (0.0, 0.0)
    };

    let mut weakest: Vec<SkillSummary> = skills
        .iter()
        .filter(|s| s.total_attempts > 0)
        .map(|s| SkillSummary {
            skill_id: s.skill_id.clone(),
            level: s.level,
            accuracy: s.accuracy(),
            mastery: s.mastery_level(),
        })
        .collect();
    weakest.sort_by(|a, b| a.accuracy.total_cmp(&b.accuracy).then(a.skill_id.cmp(&b.skill_id)));
    weakest.truncate(REPORT_WEAKEST_LIMIT);

    Ok(ProgressReport {
        profile_name: profile.as_ref().map(|p| p.name.clone()),
        streak_days: profile.as_ref().map_or(0, |p| p.streak_days),
        today_practice_time: profile.as_ref().map_or(0.0, |p| p.today_practice_time(today)),
        daily_practice_goal: profile.as_ref().map_or(0.0, |p| p.daily_practice_goal),
        tracked_skills: skills.len(),
        introduced: count(MasteryLevel::Introduced),
        learning: count(MasteryLevel::Learning),
        practicing: count(MasteryLevel::Practicing),
        mastered: count(MasteryLevel::Mastered),
        total_attempts,
        overall_accuracy,
        average_response_time,
        due_for_review: skills.iter().filter(|s| s.is_due_for_review(now)).count(),
        weakest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ClockTime;
    use crate::feedback::{RecordingFeedback, SPEECH_CORRECT, SPEECH_TRY_AGAIN};
    use crate::question::QuestionKind;
    use crate::repository::MemoryRepository;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 10, 0, 0).unwrap()
    }

    fn set_question(hour: i32, minute: i32) -> Question {
        Question {
            kind: QuestionKind::SetTime,
            level: 2,
            target: ClockTime::new(hour, minute),
            prompt: format!("{}に してね", ClockTime::new(hour, minute).japanese_reading()),
            skill_id: format!("half_{}_{}", hour, minute),
        }
    }

    #[test]
    fn correct_answer_creates_skill_and_cheers() {
        let mut repo = MemoryRepository::new();
        let fb = RecordingFeedback::default();
        let q = set_question(3, 30);

        let outcome = process_attempt(
            &mut repo,
            &fb,
            &q,
            &Answer::Time(ClockTime::new(3, 31)),
            LevelConfig::level(2),
            2.0,
            t0(),
        )
        .unwrap();

        assert!(outcome.correct);
        assert!(outcome.newly_tracked);
        assert_eq!(outcome.skill.level, 2);
        assert_eq!(outcome.mastery_level(), MasteryLevel::Learning);
        assert_eq!(*fb.events.borrow(), vec![FeedbackEvent::Success]);
        assert_eq!(*fb.utterances.borrow(), vec![SPEECH_CORRECT.to_string()]);
        assert_eq!(repo.find("half_3_30").unwrap(), Some(outcome.skill));
        assert_eq!(repo.attempts.len(), 1);
        assert_eq!(repo.attempts[0].question_kind, "set_time");
    }

    #[test]
    fn wrong_answer_resets_existing_streak() {
        let mut repo = MemoryRepository::new();
        let fb = RecordingFeedback::default();
        let q = set_question(9, 0);
        let config = LevelConfig::level(2);

        for _ in 0..3 {
            process_attempt(&mut repo, &fb, &q, &Answer::Time(ClockTime::new(9, 0)), config, 1.0, t0())
                .unwrap();
        }
        let outcome =
            process_attempt(&mut repo, &fb, &q, &Answer::Time(ClockTime::new(3, 0)), config, 1.0, t0())
                .unwrap();

        assert!(!outcome.correct);
        assert!(!outcome.newly_tracked);
        assert_eq!(outcome.skill.correct_streak, 0);
        assert_eq!(outcome.skill.interval, 1);
        assert_eq!(outcome.skill.total_attempts, 4);
        assert_eq!(fb.events.borrow().last(), Some(&FeedbackEvent::Hint));
        assert_eq!(fb.utterances.borrow().last(), Some(&SPEECH_TRY_AGAIN.to_string()));
    }

    #[test]
    fn due_reviews_after_interval() {
        let mut repo = MemoryRepository::new();
        let fb = RecordingFeedback::default();
        let q = set_question(6, 30);
        process_attempt(&mut repo, &fb, &q, &Answer::Time(ClockTime::new(6, 30)), LevelConfig::level(2), 1.0, t0())
            .unwrap();

        assert!(due_reviews(&repo, t0()).unwrap().is_empty());
        let due = due_reviews(&repo, t0() + Duration::days(1)).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].skill_id, "half_6_30");
    }

    #[test]
    fn finish_session_credits_profile() {
        let mut repo = MemoryRepository::new();
        let today = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        assert_eq!(finish_session(&mut repo, 60.0, today).unwrap(), None);

        repo.save_profile(&ChildProfile::new("はな", t0())).unwrap();
        finish_session(&mut repo, 60.0, today).unwrap();
        let profile = finish_session(&mut repo, 30.0, today.succ_opt().unwrap())
            .unwrap()
            .expect("profile");
        assert_eq!(profile.streak_days, 2);
        assert_eq!(profile.total_practice_time, 90.0);
    }

    #[test]
    fn report_summarises_skills() {
        let mut repo = MemoryRepository::new();
        let fb = RecordingFeedback::default();
        let config = LevelConfig::level(2);
        let good = set_question(1, 0);
        let weak = set_question(2, 30);

        for _ in 0..5 {
            process_attempt(&mut repo, &fb, &good, &Answer::Time(ClockTime::new(1, 0)), config, 2.0, t0())
                .unwrap();
        }
        process_attempt(&mut repo, &fb, &weak, &Answer::Time(ClockTime::new(8, 0)), config, 6.0, t0())
            .unwrap();

        let report = progress_report(&repo, t0()).unwrap();
        assert_eq!(report.tracked_skills, 2);
        assert_eq!(report.mastered, 1);
        assert_eq!(report.introduced, 1);
        assert_eq!(report.total_attempts, 6);
        assert!((report.overall_accuracy - 5.0 / 6.0).abs() < 1e-9);
        assert!((report.average_response_time - 16.0 / 6.0).abs() < 1e-9);
        assert_eq!(report.weakest[0].skill_id, "half_2_30");
        assert_eq!(report.due_for_review, 0);

        let json = report.to_json().unwrap();
        assert!(json.contains("\"mastered\": 1"));
    }
}
