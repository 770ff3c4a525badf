// src/question.rs

use crate::clock::ClockTime;
use crate::constants::*;
use crate::level::LevelConfig;
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

// --- Learning Phase ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LearningPhase {
    Introduction,
    Recognition,
    Reproduction,
    Application,
}

impl LearningPhase {
    pub const ALL: [LearningPhase; 4] = [
        LearningPhase::Introduction,
        LearningPhase::Recognition,
        LearningPhase::Reproduction,
        LearningPhase::Application,
    ];

    /// Following phase, or `None` at the last one.
    pub fn next(self) -> Option<LearningPhase> {
        match self {
            LearningPhase::Introduction => Some(LearningPhase::Recognition),
            LearningPhase::Recognition => Some(LearningPhase::Reproduction),
            LearningPhase::Reproduction => Some(LearningPhase::Application),
            LearningPhase::Application => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LearningPhase::Introduction => "どうにゅう",
            LearningPhase::Recognition => "にんしき",
            LearningPhase::Reproduction => "さいせい",
            LearningPhase::Application => "おうよう",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            LearningPhase::Introduction => "とけいを みてみよう",
            LearningPhase::Recognition => "どっちかな？",
            LearningPhase::Reproduction => "はりを うごかそう",
            LearningPhase::Application => "なんじ？",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            LearningPhase::Introduction => "じかんと とけいを おぼえよう",
            LearningPhase::Recognition => "ただしい とけいを えらぼう",
            LearningPhase::Reproduction => "じぶんで とけいを あわせよう",
            LearningPhase::Application => "とけいを よんでみよう",
        }
    }
}

// --- Question ---

/// What the learner is asked to do, with the data only that variant needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum QuestionKind {
    /// Clock is shown, learner names the time.
    ReadTime,
    /// Time is named, learner sets the hands.
    SetTime,
    /// Learner picks the clock showing the named time.
    ChooseTime { options: Vec<ClockTime> },
    /// A daily event is paired with its hour.
    MatchEvent { event_name: String },
    /// Start time plus a duration; learner sets the end time.
    CalculateTime {
        start: ClockTime,
        duration_minutes: i32,
    },
}

impl QuestionKind {
    pub fn name(&self) -> &'static str {
        match self {
            QuestionKind::ReadTime => "read_time",
            QuestionKind::SetTime => "set_time",
            QuestionKind::ChooseTime { .. } => "choose_time",
            QuestionKind::MatchEvent { .. } => "match_event",
            QuestionKind::CalculateTime { .. } => "calculate_time",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub kind: QuestionKind,
    pub level: u32,
    pub target: ClockTime,
    pub prompt: String,
    /// Mastery key, e.g. `hour_7`, `half_3_30`, `calc_30`.
    pub skill_id: String,
}

/// The learner's response as reported by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Answer {
    /// "Next" on an event card.
    Acknowledged,
    Choice(usize),
    /// Level 1 hour picker.
    Hour(i32),
    Time(ClockTime),
}

impl Question {
    pub fn is_correct(&self, answer: &Answer, config: &LevelConfig) -> bool {
        let tolerance = config.tolerance_minutes();
        match (&self.kind, answer) {
            (QuestionKind::MatchEvent { .. }, _) => true,
            (QuestionKind::ChooseTime { options }, Answer::Choice(index)) => {
                options.get(*index) == Some(&self.target)
            }
            (QuestionKind::ChooseTime { .. }, Answer::Time(t)) => *t == self.target,
            (QuestionKind::ReadTime, Answer::Hour(h)) => *h == self.target.hour(),
            (QuestionKind::ReadTime, Answer::Time(t))
            | (QuestionKind::SetTime, Answer::Time(t))
            | (QuestionKind::CalculateTime { .. }, Answer::Time(t)) => {
                t.matches(&self.target, tolerance)
            }
            _ => false,
        }
    }
}

// --- Generator ---

/// Maps (level, phase) to a question, drawing parameters from `rng`.
pub struct QuestionGenerator<R: Rng> {
    rng: R,
}

impl<R: Rng> QuestionGenerator<R> {
    pub fn new(rng: R) -> Self {
        QuestionGenerator { rng }
    }

    pub fn generate(&mut self, level: u32, phase: LearningPhase) -> Question {
        let question = match level {
            1 => self.hour_question(phase),
            2 => self.half_hour_question(phase),
            3 => self.five_minute_question(phase),
            4 => self.precise_question(phase),
            5 => self.calculation_question(),
            _ => {
                warn!("No questions for level {}, serving an hour question", level);
                self.hour_question(LearningPhase::Application)
            }
        };

        debug!(
            "[Question] Level {} {:?}: {} ({}) target {}",
            level,
            phase,
            question.kind.name(),
            question.skill_id,
            question.target
        );
        question
    }

    fn random_hour(&mut self) -> i32 {
        self.rng.gen_range(1..=12)
    }

    fn hour_question(&mut self, phase: LearningPhase) -> Question {
        let hour = self.random_hour();
        let target = ClockTime::new(hour, 0);

        let (kind, prompt) = match phase {
            LearningPhase::Introduction => {
                let event = event_name(hour);
                let prompt = format!("{}は {}じ", event, hour);
                (
                    QuestionKind::MatchEvent {
                        event_name: event.to_string(),
                    },
                    prompt,
                )
            }
            LearningPhase::Recognition => {
                let offset = self.rng.gen_range(1..=WRONG_HOUR_OFFSET_MAX);
                let wrong = ClockTime::new((hour + offset) % 12 + 1, 0);
                let mut options = vec![target, wrong];
                options.shuffle(&mut self.rng);
                (
                    QuestionKind::ChooseTime { options },
                    format!("{}じは どっち？", hour),
                )
            }
            LearningPhase::Reproduction => (QuestionKind::SetTime, format!("{}じに してね", hour)),
            LearningPhase::Application => (QuestionKind::ReadTime, "いま なんじ？".to_string()),
        };

        Question {
            kind,
            level: 1,
            target,
            prompt,
            skill_id: format!("hour_{}", hour),
        }
    }

    fn half_hour_question(&mut self, phase: LearningPhase) -> Question {
        let hour = self.random_hour();
        let minute = self.rng.gen_range(0..2) * 30;
        let target = ClockTime::new(hour, minute);
        let named = if minute == 0 {
            format!("{}じ", hour)
        } else {
            format!("{}じはん", hour)
        };

        let (kind, prompt) = match phase {
            LearningPhase::Introduction | LearningPhase::Recognition => {
                let other = ClockTime::new(hour, if minute == 0 { 30 } else { 0 });
                let mut options = vec![target, other];
                options.shuffle(&mut self.rng);
                (
                    QuestionKind::ChooseTime { options },
                    format!("{}は どっち？", named),
                )
            }
            LearningPhase::Reproduction => (QuestionKind::SetTime, format!("{}に してね", named)),
            LearningPhase::Application => (QuestionKind::ReadTime, "いま なんじ？".to_string()),
        };

        Question {
            kind,
            level: 2,
            target,
            prompt,
            skill_id: format!("half_{}_{}", hour, minute),
        }
    }

    fn five_minute_question(&mut self, phase: LearningPhase) -> Question {
        let hour = self.random_hour();
        let minute = self.rng.gen_range(0..=FIVE_MINUTE_STEPS) * 5;
        set_or_read(3, phase, ClockTime::new(hour, minute), format!("five_{}_{}", hour, minute))
    }

    fn precise_question(&mut self, phase: LearningPhase) -> Question {
        let hour = self.random_hour();
        let minute = self.rng.gen_range(0..MINUTES_PER_HOUR);
        set_or_read(4, phase, ClockTime::new(hour, minute), format!("precise_{}_{}", hour, minute))
    }

    fn calculation_question(&mut self) -> Question {
        let start_hour = self.rng.gen_range(1..=CALC_START_HOUR_MAX);
        let start_minute = self.rng.gen_range(0..=FIVE_MINUTE_STEPS) * 5;
        let duration = CALC_DURATIONS[self.rng.gen_range(0..CALC_DURATIONS.len())];

        let start = ClockTime::new(start_hour, start_minute);
        let target = start.adding_minutes(duration);

        Question {
            kind: QuestionKind::CalculateTime {
                start,
                duration_minutes: duration,
            },
            level: 5,
            target,
            prompt: format!("{}から {}ふんご は なんじ？", start.japanese_reading(), duration),
            skill_id: format!("calc_{}", duration),
        }
    }
}

fn set_or_read(level: u32, phase: LearningPhase, target: ClockTime, skill_id: String) -> Question {
    let (kind, prompt) = if phase == LearningPhase::Reproduction {
        (QuestionKind::SetTime, format!("{}に してね", target.japanese_reading()))
    } else {
        (QuestionKind::ReadTime, "いま なんじ？".to_string())
    };

    Question {
        kind,
        level,
        target,
        prompt,
        skill_id,
    }
}

/// Daily event anchored to a whole hour.
pub fn event_name(hour: i32) -> &'static str {
    match hour {
        7 => "あさごはん",
        8 => "がっこう",
        12 => "おひるごはん",
        3 => "おやつ",
        6 => "ばんごはん",
        9 => "ねるじかん",
        _ => "とけい",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn generator(seed: u64) -> QuestionGenerator<ChaCha8Rng> {
        QuestionGenerator::new(ChaCha8Rng::seed_from_u64(seed))
    }

    #[test]
    fn phases_advance_and_saturate() {
        assert_eq!(LearningPhase::Introduction.next(), Some(LearningPhase::Recognition));
        assert_eq!(LearningPhase::Application.next(), None);
        assert_eq!(LearningPhase::Reproduction.label(), "さいせい");
    }

    #[test]
    fn level_one_introduction_is_event_on_the_hour() {
        let mut g = generator(7);
        for _ in 0..100 {
            let q = g.generate(1, LearningPhase::Introduction);
            match &q.kind {
                QuestionKind::MatchEvent { event_name } => assert!(!event_name.is_empty()),
                other => panic!("unexpected kind {:?}", other),
            }
            assert_eq!(q.target.minute(), 0);
            assert_eq!(q.skill_id, format!("hour_{}", q.target.hour()));
            assert!(q.prompt.ends_with(&format!("{}じ", q.target.hour())));
        }
    }

    #[test]
    fn level_one_recognition_offers_one_wrong_hour() {
        let mut g = generator(11);
        for _ in 0..100 {
            let q = g.generate(1, LearningPhase::Recognition);
            let QuestionKind::ChooseTime { options } = &q.kind else {
                panic!("expected choose_time");
            };
            assert_eq!(options.len(), 2);
            assert_eq!(options.iter().filter(|o| **o == q.target).count(), 1);
            assert!(options.iter().all(|o| o.minute() == 0));
        }
    }

    #[test]
    fn level_two_options_are_the_two_halves() {
        let mut g = generator(3);
        for _ in 0..50 {
            let q = g.generate(2, LearningPhase::Introduction);
            let QuestionKind::ChooseTime { options } = &q.kind else {
                panic!("expected choose_time");
            };
            let mut minutes: Vec<i32> = options.iter().map(|o| o.minute()).collect();
            minutes.sort();
            assert_eq!(minutes, vec![0, 30]);
            assert!(options.iter().all(|o| o.hour() == q.target.hour()));
            assert_eq!(
                q.skill_id,
                format!("half_{}_{}", q.target.hour(), q.target.minute())
            );
        }
    }

    #[test]
    fn dispatch_table() {
        let mut g = generator(5);
        assert_eq!(g.generate(1, LearningPhase::Reproduction).kind, QuestionKind::SetTime);
        assert_eq!(g.generate(1, LearningPhase::Application).kind, QuestionKind::ReadTime);
        assert_eq!(g.generate(2, LearningPhase::Reproduction).kind, QuestionKind::SetTime);
        assert_eq!(g.generate(2, LearningPhase::Application).kind, QuestionKind::ReadTime);
        assert_eq!(g.generate(3, LearningPhase::Introduction).kind, QuestionKind::ReadTime);
        assert_eq!(g.generate(3, LearningPhase::Reproduction).kind, QuestionKind::SetTime);
        assert_eq!(g.generate(4, LearningPhase::Recognition).kind, QuestionKind::ReadTime);
        assert_eq!(g.generate(4, LearningPhase::Reproduction).kind, QuestionKind::SetTime);
    }

    #[test]
    fn minute_grids_per_level() {
        let mut g = generator(21);
        for _ in 0..200 {
            let five = g.generate(3, LearningPhase::Application);
            assert_eq!(five.target.minute() % 5, 0);
            assert!(five.skill_id.starts_with("five_"));

            let precise = g.generate(4, LearningPhase::Reproduction);
            assert!(precise.skill_id.starts_with("precise_"));
            assert_eq!(
                precise.prompt,
                format!("{}に してね", precise.target.japanese_reading())
            );
        }
    }

    #[test]
    fn calculation_target_is_start_plus_duration() {
        let mut g = generator(99);
        for phase in LearningPhase::ALL {
            for _ in 0..50 {
                let q = g.generate(5, phase);
                let QuestionKind::CalculateTime {
                    start,
                    duration_minutes,
                } = q.kind
                else {
                    panic!("expected calculate_time");
                };
                assert!((1..=10).contains(&start.hour()));
                assert_eq!(start.minute() % 5, 0);
                assert!(CALC_DURATIONS.contains(&duration_minutes));
                assert_eq!(q.target, start.adding_minutes(duration_minutes));
                assert_eq!(q.skill_id, format!("calc_{}", duration_minutes));
            }
        }
    }

    #[test]
    fn unknown_level_falls_back_to_reading_an_hour() {
        let mut g = generator(1);
        let q = g.generate(9, LearningPhase::Introduction);
        assert_eq!(q.kind, QuestionKind::ReadTime);
        assert_eq!(q.level, 1);
        assert_eq!(q.target.minute(), 0);
    }

    #[test]
    fn judging_answers() {
        let level3 = LevelConfig::level(3);
        let set = Question {
            kind: QuestionKind::SetTime,
            level: 3,
            target: ClockTime::new(4, 25),
            prompt: String::new(),
            skill_id: "five_4_25".into(),
        };
        assert!(set.is_correct(&Answer::Time(ClockTime::new(4, 26)), level3));
        assert!(!set.is_correct(&Answer::Time(ClockTime::new(4, 27)), level3));
        assert!(!set.is_correct(&Answer::Choice(0), level3));

        let choose = Question {
            kind: QuestionKind::ChooseTime {
                options: vec![ClockTime::new(2, 0), ClockTime::new(9, 0)],
            },
            level: 1,
            target: ClockTime::new(9, 0),
            prompt: String::new(),
            skill_id: "hour_9".into(),
        };
        let level1 = LevelConfig::level(1);
        assert!(choose.is_correct(&Answer::Choice(1), level1));
        assert!(!choose.is_correct(&Answer::Choice(0), level1));
        assert!(!choose.is_correct(&Answer::Choice(5), level1));

        let read = Question {
            kind: QuestionKind::ReadTime,
            ..choose.clone()
        };
        assert!(read.is_correct(&Answer::Hour(9), level1));
        assert!(!read.is_correct(&Answer::Hour(3), level1));

        let event = Question {
            kind: QuestionKind::MatchEvent {
                event_name: "ねるじかん".into(),
            },
            ..choose
        };
        assert!(event.is_correct(&Answer::Acknowledged, level1));
    }
}
