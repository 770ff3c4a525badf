// src/lib.rs

//! Learning core of an analog clock reading tutor.
//!
//! - [`clock`] hand angles, readings and tolerant comparison of clock times
//! - [`level`] the five lesson levels
//! - [`question`] question generation per level and learning phase
//! - [`session`] phase progression within one level session
//! - [`mastery`] per-skill spaced repetition
//! - [`pedagogy`] glue between answers, mastery, storage and feedback

pub mod clock;
pub mod config;
pub mod constants;
pub mod database;
pub mod feedback;
pub mod level;
pub mod mastery;
pub mod pedagogy;
pub mod profile;
pub mod question;
pub mod repository;
pub mod session;

pub use clock::{ClockTime, FixedClock, SystemClock, TimeSource};
pub use level::LevelConfig;
pub use mastery::{MasteryLevel, SkillMastery};
pub use question::{Answer, LearningPhase, Question, QuestionGenerator, QuestionKind};
pub use session::{LevelSession, SessionStep};
