// src/session.rs

use crate::constants::{CORRECT_ANSWERS_PER_PHASE, QUESTIONS_PER_SESSION};
use crate::question::{LearningPhase, Question, QuestionGenerator};
use log::{debug, info};
use rand::Rng;

/// What happened after an answer was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStep {
    Continue {
        phase: LearningPhase,
        advanced: bool,
    },
    Complete {
        correct: u32,
        total: u32,
    },
}

/// One pass through a level: a fixed number of questions, with the phase
/// moving forward every other correct answer.
#[derive(Debug, Clone)]
pub struct LevelSession {
    level: u32,
    phase: LearningPhase,
    questions_answered: u32,
    correct_answers: u32,
}

impl LevelSession {
    pub fn new(level: u32) -> Self {
        LevelSession {
            level,
            phase: LearningPhase::Introduction,
            questions_answered: 0,
            correct_answers: 0,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn phase(&self) -> LearningPhase {
        self.phase
    }

    pub fn questions_answered(&self) -> u32 {
        self.questions_answered
    }

    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    pub fn total_questions(&self) -> u32 {
        QUESTIONS_PER_SESSION
    }

    pub fn is_complete(&self) -> bool {
        self.questions_answered >= QUESTIONS_PER_SESSION
    }

    pub fn next_question<R: Rng>(&self, generator: &mut QuestionGenerator<R>) -> Option<Question> {
        if self.is_complete() {
            return None;
        }
        Some(generator.generate(self.level, self.phase))
    }

    pub fn record_answer(&mut self, correct: bool) -> SessionStep {
        if self.is_complete() {
            return self.completion();
        }

        self.questions_answered += 1;
        let mut advanced = false;
        if correct {
            self.correct_answers += 1;
            if self.correct_answers % CORRECT_ANSWERS_PER_PHASE == 0 {
                advanced = self.advance_phase();
            }
        }

        debug!(
            "[Session] Level {}: {}/{} answered, {} correct, phase {:?}",
            self.level, self.questions_answered, QUESTIONS_PER_SESSION, self.correct_answers, self.phase
        );

        if self.is_complete() {
            info!(
                "[Session] Level {} complete: {}/{}",
                self.level, self.correct_answers, QUESTIONS_PER_SESSION
            );
            return self.completion();
        }

        SessionStep::Continue {
            phase: self.phase,
            advanced,
        }
    }

    pub fn reset(&mut self) {
        *self = LevelSession::new(self.level);
    }

    fn advance_phase(&mut self) -> bool {
        match self.phase.next() {
            Some(next) => {
                info!("[Session] Phase {:?} -> {:?}", self.phase, next);
                self.phase = next;
                true
            }
            None => false,
        }
    }

    fn completion(&self) -> SessionStep {
        SessionStep::Complete {
            correct: self.correct_answers,
            total: QUESTIONS_PER_SESSION,
        }
    }
}
