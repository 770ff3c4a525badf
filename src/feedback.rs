// src/feedback.rs

use crate::clock::ClockTime;
use log::{debug, info};
#[cfg(test)]
use std::cell::RefCell;

pub const SPEECH_CORRECT: &str = "せいかい！";
pub const SPEECH_TRY_AGAIN: &str = "もういちど やってみよう";

/// Discrete cues sent to the haptics layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackEvent {
    /// Light tap at a 5-minute mark.
    Tick,
    /// Medium tap at an hour mark.
    HourMark,
    Success,
    /// Gentle nudge after a wrong answer.
    Hint,
}

/// Haptics and speech. Fire-and-forget: implementations swallow and log
/// their own failures.
pub trait Feedback {
    fn haptic(&self, event: FeedbackEvent);

    fn speak(&self, text: &str);

    fn speak_time(&self, time: &ClockTime) {
        self.speak(&time.spoken_japanese());
    }

    fn speak_correct(&self) {
        self.speak(SPEECH_CORRECT);
    }

    fn speak_try_again(&self) {
        self.speak(SPEECH_TRY_AGAIN);
    }
}

/// Writes every cue to the log, honouring the sound and haptics switches.
pub struct LogFeedback {
    pub sound_enabled: bool,
    pub haptics_enabled: bool,
}

impl Feedback for LogFeedback {
    fn haptic(&self, event: FeedbackEvent) {
        if self.haptics_enabled {
            debug!("[Haptic] {:?}", event);
        }
    }

    fn speak(&self, text: &str) {
        if self.sound_enabled {
            info!("[Speech] {}", text);
        }
    }
}

/// Drops every cue, for free play with sound and haptics both off.
pub struct Muted;

impl Feedback for Muted {
    fn haptic(&self, _event: FeedbackEvent) {}
    fn speak(&self, _text: &str) {}
}

/// Records cues so tests can assert on them.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingFeedback {
    pub events: RefCell<Vec<FeedbackEvent>>,
    pub utterances: RefCell<Vec<String>>,
}

#[cfg(test)]
impl Feedback for RecordingFeedback {
    fn haptic(&self, event: FeedbackEvent) {
        self.events.borrow_mut().push(event);
    }

    fn speak(&self, text: &str) {
        self.utterances.borrow_mut().push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speak_time_uses_phonetic_reading() {
        let fb = RecordingFeedback::default();
        fb.speak_time(&ClockTime::new(10, 20));
        fb.speak_correct();
        assert_eq!(
            *fb.utterances.borrow(),
            vec!["じゅうじにじゅっぷん".to_string(), SPEECH_CORRECT.to_string()]
        );
    }

    #[test]
    fn switches_and_muted_accept_every_cue() {
        let quiet = LogFeedback {
            sound_enabled: false,
            haptics_enabled: false,
        };
        let feedback: [&dyn Feedback; 2] = [&quiet, &Muted];
        for fb in feedback {
            fb.haptic(FeedbackEvent::Tick);
            fb.speak_try_again();
            fb.speak_time(&ClockTime::default());
        }
    }
}
