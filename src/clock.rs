// src/clock.rs

use crate::constants::*;
use crate::feedback::FeedbackEvent;
use chrono::{DateTime, Local, Timelike, Utc};
use serde::Serialize;
use std::cell::Cell;
use std::fmt;

// --- Time Source ---

/// Wall-clock boundary. Everything that needs "now" takes one of these.
pub trait TimeSource {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays.
pub struct FixedClock {
    now: Cell<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        FixedClock {
            now: Cell::new(now),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }
}

impl TimeSource for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

// --- Clock Time ---

/// A position of the two hands on a 12-hour dial.
///
/// Always normalized: `1 <= hour <= 12`, `0 <= minute <= 59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ClockTime {
    hour: i32,
    minute: i32,
}

impl ClockTime {
    pub fn new(hour: i32, minute: i32) -> Self {
        // Euclidean remainder keeps negative input on the dial as well.
        let h = hour.rem_euclid(12);
        ClockTime {
            hour: if h == 0 { 12 } else { h },
            minute: minute.rem_euclid(MINUTES_PER_HOUR),
        }
    }

    /// Local wall-clock time as read from `source`.
    pub fn current(source: &dyn TimeSource) -> Self {
        let local = source.now().with_timezone(&Local);
        ClockTime::new(local.hour() as i32, local.minute() as i32)
    }

    pub fn hour(&self) -> i32 {
        self.hour
    }

    pub fn minute(&self) -> i32 {
        self.minute
    }

    /// Degrees clockwise from 12 o'clock.
    pub fn hour_angle(&self) -> f64 {
        (self.hour % 12) as f64 * DEGREES_PER_HOUR + self.minute as f64 * HOUR_HAND_DEGREES_PER_MINUTE
    }

    pub fn minute_angle(&self) -> f64 {
        self.minute as f64 * DEGREES_PER_MINUTE
    }

    /// Minutes past the top of the dial, 12 o'clock collapsing to 0.
    pub fn dial_minutes(&self) -> i32 {
        (self.hour % 12) * MINUTES_PER_HOUR + self.minute
    }

    /// Digital form, e.g. "7:05".
    pub fn display_string(&self) -> String {
        let display_hour = if self.hour == 0 { 12 } else { self.hour };
        format!("{}:{:02}", display_hour, self.minute)
    }

    /// Written reading used in prompts: "3じ", "3じはん", "3じ15ふん".
    pub fn japanese_reading(&self) -> String {
        match self.minute {
            0 => format!("{}じ", self.hour),
            30 => format!("{}じはん", self.hour),
            m => format!("{}じ{}ふん", self.hour, m),
        }
    }

    /// Phonetic reading handed to the speech engine.
    pub fn spoken_japanese(&self) -> String {
        let hour = spoken_hour(self.hour);
        if self.minute == 0 {
            hour.to_string()
        } else {
            format!("{}{}", hour, spoken_minutes(self.minute))
        }
    }

    /// Exact comparison when `tolerance_minutes` is 0, otherwise distance on
    /// the 12-hour dial, wrapping across 12 o'clock.
    pub fn matches(&self, other: &ClockTime, tolerance_minutes: i32) -> bool {
        if tolerance_minutes == 0 {
            return self.hour == other.hour && self.minute == other.minute;
        }

        let tolerance = tolerance_minutes as i64;
        let diff = (self.dial_minutes() - other.dial_minutes()).abs() as i64;
        diff <= tolerance || diff >= MINUTES_PER_HALF_DAY as i64 - tolerance
    }

    /// `self` moved forward by `minutes` around the dial.
    pub fn adding_minutes(&self, minutes: i32) -> ClockTime {
        let per_hour = MINUTES_PER_HOUR as i64;
        let total = (self.hour * MINUTES_PER_HOUR + self.minute) as i64 + minutes as i64;
        ClockTime::new(
            (total.div_euclid(per_hour) % 12) as i32,
            total.rem_euclid(per_hour) as i32,
        )
    }

    /// Snaps dragged hand angles to a time on the level's minute grid.
    pub fn from_hand_angles(
        hour_angle: f64,
        minute_angle: f64,
        granularity: i32,
        show_minute_hand: bool,
    ) -> ClockTime {
        let hour = snap_index(hour_angle, DEGREES_PER_HOUR, 12);
        if !show_minute_hand {
            return ClockTime::new(hour, 0);
        }

        let step = granularity.max(1);
        let minute = snap_index(minute_angle, DEGREES_PER_MINUTE, MINUTES_PER_HOUR);
        ClockTime::new(hour, (minute / step) * step)
    }
}

impl Default for ClockTime {
    fn default() -> Self {
        ClockTime::new(12, 0)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

fn snap_index(angle: f64, degrees_per_step: f64, steps: i32) -> i32 {
    if !angle.is_finite() {
        return 0;
    }
    (angle.rem_euclid(360.0) / degrees_per_step).round() as i32 % steps
}

fn spoken_hour(hour: i32) -> &'static str {
    match hour {
        1 => "いちじ",
        2 => "にじ",
        3 => "さんじ",
        4 => "よじ",
        5 => "ごじ",
        6 => "ろくじ",
        7 => "しちじ",
        8 => "はちじ",
        9 => "くじ",
        10 => "じゅうじ",
        11 => "じゅういちじ",
        _ => "じゅうにじ",
    }
}

// Counter "ふん" with the p-sound shifts (1, 3, 4, 6, 8 and the tens).
fn spoken_minutes(minute: i32) -> String {
    let tens = match minute / 10 {
        1 => "じゅう",
        2 => "にじゅう",
        3 => "さんじゅう",
        4 => "よんじゅう",
        5 => "ごじゅう",
        _ => "",
    };

    let ones = match minute % 10 {
        0 => return format!("{}っぷん", tens.trim_end_matches('う')),
        1 => "いっぷん",
        2 => "にふん",
        3 => "さんぷん",
        4 => "よんぷん",
        5 => "ごふん",
        6 => "ろっぷん",
        7 => "ななふん",
        8 => "はっぷん",
        _ => "きゅうふん",
    };
    format!("{}{}", tens, ones)
}

// --- Hand Dragging ---

/// Hour hand position while the minute hand is being dragged.
pub fn follow_minute_hand(hour_angle: f64, minute_angle: f64) -> f64 {
    let hour = (hour_angle.rem_euclid(360.0) / DEGREES_PER_HOUR) as i32 % 12;
    let minute = (minute_angle.rem_euclid(360.0) / DEGREES_PER_MINUTE) as i32 % MINUTES_PER_HOUR;
    hour as f64 * DEGREES_PER_HOUR + minute as f64 * HOUR_HAND_DEGREES_PER_MINUTE
}

/// Haptic cues for a drag step from `previous` to `angle`. The minute hand
/// checks the tick and the hour mark independently, so a step can fire both.
pub fn drag_feedback(previous: f64, angle: f64, minute_hand: bool) -> Vec<FeedbackEvent> {
    let mark = (angle / DEGREES_PER_HOUR).floor() * DEGREES_PER_HOUR;
    let mut events = Vec::new();

    if !minute_hand {
        if (angle - mark).abs() < HOUR_HAND_SNAP_DEGREES
            && (previous - mark).abs() >= HOUR_HAND_SNAP_DEGREES
        {
            events.push(FeedbackEvent::HourMark);
        }
        return events;
    }

    if (angle - mark).abs() < TICK_SNAP_DEGREES && (previous - mark).abs() >= TICK_SNAP_DEGREES {
        events.push(FeedbackEvent::Tick);
    }
    if angle.rem_euclid(DEGREES_PER_HOUR) < HOUR_MARK_SNAP_DEGREES
        && previous.rem_euclid(DEGREES_PER_HOUR) >= HOUR_MARK_SNAP_DEGREES
    {
        events.push(FeedbackEvent::HourMark);
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[test]
    fn normalizes_hour_and_minute() {
        assert_eq!(ClockTime::new(0, 0).hour(), 12);
        assert_eq!(ClockTime::new(13, 0).hour(), 1);
        assert_eq!(ClockTime::new(24, 75).hour(), 12);
        assert_eq!(ClockTime::new(24, 75).minute(), 15);
    }

    #[test]
    fn hand_angles() {
        let t = ClockTime::new(3, 30);
        assert_eq!(t.hour_angle(), 105.0);
        assert_eq!(t.minute_angle(), 180.0);
        assert_eq!(ClockTime::new(12, 0).hour_angle(), 0.0);
    }

    #[test]
    fn display_pads_minutes() {
        assert_eq!(ClockTime::new(7, 5).display_string(), "7:05");
        assert_eq!(ClockTime::new(12, 45).to_string(), "12:45");
    }

    #[test]
    fn japanese_reading_forms() {
        assert_eq!(ClockTime::new(6, 30).japanese_reading(), "6じはん");
        assert_eq!(ClockTime::new(6, 0).japanese_reading(), "6じ");
        assert_eq!(ClockTime::new(6, 15).japanese_reading(), "6じ15ふん");
    }

    #[test]
    fn spoken_reading_uses_sound_changes() {
        assert_eq!(ClockTime::new(10, 20).spoken_japanese(), "じゅうじにじゅっぷん");
        assert_eq!(ClockTime::new(4, 0).spoken_japanese(), "よじ");
        assert_eq!(ClockTime::new(9, 1).spoken_japanese(), "くじいっぷん");
        assert_eq!(ClockTime::new(7, 10).spoken_japanese(), "しちじじゅっぷん");
        assert_eq!(ClockTime::new(2, 36).spoken_japanese(), "にじさんじゅうろっぷん");
        assert_eq!(ClockTime::new(5, 45).spoken_japanese(), "ごじよんじゅうごふん");
        assert_eq!(ClockTime::new(8, 58).spoken_japanese(), "はちじごじゅうはっぷん");
    }

    #[test]
    fn exact_match_without_tolerance() {
        assert!(ClockTime::new(3, 0).matches(&ClockTime::new(3, 0), 0));
        assert!(!ClockTime::new(3, 1).matches(&ClockTime::new(3, 0), 0));
    }

    #[test]
    fn tolerance_wraps_across_twelve() {
        assert!(ClockTime::new(12, 58).matches(&ClockTime::new(1, 2), 5));
        assert!(ClockTime::new(11, 58).matches(&ClockTime::new(12, 2), 5));
        assert!(!ClockTime::new(11, 50).matches(&ClockTime::new(12, 2), 5));
    }

    #[test]
    fn adding_minutes_carries_into_hours() {
        assert_eq!(ClockTime::new(11, 50).adding_minutes(30), ClockTime::new(12, 20));
        assert_eq!(ClockTime::new(10, 45).adding_minutes(60), ClockTime::new(11, 45));
        assert_eq!(ClockTime::new(12, 30).adding_minutes(45), ClockTime::new(1, 15));
    }

    #[test]
    fn snapping_respects_granularity() {
        // Hour hand past the half-way point rounds to the next mark.
        let t = ClockTime::from_hand_angles(90.0 + 18.5, 37.0 * 6.0, 5, true);
        assert_eq!(t, ClockTime::new(4, 35));
        let t = ClockTime::from_hand_angles(359.0, 0.0, 60, false);
        assert_eq!(t, ClockTime::new(12, 0));
        let t = ClockTime::from_hand_angles(-30.0, 0.0, 60, false);
        assert_eq!(t, ClockTime::new(11, 0));
    }

    #[test]
    fn hour_hand_follows_minute_hand() {
        assert_eq!(follow_minute_hand(95.0, 180.0), 105.0);
        assert_eq!(follow_minute_hand(0.0, 354.0), 29.5);
    }

    #[test]
    fn drag_cues() {
        use FeedbackEvent::{HourMark, Tick};

        assert_eq!(drag_feedback(55.0, 61.0, true), vec![Tick, HourMark]);
        assert_eq!(drag_feedback(64.0, 61.0, true), vec![Tick, HourMark]);
        assert_eq!(drag_feedback(57.0, 62.5, true), vec![Tick]);
        assert_eq!(drag_feedback(62.5, 63.0, true), vec![]);
        assert_eq!(drag_feedback(80.0, 91.0, false), vec![HourMark]);
        assert_eq!(drag_feedback(91.0, 92.0, false), vec![]);
    }

    #[test]
    fn extreme_tolerances_do_not_overflow() {
        let three = ClockTime::new(3, 0);
        let nine = ClockTime::new(9, 0);
        assert!(!three.matches(&three, i32::MIN));
        assert!(!three.matches(&nine, i32::MIN));
        assert!(three.matches(&nine, i32::MAX));
        assert!(!three.matches(&nine, -5));
    }

    #[test]
    fn current_reads_local_wall_clock() {
        let local = Local.with_ymd_and_hms(2026, 3, 1, 15, 42, 0).unwrap();
        let clock = FixedClock::new(local.with_timezone(&Utc));
        assert_eq!(ClockTime::current(&clock), ClockTime::new(3, 42));
    }

    proptest! {
        #[test]
        fn construction_is_total(h in any::<i32>(), m in any::<i32>()) {
            let t = ClockTime::new(h, m);
            prop_assert!((1..=12).contains(&t.hour()));
            prop_assert!((0..=59).contains(&t.minute()));
        }

        #[test]
        fn angles_follow_hands(h in 0i32..48, m in 0i32..60) {
            let t = ClockTime::new(h, m);
            prop_assert_eq!(ClockTime::new(h, 0).hour_angle() % 30.0, 0.0);
            prop_assert_eq!(t.minute_angle(), m as f64 * 6.0);
        }

        #[test]
        fn tolerance_is_symmetric(a in 0i32..720, b in 0i32..720, tol in 0i32..30) {
            let x = ClockTime::new(a / 60, a % 60);
            let y = ClockTime::new(b / 60, b % 60);
            prop_assert_eq!(x.matches(&y, tol), y.matches(&x, tol));
        }

        #[test]
        fn any_tolerance_is_total(a in 0i32..720, b in 0i32..720, tol in any::<i32>()) {
            let x = ClockTime::new(a / 60, a % 60);
            let y = ClockTime::new(b / 60, b % 60);
            prop_assert_eq!(x.matches(&y, tol), y.matches(&x, tol));
            if tol < 0 {
                prop_assert!(!x.matches(&y, tol));
            }
            if tol >= MINUTES_PER_HALF_DAY {
                prop_assert!(x.matches(&y, tol));
            }
        }
    }
}
