// src/level.rs

use crate::constants::DEGREES_PER_MINUTE;
use log::warn;
use serde::Serialize;

/// Presentation and difficulty knobs for one lesson level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelConfig {
    pub id: u32,
    pub title: &'static str,
    pub subtitle: &'static str,
    /// Allowed minute step: 60, 30, 5 or 1.
    pub minute_granularity: i32,
    pub show_minute_hand: bool,
    pub show_all_numbers: bool,
    pub show_minute_marks: bool,
    pub tolerance_degrees: f64,
    pub show_digital_time: bool,
}

impl LevelConfig {
    /// Tolerance used when checking a set or read answer.
    pub fn tolerance_minutes(&self) -> i32 {
        (self.tolerance_degrees / DEGREES_PER_MINUTE) as i32
    }

    /// Catalog lookup; unknown ids fall back to level 1.
    pub fn level(id: u32) -> &'static LevelConfig {
        LEVELS.iter().find(|l| l.id == id).unwrap_or_else(|| {
            warn!("Unknown level {}, falling back to level 1", id);
            &LEVELS[0]
        })
    }

    pub fn all() -> &'static [LevelConfig] {
        &LEVELS
    }

    /// Full clock showing the current time on the home screen.
    pub fn home() -> LevelConfig {
        LevelConfig {
            title: "",
            ..LevelConfig::free_play()
        }
    }

    /// Free play clock.
    pub fn sandbox() -> LevelConfig {
        LevelConfig {
            title: "あそび",
            ..LevelConfig::free_play()
        }
    }

    fn free_play() -> LevelConfig {
        LevelConfig {
            id: 0,
            title: "",
            subtitle: "",
            minute_granularity: 1,
            show_minute_hand: true,
            show_all_numbers: true,
            show_minute_marks: true,
            tolerance_degrees: 0.0,
            show_digital_time: true,
        }
    }
}

static LEVELS: [LevelConfig; 5] = [
    LevelConfig {
        id: 1,
        title: "いまなんじ？",
        subtitle: "ちょうどの じかん",
        minute_granularity: 60,
        show_minute_hand: false,
        show_all_numbers: false,
        show_minute_marks: false,
        tolerance_degrees: 15.0,
        show_digital_time: false,
    },
    LevelConfig {
        id: 2,
        title: "はんぶん",
        subtitle: "30ぷん",
        minute_granularity: 30,
        show_minute_hand: true,
        show_all_numbers: false,
        show_minute_marks: false,
        tolerance_degrees: 12.0,
        show_digital_time: false,
    },
    LevelConfig {
        id: 3,
        title: "いつつずつ",
        subtitle: "5ふん きざみ",
        minute_granularity: 5,
        show_minute_hand: true,
        show_all_numbers: true,
        show_minute_marks: true,
        tolerance_degrees: 8.0,
        show_digital_time: true,
    },
    LevelConfig {
        id: 4,
        title: "ぴったり",
        subtitle: "1ぷん きざみ",
        minute_granularity: 1,
        show_minute_hand: true,
        show_all_numbers: true,
        show_minute_marks: true,
        tolerance_degrees: 4.0,
        show_digital_time: true,
    },
    LevelConfig {
        id: 5,
        title: "じかんのけいさん",
        subtitle: "たしざん ひきざん",
        minute_granularity: 5,
        show_minute_hand: true,
        show_all_numbers: true,
        show_minute_marks: true,
        tolerance_degrees: 6.0,
        show_digital_time: true,
    },
];
