// src/constants.rs

// --- Time Constants ---
pub const MINUTES_PER_HOUR: i32 = 60;
pub const MINUTES_PER_HALF_DAY: i32 = 12 * 60;
pub const DEGREES_PER_HOUR: f64 = 30.0; // Hour hand, per hour
pub const DEGREES_PER_MINUTE: f64 = 6.0; // Minute hand, per minute
pub const HOUR_HAND_DEGREES_PER_MINUTE: f64 = 0.5;

// --- Spaced Repetition (simplified SM-2) Parameters ---
pub const EASE_FACTOR_MIN: f64 = 1.3;
pub const EASE_FACTOR_DEFAULT: f64 = 2.5;
pub const INTERVAL_DEFAULT: i64 = 1; // Days

// Adjustments (kept as separate terms, the net delta is 0.0)
pub const EASE_FACTOR_BASE_INCREMENT: f64 = 0.1;
pub const EASE_FACTOR_QUALITY_PENALTY: f64 = 0.08;
pub const EASE_FACTOR_QUALITY_PENALTY_SQ: f64 = 0.02;

// Interval ladder
pub const INTERVAL_FIRST_CORRECT: i64 = 1;
pub const INTERVAL_SECOND_CORRECT: i64 = 6;

// --- Mastery Classification ---
pub const MASTERED_ACCURACY: f64 = 0.9;
pub const MASTERED_STREAK: u32 = 5;
pub const PRACTICING_ACCURACY: f64 = 0.7;
pub const PRACTICING_STREAK: u32 = 3;
pub const LEARNING_ACCURACY: f64 = 0.5;

// --- Level Session ---
pub const QUESTIONS_PER_SESSION: u32 = 5;
pub const CORRECT_ANSWERS_PER_PHASE: u32 = 2;

// --- Question Generation ---
pub const WRONG_HOUR_OFFSET_MAX: i32 = 6;
pub const CALC_START_HOUR_MAX: i32 = 10;
pub const CALC_DURATIONS: [i32; 4] = [15, 30, 45, 60];
pub const FIVE_MINUTE_STEPS: i32 = 11; // 0..=11 * 5

// --- Hand Dragging ---
pub const TICK_SNAP_DEGREES: f64 = 3.0;
pub const HOUR_MARK_SNAP_DEGREES: f64 = 2.0;
pub const HOUR_HAND_SNAP_DEGREES: f64 = 5.0;

// --- Profile ---
pub const DAILY_PRACTICE_GOAL_SECONDS: f64 = 600.0;
pub const CHILD_AGE_MIN: u32 = 3;
pub const CHILD_AGE_MAX: u32 = 12;
pub const CHILD_AGE_DEFAULT: u32 = 5;
pub const REPORT_WEAKEST_LIMIT: usize = 3;
