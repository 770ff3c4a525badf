// src/config.rs

use crate::constants::{CHILD_AGE_DEFAULT, CHILD_AGE_MAX, CHILD_AGE_MIN};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "TOKEI_DB_PATH";
pub const ENV_SOUND: &str = "TOKEI_SOUND";
pub const ENV_HAPTICS: &str = "TOKEI_HAPTICS";
pub const ENV_CHILD_AGE: &str = "TOKEI_CHILD_AGE";
pub const ENV_CHILD_NAME: &str = "TOKEI_CHILD_NAME";
pub const ENV_LOG: &str = "TOKEI_LOG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub db_path: PathBuf,
    pub sound_enabled: bool,
    pub haptics_enabled: bool,
    /// Always within 3..=12.
    pub child_age: u32,
    pub child_name: String,
    /// `env_logger` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            db_path: PathBuf::from("tokei.db"),
            sound_enabled: true,
            haptics_enabled: true,
            child_age: CHILD_AGE_DEFAULT,
            child_name: String::new(),
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the `TOKEI_*` keys.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        if let Some(path) = lookup(ENV_DB_PATH) {
            settings.db_path = PathBuf::from(path);
        }
        if let Some(v) = lookup(ENV_SOUND) {
            settings.sound_enabled = parse_flag(ENV_SOUND, &v, settings.sound_enabled);
        }
        if let Some(v) = lookup(ENV_HAPTICS) {
            settings.haptics_enabled = parse_flag(ENV_HAPTICS, &v, settings.haptics_enabled);
        }
        if let Some(v) = lookup(ENV_CHILD_AGE) {
            match v.trim().parse::<u32>() {
                Ok(age) => settings.child_age = age.clamp(CHILD_AGE_MIN, CHILD_AGE_MAX),
                Err(_) => warn!("Ignoring {}={:?}: not a number", ENV_CHILD_AGE, v),
            }
        }
        if let Some(name) = lookup(ENV_CHILD_NAME) {
            settings.child_name = name;
        }
        if let Some(filter) = lookup(ENV_LOG) {
            settings.log_filter = filter;
        }

        settings
    }
}

fn parse_flag(key: &str, value: &str, fallback: bool) -> bool {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => true,
        "0" | "false" | "off" | "no" => false,
        _ => {
            warn!("Ignoring {}={:?}: expected on/off", key, value);
            fallback
        }
    }
}
