use chrono_tz::Tz;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::str::FromStr;

#[derive(Deserialize, Debug)]
pub struct Config {
    /// Path of the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// IANA timezone used to interpret dates typed on the command line.
    #[serde(default = "detect_system_timezone")]
    pub timezone: String,
    /// Owner id used when a command does not pass --owner.
    #[serde(default = "default_owner")]
    pub owner: String,
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("dayplan.toml"))
            .merge(Env::prefixed("DAYPLAN_"))
            .extract()
    }

    pub fn tz(&self) -> Tz {
        Tz::from_str(&self.timezone).unwrap_or(chrono_tz::UTC)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            timezone: detect_system_timezone(),
            owner: default_owner(),
        }
    }
}

fn default_database_path() -> String {
    "dayplan.db".to_string()
}

fn default_owner() -> String {
    "local".to_string()
}

/// Detects the system timezone, falling back to UTC if detection fails
pub fn detect_system_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if Tz::from_str(&tz).is_ok() {
            return tz;
        }
    }

    if let Ok(tz) = iana_time_zone::get_timezone() {
        if Tz::from_str(&tz).is_ok() {
            return tz;
        }
    }

    "UTC".to_string()
}
