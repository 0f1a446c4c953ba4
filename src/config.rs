use std::{env, path::PathBuf};
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_RESET_HOUR: u32 = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    /// Local hour at which habit check-marks are cleared.
    pub reset_hour: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = match lookup("PORT") {
            Some(value) => value.parse::<u16>().unwrap_or_else(|_| {
                warn!("invalid PORT '{value}', using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/state.json"));

        let reset_hour = match lookup("RESET_HOUR") {
            Some(value) => match value.parse::<u32>() {
                Ok(hour) if hour < 24 => hour,
                _ => {
                    warn!("invalid RESET_HOUR '{value}', using {DEFAULT_RESET_HOUR}");
                    DEFAULT_RESET_HOUR
                }
            },
            None => DEFAULT_RESET_HOUR,
        };

        Self {
            port,
            data_path,
            reset_hour,
        }
    }
}
