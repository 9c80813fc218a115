//! Bot settings loaded from config.toml
//!
//! Every field has a default, so the file is optional: a missing config.toml runs the
//! bot with the stock prefix, game windows, economy and XP tuning. The path can be
//! overridden with the `BOT_CONFIG` environment variable.

use crate::core::game::Variant;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Prefix for text commands
    pub prefix: String,
    /// Challenge and idle windows
    pub games: GameSettings,
    /// Reward ranges and cooldowns
    pub economy: EconomySettings,
    /// XP awarded per command
    pub leveling: LevelingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefix: "$".to_string(),
            games: GameSettings::default(),
            economy: EconomySettings::default(),
            leveling: LevelingSettings::default(),
        }
    }
}

/// Timing for challenges and in-progress games
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// How long the opponent has to accept or decline
    pub challenge_window_secs: u64,
    /// Idle window for Tic Tac Toe
    pub tictactoe_idle_secs: u64,
    /// Idle window for Connect 4
    pub connect4_idle_secs: u64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            challenge_window_secs: 120,
            tictactoe_idle_secs: 3 * 60,
            connect4_idle_secs: 5 * 60,
        }
    }
}

impl GameSettings {
    /// Challenge window as a [`Duration`]
    #[must_use]
    pub const fn challenge_window(&self) -> Duration {
        Duration::from_secs(self.challenge_window_secs)
    }

    /// Idle window for `variant`
    #[must_use]
    pub const fn idle_timeout(&self, variant: Variant) -> Duration {
        match variant {
            Variant::TicTacToe => Duration::from_secs(self.tictactoe_idle_secs),
            Variant::Connect4 => Duration::from_secs(self.connect4_idle_secs),
        }
    }
}

/// Economy tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EconomySettings {
    /// Seconds between daily claims
    pub daily_cooldown_secs: i64,
    /// Smallest daily reward
    pub daily_min: i64,
    /// Largest daily reward
    pub daily_max: i64,
    /// Seconds between work shifts
    pub work_cooldown_secs: i64,
    /// Smallest work payout
    pub work_min: i64,
    /// Largest work payout
    pub work_max: i64,
    /// Flavour lines for work payouts, each followed by the amount
    pub work_messages: Vec<String>,
}

impl Default for EconomySettings {
    fn default() -> Self {
        Self {
            daily_cooldown_secs: 24 * 60 * 60,
            daily_min: 200,
            daily_max: 500,
            work_cooldown_secs: 2 * 60 * 60,
            work_min: 50,
            work_max: 200,
            work_messages: [
                "You moonlighted as a bug bounty hunter and earned",
                "You streamed on Twitch and your viewers donated",
                "You sold some rare items on the galactic market for",
                "You delivered mail and received",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// XP tuning
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LevelingSettings {
    /// Smallest XP award for using a command
    pub xp_min: i64,
    /// Largest XP award for using a command
    pub xp_max: i64,
}

impl Default for LevelingSettings {
    fn default() -> Self {
        Self {
            xp_min: 15,
            xp_max: 25,
        }
    }
}

impl Settings {
    /// Checks ranges and windows that would make commands misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.prefix.trim().is_empty() {
            return Err(Error::Config {
                message: "prefix cannot be empty".to_string(),
            });
        }
        if self.games.challenge_window_secs == 0
            || self.games.tictactoe_idle_secs == 0
            || self.games.connect4_idle_secs == 0
        {
            return Err(Error::Config {
                message: "game windows must be at least one second".to_string(),
            });
        }
        let economy = &self.economy;
        for (name, min, max) in [
            ("daily", economy.daily_min, economy.daily_max),
            ("work", economy.work_min, economy.work_max),
            ("xp", self.leveling.xp_min, self.leveling.xp_max),
        ] {
            if min <= 0 || min > max {
                return Err(Error::Config {
                    message: format!("{name} reward range {min}..={max} is invalid"),
                });
            }
        }
        if economy.daily_cooldown_secs < 0 || economy.work_cooldown_secs < 0 {
            return Err(Error::Config {
                message: "cooldowns cannot be negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value fails [`Settings::validate`]
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    debug!("Loading settings from {:?}", path.as_ref());
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;
    parse_settings(&contents)
}

/// Parses and validates settings from TOML text
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    settings.validate()?;
    Ok(settings)
}

/// Loads settings from `BOT_CONFIG` (default ./config.toml), falling back to defaults
/// when the file does not exist.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("BOT_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        load_settings(&path)
    } else {
        info!("No config file at {path}, using default settings");
        Ok(Settings::default())
    }
}
