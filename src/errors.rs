//! Unified error types for the bot.
//!
//! Game-rule violations live in [`crate::core::game::GameError`] and are wrapped here so
//! command handlers can use `?` across the database, framework and game layers.

use crate::core::game::GameError;
use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Database error bubbled up from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error (reading config files, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Failure while formatting a message
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// A coin amount was zero, negative or otherwise unusable
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: i64,
    },

    /// Not enough coins for the requested bet
    #[error("Insufficient funds: have {current}, need {required}")]
    InsufficientFunds {
        /// Current wallet balance
        current: i64,
        /// Amount the operation needed
        required: i64,
    },

    /// A timed reward was claimed before its cooldown elapsed
    #[error("On cooldown for another {remaining_secs}s")]
    Cooldown {
        /// Seconds until the reward can be claimed again
        remaining_secs: i64,
    },

    /// Game rule or lifecycle violation
    #[error(transparent)]
    Game(#[from] GameError),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
