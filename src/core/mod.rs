//! Framework-agnostic business logic.
//!
//! Nothing in here talks to Discord; the bot layer translates commands and button
//! presses into calls on these modules and renders what comes back.

/// Wallets, timed rewards and coin-flip bets
pub mod economy;
/// XP awards, the level curve and the leaderboard
pub mod leveling;
/// Turn-based game engine, challenge negotiation and the per-channel registry
pub mod game;
