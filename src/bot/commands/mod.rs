//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Wallet and reward commands
pub mod economy;

/// Game challenge commands
pub mod games;

/// General utility commands
pub mod general;

/// Level and leaderboard commands
pub mod leveling;

// Export commands
pub use economy::*;
pub use games::*;
pub use general::*;
pub use leveling::*;
