//! Discord interaction handlers
//!
//! Board button presses arrive through the framework's event hook; challenge prompts
//! collect their own Accept/Decline presses.

/// Board button presses routed to the game registry
pub mod interaction;
/// Accept/Decline consent prompt for challenges
pub mod prompt;

pub use interaction::event_handler;
pub use prompt::ButtonPrompt;
