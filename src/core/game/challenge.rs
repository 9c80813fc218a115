//! Challenge negotiation - consent from the opponent before a game exists.
//!
//! The negotiator is framework-agnostic: asking the opponent goes through the
//! [`ConsentPrompt`] seam, which the bot implements with Accept/Decline buttons and
//! tests implement with scripted answers.

use super::{ActiveGame, ChannelId, GameError, GameRegistry, GameSnapshot, Player, Variant};
use crate::errors::Result;
use std::future::Future;
use std::time::Duration;
use tracing::info;

/// The opponent's answer to a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeResponse {
    /// Play
    Accept,
    /// Refuse
    Decline,
}

/// How a negotiation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// Opponent accepted; the game is registered and waiting for the challenger's move
    Accepted(GameSnapshot),
    /// Opponent declined; no game was created
    Declined,
    /// Nobody answered within the window; no game was created
    Expired,
}

/// A validated challenge waiting for the opponent's consent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Channel the game would be played in
    pub channel_id: ChannelId,
    /// Player issuing the challenge; moves first
    pub challenger: Player,
    /// Player being challenged
    pub opponent: Player,
    /// Requested ruleset
    pub variant: Variant,
}

impl Challenge {
    /// Validates the participants.
    ///
    /// Fails with [`GameError::InvalidOpponent`] when nobody was mentioned, the opponent
    /// is a bot, or the challenger named themselves.
    pub fn new(
        channel_id: ChannelId,
        challenger: Player,
        opponent: Option<Player>,
        variant: Variant,
    ) -> std::result::Result<Self, GameError> {
        let opponent = opponent.ok_or(GameError::InvalidOpponent {
            reason: "nobody was mentioned",
        })?;
        super::validate_opponent(&challenger, &opponent)?;
        Ok(Self {
            channel_id,
            challenger,
            opponent,
            variant,
        })
    }
}

/// Asks the opponent to accept or decline.
pub trait ConsentPrompt {
    /// Waits up to `window` for the opponent's answer.
    ///
    /// Resolves to `None` when the window elapses. Only the opponent's answer may
    /// resolve the prompt, and it resolves at most once.
    fn await_response(
        &mut self,
        challenge: &Challenge,
        window: Duration,
    ) -> impl Future<Output = Result<Option<ChallengeResponse>>> + Send;
}

/// Runs a challenge to completion.
///
/// The channel is checked before the opponent is asked, so a busy channel is refused
/// without prompting anyone. On acceptance the game is built with the challenger in
/// seat 0 and registered under the channel.
pub async fn propose_challenge<P>(
    registry: &GameRegistry,
    challenge: Challenge,
    prompt: &mut P,
    window: Duration,
    idle_timeout: Duration,
) -> Result<ChallengeOutcome>
where
    P: ConsentPrompt + Send,
{
    if registry.is_active(challenge.channel_id).await {
        return Err(GameError::AlreadyActive.into());
    }

    info!(
        channel = challenge.channel_id,
        challenger = challenge.challenger.id,
        opponent = challenge.opponent.id,
        variant = %challenge.variant,
        "Challenge issued"
    );

    let outcome = match prompt.await_response(&challenge, window).await? {
        Some(ChallengeResponse::Accept) => {
            let Challenge {
                channel_id,
                challenger,
                opponent,
                variant,
            } = challenge;
            let game = ActiveGame::new(variant, challenger, opponent)?;
            let snapshot = registry.register(channel_id, game, idle_timeout).await?;
            ChallengeOutcome::Accepted(snapshot)
        }
        Some(ChallengeResponse::Decline) => ChallengeOutcome::Declined,
        None => ChallengeOutcome::Expired,
    };
    Ok(outcome)
}
