//! Accept/Decline buttons as the consent prompt for challenges.

use crate::{
    bot::{
        BotData,
        render::{self, PressVerdict},
    },
    core::game::{Challenge, ChallengeResponse, ConsentPrompt},
    errors::{Error, Result},
};
use poise::{
    CreateReply,
    serenity_prelude::{
        self as serenity, ComponentInteractionCollector, CreateInteractionResponse,
        CreateInteractionResponseMessage,
    },
};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Posts the challenge as a reply to the invoking command and waits for the opponent
/// to press one of its buttons.
pub struct ButtonPrompt<'a> {
    ctx: poise::Context<'a, BotData, Error>,
}

impl<'a> ButtonPrompt<'a> {
    /// Prompt bound to the command invocation `ctx`.
    #[must_use]
    pub const fn new(ctx: poise::Context<'a, BotData, Error>) -> Self {
        Self { ctx }
    }
}

fn respond(content: &str) -> CreateInteractionResponse {
    CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true),
    )
}

impl ConsentPrompt for ButtonPrompt<'_> {
    fn await_response(
        &mut self,
        challenge: &Challenge,
        window: Duration,
    ) -> impl Future<Output = Result<Option<ChallengeResponse>>> + Send {
        let ctx = self.ctx;
        async move {
            let nonce = ctx.id();
            let content = format!(
                "<@{}>, you have been challenged to **{}** by <@{}>. Do you accept?",
                challenge.opponent.id,
                challenge.variant.name(),
                challenge.challenger.id
            );
            let handle = ctx
                .send(
                    CreateReply::default()
                        .content(content)
                        .components(vec![render::challenge_buttons(nonce)]),
                )
                .await?;

            let deadline = Instant::now() + window;
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                let prefix = format!("challenge:{nonce}:");
                let press = ComponentInteractionCollector::new(ctx)
                    .channel_id(serenity::ChannelId::new(challenge.channel_id))
                    .filter(move |press| press.data.custom_id.starts_with(&prefix))
                    .timeout(remaining)
                    .await;

                let Some(press) = press else {
                    debug!(channel = challenge.channel_id, "Challenge expired");
                    handle
                        .edit(
                            ctx,
                            CreateReply::default()
                                .content("Challenge expired due to inactivity.")
                                .components(vec![]),
                        )
                        .await?;
                    return Ok(None);
                };

                let verdict = render::classify_challenge_press(
                    &press.data.custom_id,
                    press.user.id.get(),
                    challenge,
                    nonce,
                );
                let (response, text) = match verdict {
                    PressVerdict::Respond(ChallengeResponse::Accept) => {
                        (ChallengeResponse::Accept, "Challenge accepted! Starting game...")
                    }
                    PressVerdict::Respond(ChallengeResponse::Decline) => {
                        (ChallengeResponse::Decline, "Challenge declined.")
                    }
                    PressVerdict::NotForYou => {
                        press
                            .create_response(ctx, respond("This challenge is not for you!"))
                            .await?;
                        continue;
                    }
                    PressVerdict::Ignore => continue,
                };

                press
                    .create_response(
                        ctx,
                        CreateInteractionResponse::UpdateMessage(
                            CreateInteractionResponseMessage::new()
                                .content(text)
                                .components(vec![]),
                        ),
                    )
                    .await?;
                return Ok(Some(response));
            }
        }
    }
}
