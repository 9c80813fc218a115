//! Game commands - challenge someone to Tic Tac Toe or Connect 4, or stop a game.
//!
//! A challenge is negotiated with Accept/Decline buttons. Once accepted, the board is
//! posted to the channel and an idle watchdog is armed that closes the board when
//! nobody moves in time.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::ButtonPrompt, render},
        core::game::{
            Challenge, ChallengeOutcome, GameSnapshot, Player, Variant, challenge::propose_challenge,
        },
        errors::{Error, Result},
    };
    use poise::serenity_prelude::{self as serenity, CreateMessage, EditMessage};
    use std::sync::Arc;
    use tracing::{info, warn};

    fn player(user: &serenity::User) -> Player {
        Player {
            id: user.id.get(),
            name: user.name.clone(),
            is_bot: user.bot,
        }
    }

    /// Challenges a user to Tic Tac Toe.
    #[poise::command(slash_command, prefix_command, guild_only)]
    pub async fn tictactoe(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Who to play against"] opponent: Option<serenity::User>,
    ) -> Result<()> {
        start_game(ctx, Variant::TicTacToe, opponent).await
    }

    /// Challenges a user to Connect 4.
    #[poise::command(slash_command, prefix_command, guild_only)]
    pub async fn connect4(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Who to play against"] opponent: Option<serenity::User>,
    ) -> Result<()> {
        start_game(ctx, Variant::Connect4, opponent).await
    }

    /// Stops the game in this channel. Only its players may do this.
    #[poise::command(slash_command, prefix_command, guild_only)]
    pub async fn stopgame(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let games = &ctx.data().games;
        let channel = ctx.channel_id().get();
        let author = ctx.author().id.get();

        let Some(current) = games.get(channel).await else {
            ctx.say("There is no active game in this channel.").await?;
            return Ok(());
        };
        if !current.players.iter().any(|p| p.id == author) {
            ctx.say("Only the players can stop this game.").await?;
            return Ok(());
        }
        let Some(snapshot) = games.abandon(channel, Some(current.game_id)).await else {
            ctx.say("This game has already ended.").await?;
            return Ok(());
        };

        refresh_board(ctx.serenity_context().http.as_ref(), &snapshot).await;
        ctx.say(format!(
            "🛑 {} stopped the {} game.",
            ctx.author().name,
            snapshot.variant.name()
        ))
        .await?;
        Ok(())
    }

    async fn start_game(
        ctx: poise::Context<'_, BotData, Error>,
        variant: Variant,
        opponent: Option<serenity::User>,
    ) -> Result<()> {
        let data = ctx.data();
        let challenge = match Challenge::new(
            ctx.channel_id().get(),
            player(ctx.author()),
            opponent.as_ref().map(player),
            variant,
        ) {
            Ok(challenge) => challenge,
            Err(e) => {
                ctx.say(format!(
                    "{e} Usage: `{}{} @user`",
                    data.settings.prefix,
                    variant.command()
                ))
                .await?;
                return Ok(());
            }
        };

        let mut prompt = ButtonPrompt::new(ctx);
        let outcome = propose_challenge(
            &data.games,
            challenge,
            &mut prompt,
            data.settings.games.challenge_window(),
            data.settings.games.idle_timeout(variant),
        )
        .await;

        match outcome {
            Ok(ChallengeOutcome::Accepted(snapshot)) => post_board(ctx, snapshot).await,
            // The prompt message already tells the channel how it ended.
            Ok(ChallengeOutcome::Declined | ChallengeOutcome::Expired) => Ok(()),
            Err(Error::Game(e)) => {
                ctx.say(e.to_string()).await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Posts the board for a freshly registered game and arms its idle watchdog.
    async fn post_board(
        ctx: poise::Context<'_, BotData, Error>,
        snapshot: GameSnapshot,
    ) -> Result<()> {
        let games = &ctx.data().games;
        let channel = serenity::ChannelId::new(snapshot.channel_id);

        let message = CreateMessage::new()
            .embed(render::board_embed(&snapshot))
            .components(render::board_components(&snapshot));
        let sent = match channel.send_message(ctx, message).await {
            Ok(sent) => sent,
            Err(e) => {
                games.deregister(snapshot.channel_id).await;
                return Err(e.into());
            }
        };

        games
            .attach_message(snapshot.channel_id, snapshot.game_id, sent.id.get())
            .await;

        let http = Arc::clone(&ctx.serenity_context().http);
        games
            .spawn_idle_watch(snapshot.channel_id, snapshot.game_id, move |ended| async move {
                refresh_board(&http, &ended).await;
            })
            .await;

        info!(
            channel = snapshot.channel_id,
            game_id = snapshot.game_id,
            variant = %snapshot.variant,
            "Board posted"
        );
        Ok(())
    }

    /// Re-renders the board message of an ended game. Failures are only logged since
    /// the game is already gone.
    async fn refresh_board(http: &serenity::Http, snapshot: &GameSnapshot) {
        let Some(message_id) = snapshot.message_id else {
            return;
        };
        let edit = EditMessage::new()
            .embed(render::board_embed(snapshot))
            .components(render::board_components(snapshot));
        if let Err(e) = serenity::ChannelId::new(snapshot.channel_id)
            .edit_message(http, serenity::MessageId::new(message_id), edit)
            .await
        {
            warn!(
                channel = snapshot.channel_id,
                game_id = snapshot.game_id,
                "Failed to update board message: {e}"
            );
        }
    }
}

// Re-export all commands
pub use inner::*;
