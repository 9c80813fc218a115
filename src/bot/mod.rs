//! Bot layer - Discord-specific interface and command handlers
//!
//! This module wires the poise framework: prefix and slash commands, the button
//! handlers and the shared [`BotData`] every command receives.

/// Discord command implementations (games, economy, general)
pub mod commands;
/// Discord interaction handlers (board buttons, challenge prompts)
pub mod handlers;
/// Embeds and buttons for game boards
pub mod render;

use crate::{
    config::settings::Settings,
    core::{game::GameRegistry, leveling},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use rand::{SeedableRng, rngs::StdRng};
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Database connection for the economy
    pub database: DatabaseConnection,
    /// Live games, one per channel
    pub games: GameRegistry,
    /// Settings loaded at startup
    pub settings: Arc<Settings>,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(
        database: DatabaseConnection,
        games: GameRegistry,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            database,
            games,
            settings,
        }
    }
}

/// Every command the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, Error>> {
    vec![
        commands::tictactoe(),
        commands::connect4(),
        commands::stopgame(),
        commands::balance(),
        commands::daily(),
        commands::work(),
        commands::coin(),
        commands::ping(),
        commands::help(),
        commands::coinflip(),
        commands::dice(),
        commands::eight_ball(),
        commands::joke(),
        commands::truth(),
        commands::dare(),
        commands::stats(),
        commands::leaderboard(),
    ]
}

/// Gives the invoking user a little XP before every command runs.
async fn award_command_xp(ctx: poise::Context<'_, BotData, Error>) {
    if ctx.author().bot {
        return;
    }
    let data = ctx.data();
    let user_id = ctx.author().id.to_string();
    let mut rng = StdRng::from_entropy();
    match leveling::award_command_xp(&data.database, &user_id, &data.settings.leveling, &mut rng)
        .await
    {
        Ok(gain) if gain.leveled_up() => {
            let announcement = format!(
                "🎉 <@{user_id}> reached **level {}**!",
                gain.progress.level
            );
            if let Err(e) = ctx.channel_id().say(ctx, announcement).await {
                warn!("Failed to announce level up: {}", e);
            }
        }
        Ok(_) => {}
        Err(e) => warn!(%user_id, "Failed to award XP: {}", e),
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("An error occurred: {error}")).await {
                error!("Failed to send error message: {}", e);
            }
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!(
                "Error handling event {}: {:?}",
                event.snake_case_name(),
                error
            );
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Error waiting for Ctrl+C: {:?}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Error installing SIGTERM handler: {:?}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

/// Runs `action` once `signal` resolves. Aborting the handle first skips the action.
fn spawn_shutdown_watch<S, A, AF>(signal: S, action: A) -> JoinHandle<()>
where
    S: Future<Output = ()> + Send + 'static,
    A: FnOnce() -> AF + Send + 'static,
    AF: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        signal.await;
        info!("Shutdown signal received, stopping shards...");
        action().await;
    })
}

/// Connects to Discord and runs until the gateway client stops.
///
/// Ctrl-C or SIGTERM stops every shard, which makes the client return; games still
/// running at that point are abandoned before this returns.
#[instrument(skip_all)]
pub async fn run_bot(
    token: String,
    database: DatabaseConnection,
    games: GameRegistry,
    settings: Arc<Settings>,
) -> Result<()> {
    let prefix = settings.prefix.clone();
    let registry = games.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            pre_command: |ctx| Box::pin(award_command_xp(ctx)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(handlers::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(database, games, settings))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    let shard_manager = Arc::clone(&client.shard_manager);
    let watcher = spawn_shutdown_watch(shutdown_signal(), move || async move {
        shard_manager.shutdown_all().await;
    });

    info!("Starting bot client...");
    let result = client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e));

    watcher.abort();
    let abandoned = registry.shutdown().await;
    info!(abandoned, "Bot stopped.");
    Ok(result?)
}

pub use commands::*;
pub use handlers::*;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::game::Variant;
    use crate::test_utils::new_game;
    use std::time::Duration;
    use tokio::sync::oneshot;

    const IDLE: Duration = Duration::from_secs(180);

    #[test]
    fn test_all_commands_have_unique_names() {
        let commands = all_commands();
        let mut names: Vec<&str> = commands.iter().map(|c| c.name.as_str()).collect();
        assert!(names.contains(&"8ball"));
        assert!(names.contains(&"leaderboard"));
        let count = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), count);
    }

    #[tokio::test]
    async fn test_shutdown_watch_runs_action_when_signalled() {
        let registry = GameRegistry::new();
        registry
            .register(1, new_game(Variant::TicTacToe), IDLE)
            .await
            .unwrap();

        let (tx, rx) = oneshot::channel::<()>();
        let watched = registry.clone();
        let watcher = spawn_shutdown_watch(
            async move {
                let _ = rx.await;
            },
            move || async move {
                watched.shutdown().await;
            },
        );

        assert!(registry.is_active(1).await);
        tx.send(()).unwrap();
        watcher.await.unwrap();
        assert_eq!(registry.active_count().await, 0);
    }

    #[tokio::test]
    async fn test_aborted_shutdown_watch_skips_action() {
        let registry = GameRegistry::new();
        registry
            .register(1, new_game(Variant::Connect4), IDLE)
            .await
            .unwrap();

        let watched = registry.clone();
        let watcher = spawn_shutdown_watch(std::future::pending::<()>(), move || async move {
            watched.shutdown().await;
        });
        watcher.abort();
        assert!(watcher.await.unwrap_err().is_cancelled());
        assert!(registry.is_active(1).await);
    }
}
