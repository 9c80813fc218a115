//! Shared test utilities.
//!
//! Provides an in-memory database, a small cast of players, and a scripted
//! [`ConsentPrompt`] so negotiation can be tested without a Discord connection.

use crate::{
    core::{
        economy,
        game::{
            ActiveGame, Challenge, ChallengeResponse, ChannelId, ConsentPrompt, GameRegistry,
            Player, Variant,
        },
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::time::Duration;

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates an account holding `balance` coins.
pub async fn create_funded_account(
    db: &DatabaseConnection,
    user_id: &str,
    balance: i64,
) -> Result<entities::economy::Model> {
    economy::get_or_create_account(db, user_id).await?;
    economy::adjust_balance(db, user_id, balance).await
}

/// The usual challenger.
pub fn alice() -> Player {
    Player::new(1, "alice")
}

/// The usual opponent.
pub fn bob() -> Player {
    Player::new(2, "bob")
}

/// A bystander.
pub fn carol() -> Player {
    Player::new(3, "carol")
}

/// Fresh alice-vs-bob game of the given variant.
#[allow(clippy::unwrap_used)]
pub fn new_game(variant: Variant) -> ActiveGame {
    ActiveGame::new(variant, alice(), bob()).unwrap()
}

/// Prompt that answers from a script.
///
/// A silent prompt sleeps through the whole window and reports no answer.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    response: Option<ChallengeResponse>,
    occupy: Option<(GameRegistry, ChannelId)>,
    /// How many times the prompt was shown
    pub asked: usize,
}

impl ScriptedPrompt {
    /// Prompt that immediately resolves with `response`.
    pub fn answering(response: Option<ChallengeResponse>) -> Self {
        Self {
            response,
            ..Self::default()
        }
    }

    /// Prompt nobody answers.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Registers another game in `channel` while the opponent is deciding.
    pub fn occupying(mut self, registry: GameRegistry, channel: ChannelId) -> Self {
        self.occupy = Some((registry, channel));
        self
    }
}

impl ConsentPrompt for ScriptedPrompt {
    fn await_response(
        &mut self,
        _challenge: &Challenge,
        window: Duration,
    ) -> impl Future<Output = Result<Option<ChallengeResponse>>> + Send {
        self.asked += 1;
        let response = self.response;
        let occupy = self.occupy.take();
        async move {
            if let Some((registry, channel)) = occupy {
                registry
                    .register(channel, new_game(Variant::TicTacToe), window)
                    .await?;
            }
            if response.is_none() {
                tokio::time::sleep(window).await;
            }
            Ok(response)
        }
    }
}
