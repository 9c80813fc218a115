//! Active-game registry - the single source of truth for which channel hosts a live game.
//!
//! The registry is a cheap-to-clone handle around shared state, created once at startup,
//! injected into the bot data and shut down when the client stops. Every terminal
//! transition removes the channel's entry exactly once and aborts its idle watchdog.

use super::{ActiveGame, ChannelId, GameError, GameId, GameSnapshot, UserId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, instrument};

#[derive(Debug)]
struct Entry {
    id: GameId,
    game: ActiveGame,
    message_id: Option<u64>,
    idle_timeout: Duration,
    last_activity: Instant,
    watchdog: Option<JoinHandle<()>>,
}

impl Entry {
    fn snapshot(&self, channel_id: ChannelId) -> GameSnapshot {
        GameSnapshot {
            game_id: self.id,
            channel_id,
            variant: self.game.variant(),
            players: self.game.players().clone(),
            turn: self.game.turn(),
            status: self.game.status(),
            cells: self.game.cells(),
            controls: self.game.controls(),
            message_id: self.message_id,
        }
    }

    fn idle_deadline(&self) -> Instant {
        self.last_activity + self.idle_timeout
    }

    fn cancel_watchdog(&mut self) {
        if let Some(handle) = self.watchdog.take() {
            handle.abort();
        }
    }
}

/// Process-wide map from channel to its single live game.
#[derive(Debug, Clone, Default)]
pub struct GameRegistry {
    games: Arc<Mutex<HashMap<ChannelId, Entry>>>,
    next_id: Arc<AtomicU64>,
}

impl GameRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `channel` currently hosts a game.
    pub async fn is_active(&self, channel: ChannelId) -> bool {
        self.games.lock().await.contains_key(&channel)
    }

    /// Number of live games.
    pub async fn active_count(&self) -> usize {
        self.games.lock().await.len()
    }

    /// Registers `game` under `channel`, starting its idle clock.
    ///
    /// Fails with [`GameError::AlreadyActive`] when the channel already has a game; the
    /// existing game is left untouched.
    #[instrument(skip(self, game), fields(variant = %game.variant()))]
    pub async fn register(
        &self,
        channel: ChannelId,
        game: ActiveGame,
        idle_timeout: Duration,
    ) -> Result<GameSnapshot, GameError> {
        let mut games = self.games.lock().await;
        if games.contains_key(&channel) {
            return Err(GameError::AlreadyActive);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let entry = Entry {
            id,
            game,
            message_id: None,
            idle_timeout,
            last_activity: Instant::now(),
            watchdog: None,
        };
        let snapshot = entry.snapshot(channel);
        games.insert(channel, entry);
        info!(game_id = id, "Game registered");
        Ok(snapshot)
    }

    /// Current state of the channel's game, if any.
    pub async fn get(&self, channel: ChannelId) -> Option<GameSnapshot> {
        self.games
            .lock()
            .await
            .get(&channel)
            .map(|entry| entry.snapshot(channel))
    }

    /// Removes the channel's entry. Idempotent; returns whether something was removed.
    pub async fn deregister(&self, channel: ChannelId) -> bool {
        let removed = self.games.lock().await.remove(&channel);
        match removed {
            Some(mut entry) => {
                entry.cancel_watchdog();
                debug!(game_id = entry.id, channel, "Game deregistered");
                true
            }
            None => false,
        }
    }

    /// Records the message that displays the board for `game_id`.
    pub async fn attach_message(&self, channel: ChannelId, game_id: GameId, message_id: u64) -> bool {
        let mut games = self.games.lock().await;
        match games.get_mut(&channel) {
            Some(entry) if entry.id == game_id => {
                entry.message_id = Some(message_id);
                true
            }
            _ => false,
        }
    }

    /// Routes a move to the channel's game.
    ///
    /// A move for a game that is no longer registered (finished, replaced or never
    /// existed) fails with [`GameError::GameNotFound`]. A move that ends the game
    /// deregisters it before returning the final snapshot.
    #[instrument(skip(self))]
    pub async fn submit_move(
        &self,
        channel: ChannelId,
        game_id: GameId,
        actor: UserId,
        mv: usize,
    ) -> Result<GameSnapshot, GameError> {
        let mut games = self.games.lock().await;
        let entry = games
            .get_mut(&channel)
            .filter(|entry| entry.id == game_id)
            .ok_or(GameError::GameNotFound)?;

        let status = match entry.game.submit_move(actor, mv) {
            Ok(status) => status,
            Err(GameError::GameOver) => return Err(GameError::GameNotFound),
            Err(e) => {
                debug!(error = %e, "Move rejected");
                return Err(e);
            }
        };

        if !status.is_terminal() {
            entry.last_activity = Instant::now();
            return Ok(entry.snapshot(channel));
        }

        let mut entry = games.remove(&channel).ok_or(GameError::GameNotFound)?;
        entry.cancel_watchdog();
        info!(game_id, ?status, "Game finished");
        Ok(entry.snapshot(channel))
    }

    /// Ends the channel's game as abandoned.
    ///
    /// When `game_id` is given, only that game is stopped.
    pub async fn abandon(&self, channel: ChannelId, game_id: Option<GameId>) -> Option<GameSnapshot> {
        let mut games = self.games.lock().await;
        if game_id.is_some_and(|id| games.get(&channel).is_none_or(|entry| entry.id != id)) {
            return None;
        }
        let mut entry = games.remove(&channel)?;
        entry.cancel_watchdog();
        entry.game.abandon();
        info!(game_id = entry.id, channel, "Game abandoned");
        Some(entry.snapshot(channel))
    }

    /// Abandons every live game. Called once when the bot shuts down.
    pub async fn shutdown(&self) -> usize {
        let mut games = self.games.lock().await;
        let count = games.len();
        for (_, mut entry) in games.drain() {
            entry.cancel_watchdog();
            entry.game.abandon();
        }
        if count > 0 {
            info!(count, "Abandoned in-flight games at shutdown");
        }
        count
    }

    /// Starts the idle watchdog for `game_id`.
    ///
    /// When no valid move arrives within the game's idle window, the game is marked
    /// timed out, deregistered, and `on_timeout` receives its final snapshot. The
    /// watchdog is aborted as soon as the game reaches any other terminal state.
    pub async fn spawn_idle_watch<F, Fut>(&self, channel: ChannelId, game_id: GameId, on_timeout: F)
    where
        F: FnOnce(GameSnapshot) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let registry = self.clone();
        let handle = tokio::spawn(async move {
            if let Some(snapshot) = registry.watch_idle(channel, game_id).await {
                on_timeout(snapshot).await;
            }
        });

        let mut games = self.games.lock().await;
        if let Some(entry) = games.get_mut(&channel).filter(|entry| entry.id == game_id) {
            entry.cancel_watchdog();
            entry.watchdog = Some(handle);
        }
        // Otherwise the game is already gone and the task exits on its first liveness check.
    }

    /// Sleeps until the game's idle deadline, re-arming after every move.
    async fn watch_idle(&self, channel: ChannelId, game_id: GameId) -> Option<GameSnapshot> {
        loop {
            let deadline = {
                let games = self.games.lock().await;
                games
                    .get(&channel)
                    .filter(|entry| entry.id == game_id)?
                    .idle_deadline()
            };
            time::sleep_until(deadline).await;

            let mut games = self.games.lock().await;
            let expired = games
                .get(&channel)
                .filter(|entry| entry.id == game_id)?
                .idle_deadline()
                <= Instant::now();
            if !expired {
                continue;
            }

            let mut entry = games.remove(&channel)?;
            // This task owns the handle; dropping it detaches instead of aborting ourselves.
            entry.watchdog.take();
            entry.game.time_out();
            info!(game_id, channel, "Game timed out");
            return Some(entry.snapshot(channel));
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::game::{GameStatus, Variant};
    use crate::test_utils::{alice, bob, carol, new_game};
    use tokio::sync::oneshot;

    const CHANNEL: ChannelId = 100;
    const IDLE: Duration = Duration::from_secs(180);

    #[tokio::test]
    async fn test_register_and_get() {
        let registry = GameRegistry::new();
        assert!(registry.get(CHANNEL).await.is_none());

        let snapshot = registry
            .register(CHANNEL, new_game(Variant::TicTacToe), IDLE)
            .await
            .unwrap();
        assert_eq!(snapshot.channel_id, CHANNEL);
        assert_eq!(snapshot.status, GameStatus::InProgress);

        let fetched = registry.get(CHANNEL).await.unwrap();
        assert_eq!(fetched.game_id, snapshot.game_id);
        assert_eq!(registry.active_count().await, 1);
    }

    #[tokio::test]
    async fn test_register_twice_fails_and_keeps_existing_game() {
        let registry = GameRegistry::new();
        let first = registry
            .register(CHANNEL, new_game(Variant::TicTacToe), IDLE)
            .await
            .unwrap();
        registry
            .submit_move(CHANNEL, first.game_id, alice().id, 4)
            .await
            .unwrap();

        let second = ActiveGame::new(Variant::Connect4, carol(), bob()).unwrap();
        let result = registry.register(CHANNEL, second, IDLE).await;
        assert_eq!(result, Err(GameError::AlreadyActive));

        let current = registry.get(CHANNEL).await.unwrap();
        assert_eq!(current.game_id, first.game_id);
        assert_eq!(current.variant, Variant::TicTacToe);
        assert_eq!(current.filled(), 1);
    }

    #[tokio::test]
    async fn test_deregister_is_idempotent() {
        let registry = GameRegistry::new();
        registry
            .register(CHANNEL, new_game(Variant::Connect4), IDLE)
            .await
            .unwrap();
        assert!(registry.deregister(CHANNEL).await);
        assert!(!registry.deregister(CHANNEL).await);
        assert!(!registry.is_active(CHANNEL).await);
    }

    #[tokio::test]
    async fn test_winning_move_deregisters_and_later_moves_are_not_found() {
        let registry = GameRegistry::new();
        let game = registry
            .register(CHANNEL, new_game(Variant::TicTacToe), IDLE)
            .await
            .unwrap();

        for (actor, cell) in [(alice(), 0), (bob(), 3), (alice(), 1), (bob(), 4)] {
            registry
                .submit_move(CHANNEL, game.game_id, actor.id, cell)
                .await
                .unwrap();
        }
        let last = registry
            .submit_move(CHANNEL, game.game_id, alice().id, 2)
            .await
            .unwrap();
        assert_eq!(last.status, GameStatus::Won { seat: 0 });
        assert_eq!(last.winner(), Some(&alice()));
        assert!(last.controls.iter().all(|enabled| !enabled));

        assert!(!registry.is_active(CHANNEL).await);
        let result = registry.submit_move(CHANNEL, game.game_id, bob().id, 5).await;
        assert_eq!(result, Err(GameError::GameNotFound));
    }

    #[tokio::test]
    async fn test_rejected_moves_leave_state_untouched() {
        let registry = GameRegistry::new();
        let game = registry
            .register(CHANNEL, new_game(Variant::Connect4), IDLE)
            .await
            .unwrap();

        let result = registry.submit_move(CHANNEL, game.game_id, bob().id, 0).await;
        assert_eq!(result, Err(GameError::NotYourTurn));

        let result = registry.submit_move(CHANNEL, game.game_id, alice().id, 7).await;
        assert!(matches!(result, Err(GameError::IllegalMove { .. })));

        let current = registry.get(CHANNEL).await.unwrap();
        assert_eq!(current.filled(), 0);
        assert_eq!(current.turn, 0);
    }

    #[tokio::test]
    async fn test_stale_game_id_is_not_found() {
        let registry = GameRegistry::new();
        let old = registry
            .register(CHANNEL, new_game(Variant::TicTacToe), IDLE)
            .await
            .unwrap();
        registry.abandon(CHANNEL, None).await.unwrap();
        let new = registry
            .register(CHANNEL, new_game(Variant::TicTacToe), IDLE)
            .await
            .unwrap();
        assert_ne!(old.game_id, new.game_id);

        let result = registry.submit_move(CHANNEL, old.game_id, alice().id, 0).await;
        assert_eq!(result, Err(GameError::GameNotFound));
        assert!(registry.abandon(CHANNEL, Some(old.game_id)).await.is_none());
        assert!(registry.is_active(CHANNEL).await);
    }

    #[tokio::test]
    async fn test_abandon_marks_game_and_removes_entry() {
        let registry = GameRegistry::new();
        registry
            .register(CHANNEL, new_game(Variant::Connect4), IDLE)
            .await
            .unwrap();
        let snapshot = registry.abandon(CHANNEL, None).await.unwrap();
        assert_eq!(snapshot.status, GameStatus::Abandoned);
        assert!(!registry.is_active(CHANNEL).await);
        assert!(registry.abandon(CHANNEL, None).await.is_none());
    }

    #[tokio::test]
    async fn test_attach_message_only_for_matching_game() {
        let registry = GameRegistry::new();
        let game = registry
            .register(CHANNEL, new_game(Variant::TicTacToe), IDLE)
            .await
            .unwrap();
        assert!(!registry.attach_message(CHANNEL, game.game_id + 1, 7).await);
        assert!(registry.attach_message(CHANNEL, game.game_id, 7).await);
        assert_eq!(registry.get(CHANNEL).await.unwrap().message_id, Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_game_times_out() {
        let registry = GameRegistry::new();
        let game = registry
            .register(CHANNEL, new_game(Variant::TicTacToe), IDLE)
            .await
            .unwrap();

        let (tx, rx) = oneshot::channel();
        registry
            .spawn_idle_watch(CHANNEL, game.game_id, move |snapshot| async move {
                let _ = tx.send(snapshot);
            })
            .await;

        let snapshot = rx.await.unwrap();
        assert_eq!(snapshot.status, GameStatus::TimedOut);
        assert!(!registry.is_active(CHANNEL).await);
        let result = registry.submit_move(CHANNEL, game.game_id, alice().id, 0).await;
        assert_eq!(result, Err(GameError::GameNotFound));
    }

    #[tokio::test(start_paused = true)]
    async fn test_moves_push_back_idle_deadline() {
        let registry = GameRegistry::new();
        let game = registry
            .register(CHANNEL, new_game(Variant::TicTacToe), IDLE)
            .await
            .unwrap();
        let (tx, mut rx) = oneshot::channel();
        registry
            .spawn_idle_watch(CHANNEL, game.game_id, move |snapshot| async move {
                let _ = tx.send(snapshot);
            })
            .await;

        time::sleep(IDLE - Duration::from_secs(10)).await;
        registry
            .submit_move(CHANNEL, game.game_id, alice().id, 4)
            .await
            .unwrap();

        // Past the original deadline but within the refreshed one
        time::sleep(Duration::from_secs(60)).await;
        assert!(rx.try_recv().is_err());
        assert!(registry.is_active(CHANNEL).await);

        let snapshot = rx.await.unwrap();
        assert_eq!(snapshot.status, GameStatus::TimedOut);
        assert_eq!(snapshot.filled(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_game_never_times_out() {
        let registry = GameRegistry::new();
        let game = registry
            .register(CHANNEL, new_game(Variant::TicTacToe), IDLE)
            .await
            .unwrap();
        let (tx, rx) = oneshot::channel::<GameSnapshot>();
        registry
            .spawn_idle_watch(CHANNEL, game.game_id, move |snapshot| async move {
                let _ = tx.send(snapshot);
            })
            .await;

        registry.abandon(CHANNEL, Some(game.game_id)).await.unwrap();
        // The aborted watchdog drops its sender without ever sending.
        assert!(rx.await.is_err());

        // A new game in the same channel is not affected by the old watchdog.
        registry
            .register(CHANNEL, new_game(Variant::Connect4), IDLE)
            .await
            .unwrap();
        time::sleep(IDLE * 2).await;
        assert!(registry.is_active(CHANNEL).await);
    }

    #[tokio::test]
    async fn test_shutdown_clears_everything() {
        let registry = GameRegistry::new();
        for channel in 1..=3 {
            registry
                .register(channel, new_game(Variant::TicTacToe), IDLE)
                .await
                .unwrap();
        }
        assert_eq!(registry.shutdown().await, 3);
        assert_eq!(registry.active_count().await, 0);
    }
}
