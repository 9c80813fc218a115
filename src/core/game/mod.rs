//! Turn-based game engine - shared lifecycle for two-player board games.
//!
//! A [`Game`] owns the players, the turn index, the board and the termination status.
//! Everything variant-specific (move validation, win detection, fullness) is delegated
//! to a [`Rules`] implementation, one per variant. [`ActiveGame`] tags the concrete
//! variants so a single [`GameRegistry`] can hold either of them.

pub mod challenge;
pub mod connect4;
pub mod registry;
pub mod tictactoe;

pub use challenge::{Challenge, ChallengeOutcome, ChallengeResponse, ConsentPrompt};
pub use connect4::{Connect4, Connect4Board};
pub use registry::GameRegistry;
pub use tictactoe::{TicTacToe, TicTacToeBoard};

use std::fmt;
use thiserror::Error;

/// Discord channel id, as a raw integer
pub type ChannelId = u64;
/// Discord user id, as a raw integer
pub type UserId = u64;
/// Process-unique identifier handed out by the registry for each registered game
pub type GameId = u64;

/// Rule violations and lifecycle refusals raised by the game engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The actor is not the participant whose turn it is
    #[error("It's not your turn!")]
    NotYourTurn,
    /// The move is structurally invalid for the variant
    #[error("{reason}")]
    IllegalMove {
        /// Human-readable explanation
        reason: &'static str,
    },
    /// The channel already hosts a live game
    #[error("There's already a game in progress in this channel!")]
    AlreadyActive,
    /// Self-challenge, bot target or nobody mentioned
    #[error("You need to mention a valid user to play against ({reason}).")]
    InvalidOpponent {
        /// Why the opponent was refused
        reason: &'static str,
    },
    /// No live game matches the request
    #[error("There is no active game here anymore.")]
    GameNotFound,
    /// The game has already reached a terminal state
    #[error("This game has already ended.")]
    GameOver,
}

/// A participant in a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Discord user id
    pub id: UserId,
    /// Display name used when rendering turns and results
    pub name: String,
    /// Whether the account is a bot
    pub is_bot: bool,
}

impl Player {
    /// Creates a human player.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_bot: false,
        }
    }
}

/// The mark a seat places on the board. Seat 0 always plays `First`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    /// Challenger's mark
    First,
    /// Opponent's mark
    Second,
}

impl Mark {
    /// Mark owned by the given seat (0 or 1).
    #[must_use]
    pub const fn for_seat(seat: usize) -> Self {
        if seat == 0 { Self::First } else { Self::Second }
    }

    /// Seat that owns this mark.
    #[must_use]
    pub const fn seat(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

/// Termination state of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Waiting for the player at the current turn index
    InProgress,
    /// The player in `seat` completed a line
    Won {
        /// Winning seat
        seat: usize,
    },
    /// Board filled without a winner
    Drawn,
    /// No valid move arrived within the idle window
    TimedOut,
    /// Stopped on request or cleared at shutdown
    Abandoned,
}

impl GameStatus {
    /// True for every state from which no further moves are accepted.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// The two supported rulesets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// 3x3 noughts and crosses
    TicTacToe,
    /// 6x7 gravity drop, four in a row
    Connect4,
}

impl Variant {
    /// Display name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TicTacToe => "Tic Tac Toe",
            Self::Connect4 => "Connect 4",
        }
    }

    /// Command name used to start this variant
    #[must_use]
    pub const fn command(self) -> &'static str {
        match self {
            Self::TicTacToe => "tictactoe",
            Self::Connect4 => "connect4",
        }
    }

    /// Symbols for seat 0 and seat 1
    #[must_use]
    pub const fn symbols(self) -> [&'static str; 2] {
        match self {
            Self::TicTacToe => ["❌", "⭕"],
            Self::Connect4 => ["🔴", "🟡"],
        }
    }

    /// Symbol rendered for `mark` in this variant
    #[must_use]
    pub const fn symbol(self, mark: Mark) -> &'static str {
        self.symbols()[mark.seat()]
    }

    /// Width of the board grid when cells are laid out row-major
    #[must_use]
    pub const fn columns(self) -> usize {
        match self {
            Self::TicTacToe => tictactoe::SIZE,
            Self::Connect4 => connect4::COLUMNS,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Variant-specific capabilities the lifecycle controller is parameterised over.
///
/// Moves are plain indices into the variant's control set: a cell for TicTacToe,
/// a column for Connect4.
pub trait Rules {
    /// Grid state for this variant
    type Board: Default + Clone + fmt::Debug + Send;

    /// Which variant these rules implement
    const VARIANT: Variant;

    /// Number of move controls (cells or columns)
    const CONTROLS: usize;

    /// Places `mark` according to `mv` and returns the row-major index of the placed cell.
    ///
    /// Leaves the board untouched when the move is illegal.
    fn apply_move(board: &mut Self::Board, mv: usize, mark: Mark) -> Result<usize, GameError>;

    /// Whether the mark just placed at `placed` completes a winning line.
    fn detect_win(board: &Self::Board, placed: usize, mark: Mark) -> bool;

    /// Whether no further move can be placed.
    fn is_full(board: &Self::Board) -> bool;

    /// Whether `mv` would currently be accepted.
    fn is_legal(board: &Self::Board, mv: usize) -> bool;

    /// All cells, row-major.
    fn cells(board: &Self::Board) -> Vec<Option<Mark>>;
}

/// Refuses bot accounts and self-challenges.
pub fn validate_opponent(challenger: &Player, opponent: &Player) -> Result<(), GameError> {
    if opponent.is_bot {
        return Err(GameError::InvalidOpponent {
            reason: "bots can't play",
        });
    }
    if opponent.id == challenger.id {
        return Err(GameError::InvalidOpponent {
            reason: "you can't challenge yourself",
        });
    }
    Ok(())
}

/// Lifecycle controller shared by every variant.
#[derive(Debug, Clone)]
pub struct Game<R: Rules> {
    players: [Player; 2],
    turn: usize,
    board: R::Board,
    status: GameStatus,
    moves: usize,
}

impl<R: Rules> Game<R> {
    /// Starts a game with the challenger in seat 0, who moves first.
    pub fn new(challenger: Player, opponent: Player) -> Result<Self, GameError> {
        validate_opponent(&challenger, &opponent)?;
        Ok(Self {
            players: [challenger, opponent],
            turn: 0,
            board: R::Board::default(),
            status: GameStatus::InProgress,
            moves: 0,
        })
    }

    /// Participant whose turn it is.
    #[must_use]
    pub fn current_player(&self) -> &Player {
        &self.players[self.turn]
    }

    /// Which ruleset this game follows.
    #[must_use]
    pub const fn variant(&self) -> Variant {
        R::VARIANT
    }

    /// Both participants, challenger first.
    #[must_use]
    pub const fn players(&self) -> &[Player; 2] {
        &self.players
    }

    /// Current turn index (0 or 1).
    #[must_use]
    pub const fn turn(&self) -> usize {
        self.turn
    }

    /// Current termination state.
    #[must_use]
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    /// Number of accepted moves so far.
    #[must_use]
    pub const fn moves(&self) -> usize {
        self.moves
    }

    /// Read-only board access.
    #[must_use]
    pub const fn board(&self) -> &R::Board {
        &self.board
    }

    /// Validates and applies a move from `actor`.
    ///
    /// On success returns the status after the move. Rejected moves leave the board,
    /// the turn index and the status exactly as they were.
    pub fn submit_move(&mut self, actor: UserId, mv: usize) -> Result<GameStatus, GameError> {
        if self.status.is_terminal() {
            return Err(GameError::GameOver);
        }
        if actor != self.current_player().id {
            return Err(GameError::NotYourTurn);
        }

        let mark = Mark::for_seat(self.turn);
        let placed = R::apply_move(&mut self.board, mv, mark)?;
        self.moves += 1;

        if R::detect_win(&self.board, placed, mark) {
            self.status = GameStatus::Won { seat: self.turn };
        } else if R::is_full(&self.board) {
            self.status = GameStatus::Drawn;
        } else {
            self.turn = 1 - self.turn;
        }
        Ok(self.status)
    }

    /// Ends an in-progress game for inactivity.
    pub fn time_out(&mut self) {
        if !self.status.is_terminal() {
            self.status = GameStatus::TimedOut;
        }
    }

    /// Ends an in-progress game on request.
    pub fn abandon(&mut self) {
        if !self.status.is_terminal() {
            self.status = GameStatus::Abandoned;
        }
    }

    /// Enabled flag per move control; everything is disabled once the game is over.
    #[must_use]
    pub fn controls(&self) -> Vec<bool> {
        let open = !self.status.is_terminal();
        (0..R::CONTROLS)
            .map(|mv| open && R::is_legal(&self.board, mv))
            .collect()
    }
}

/// A live game of either variant.
#[derive(Debug, Clone)]
pub enum ActiveGame {
    /// Tic Tac Toe game
    TicTacToe(Game<TicTacToe>),
    /// Connect 4 game
    Connect4(Game<Connect4>),
}

macro_rules! dispatch {
    ($self:expr, $game:ident => $body:expr) => {
        match $self {
            ActiveGame::TicTacToe($game) => $body,
            ActiveGame::Connect4($game) => $body,
        }
    };
}

impl ActiveGame {
    /// Builds a fresh game of the requested variant.
    pub fn new(variant: Variant, challenger: Player, opponent: Player) -> Result<Self, GameError> {
        Ok(match variant {
            Variant::TicTacToe => Self::TicTacToe(Game::new(challenger, opponent)?),
            Variant::Connect4 => Self::Connect4(Game::new(challenger, opponent)?),
        })
    }

    /// Which variant this game is.
    #[must_use]
    pub const fn variant(&self) -> Variant {
        dispatch!(self, game => game.variant())
    }

    /// See [`Game::submit_move`].
    pub fn submit_move(&mut self, actor: UserId, mv: usize) -> Result<GameStatus, GameError> {
        dispatch!(self, game => game.submit_move(actor, mv))
    }

    /// See [`Game::time_out`].
    pub fn time_out(&mut self) {
        dispatch!(self, game => game.time_out());
    }

    /// See [`Game::abandon`].
    pub fn abandon(&mut self) {
        dispatch!(self, game => game.abandon());
    }

    /// See [`Game::status`].
    #[must_use]
    pub fn status(&self) -> GameStatus {
        dispatch!(self, game => game.status())
    }

    /// See [`Game::players`].
    #[must_use]
    pub fn players(&self) -> &[Player; 2] {
        dispatch!(self, game => game.players())
    }

    /// See [`Game::turn`].
    #[must_use]
    pub fn turn(&self) -> usize {
        dispatch!(self, game => game.turn())
    }

    /// See [`Game::current_player`].
    #[must_use]
    pub fn current_player(&self) -> &Player {
        dispatch!(self, game => game.current_player())
    }

    /// Row-major cell marks.
    #[must_use]
    pub fn cells(&self) -> Vec<Option<Mark>> {
        match self {
            Self::TicTacToe(game) => TicTacToe::cells(game.board()),
            Self::Connect4(game) => Connect4::cells(game.board()),
        }
    }

    /// See [`Game::controls`].
    #[must_use]
    pub fn controls(&self) -> Vec<bool> {
        dispatch!(self, game => game.controls())
    }
}

/// Semantic view of a game handed to the render sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    /// Registry-assigned game id
    pub game_id: GameId,
    /// Channel hosting the game
    pub channel_id: ChannelId,
    /// Ruleset
    pub variant: Variant,
    /// Challenger then opponent
    pub players: [Player; 2],
    /// Current turn index
    pub turn: usize,
    /// Termination state
    pub status: GameStatus,
    /// Row-major cell marks
    pub cells: Vec<Option<Mark>>,
    /// Enabled flag per move control
    pub controls: Vec<bool>,
    /// Message carrying the rendered board, once posted
    pub message_id: Option<u64>,
}

impl GameSnapshot {
    /// Player whose turn it is.
    #[must_use]
    pub fn current_player(&self) -> &Player {
        &self.players[self.turn]
    }

    /// Winning player, if the game was won.
    #[must_use]
    pub fn winner(&self) -> Option<&Player> {
        match self.status {
            GameStatus::Won { seat } => self.players.get(seat),
            _ => None,
        }
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }
}
