//! Turns game snapshots into Discord embeds and buttons.
//!
//! Board buttons carry `ttt:<game_id>:<cell>` or `c4:<game_id>:<column>` as their
//! custom id, so a press on a stale board never reaches a newer game in the same
//! channel.

use crate::core::game::{
    Challenge, ChallengeResponse, GameId, GameSnapshot, GameStatus, Mark, UserId, Variant,
};
use poise::serenity_prelude::{ButtonStyle, CreateActionRow, CreateButton, CreateEmbed};

/// Embed colour while a game is running
pub const COLOUR_IN_PROGRESS: u32 = 0x3498db;
/// Embed colour for a win
pub const COLOUR_WON: u32 = 0x2ecc71;
/// Embed colour for a draw
pub const COLOUR_DRAWN: u32 = 0x95a5a6;
/// Embed colour for a timed out or abandoned game
pub const COLOUR_ENDED: u32 = 0xe74c3c;

const EMPTY_CONNECT4_CELL: &str = "⚫";
// Discord rejects blank button labels.
const EMPTY_TICTACTOE_LABEL: &str = "\u{200b}";
const MAX_BUTTONS_PER_ROW: usize = 5;

/// A parsed board button press.
///
/// The game id alone identifies the board, so the variant prefix is only checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardPress {
    /// Game the board belonged to
    pub game_id: GameId,
    /// Cell or column index
    pub mv: usize,
}

const fn id_prefix(variant: Variant) -> &'static str {
    match variant {
        Variant::TicTacToe => "ttt",
        Variant::Connect4 => "c4",
    }
}

/// Custom id for the button that plays `mv` in `game_id`.
#[must_use]
pub fn board_custom_id(variant: Variant, game_id: GameId, mv: usize) -> String {
    format!("{}:{game_id}:{mv}", id_prefix(variant))
}

/// Parses a board custom id; anything else (challenge buttons included) yields `None`.
#[must_use]
pub fn parse_board_custom_id(custom_id: &str) -> Option<BoardPress> {
    let mut parts = custom_id.split(':');
    let prefix = parts.next()?;
    if prefix != id_prefix(Variant::TicTacToe) && prefix != id_prefix(Variant::Connect4) {
        return None;
    }
    let game_id = parts.next()?.parse().ok()?;
    let mv = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(BoardPress { game_id, mv })
}

/// Connect 4 grid as rows of emoji, top row first.
#[must_use]
pub fn grid_text(snapshot: &GameSnapshot) -> String {
    let variant = snapshot.variant;
    snapshot
        .cells
        .chunks(variant.columns())
        .map(|row| {
            row.iter()
                .map(|cell| cell.map_or(EMPTY_CONNECT4_CELL, |mark| variant.symbol(mark)))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line summary: whose turn it is, or how the game ended.
#[must_use]
pub fn status_line(snapshot: &GameSnapshot) -> String {
    let variant = snapshot.variant;
    match snapshot.status {
        GameStatus::InProgress => format!(
            "It's {}'s turn! ({})",
            snapshot.current_player().name,
            variant.symbol(Mark::for_seat(snapshot.turn))
        ),
        GameStatus::Won { seat } => format!(
            "{} ({}) wins!",
            snapshot.players[seat].name,
            variant.symbol(Mark::for_seat(seat))
        ),
        GameStatus::Drawn => "It's a draw!".to_string(),
        GameStatus::TimedOut => "Game timed out due to inactivity.".to_string(),
        GameStatus::Abandoned => "Game abandoned.".to_string(),
    }
}

/// Embed colour for `status`.
#[must_use]
pub const fn status_colour(status: GameStatus) -> u32 {
    match status {
        GameStatus::InProgress => COLOUR_IN_PROGRESS,
        GameStatus::Won { .. } => COLOUR_WON,
        GameStatus::Drawn => COLOUR_DRAWN,
        GameStatus::TimedOut | GameStatus::Abandoned => COLOUR_ENDED,
    }
}

fn players_line(snapshot: &GameSnapshot) -> String {
    let [first, second] = &snapshot.players;
    let [first_symbol, second_symbol] = snapshot.variant.symbols();
    format!(
        "{first_symbol} <@{}> vs {second_symbol} <@{}>",
        first.id, second.id
    )
}

/// The board embed.
#[must_use]
pub fn board_embed(snapshot: &GameSnapshot) -> CreateEmbed {
    let title = if snapshot.status.is_terminal() {
        "Game Over!"
    } else {
        snapshot.variant.name()
    };
    let description = match snapshot.variant {
        // Tic Tac Toe draws its board on the buttons.
        Variant::TicTacToe => players_line(snapshot),
        Variant::Connect4 => format!("{}\n\n{}", players_line(snapshot), grid_text(snapshot)),
    };
    let field_name = if snapshot.status.is_terminal() {
        "Result"
    } else {
        "Turn"
    };

    CreateEmbed::new()
        .title(title)
        .description(description)
        .field(field_name, status_line(snapshot), false)
        .colour(status_colour(snapshot.status))
}

/// Board buttons; every button is disabled once the game has ended.
#[must_use]
pub fn board_components(snapshot: &GameSnapshot) -> Vec<CreateActionRow> {
    let variant = snapshot.variant;
    let buttons: Vec<CreateButton> = snapshot
        .controls
        .iter()
        .enumerate()
        .map(|(mv, &enabled)| {
            let custom_id = board_custom_id(variant, snapshot.game_id, mv);
            match variant {
                Variant::TicTacToe => {
                    let mark = snapshot.cells.get(mv).copied().flatten();
                    CreateButton::new(custom_id)
                        .label(mark.map_or(EMPTY_TICTACTOE_LABEL, |mark| variant.symbol(mark)))
                        .style(if mark.is_some() {
                            ButtonStyle::Secondary
                        } else {
                            ButtonStyle::Primary
                        })
                        .disabled(!enabled)
                }
                Variant::Connect4 => CreateButton::new(custom_id)
                    .label((mv + 1).to_string())
                    .style(ButtonStyle::Secondary)
                    .disabled(!enabled),
            }
        })
        .collect();

    let per_row = match variant {
        Variant::TicTacToe => variant.columns(),
        Variant::Connect4 => MAX_BUTTONS_PER_ROW,
    };
    buttons
        .chunks(per_row)
        .map(|row| CreateActionRow::Buttons(row.to_vec()))
        .collect()
}

/// Custom ids for the Accept and Decline buttons of one challenge prompt.
#[must_use]
pub fn challenge_custom_ids(nonce: u64) -> (String, String) {
    (
        format!("challenge:{nonce}:accept"),
        format!("challenge:{nonce}:decline"),
    )
}

/// What a button press on a challenge prompt means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressVerdict {
    /// The challenged player answered
    Respond(ChallengeResponse),
    /// Someone other than the challenged player pressed a button
    NotForYou,
    /// Not a button of this prompt
    Ignore,
}

/// Classifies a press of `custom_id` by `presser` on the prompt for `challenge`.
#[must_use]
pub fn classify_challenge_press(
    custom_id: &str,
    presser: UserId,
    challenge: &Challenge,
    nonce: u64,
) -> PressVerdict {
    if !custom_id.starts_with(&format!("challenge:{nonce}:")) {
        return PressVerdict::Ignore;
    }
    if presser != challenge.opponent.id {
        return PressVerdict::NotForYou;
    }
    let (accept_id, decline_id) = challenge_custom_ids(nonce);
    if custom_id == accept_id {
        PressVerdict::Respond(ChallengeResponse::Accept)
    } else if custom_id == decline_id {
        PressVerdict::Respond(ChallengeResponse::Decline)
    } else {
        PressVerdict::Ignore
    }
}

/// Accept/Decline row for a challenge prompt.
#[must_use]
pub fn challenge_buttons(nonce: u64) -> CreateActionRow {
    let (accept, decline) = challenge_custom_ids(nonce);
    CreateActionRow::Buttons(vec![
        CreateButton::new(accept)
            .label("Accept")
            .style(ButtonStyle::Success),
        CreateButton::new(decline)
            .label("Decline")
            .style(ButtonStyle::Danger),
    ])
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::game::Player;
    use crate::test_utils::{alice, bob, carol};

    fn snapshot(variant: Variant) -> GameSnapshot {
        let game = crate::test_utils::new_game(variant);
        GameSnapshot {
            game_id: 9,
            channel_id: 42,
            variant,
            players: game.players().clone(),
            turn: game.turn(),
            status: game.status(),
            cells: game.cells(),
            controls: game.controls(),
            message_id: None,
        }
    }

    #[test]
    fn test_board_custom_id_parses_back() {
        let id = board_custom_id(Variant::Connect4, 17, 6);
        assert_eq!(id, "c4:17:6");
        assert_eq!(
            parse_board_custom_id(&id),
            Some(BoardPress { game_id: 17, mv: 6 })
        );
        assert_eq!(
            parse_board_custom_id(&board_custom_id(Variant::TicTacToe, 3, 8)),
            Some(BoardPress { game_id: 3, mv: 8 })
        );
    }

    #[test]
    fn test_parse_board_custom_id_rejects_foreign_ids() {
        assert_eq!(parse_board_custom_id("challenge:3:accept"), None);
        assert_eq!(parse_board_custom_id("ttt:abc:1"), None);
        assert_eq!(parse_board_custom_id("ttt:1"), None);
        assert_eq!(parse_board_custom_id("ttt:1:2:3"), None);
        assert_eq!(parse_board_custom_id("ttt_4"), None);
        assert_eq!(parse_board_custom_id("chess:1:2"), None);
    }

    fn challenge() -> Challenge {
        Challenge {
            channel_id: 42,
            challenger: alice(),
            opponent: bob(),
            variant: Variant::TicTacToe,
        }
    }

    #[test]
    fn test_opponent_press_answers_challenge() {
        let (accept, decline) = challenge_custom_ids(5);
        let opponent = bob().id;
        assert_eq!(
            classify_challenge_press(&accept, opponent, &challenge(), 5),
            PressVerdict::Respond(ChallengeResponse::Accept)
        );
        assert_eq!(
            classify_challenge_press(&decline, opponent, &challenge(), 5),
            PressVerdict::Respond(ChallengeResponse::Decline)
        );
    }

    #[test]
    fn test_other_users_cannot_answer_challenge() {
        let (accept, decline) = challenge_custom_ids(5);
        assert_eq!(
            classify_challenge_press(&accept, carol().id, &challenge(), 5),
            PressVerdict::NotForYou
        );
        // The challenger cannot accept on the opponent's behalf either.
        assert_eq!(
            classify_challenge_press(&decline, alice().id, &challenge(), 5),
            PressVerdict::NotForYou
        );
    }

    #[test]
    fn test_presses_on_other_prompts_are_ignored() {
        let (other_accept, _) = challenge_custom_ids(6);
        let opponent = bob().id;
        assert_eq!(
            classify_challenge_press(&other_accept, opponent, &challenge(), 5),
            PressVerdict::Ignore
        );
        // 5 must not match as a prefix of 55.
        let (longer_nonce, _) = challenge_custom_ids(55);
        assert_eq!(
            classify_challenge_press(&longer_nonce, carol().id, &challenge(), 5),
            PressVerdict::Ignore
        );
        assert_eq!(
            classify_challenge_press("challenge:5:maybe", opponent, &challenge(), 5),
            PressVerdict::Ignore
        );
        assert_eq!(
            classify_challenge_press("ttt:5:0", opponent, &challenge(), 5),
            PressVerdict::Ignore
        );
    }

    #[test]
    fn test_grid_text_shows_connect4_rows_top_first() {
        let mut snap = snapshot(Variant::Connect4);
        let bottom_left = 5 * 7;
        snap.cells[bottom_left] = Some(Mark::First);
        snap.cells[bottom_left + 1] = Some(Mark::Second);

        let text = grid_text(&snap);
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0], ["⚫"; 7].join(" "));
        assert!(rows[5].starts_with("🔴 🟡 ⚫"));
    }

    #[test]
    fn test_status_line_follows_game_state() {
        let mut snap = snapshot(Variant::TicTacToe);
        assert_eq!(status_line(&snap), "It's alice's turn! (❌)");

        snap.turn = 1;
        assert_eq!(status_line(&snap), "It's bob's turn! (⭕)");

        snap.status = GameStatus::Won { seat: 1 };
        assert_eq!(status_line(&snap), "bob (⭕) wins!");

        snap.status = GameStatus::TimedOut;
        assert_eq!(status_line(&snap), "Game timed out due to inactivity.");
        assert_eq!(status_colour(snap.status), COLOUR_ENDED);
        assert_eq!(status_colour(GameStatus::Drawn), COLOUR_DRAWN);
    }

    #[test]
    fn test_board_components_layout() {
        let ttt = board_components(&snapshot(Variant::TicTacToe));
        assert_eq!(ttt.len(), 3);

        let c4 = board_components(&snapshot(Variant::Connect4));
        assert_eq!(c4.len(), 2);
    }

    #[test]
    fn test_players_line_mentions_both_seats() {
        let mut snap = snapshot(Variant::TicTacToe);
        snap.players[1] = Player::new(77, "dora");
        assert_eq!(players_line(&snap), "❌ <@1> vs ⭕ <@77>");
    }
}
