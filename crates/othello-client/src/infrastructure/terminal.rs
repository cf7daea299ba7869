//! Terminal wording for view events and local refusals.
//!
//! Everything here returns strings; `main.rs` decides where they are printed.

use othello_core::{GameResult, Outcome, Player};

use crate::application::game_view::{GameView, ViewEvent};

/// Text to print for `event`, given the view after it was applied.
pub fn present(event: &ViewEvent, view: &GameView) -> String {
    match event {
        ViewEvent::Welcomed {
            seat,
            text,
            mismatch,
        } => {
            if *mismatch {
                format!("{text}\n(note: you asked for {}, the server decides)", seat.opponent())
            } else {
                text.clone()
            }
        }
        ViewEvent::BoardChanged => format!("{}\n{}", view.render(), turn_line(view)),
        ViewEvent::Info(text) => format!("* {text}"),
        ViewEvent::Chat { sender, text } => format!("[{sender}] {text}"),
        ViewEvent::Rejected(reason) => format!("Server refused: {reason}."),
        ViewEvent::GameOver(result) => game_over_text(result, view.seat()),
    }
}

fn turn_line(view: &GameView) -> String {
    match (view.active(), view.seat()) {
        (None, _) => "The game is over.".to_string(),
        (Some(active), Some(me)) if active == me => {
            "Your turn. Cells marked * are legal.".to_string()
        }
        (Some(active), _) => format!("Waiting for {active}."),
    }
}

/// Final summary, phrased from `me`'s point of view when known.
pub fn game_over_text(result: &GameResult, me: Option<Player>) -> String {
    let why = match result.outcome {
        Outcome::BlackWins | Outcome::WhiteWins | Outcome::Draw => "final count".to_string(),
        Outcome::Surrendered(p) => format!("{p} surrendered"),
        Outcome::Abandoned(p) => format!("{p} left the game"),
    };
    let verdict = match (result.outcome.winner(), me) {
        (None, _) => "Draw.".to_string(),
        (Some(w), Some(me)) if w == me => "You win!".to_string(),
        (Some(_), Some(_)) => "You lose.".to_string(),
        (Some(w), None) => format!("{w} wins."),
    };
    format!(
        "Game over ({why}): {verdict} Black {} / White {}",
        result.discs.black, result.discs.white
    )
}
