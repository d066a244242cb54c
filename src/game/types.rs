use serde::Serialize;
use thiserror::Error;

use crate::{
    database::{PointsChange, SessionWrite},
    deck::Card,
};

pub const GAME_STARTED_MESSAGE: &str = "Game Started!";
pub const GAME_OVER_MESSAGE: &str = "Game Over! You lost!";

/// What the caller gets back from StartGame and DrawCard.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameOutcome {
    pub deck: Vec<Card>,
    pub points: i64,
    pub message: String,
    pub game_over: bool,
    #[serde(skip)]
    pub drawn_card: Option<Card>,
}

/// The pure result of a game action, before it touches the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub deck: Vec<Card>,
    pub drawn_card: Option<Card>,
    pub points: PointsChange,
    pub message: String,
    pub game_over: bool,
}

impl Transition {
    pub fn write_for(&self, username: &str) -> SessionWrite {
        SessionWrite {
            username: username.to_string(),
            points: self.points,
            deck: self.deck.clone(),
            current_card: self.drawn_card,
        }
    }

    pub fn into_outcome(self, points: i64) -> GameOutcome {
        GameOutcome {
            deck: self.deck,
            points,
            message: self.message,
            game_over: self.game_over,
            drawn_card: self.drawn_card,
        }
    }
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Deck is empty or not provided!")]
    EmptyDeck,
    #[error("No game has been started for {0}")]
    UserNotFound(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(anyhow::Error),
}
