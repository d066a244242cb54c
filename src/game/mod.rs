use std::sync::Arc;

use tokio::sync::Mutex;
pub use types::{GameError, GameOutcome, Transition};
use types::{GAME_OVER_MESSAGE, GAME_STARTED_MESSAGE};

use crate::{
    config::SeedPolicy,
    database::{Database, PointsChange},
    deck::{Card, DeckGenerator},
};

pub mod types;

fn validate_username(username: &str) -> Result<(), GameError> {
    if username.trim().is_empty() {
        return Err(GameError::InvalidInput(
            "Username cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Rejects a change that would take the stored points past what the store holds.
fn checked_points(change: PointsChange, current: i64) -> Result<i64, GameError> {
    change.apply(current).ok_or_else(|| {
        GameError::InvalidInput(format!(
            "Points out of range: {:?} on top of {}",
            change, current
        ))
    })
}

/// Starting a game always hands out a fresh deck with nothing drawn yet.
pub fn start_transition(supplied: Option<i64>, policy: SeedPolicy, deck: Vec<Card>) -> Transition {
    let points = match policy {
        SeedPolicy::Additive => PointsChange::Add(supplied.unwrap_or(0)),
        SeedPolicy::Reset => PointsChange::Set(supplied.unwrap_or(0)),
        SeedPolicy::Ignore => PointsChange::Add(0),
    };

    Transition {
        deck,
        drawn_card: None,
        points,
        message: GAME_STARTED_MESSAGE.to_string(),
        game_over: false,
    }
}

/// Pops the last card of the deck and works out its effect.
pub fn draw_transition(mut deck: Vec<Card>) -> Result<Transition, GameError> {
    let drawn_card = deck.pop().ok_or(GameError::EmptyDeck)?;

    let (points, message, game_over) = match drawn_card {
        Card::Cat => (
            PointsChange::Add(1),
            format!("You drew a {} card!", drawn_card),
            false,
        ),
        Card::Bomb => (PointsChange::Set(0), GAME_OVER_MESSAGE.to_string(), true),
        // shuffle leaves the deck as it is
        Card::Defuse | Card::Shuffle => (
            PointsChange::Add(0),
            format!("You drew a {} card!", drawn_card),
            false,
        ),
    };

    Ok(Transition {
        deck,
        drawn_card: Some(drawn_card),
        points,
        message,
        game_over,
    })
}

/// Runs game actions against the store. The store lock is held from the
/// existence check to the write, so updates for a user never interleave.
pub struct GameEngine<D: Database + Send, G: DeckGenerator> {
    database: Arc<Mutex<D>>,
    deck_generator: Arc<G>,
    seed_policy: SeedPolicy,
}

impl<D: Database + Send, G: DeckGenerator> GameEngine<D, G> {
    pub fn new(database: Arc<Mutex<D>>, deck_generator: Arc<G>, seed_policy: SeedPolicy) -> Self {
        Self {
            database,
            deck_generator,
            seed_policy,
        }
    }

    pub async fn start_game(
        &self,
        username: &str,
        points: Option<i64>,
    ) -> Result<GameOutcome, GameError> {
        validate_username(username)?;
        let transition = start_transition(
            points,
            self.seed_policy,
            self.deck_generator.generate(),
        );

        let database = self.database.lock().await;
        let (existing, exists) = database
            .load(username)
            .map_err(GameError::StoreUnavailable)?;
        let expected = checked_points(transition.points, existing)?;
        log::debug!(
            "Starting game for {} (returning: {}, {} -> {} points)",
            username,
            exists,
            existing,
            expected
        );

        let points = database
            .apply_session_write(&transition.write_for(username))
            .map_err(GameError::StoreUnavailable)?;
        drop(database);

        log::info!("{} started a game with {} points", username, points);
        Ok(transition.into_outcome(points))
    }

    pub async fn draw_card(
        &self,
        username: &str,
        deck: Vec<Card>,
    ) -> Result<GameOutcome, GameError> {
        let transition = draw_transition(deck)?;
        validate_username(username)?;

        let database = self.database.lock().await;
        let (current, exists) = database
            .load(username)
            .map_err(GameError::StoreUnavailable)?;
        if !exists {
            return Err(GameError::UserNotFound(username.to_string()));
        }
        checked_points(transition.points, current)?;

        let points = database
            .apply_session_write(&transition.write_for(username))
            .map_err(GameError::StoreUnavailable)?;
        drop(database);

        if transition.game_over {
            log::info!("{} drew a bomb, game over", username);
        } else {
            log::debug!(
                "{} drew {:?}, now at {} points with {} cards left",
                username,
                transition.drawn_card,
                points,
                transition.deck.len()
            );
        }
        Ok(transition.into_outcome(points))
    }
}
