use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    config::{Config, SeedPolicy},
    database::{Database, DatabaseConnection, DatabaseConnectionCreater},
    deck::{DeckGenerator, ShuffledDeckGenerator},
    game::GameEngine,
    leaderboard::LeaderboardAggregator,
};

#[cfg(test)]
use crate::deck::MockDeckGenerator;

/// Shared by every request handler. Holds the only store connection.
pub struct AppState<D: Database + Send, G: DeckGenerator> {
    pub database: Arc<Mutex<D>>,
    pub(super) deck_generator: Arc<G>,
    pub seed_policy: SeedPolicy,
}

impl<D: Database + Send, G: DeckGenerator> Clone for AppState<D, G> {
    fn clone(&self) -> Self {
        Self {
            database: self.database.clone(),
            deck_generator: self.deck_generator.clone(),
            seed_policy: self.seed_policy,
        }
    }
}

impl<D: Database + Send, G: DeckGenerator> AppState<D, G> {
    pub fn new(database: D, deck_generator: G, seed_policy: SeedPolicy) -> Self {
        Self {
            database: Arc::new(Mutex::new(database)),
            deck_generator: Arc::new(deck_generator),
            seed_policy,
        }
    }

    pub fn engine(&self) -> GameEngine<D, G> {
        GameEngine::new(
            self.database.clone(),
            self.deck_generator.clone(),
            self.seed_policy,
        )
    }

    pub fn leaderboard(&self) -> LeaderboardAggregator<D> {
        LeaderboardAggregator::new(self.database.clone())
    }
}

impl<G: DeckGenerator> AppState<DatabaseConnection, G> {
    /// Closes the store if nothing else holds it any more.
    pub fn shutdown(self) -> Result<(), anyhow::Error> {
        match Arc::try_unwrap(self.database) {
            Ok(database) => {
                log::info!("Closing session database");
                database.into_inner().close()
            }
            Err(_) => {
                log::warn!("Session database is still shared, leaving it to be dropped");
                Ok(())
            }
        }
    }
}

pub fn new_real_appstate(
    config: &Config,
) -> Result<AppState<DatabaseConnection, ShuffledDeckGenerator>, anyhow::Error> {
    Ok(AppState::new(
        DatabaseConnectionCreater::open_else_new(&config.database_path).start()?,
        ShuffledDeckGenerator::default(),
        config.seed_policy,
    ))
}

#[cfg(test)]
pub fn new_memory_appstate(
    seed_policy: SeedPolicy,
) -> Result<AppState<DatabaseConnection, ShuffledDeckGenerator>, anyhow::Error> {
    Ok(AppState::new(
        DatabaseConnectionCreater::open_in_memory().start()?,
        ShuffledDeckGenerator::default(),
        seed_policy,
    ))
}

#[cfg(test)]
pub fn new_testing_appstate(
) -> Result<AppState<DatabaseConnection, MockDeckGenerator>, anyhow::Error> {
    Ok(AppState::new(
        DatabaseConnectionCreater::open_in_memory().start()?,
        MockDeckGenerator::default(),
        SeedPolicy::Additive,
    ))
}
