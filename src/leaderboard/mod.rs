use std::sync::Arc;

use itertools::Itertools;
use tokio::sync::Mutex;
pub use types::LeaderboardEntry;

use crate::{database::Database, game::GameError};

mod types;

pub struct LeaderboardAggregator<D: Database + Send> {
    database: Arc<Mutex<D>>,
}

impl<D: Database + Send> LeaderboardAggregator<D> {
    pub fn new(database: Arc<Mutex<D>>) -> Self {
        Self { database }
    }

    /// Every known user ranked by points, highest first. Ties are ordered by
    /// username. Users whose points cannot be read are left out.
    pub async fn list(&self) -> Result<Vec<LeaderboardEntry>, GameError> {
        let database = self.database.lock().await;
        let usernames = database
            .get_all_usernames()
            .map_err(GameError::StoreUnavailable)?;
        log::debug!("Building leaderboard from {} users", usernames.len());

        let entries = usernames
            .into_iter()
            .filter_map(|username| match database.get_points(&username) {
                Ok(points) => Some(LeaderboardEntry { username, points }),
                Err(e) => {
                    log::warn!("Leaving {} off the leaderboard, {}", username, e);
                    None
                }
            })
            .sorted_by(|a, b| {
                b.points
                    .cmp(&a.points)
                    .then_with(|| a.username.cmp(&b.username))
            })
            .collect();

        Ok(entries)
    }
}
