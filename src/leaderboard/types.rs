use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub username: String,
    pub points: i64,
}
