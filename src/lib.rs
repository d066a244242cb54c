pub mod appstate;
pub mod config;
pub mod database;
pub mod deck;
pub mod game;
pub mod leaderboard;
pub mod server;
