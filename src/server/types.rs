use serde::Deserialize;

use crate::deck::Card;

#[derive(Deserialize, Debug)]
pub struct StartGameRequest {
    #[serde(default)]
    pub username: String,
    pub points: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct DrawCardRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub deck: Vec<Card>,
}
