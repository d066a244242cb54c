use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed card vocabulary. Anything else is rejected when a deck is parsed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Card {
    Cat,
    Bomb,
    Defuse,
    Shuffle,
}

impl Card {
    pub const ALL: [Card; 4] = [Card::Cat, Card::Bomb, Card::Defuse, Card::Shuffle];

    pub fn label(&self) -> &'static str {
        match self {
            Card::Cat => "cat",
            Card::Bomb => "bomb",
            Card::Defuse => "defuse",
            Card::Shuffle => "shuffle",
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Card {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Card::ALL
            .into_iter()
            .find(|card| card.label() == s)
            .ok_or(anyhow::anyhow!("unknown card label {}", s))
    }
}
