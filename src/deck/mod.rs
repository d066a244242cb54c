use rand::seq::SliceRandom;

pub use types::Card;

mod types;

pub trait DeckGenerator {
    /// Produces a fresh deck. The last element is the first one drawn.
    fn generate(&self) -> Vec<Card>;
}

/// Shuffles the full vocabulary with the thread-local RNG, which is seeded
/// from the OS so consecutive games do not repeat.
#[derive(Default, Debug, Clone, Copy)]
pub struct ShuffledDeckGenerator {}

impl DeckGenerator for ShuffledDeckGenerator {
    fn generate(&self) -> Vec<Card> {
        let mut deck = Card::ALL.to_vec();
        deck.shuffle(&mut rand::thread_rng());
        deck
    }
}

#[cfg(test)]
pub struct MockDeckGenerator {
    pub deck: Vec<Card>,
}

#[cfg(test)]
impl Default for MockDeckGenerator {
    fn default() -> Self {
        Self {
            deck: Card::ALL.to_vec(),
        }
    }
}

#[cfg(test)]
impl DeckGenerator for MockDeckGenerator {
    fn generate(&self) -> Vec<Card> {
        self.deck.clone()
    }
}
