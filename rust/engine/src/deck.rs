use rand::seq::SliceRandom;
use rand::Rng;

use crate::cards::{full_deck, Card};

/// A single-hand draw source. The 52 cards are permuted once at construction
/// and drawn from the end, so no card can come out twice.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cards = full_deck();
        cards.shuffle(rng);
        Self { cards }
    }

    /// Stacked deck; the last card of `cards` is drawn first.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}
