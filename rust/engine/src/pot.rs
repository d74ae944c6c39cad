use serde::{Deserialize, Serialize};

/// The single heads-up pot. With two contributors no side pot is ever needed:
/// whatever one player commits beyond what the other can match is returned
/// when the betting round closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pot {
    chips: u32,
}

impl Pot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> u32 {
        self.chips
    }

    pub(crate) fn add(&mut self, chips: u32) {
        self.chips += chips;
    }

    pub(crate) fn remove(&mut self, chips: u32) -> u32 {
        let removed = chips.min(self.chips);
        self.chips -= removed;
        removed
    }

    /// Empties the pot, returning everything that was in it.
    pub(crate) fn take(&mut self) -> u32 {
        std::mem::take(&mut self.chips)
    }
}

/// Seat index and size of the over-commitment when the two round bets differ.
pub fn uncalled_excess(bets: [u32; 2]) -> Option<(usize, u32)> {
    match bets[0].cmp(&bets[1]) {
        std::cmp::Ordering::Greater => Some((0, bets[0] - bets[1])),
        std::cmp::Ordering::Less => Some((1, bets[1] - bets[0])),
        std::cmp::Ordering::Equal => None,
    }
}

/// Chop of a tied pot: `(share per player, odd chip left unawarded)`.
pub fn chop(pot: u32) -> (u32, u32) {
    (pot / 2, pot % 2)
}
