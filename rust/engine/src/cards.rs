use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four suits of a standard 52-card deck.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Suit {
    /// Spades (♠)
    Spades,
    /// Hearts (♥)
    Hearts,
    /// Diamonds (♦)
    Diamonds,
    /// Clubs (♣)
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn symbol(self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Suit::Spades => 0,
            Suit::Hearts => 1,
            Suit::Diamonds => 2,
            Suit::Clubs => 3,
        }
    }
}

/// Face value of a card. The discriminant is the numeric rank used by the
/// evaluator, so `Rank::Jack as u8 == 11` and `Rank::Ace as u8 == 14`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Rank {
    Two = 2,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    /// Ace (14), also plays low in the wheel straight
    Ace,
}

impl Rank {
    /// Two through Ace, ascending.
    pub const ALL: [Rank; 13] = [
        Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Seven, Rank::Eight,
        Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace,
    ];

    pub fn from_value(v: u8) -> Option<Rank> {
        Rank::ALL.get(usize::from(v).checked_sub(2)?).copied()
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    /// Display label: `2`..`10` for pip cards, `J`/`Q`/`K`/`A` for faces.
    pub fn label(self) -> String {
        match self {
            Rank::Jack => "J".to_string(),
            Rank::Queen => "Q".to_string(),
            Rank::King => "K".to_string(),
            Rank::Ace => "A".to_string(),
            pip => pip.value().to_string(),
        }
    }
}

/// A single playing card. Cards are `Copy` and never change once dealt.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    /// Display form used by table snapshots, e.g. `♠A` or `♥10`.
    pub fn display(&self) -> String {
        format!("{}{}", self.suit.symbol(), self.rank.label())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// The 52 distinct cards, suit by suit.
pub fn full_deck() -> Vec<Card> {
    Suit::ALL
        .iter()
        .flat_map(|&suit| Rank::ALL.iter().map(move |&rank| Card { suit, rank }))
        .collect()
}
