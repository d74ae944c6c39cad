#![allow(dead_code)]

use headsup_engine::cards::{Card, Rank, Suit};
use headsup_engine::deck::Deck;

pub fn c(suit: Suit, rank: Rank) -> Card {
    Card { suit, rank }
}

/// Deck that deals `p1` hole cards, then `p2`, then `board` in order.
pub fn stacked(p1: [Card; 2], p2: [Card; 2], board: [Card; 5]) -> Deck {
    let mut order: Vec<Card> = p1.into_iter().chain(p2).chain(board).collect();
    order.reverse();
    Deck::from_cards(order)
}

/// Rainbow board with no straight or flush possibilities.
pub fn dry_board() -> [Card; 5] {
    [
        c(Suit::Diamonds, Rank::Two),
        c(Suit::Clubs, Rank::Seven),
        c(Suit::Hearts, Rank::Nine),
        c(Suit::Diamonds, Rank::Jack),
        c(Suit::Clubs, Rank::Three),
    ]
}

pub fn aces() -> [Card; 2] {
    [c(Suit::Spades, Rank::Ace), c(Suit::Hearts, Rank::Ace)]
}

pub fn kings() -> [Card; 2] {
    [c(Suit::Spades, Rank::King), c(Suit::Hearts, Rank::King)]
}
