use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::cards::Card;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::HighCard => "High Card",
            Category::OnePair => "One Pair",
            Category::TwoPair => "Two Pair",
            Category::ThreeOfAKind => "Three of a Kind",
            Category::Straight => "Straight",
            Category::Flush => "Flush",
            Category::FullHouse => "Full House",
            Category::FourOfAKind => "Four of a Kind",
            Category::StraightFlush => "Straight Flush",
        }
    }
}

/// Evaluation of a five-card hand.
///
/// Field order matters: the derived `Ord` compares `category` first and then
/// the tiebreak ranks lexicographically, which is exactly the showdown order.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct HandStrength {
    pub category: Category,
    /// All five ranks ordered by (count desc, rank desc). The wheel is
    /// `[5, 4, 3, 2, 14]` so the ace plays low.
    pub tiebreak: [u8; 5],
}

/// Scores exactly five cards.
pub fn evaluate_five(cards: &[Card; 5]) -> HandStrength {
    let mut rank_counts = [0u8; 15];
    for c in cards {
        rank_counts[c.rank.value() as usize] += 1;
    }

    let mut tiebreak = [0u8; 5];
    for (slot, c) in tiebreak.iter_mut().zip(cards.iter()) {
        *slot = c.rank.value();
    }
    tiebreak.sort_unstable_by(|a, b| {
        rank_counts[*b as usize]
            .cmp(&rank_counts[*a as usize])
            .then(b.cmp(a))
    });

    let mut counts: Vec<u8> = rank_counts.iter().copied().filter(|&n| n > 0).collect();
    counts.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = cards.iter().all(|c| c.suit == cards[0].suit);
    let distinct = counts.len() == 5;
    let mut is_straight = distinct && tiebreak[0] - tiebreak[4] == 4;
    if distinct && tiebreak == [14, 5, 4, 3, 2] {
        is_straight = true;
        tiebreak = [5, 4, 3, 2, 14];
    }

    let category = if is_straight && is_flush {
        Category::StraightFlush
    } else if counts[0] == 4 {
        Category::FourOfAKind
    } else if counts[..2] == [3, 2] {
        Category::FullHouse
    } else if is_flush {
        Category::Flush
    } else if is_straight {
        Category::Straight
    } else if counts[0] == 3 {
        Category::ThreeOfAKind
    } else if counts[..2] == [2, 2] {
        Category::TwoPair
    } else if counts[0] == 2 {
        Category::OnePair
    } else {
        Category::HighCard
    };

    HandStrength { category, tiebreak }
}

/// Best five-card hand out of seven: all 21 subsets are scored and the
/// maximum is returned.
pub fn evaluate_hand(cards: &[Card; 7]) -> HandStrength {
    let mut best = evaluate_five(&[cards[0], cards[1], cards[2], cards[3], cards[4]]);
    // choose the two cards left out
    for skip_a in 0..7 {
        for skip_b in (skip_a + 1)..7 {
            let mut five = [cards[0]; 5];
            let mut n = 0;
            for (i, &c) in cards.iter().enumerate() {
                if i != skip_a && i != skip_b {
                    five[n] = c;
                    n += 1;
                }
            }
            let strength = evaluate_five(&five);
            if strength > best {
                best = strength;
            }
        }
    }
    best
}

pub fn compare_hands(a: &HandStrength, b: &HandStrength) -> Ordering {
    match a.category.cmp(&b.category) {
        Ordering::Equal => a.tiebreak.cmp(&b.tiebreak),
        ord => ord,
    }
}

/// Advisory category for a partial hand (hole cards plus whatever part of the
/// board is visible). Returns `None` for fewer than two cards.
///
/// Unlike [`evaluate_hand`] this works on any number of cards, so a flush only
/// needs five suited cards somewhere in the set. It is meant for display and
/// for the opponent's strength read, never for settling a pot.
pub fn current_category(cards: &[Card]) -> Option<Category> {
    if cards.len() < 2 {
        return None;
    }

    let mut rank_counts = [0u8; 15];
    let mut by_suit: [Vec<u8>; 4] = [vec![], vec![], vec![], vec![]];
    for c in cards {
        rank_counts[c.rank.value() as usize] += 1;
        by_suit[c.suit.index()].push(c.rank.value());
    }

    let flush_ranks = by_suit.iter().find(|ranks| ranks.len() >= 5);
    if let Some(ranks) = flush_ranks {
        if has_straight(ranks) {
            return Some(Category::StraightFlush);
        }
    }

    let (quads, trips, pairs) = classify_multiples(&rank_counts);
    if quads > 0 {
        return Some(Category::FourOfAKind);
    }
    if trips > 0 && (trips + pairs) >= 2 {
        return Some(Category::FullHouse);
    }
    if flush_ranks.is_some() {
        return Some(Category::Flush);
    }
    let present: Vec<u8> = (2..=14).filter(|&r| rank_counts[r as usize] > 0).collect();
    if has_straight(&present) {
        return Some(Category::Straight);
    }
    let category = if trips > 0 {
        Category::ThreeOfAKind
    } else if pairs >= 2 {
        Category::TwoPair
    } else if pairs == 1 {
        Category::OnePair
    } else {
        Category::HighCard
    };
    Some(category)
}

fn has_straight(ranks: &[u8]) -> bool {
    let mut mask: u16 = 0;
    for &r in ranks {
        mask |= 1 << r;
    }
    // ace also plays as 1
    if mask & (1 << 14) != 0 {
        mask |= 1 << 1;
    }
    (5..=14u16).any(|high| {
        let window = 0b1_1111u16 << (high - 4);
        mask & window == window
    })
}

/// Counts ranks appearing four, three and two times.
fn classify_multiples(rank_counts: &[u8; 15]) -> (usize, usize, usize) {
    let mut quads = 0;
    let mut trips = 0;
    let mut pairs = 0;
    for &count in &rank_counts[2..] {
        match count {
            4 => quads += 1,
            3 => trips += 1,
            2 => pairs += 1,
            _ => {}
        }
    }
    (quads, trips, pairs)
}
