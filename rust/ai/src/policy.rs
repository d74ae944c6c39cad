//! Heuristic policy for the opponent seat.
//!
//! Hands are bucketed into three tiers and each tier maps a uniform roll in
//! `[0, 1)` onto fold / call / raise with fixed thresholds:
//!
//! | Tier   | Facing a bet                                   | No bet             |
//! |--------|------------------------------------------------|--------------------|
//! | Strong | 70% raise `pot/2 + 20`, else call              | same               |
//! | Medium | bet > pot/3: 50% fold; then 15% raise 50, call | 15% raise 50, call |
//! | Weak   | 75% fold, 10% raise 50, else call              | 20% raise 20, check|
//!
//! The result is always legal: raises the stack cannot back are turned into
//! calls, and the engine caps any call at the stack.

use headsup_engine::game::{GameState, Phase};
use headsup_engine::hand::{current_category, Category};
use headsup_engine::player::{PlayerAction, PlayerId};
use rand::Rng;

const STRONG_RAISE_CHANCE: f64 = 0.7;
const STRONG_RAISE_BONUS: u32 = 20;
const MEDIUM_FOLD_CHANCE: f64 = 0.5;
const MEDIUM_RAISE_CHANCE: f64 = 0.15;
const MEDIUM_RAISE: u32 = 50;
const WEAK_FOLD_CHANCE: f64 = 0.75;
const WEAK_BLUFF_CEILING: f64 = 0.85;
const WEAK_BLUFF_RAISE: u32 = 50;
const WEAK_STAB_CHANCE: f64 = 0.2;
const WEAK_STAB_RAISE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HandTier {
    Weak,
    Medium,
    Strong,
}

/// The numbers a decision depends on, taken from the deciding seat's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionContext {
    pub to_call: u32,
    pub pot: u32,
    pub stack: u32,
}

impl DecisionContext {
    pub fn from_state(state: &GameState, seat: PlayerId) -> Self {
        Self {
            to_call: state.to_call(seat),
            pot: state.pot(),
            stack: state.player(seat).stack(),
        }
    }
}

/// Buckets `seat`'s holding. Preflop only the hole cards count: a pocket
/// pair is strong and a queen or better is medium. After the flop the
/// made-hand category over hole cards and board decides.
pub fn classify_strength(state: &GameState, seat: PlayerId) -> HandTier {
    let hole = state.player(seat).hole_cards();
    if state.phase() == Phase::Preflop {
        return match hole {
            [a, b] if a.rank == b.rank => HandTier::Strong,
            [a, b] if a.rank.value() >= 12 || b.rank.value() >= 12 => HandTier::Medium,
            _ => HandTier::Weak,
        };
    }

    match current_category(&state.visible_cards(seat)) {
        Some(c) if c >= Category::ThreeOfAKind => HandTier::Strong,
        Some(Category::OnePair | Category::TwoPair) => HandTier::Medium,
        _ => HandTier::Weak,
    }
}

/// Pure decision for a tier, a table context and a roll in `[0, 1)`.
///
/// # Examples
///
/// ```
/// use headsup_ai::policy::{choose_action, DecisionContext, HandTier};
/// use headsup_engine::player::PlayerAction;
///
/// let ctx = DecisionContext { to_call: 0, pot: 40, stack: 980 };
/// assert_eq!(choose_action(HandTier::Strong, ctx, 0.1), PlayerAction::Raise(40));
/// assert_eq!(choose_action(HandTier::Weak, ctx, 0.5), PlayerAction::Call);
/// ```
pub fn choose_action(tier: HandTier, ctx: DecisionContext, roll: f64) -> PlayerAction {
    let facing_bet = ctx.to_call > 0;
    let action = match tier {
        HandTier::Strong => {
            if roll < STRONG_RAISE_CHANCE {
                let headroom = ctx.stack.saturating_sub(ctx.to_call);
                PlayerAction::Raise((ctx.pot / 2 + STRONG_RAISE_BONUS).min(headroom))
            } else {
                PlayerAction::Call
            }
        }
        HandTier::Medium => {
            let big_bet = ctx.to_call > ctx.pot / 3;
            if big_bet && roll < MEDIUM_FOLD_CHANCE {
                PlayerAction::Fold
            } else {
                // rescale what is left of the roll after the fold band
                let rest = if big_bet {
                    (roll - MEDIUM_FOLD_CHANCE) / (1.0 - MEDIUM_FOLD_CHANCE)
                } else {
                    roll
                };
                if rest < MEDIUM_RAISE_CHANCE {
                    PlayerAction::Raise(MEDIUM_RAISE)
                } else {
                    PlayerAction::Call
                }
            }
        }
        HandTier::Weak if facing_bet => {
            if roll < WEAK_FOLD_CHANCE {
                PlayerAction::Fold
            } else if roll < WEAK_BLUFF_CEILING {
                PlayerAction::Raise(WEAK_BLUFF_RAISE)
            } else {
                PlayerAction::Call
            }
        }
        HandTier::Weak => {
            if roll < WEAK_STAB_CHANCE {
                PlayerAction::Raise(WEAK_STAB_RAISE)
            } else {
                PlayerAction::Call
            }
        }
    };
    downgrade_unbacked_raise(action, ctx)
}

/// Draws a roll from `rng` and decides for `seat`.
pub fn decide<R: Rng>(state: &GameState, seat: PlayerId, rng: &mut R) -> PlayerAction {
    let tier = classify_strength(state, seat);
    let ctx = DecisionContext::from_state(state, seat);
    let roll: f64 = rng.random();
    choose_action(tier, ctx, roll)
}

fn downgrade_unbacked_raise(action: PlayerAction, ctx: DecisionContext) -> PlayerAction {
    match action {
        PlayerAction::Raise(0) => PlayerAction::Call,
        PlayerAction::Raise(_) if ctx.stack <= ctx.to_call => PlayerAction::Call,
        other => other,
    }
}
