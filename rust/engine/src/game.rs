use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::player::{Player, PlayerId};
use crate::pot::Pot;

/// Stage of a hand. `Showdown` is terminal until the next hand starts.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Phase {
    pub fn next(self) -> Phase {
        match self {
            Phase::Preflop => Phase::Flop,
            Phase::Flop => Phase::Turn,
            Phase::Turn => Phase::River,
            Phase::River | Phase::Showdown => Phase::Showdown,
        }
    }

    /// Community cards dealt when entering this phase.
    pub fn cards_dealt_on_entry(self) -> usize {
        match self {
            Phase::Flop => 3,
            Phase::Turn | Phase::River => 1,
            Phase::Preflop | Phase::Showdown => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Preflop => "PREFLOP",
            Phase::Flop => "FLOP",
            Phase::Turn => "TURN",
            Phase::River => "RIVER",
            Phase::Showdown => "SHOWDOWN",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The live table: both seats, the board, the pot and whose turn it is.
/// Exactly one exists per session and it is reset at the start of every hand.
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) phase: Phase,
    pub(crate) players: [Player; 2],
    pub(crate) community_cards: Vec<Card>,
    pub(crate) pot: Pot,
    /// Largest `current_bet` of the round
    pub(crate) highest_bet: u32,
    pub(crate) current_turn: PlayerId,
    pub(crate) dealer_button: PlayerId,
    pub(crate) actions_this_round: u32,
    pub(crate) message: String,
}

impl GameState {
    /// Fresh table. The button starts on `P2` so that the first hand, which
    /// rotates it, puts `P1` on the button.
    pub fn new(players: [Player; 2]) -> Self {
        Self {
            phase: Phase::Showdown,
            players,
            community_cards: Vec::with_capacity(5),
            pot: Pot::new(),
            highest_bet: 0,
            current_turn: PlayerId::P1,
            dealer_button: PlayerId::P2,
            actions_this_round: 0,
            message: "Start a hand to begin.".to_string(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }
    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }
    pub(crate) fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id.index()]
    }
    pub fn community_cards(&self) -> &[Card] {
        &self.community_cards
    }
    pub fn pot(&self) -> u32 {
        self.pot.total()
    }
    pub fn highest_bet(&self) -> u32 {
        self.highest_bet
    }
    pub fn current_turn(&self) -> PlayerId {
        self.current_turn
    }
    pub fn dealer_button(&self) -> PlayerId {
        self.dealer_button
    }
    pub fn actions_this_round(&self) -> u32 {
        self.actions_this_round
    }
    pub fn message(&self) -> &str {
        &self.message
    }
    pub fn is_hand_over(&self) -> bool {
        self.phase == Phase::Showdown
    }

    /// Chips `id` must add to match the highest bet.
    pub fn to_call(&self, id: PlayerId) -> u32 {
        self.highest_bet
            .saturating_sub(self.player(id).current_bet())
    }

    /// Hole cards of `id` followed by the visible board.
    pub fn visible_cards(&self, id: PlayerId) -> Vec<Card> {
        let mut cards = self.player(id).hole_cards().to_vec();
        cards.extend_from_slice(&self.community_cards);
        cards
    }

    /// Pot plus both stacks; constant within a hand until the pot is paid out.
    pub fn chips_in_play(&self) -> u32 {
        self.pot.total() + self.players.iter().map(|p| p.stack()).sum::<u32>()
    }

    pub(crate) fn rotate_button(&mut self) {
        self.dealer_button = self.dealer_button.other();
    }

    pub(crate) fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub(crate) fn append_message(&mut self, extra: &str) {
        self.message.push(' ');
        self.message.push_str(extra);
    }

    pub(crate) fn recompute_highest_bet(&mut self) {
        self.highest_bet = self
            .players
            .iter()
            .map(|p| p.current_bet())
            .max()
            .unwrap_or(0);
    }
}
