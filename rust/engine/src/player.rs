use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::errors::GameError;

/// Seat identifier. `P1` is the human seat and `P2` the scripted opponent.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerId {
    P1,
    P2,
}

impl PlayerId {
    pub fn other(self) -> PlayerId {
        match self {
            PlayerId::P1 => PlayerId::P2,
            PlayerId::P2 => PlayerId::P1,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PlayerId::P1 => 0,
            PlayerId::P2 => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerId::P1 => "p1",
            PlayerId::P2 => "p2",
        }
    }

    pub fn parse(raw: &str) -> Option<PlayerId> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "p1" => Some(PlayerId::P1),
            "p2" => Some(PlayerId::P2),
            _ => None,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A betting decision. A call with nothing to call is a check; `Raise`
/// carries the increment on top of the call.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "amount", rename_all = "lowercase")]
pub enum PlayerAction {
    Fold,
    Call,
    Raise(u32),
}

impl PlayerAction {
    /// Builds an action from the wire form used by request layers
    /// (`"fold"`, `"call"`, `"raise"` plus an amount that only raise reads).
    pub fn from_parts(action_type: &str, amount: u32) -> Result<PlayerAction, GameError> {
        match action_type.trim().to_ascii_lowercase().as_str() {
            "fold" => Ok(PlayerAction::Fold),
            "call" => Ok(PlayerAction::Call),
            "raise" => Ok(PlayerAction::Raise(amount)),
            other => Err(GameError::UnknownAction(other.to_string())),
        }
    }
}

/// Default starting stack size for each player in chips
pub const STARTING_STACK: u32 = 1_000;

#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    name: String,
    stack: u32,
    hole: Vec<Card>,
    /// Chips committed during the current betting round
    current_bet: u32,
    is_active: bool,
    last_action: Option<String>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, stack: u32) -> Self {
        Self {
            id,
            name: name.into(),
            stack,
            hole: Vec::with_capacity(2),
            current_bet: 0,
            is_active: true,
            last_action: None,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
    pub fn stack(&self) -> u32 {
        self.stack
    }
    pub fn current_bet(&self) -> u32 {
        self.current_bet
    }
    pub fn is_active(&self) -> bool {
        self.is_active
    }
    pub fn is_all_in(&self) -> bool {
        self.stack == 0
    }
    pub fn hole_cards(&self) -> &[Card] {
        &self.hole
    }
    pub fn last_action(&self) -> Option<&str> {
        self.last_action.as_deref()
    }

    /// Clears per-hand state; the stack carries over.
    pub(crate) fn prepare_for_hand(&mut self, hole: [Card; 2]) {
        self.hole.clear();
        self.hole.extend_from_slice(&hole);
        self.current_bet = 0;
        self.is_active = true;
        self.last_action = None;
    }

    /// Moves up to `amount` chips from the stack into the current bet and
    /// returns what was actually committed. Never goes negative.
    pub(crate) fn commit(&mut self, amount: u32) -> u32 {
        let committed = amount.min(self.stack);
        self.stack -= committed;
        self.current_bet += committed;
        committed
    }

    /// Returns `amount` of the current bet to the stack.
    pub(crate) fn refund(&mut self, amount: u32) {
        let returned = amount.min(self.current_bet);
        self.current_bet -= returned;
        self.stack += returned;
    }

    pub(crate) fn clear_bet(&mut self) {
        self.current_bet = 0;
    }

    pub(crate) fn add_chips(&mut self, amount: u32) {
        self.stack = self.stack.saturating_add(amount);
    }

    pub(crate) fn set_stack(&mut self, stack: u32) {
        self.stack = stack;
    }

    pub(crate) fn fold(&mut self) {
        self.is_active = false;
    }

    pub(crate) fn set_last_action(&mut self, label: impl Into<String>) {
        self.last_action = Some(label.into());
    }
}
