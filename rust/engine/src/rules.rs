use serde::{Deserialize, Serialize};

use crate::player::{PlayerAction as A, STARTING_STACK};

pub const SMALL_BLIND: u32 = 10;
pub const BIG_BLIND: u32 = 20;

/// Table stakes. Blinds are posted by the button (small) and then the other
/// seat (big), each capped at the poster's stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub starting_stack: u32,
    pub small_blind: u32,
    pub big_blind: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            starting_stack: STARTING_STACK,
            small_blind: SMALL_BLIND,
            big_blind: BIG_BLIND,
        }
    }
}

/// An action with its chip movement worked out against the actor's stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAction {
    Fold,
    Check,
    Call(u32),
    /// `total` chips go in this action, `increment` of which is above the call
    Raise { total: u32, increment: u32 },
    /// Stack did not cover the request; the whole stack goes in
    AllIn(u32),
}

impl ResolvedAction {
    /// Chips that leave the stack for this action.
    pub fn chips(&self) -> u32 {
        match self {
            ResolvedAction::Fold | ResolvedAction::Check => 0,
            ResolvedAction::Call(n) | ResolvedAction::AllIn(n) => *n,
            ResolvedAction::Raise { total, .. } => *total,
        }
    }

    /// Label shown next to the player in table snapshots.
    pub fn label(&self) -> String {
        match self {
            ResolvedAction::Fold => "Fold".to_string(),
            ResolvedAction::Check => "Check".to_string(),
            ResolvedAction::Call(_) => "Call".to_string(),
            ResolvedAction::Raise { increment, .. } => format!("Raise +{increment}"),
            ResolvedAction::AllIn(_) => "All-in".to_string(),
        }
    }
}

/// Resolves a requested action into chip movement.
///
/// Insufficient chips are never an error: a call or raise the stack cannot
/// cover becomes [`ResolvedAction::AllIn`] for the whole stack.
///
/// # Examples
///
/// ```
/// use headsup_engine::rules::{resolve_action, ResolvedAction};
/// use headsup_engine::player::PlayerAction;
///
/// assert_eq!(resolve_action(1000, 50, PlayerAction::Call), ResolvedAction::Call(50));
/// assert_eq!(resolve_action(40, 100, PlayerAction::Call), ResolvedAction::AllIn(40));
/// assert_eq!(
///     resolve_action(1000, 20, PlayerAction::Raise(50)),
///     ResolvedAction::Raise { total: 70, increment: 50 }
/// );
/// assert_eq!(resolve_action(60, 20, PlayerAction::Raise(50)), ResolvedAction::AllIn(60));
/// ```
pub fn resolve_action(stack: u32, to_call: u32, action: A) -> ResolvedAction {
    match action {
        A::Fold => ResolvedAction::Fold,
        A::Call => {
            if to_call == 0 {
                ResolvedAction::Check
            } else if to_call >= stack {
                ResolvedAction::AllIn(stack)
            } else {
                ResolvedAction::Call(to_call)
            }
        }
        A::Raise(increment) => {
            let total = to_call.saturating_add(increment);
            if total >= stack {
                ResolvedAction::AllIn(stack)
            } else if increment == 0 {
                if to_call == 0 {
                    ResolvedAction::Check
                } else {
                    ResolvedAction::Call(to_call)
                }
            } else {
                ResolvedAction::Raise { total, increment }
            }
        }
    }
}

/// Heads-up blinds: `(small, big)` actually posted given both stacks.
pub fn post_blinds(config: &TableConfig, button_stack: u32, other_stack: u32) -> (u32, u32) {
    (
        config.small_blind.min(button_stack),
        config.big_blind.min(other_stack),
    )
}
