use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::game::Phase;
use crate::player::{PlayerAction, PlayerId};

/// One action as it was applied.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub player_id: PlayerId,
    /// Betting phase when the action was taken
    pub phase: Phase,
    pub action: PlayerAction,
    /// Chips that actually left the stack after all-in capping
    pub chips: u32,
}

/// Who took the pot, and how.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ShowdownInfo {
    pub winners: Vec<PlayerId>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// In-memory history of the hand being played.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
    /// Format: YYYYMMDD-NNNNNN
    pub hand_id: String,
    /// Table RNG seed; replaying with it deals the same cards
    pub seed: Option<u64>,
    pub actions: Vec<ActionRecord>,
    pub board: Vec<Card>,
    pub result: Option<String>,
    /// RFC3339 start time of the hand
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub showdown: Option<ShowdownInfo>,
}

impl HandRecord {
    pub fn new(hand_id: String, seed: Option<u64>) -> Self {
        Self {
            hand_id,
            seed,
            actions: Vec::new(),
            board: Vec::with_capacity(5),
            result: None,
            ts: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
            showdown: None,
        }
    }

    /// One JSON object per line, the hand-history exchange format.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Issues hand ids of the form `YYYYMMDD-NNNNNN` for one table, numbered
/// from 1.
#[derive(Debug, Clone)]
pub struct HandSequence {
    day: String,
    issued: u32,
}

impl HandSequence {
    pub fn today() -> Self {
        Self::with_date(&Utc::now().format("%Y%m%d").to_string())
    }

    pub fn with_date(day: &str) -> Self {
        HandSequence {
            day: day.to_owned(),
            issued: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.issued += 1;
        format!("{}-{:06}", self.day, self.issued)
    }
}
