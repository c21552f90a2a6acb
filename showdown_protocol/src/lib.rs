use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

mod errors;
mod types;

pub use errors::{CardParseError, ConfigError, ShowdownError};
pub use types::{parse_cards, value_label, Card, EvaluationResult, Rank, Suit};
pub type EngineResult<T> = std::result::Result<T, ShowdownError>;

/// Chip amounts. Signed so that deltas and sums never need casts.
pub type Chips = i64;

pub const MUCKED_LABEL: &str = "Mucked";
pub const UNCONTESTED_LABEL: &str = "Uncontested";

/// A named strategy for ranking hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingFamily {
    High,
    AceToFiveLow,
    DeuceToSevenLow,
    Badugi,
    Hidugi,
    QualifyingLow,
}

impl fmt::Display for RankingFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RankingFamily::High => write!(f, "High"),
            RankingFamily::AceToFiveLow => write!(f, "Ace-to-Five Low"),
            RankingFamily::DeuceToSevenLow => write!(f, "Deuce-to-Seven Low"),
            RankingFamily::Badugi => write!(f, "Badugi"),
            RankingFamily::Hidugi => write!(f, "Hidugi"),
            RankingFamily::QualifyingLow => write!(f, "Eight-or-Better Low"),
        }
    }
}

/// What one seated player put into the pot this hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
    pub id: String,
    pub seat: usize,
    #[serde(default)]
    pub hole_cards: Vec<Card>,
    pub total_committed: Chips,
    /// False once the player has folded. Their chips stay in the pot.
    pub still_in_hand: bool,
}

/// Everything the betting engine hands over once a hand is resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandSnapshot {
    #[serde(default)]
    pub hand_id: String,
    pub variant: String,
    #[serde(default)]
    pub board: Vec<Card>,
    pub contributors: Vec<Contribution>,
    pub dealer_seat: usize,
    #[serde(default)]
    pub last_aggressor_seat: Option<usize>,
    #[serde(default)]
    pub any_all_in: bool,
    /// Tiers already computed upstream; recomputed from contributions when absent.
    #[serde(default)]
    pub pot_tiers: Option<Vec<PotTier>>,
}

impl HandSnapshot {
    pub fn total_pot(&self) -> Chips {
        self.contributors.iter().map(|c| c.total_committed).sum()
    }

    pub fn contesting(&self) -> impl Iterator<Item = &Contribution> {
        self.contributors.iter().filter(|c| c.still_in_hand)
    }
}

/// One contribution level of the pot: the main pot first, then side pots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotTier {
    pub amount: Chips,
    pub eligible_player_ids: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Winner {
    pub player_id: String,
    pub amount: Chips,
    /// Best cards for the winning family; empty when the pot was uncontested.
    pub hand: Vec<Card>,
    pub hand_rank_label: String,
    pub family: Option<RankingFamily>,
    pub qualifying_hole_cards: Vec<Card>,
    pub qualifying_board_cards: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealEntry {
    pub player_id: String,
    /// Hole cards when shown, `None` when withheld.
    pub hand: Option<Vec<Card>>,
    pub hand_rank_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_hand_label: Option<String>,
    pub is_mucked: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowdownResult {
    pub winners: Vec<Winner>,
    pub all_hands: Vec<RevealEntry>,
}

impl ShowdownResult {
    pub fn total_awarded(&self) -> Chips {
        self.winners.iter().map(|w| w.amount).sum()
    }
}

/// Stack changes the caller applies after a showdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub stack_deltas: BTreeMap<String, Chips>,
    pub cleared_pot: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowdownOutcome {
    pub result: ShowdownResult,
    pub settlement: Settlement,
}

/// Published to the broadcaster once a room settles a hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TableEvent {
    Showdown(ShowdownUpdate),
    StacksUpdated(Vec<(String, Chips)>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowdownUpdate {
    pub room_id: String,
    pub hand_id: String,
    pub community_cards: Vec<Card>,
    pub result: ShowdownResult,
}

impl fmt::Display for TableEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TableEvent::Showdown(update) => write!(
                f,
                "Showdown({}/{}, {} winners)",
                update.room_id,
                update.hand_id,
                update.result.winners.len()
            ),
            TableEvent::StacksUpdated(stacks) => write!(f, "StacksUpdated({})", stacks.len()),
        }
    }
}
