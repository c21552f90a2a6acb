use crate::distributor::distribute;
use crate::pot::calculate_pot_tiers;
use crate::reveal::{reveal_hands, showdown_order};
use crate::selector::{select_best, BestHand};
use crate::variant::VariantRegistry;
use log::{debug, info, warn};
use showdown_protocol::{
    Card, Chips, Contribution, EngineResult, EvaluationResult, HandSnapshot, Settlement,
    ShowdownError, ShowdownOutcome, ShowdownResult, Winner, UNCONTESTED_LABEL,
};
use std::collections::{BTreeMap, HashSet};

/// One contesting player's best hand under each family of the variant.
#[derive(Debug, Clone)]
pub struct PlayerEvaluation {
    pub player_id: String,
    pub hole_cards: Vec<Card>,
    /// Indexed like `VariantConfig::families`. `None` when the player makes
    /// no hand under that family.
    pub hands: Vec<Option<BestHand>>,
}

impl PlayerEvaluation {
    pub fn result(&self, family: usize) -> Option<&EvaluationResult> {
        self.hands
            .get(family)
            .and_then(|h| h.as_ref())
            .map(|h| &h.result)
    }

    fn hand(&self, family: usize) -> Option<&BestHand> {
        self.hands.get(family).and_then(|h| h.as_ref())
    }
}

/// Resolves finished hands into winners, reveals and stack deltas.
///
/// The engine holds no per-hand state. Applying the returned settlement is
/// the caller's job and must happen exactly once per hand.
#[derive(Debug, Clone, Default)]
pub struct ShowdownEngine {
    registry: VariantRegistry,
}

impl ShowdownEngine {
    pub fn new(registry: VariantRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &VariantRegistry {
        &self.registry
    }

    /// Picks the right path for a finished hand: nothing to do, an
    /// uncontested award, or a full showdown.
    pub fn resolve_hand(&self, snapshot: &HandSnapshot) -> EngineResult<ShowdownOutcome> {
        let contesting = snapshot.contesting().count();
        if contesting == 0 || snapshot.total_pot() == 0 {
            warn!(
                "Hand {} has {} contesting players and a pot of {}, nothing to settle",
                snapshot.hand_id,
                contesting,
                snapshot.total_pot()
            );
            return Ok(ShowdownOutcome::default());
        }
        if contesting == 1 {
            return self.award_uncontested(snapshot);
        }
        self.execute_showdown(snapshot)
    }

    /// The last player standing takes the whole pot without showing.
    pub fn award_uncontested(&self, snapshot: &HandSnapshot) -> EngineResult<ShowdownOutcome> {
        check_contributions(&snapshot.contributors)?;
        let remaining: Vec<&Contribution> = snapshot.contesting().collect();
        if remaining.len() != 1 {
            return Err(ShowdownError::NotUncontested(remaining.len()));
        }
        let winner = remaining[0];
        let amount = snapshot.total_pot();

        info!(
            "Hand {}: {} wins {} uncontested",
            snapshot.hand_id, winner.id, amount
        );

        let mut stack_deltas = BTreeMap::new();
        stack_deltas.insert(winner.id.clone(), amount);

        Ok(ShowdownOutcome {
            result: ShowdownResult {
                winners: vec![Winner {
                    player_id: winner.id.clone(),
                    amount,
                    hand: Vec::new(),
                    hand_rank_label: UNCONTESTED_LABEL.to_string(),
                    family: None,
                    qualifying_hole_cards: Vec::new(),
                    qualifying_board_cards: Vec::new(),
                }],
                all_hands: Vec::new(),
            },
            settlement: Settlement {
                stack_deltas,
                cleared_pot: true,
            },
        })
    }

    /// Full showdown between two or more players still in the hand.
    pub fn execute_showdown(&self, snapshot: &HandSnapshot) -> EngineResult<ShowdownOutcome> {
        check_contributions(&snapshot.contributors)?;
        let contesting = snapshot.contesting().count();
        if contesting < 2 {
            return Err(ShowdownError::NotEnoughPlayers(contesting));
        }

        let variant = self.registry.resolve(&snapshot.variant)?;

        let seats: Vec<(String, usize)> = snapshot
            .contesting()
            .map(|c| (c.id.clone(), c.seat))
            .collect();
        let order = showdown_order(&seats, snapshot.dealer_seat, snapshot.last_aggressor_seat);

        let by_id: BTreeMap<&str, &Contribution> = snapshot
            .contesting()
            .map(|c| (c.id.as_str(), c))
            .collect();
        let evaluations: Vec<PlayerEvaluation> = order
            .iter()
            .filter_map(|id| by_id.get(id.as_str()))
            .map(|c| PlayerEvaluation {
                player_id: c.id.clone(),
                hole_cards: c.hole_cards.clone(),
                hands: variant
                    .families
                    .iter()
                    .map(|rule| {
                        select_best(&rule.family, rule.selection, &c.hole_cards, &snapshot.board)
                    })
                    .collect(),
            })
            .collect();

        for evaluation in &evaluations {
            debug!(
                "Hand {}: {} holds [{}]",
                snapshot.hand_id,
                evaluation.player_id,
                evaluation
                    .hands
                    .iter()
                    .map(|h| h
                        .as_ref()
                        .map_or("no hand", |h| h.result.display_name.as_str()))
                    .collect::<Vec<_>>()
                    .join(" / ")
            );
        }

        let tiers = match &snapshot.pot_tiers {
            Some(tiers) => tiers.clone(),
            None => calculate_pot_tiers(&snapshot.contributors)?,
        };

        let distribution = distribute(&tiers, &evaluations, variant.families.len());

        let winners: Vec<Winner> = distribution
            .awards
            .iter()
            .map(|award| {
                let evaluation = &evaluations[award.player_index];
                let rule = &variant.families[award.family];
                let best = evaluation.hand(award.family);
                Winner {
                    player_id: evaluation.player_id.clone(),
                    amount: award.amount,
                    hand: best.map(|b| b.cards.clone()).unwrap_or_default(),
                    hand_rank_label: best
                        .map(|b| b.result.display_name.clone())
                        .unwrap_or_default(),
                    family: Some(rule.family),
                    qualifying_hole_cards: best.map(|b| b.hole_cards.clone()).unwrap_or_default(),
                    qualifying_board_cards: best
                        .map(|b| b.board_cards.clone())
                        .unwrap_or_default(),
                }
            })
            .collect();

        let mut stack_deltas: BTreeMap<String, Chips> = BTreeMap::new();
        for winner in &winners {
            *stack_deltas.entry(winner.player_id.clone()).or_insert(0) += winner.amount;
        }

        let all_hands = reveal_hands(
            &evaluations,
            &distribution.winners,
            variant.is_split(),
            snapshot.any_all_in,
        );

        info!(
            "Hand {} ({}): {} chips to {} across {} tiers",
            snapshot.hand_id,
            snapshot.variant,
            distribution.total(),
            stack_deltas
                .keys()
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
            tiers.len()
        );

        Ok(ShowdownOutcome {
            result: ShowdownResult { winners, all_hands },
            settlement: Settlement {
                stack_deltas,
                cleared_pot: true,
            },
        })
    }
}

fn check_contributions(contributors: &[Contribution]) -> EngineResult<()> {
    let mut seen = HashSet::new();
    for contribution in contributors {
        if contribution.total_committed < 0 {
            return Err(ShowdownError::NegativeContribution(contribution.id.clone()));
        }
        if !seen.insert(contribution.id.as_str()) {
            return Err(ShowdownError::DuplicatePlayer(contribution.id.clone()));
        }
    }
    Ok(())
}
