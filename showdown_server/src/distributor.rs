use crate::showdown::PlayerEvaluation;
use log::{debug, error};
use showdown_protocol::{Chips, PotTier};
use std::collections::BTreeSet;

/// Chips won by one player under one ranking family, summed over tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Award {
    /// Index into the showdown-ordered evaluations.
    pub player_index: usize,
    pub family: usize,
    pub amount: Chips,
}

#[derive(Debug, Clone, Default)]
pub struct Distribution {
    /// Sorted by showdown position, then family.
    pub awards: Vec<Award>,
    /// Ids that won chips under each family.
    pub winners: Vec<BTreeSet<String>>,
    /// Chips in tiers nobody could win. Non-zero only when the tiers are inconsistent.
    pub unawarded: Chips,
}

impl Distribution {
    fn credit(&mut self, player_index: usize, family: usize, amount: Chips) {
        match self
            .awards
            .iter_mut()
            .find(|a| a.player_index == player_index && a.family == family)
        {
            Some(award) => award.amount += amount,
            None => self.awards.push(Award {
                player_index,
                family,
                amount,
            }),
        }
    }

    pub fn total(&self) -> Chips {
        self.awards.iter().map(|a| a.amount).sum()
    }
}

/// Divides `amount` among tied winners. Odd chips go one each to the
/// earliest winners in showdown order.
pub fn split_evenly(amount: Chips, winner_count: usize) -> Vec<Chips> {
    if winner_count == 0 {
        return Vec::new();
    }
    let count = winner_count as Chips;
    let share = amount / count;
    let remainder = (amount % count) as usize;
    (0..winner_count)
        .map(|i| if i < remainder { share + 1 } else { share })
        .collect()
}

/// Indices of the best hands under `family` among `candidates`, in order.
fn best_of(evaluations: &[PlayerEvaluation], candidates: &[usize], family: usize) -> Vec<usize> {
    let best = candidates
        .iter()
        .filter_map(|&i| evaluations[i].result(family))
        .max();
    match best {
        Some(best) => candidates
            .iter()
            .copied()
            .filter(|&i| evaluations[i].result(family) == Some(best))
            .collect(),
        None => Vec::new(),
    }
}

/// Awards every tier independently.
///
/// With two families each tier is halved first: `floor(amount / 2)` to the
/// first family, the rest to the second. A family with no eligible hand in a
/// tier (typically no qualifying low) cedes its half to the other family of
/// the same tier.
///
/// `evaluations` must be in showdown order; that order settles odd chips.
pub fn distribute(
    tiers: &[PotTier],
    evaluations: &[PlayerEvaluation],
    family_count: usize,
) -> Distribution {
    let mut distribution = Distribution {
        winners: vec![BTreeSet::new(); family_count],
        ..Default::default()
    };

    for (tier_index, tier) in tiers.iter().enumerate() {
        if tier.amount == 0 {
            continue;
        }
        if tier.eligible_player_ids.is_empty() {
            error!(
                "Invariant violation: pot tier {} ({} chips) has no eligible players, skipping",
                tier_index, tier.amount
            );
            distribution.unawarded += tier.amount;
            continue;
        }

        let eligible: Vec<usize> = evaluations
            .iter()
            .enumerate()
            .filter(|(_, e)| tier.eligible_player_ids.contains(&e.player_id))
            .map(|(i, _)| i)
            .collect();

        let live: Vec<(usize, Vec<usize>)> = (0..family_count)
            .map(|family| (family, best_of(evaluations, &eligible, family)))
            .filter(|(_, winners)| !winners.is_empty())
            .collect();

        let portions: Vec<(usize, Chips)> = match live.len() {
            0 => {
                error!(
                    "Invariant violation: pot tier {} ({} chips) has no evaluable hand, skipping",
                    tier_index, tier.amount
                );
                distribution.unawarded += tier.amount;
                continue;
            }
            1 => {
                if family_count > 1 {
                    debug!(
                        "Tier {}: only family {} has a hand, it takes all {} chips",
                        tier_index, live[0].0, tier.amount
                    );
                }
                vec![(live[0].0, tier.amount)]
            }
            _ => {
                let first = tier.amount / 2;
                vec![(live[0].0, first), (live[1].0, tier.amount - first)]
            }
        };

        for (family, amount) in portions {
            let Some((_, winners)) = live.iter().find(|(f, _)| *f == family) else {
                continue;
            };
            for (&winner, share) in winners.iter().zip(split_evenly(amount, winners.len())) {
                if share > 0 {
                    distribution.credit(winner, family, share);
                }
                distribution.winners[family].insert(evaluations[winner].player_id.clone());
            }
        }
    }

    distribution
        .awards
        .sort_by_key(|a| (a.player_index, a.family));
    distribution
}
