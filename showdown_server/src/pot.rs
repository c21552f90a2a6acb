use log::debug;
use showdown_protocol::{Chips, Contribution, EngineResult, PotTier, ShowdownError};
use std::collections::BTreeSet;

/// Splits per-player contributions into pot tiers: the main pot first, then
/// side pots in ascending contribution level.
///
/// Folded players' chips count toward every level they reached but never
/// make them eligible. Levels reached only by folded players fold into the
/// last real tier.
pub fn calculate_pot_tiers(contributions: &[Contribution]) -> EngineResult<Vec<PotTier>> {
    if let Some(negative) = contributions.iter().find(|c| c.total_committed < 0) {
        return Err(ShowdownError::NegativeContribution(negative.id.clone()));
    }

    let contributors: Vec<&Contribution> = contributions
        .iter()
        .filter(|c| c.total_committed > 0)
        .collect();

    let mut levels: Vec<Chips> = contributors.iter().map(|c| c.total_committed).collect();
    levels.sort_unstable();
    levels.dedup();

    let mut tiers: Vec<PotTier> = Vec::new();
    let mut previous = 0;

    for level in levels {
        let at_level: Vec<&&Contribution> = contributors
            .iter()
            .filter(|c| c.total_committed >= level)
            .collect();
        let eligible: BTreeSet<String> = at_level
            .iter()
            .filter(|c| c.still_in_hand)
            .map(|c| c.id.clone())
            .collect();
        let amount = (level - previous) * at_level.len() as Chips;
        previous = level;

        match tiers.last_mut() {
            Some(last) if last.eligible_player_ids == eligible || eligible.is_empty() => {
                if eligible.is_empty() {
                    debug!(
                        "Level {} reached only by folded players, adding {} to the previous tier",
                        level, amount
                    );
                }
                last.amount += amount;
            }
            _ => tiers.push(PotTier {
                amount,
                eligible_player_ids: eligible,
            }),
        }
    }

    Ok(tiers)
}

/// Sum of every tier, which equals the sum of all contributions.
pub fn total(tiers: &[PotTier]) -> Chips {
    tiers.iter().map(|t| t.amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contribution(id: &str, committed: Chips, still_in_hand: bool) -> Contribution {
        Contribution {
            id: id.to_string(),
            seat: 0,
            hole_cards: Vec::new(),
            total_committed: committed,
            still_in_hand,
        }
    }

    fn ids(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_basic_side_pot() {
        let tiers = calculate_pot_tiers(&[
            contribution("a", 100, true),
            contribution("b", 200, true),
            contribution("c", 200, true),
        ])
        .unwrap();
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[0].amount, 300);
        assert_eq!(tiers[0].eligible_player_ids, ids(&["a", "b", "c"]));
        assert_eq!(tiers[1].amount, 200);
        assert_eq!(tiers[1].eligible_player_ids, ids(&["b", "c"]));
    }

    #[test]
    fn test_equal_contributions_single_tier() {
        let tiers = calculate_pot_tiers(&[
            contribution("a", 100, true),
            contribution("b", 100, true),
            contribution("c", 100, true),
        ])
        .unwrap();
        assert_eq!(tiers.len(), 1);
        assert_eq!(tiers[0].amount, 300);
    }

    #[test]
    fn test_folded_chips_count_but_not_eligibility() {
        let tiers = calculate_pot_tiers(&[
            contribution("a", 50, true),
            contribution("b", 100, false),
            contribution("c", 100, true),
        ])
        .unwrap();
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[0].amount, 150);
        assert_eq!(tiers[0].eligible_player_ids, ids(&["a", "c"]));
        assert_eq!(tiers[1].amount, 100);
        assert_eq!(tiers[1].eligible_player_ids, ids(&["c"]));
    }

    #[test]
    fn test_folded_level_merges_into_matching_tier() {
        let tiers = calculate_pot_tiers(&[
            contribution("a", 100, true),
            contribution("b", 150, false),
            contribution("c", 200, true),
        ])
        .unwrap();
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers[0].amount, 300);
        assert_eq!(tiers[0].eligible_player_ids, ids(&["a", "c"]));
        assert_eq!(tiers[1].amount, 150);
        assert_eq!(tiers[1].eligible_player_ids, ids(&["c"]));
        assert_eq!(total(&tiers), 450);
    }

    #[test]
    fn test_folded_overbet_inflates_last_tier() {
        let tiers = calculate_pot_tiers(&[
            contribution("a", 100, true),
            contribution("b", 100, true),
            contribution("c", 300, false),
        ])
        .unwrap();
        assert_eq!(tiers.len(), 1);
        assert_eq!(tiers[0].amount, 500);
        assert_eq!(tiers[0].eligible_player_ids, ids(&["a", "b"]));
    }

    #[test]
    fn test_everyone_folded_collapses_to_one_uncontested_tier() {
        let tiers = calculate_pot_tiers(&[
            contribution("a", 100, false),
            contribution("b", 40, false),
        ])
        .unwrap();
        assert_eq!(tiers.len(), 1);
        assert_eq!(tiers[0].amount, 140);
        assert!(tiers[0].eligible_player_ids.is_empty());
    }

    #[test]
    fn test_eligibility_is_monotonic() {
        let tiers = calculate_pot_tiers(&[
            contribution("a", 25, true),
            contribution("b", 75, true),
            contribution("c", 80, false),
            contribution("d", 150, true),
            contribution("e", 150, true),
            contribution("f", 10, false),
        ])
        .unwrap();
        for pair in tiers.windows(2) {
            assert!(pair[1]
                .eligible_player_ids
                .is_subset(&pair[0].eligible_player_ids));
        }
        assert_eq!(total(&tiers), 490);
    }

    #[test]
    fn test_zero_contributions() {
        let tiers = calculate_pot_tiers(&[contribution("a", 0, true)]).unwrap();
        assert!(tiers.is_empty());
        assert!(calculate_pot_tiers(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_negative_contribution_rejected() {
        let result = calculate_pot_tiers(&[contribution("a", -5, true)]);
        assert!(matches!(result, Err(ShowdownError::NegativeContribution(_))));
    }
}
