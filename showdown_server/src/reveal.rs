use crate::showdown::PlayerEvaluation;
use showdown_protocol::{EvaluationResult, RevealEntry, MUCKED_LABEL};
use std::collections::BTreeSet;

const NO_HAND_LABEL: &str = "No hand";

/// Seat order in which hands are revealed.
///
/// Starts at the last aggressor's seat when someone bet or raised on the
/// final round, otherwise at the first seat clockwise of the button, and
/// proceeds clockwise. Hand strength plays no part.
pub fn showdown_order(
    seats: &[(String, usize)],
    dealer_seat: usize,
    last_aggressor_seat: Option<usize>,
) -> Vec<String> {
    let table_size = seats
        .iter()
        .map(|(_, seat)| *seat)
        .chain(std::iter::once(dealer_seat))
        .chain(last_aggressor_seat)
        .max()
        .unwrap_or(0)
        + 1;
    let start = last_aggressor_seat.unwrap_or((dealer_seat + 1) % table_size);

    let mut ordered: Vec<&(String, usize)> = seats.iter().collect();
    ordered.sort_by_key(|(id, seat)| ((seat + table_size - start) % table_size, id.clone()));
    ordered.into_iter().map(|(id, _)| id.clone()).collect()
}

fn revealed(player: &PlayerEvaluation, split: bool) -> RevealEntry {
    let label = |family: usize| {
        player
            .hands
            .get(family)
            .and_then(|h| h.as_ref())
            .map(|h| h.result.display_name.clone())
    };
    RevealEntry {
        player_id: player.player_id.clone(),
        hand: Some(player.hole_cards.clone()),
        hand_rank_label: label(0).unwrap_or_else(|| NO_HAND_LABEL.to_string()),
        low_hand_label: if split { label(1) } else { None },
        is_mucked: false,
    }
}

fn mucked(player: &PlayerEvaluation) -> RevealEntry {
    RevealEntry {
        player_id: player.player_id.clone(),
        hand: None,
        hand_rank_label: MUCKED_LABEL.to_string(),
        low_hand_label: None,
        is_mucked: true,
    }
}

/// Decides show or muck for every contesting hand, in showdown order.
///
/// The first hand always shows. With one family a later hand shows only if
/// it ties or beats the best hand shown so far. In split games a hand shows
/// if it wins, or ties a winner, on either side. An all-in this hand forces
/// every hand face up.
///
/// `evaluations` must already be in showdown order; `winners[f]` holds the
/// ids that won chips under family `f`.
pub fn reveal_hands(
    evaluations: &[PlayerEvaluation],
    winners: &[BTreeSet<String>],
    split: bool,
    any_all_in: bool,
) -> Vec<RevealEntry> {
    let winning_results: Vec<Vec<&EvaluationResult>> = winners
        .iter()
        .enumerate()
        .map(|(family, ids)| {
            evaluations
                .iter()
                .filter(|e| ids.contains(&e.player_id))
                .filter_map(|e| e.result(family))
                .collect()
        })
        .collect();

    let mut best_shown: Option<&EvaluationResult> = None;
    let mut entries = Vec::with_capacity(evaluations.len());

    for (position, player) in evaluations.iter().enumerate() {
        let show = if position == 0 || any_all_in {
            true
        } else if split {
            winning_results.iter().enumerate().any(|(family, results)| {
                winners[family].contains(&player.player_id)
                    || player
                        .result(family)
                        .is_some_and(|r| results.iter().any(|w| *w == r))
            })
        } else {
            match (player.result(0), best_shown) {
                (Some(result), Some(best)) => result >= best,
                (Some(_), None) => true,
                (None, _) => false,
            }
        };

        if show {
            if let Some(result) = player.result(0) {
                if best_shown.map_or(true, |best| result > best) {
                    best_shown = Some(result);
                }
            }
            entries.push(revealed(player, split));
        } else {
            entries.push(mucked(player));
        }
    }
    entries
}
