//! Lowball families. Results are stored negated so that the better (lower)
//! hand still compares greater.

use super::high::{classify, group_values, multiplicity_description, multiplicity_rank, HandRank};
use showdown_protocol::{value_label, Card, EvaluationResult};

/// Highest value a card may have in an eight-or-better low.
pub const QUALIFYING_LOW_MAX: u8 = 8;

fn low_description(values_desc: &[u8]) -> String {
    let parts: Vec<String> = values_desc.iter().map(|&v| value_label(v)).collect();
    format!("{} low", parts.join("-"))
}

fn negate(values: &[u8]) -> Vec<i32> {
    values.iter().map(|&v| -(v as i32)).collect()
}

/// Ace-to-five lowball (razz): the ace plays as 1, straights and flushes are
/// ignored, pairs count against the hand.
pub fn evaluate_ace_to_five(cards: &[Card]) -> Option<EvaluationResult> {
    if cards.is_empty() {
        return None;
    }
    let values: Vec<u8> = cards.iter().map(|c| c.rank.low_value()).collect();
    let groups = group_values(&values);
    let rank = multiplicity_rank(&groups);
    let group_order: Vec<u8> = groups.iter().map(|g| g.1).collect();

    let description = if rank == HandRank::HighCard {
        low_description(&group_order)
    } else {
        multiplicity_description(rank, &groups)
    };

    Some(EvaluationResult::new(
        -(rank as i32),
        negate(&group_order),
        description,
    ))
}

/// Deuce-to-seven lowball: the ace is always high, straights and flushes
/// are made hands that count against the player.
pub fn evaluate_deuce_to_seven(cards: &[Card]) -> Option<EvaluationResult> {
    if cards.is_empty() {
        return None;
    }
    let made = classify(cards, false);
    let description = if made.rank == HandRank::HighCard {
        low_description(&made.tiebreakers)
    } else {
        made.description
    };

    Some(EvaluationResult::new(
        -(made.rank as i32),
        negate(&made.tiebreakers),
        description,
    ))
}

/// Eight-or-better low: five distinct ranks, all eight or lower with the ace
/// playing low. Anything else has no low at all.
pub fn evaluate_qualifying_low(cards: &[Card]) -> Option<EvaluationResult> {
    if cards.len() != 5 {
        return None;
    }
    let mut values: Vec<u8> = cards.iter().map(|c| c.rank.low_value()).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));

    let distinct = values.windows(2).all(|w| w[0] != w[1]);
    if !distinct || values[0] > QUALIFYING_LOW_MAX {
        return None;
    }

    Some(EvaluationResult::new(
        0,
        negate(&values),
        low_description(&values),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use showdown_protocol::parse_cards;

    fn a5(tokens: &str) -> EvaluationResult {
        evaluate_ace_to_five(&parse_cards(tokens).unwrap()).unwrap()
    }

    fn d27(tokens: &str) -> EvaluationResult {
        evaluate_deuce_to_seven(&parse_cards(tokens).unwrap()).unwrap()
    }

    fn eight(tokens: &str) -> Option<EvaluationResult> {
        evaluate_qualifying_low(&parse_cards(tokens).unwrap())
    }

    #[test]
    fn test_ace_to_five_wheel_is_best() {
        let wheel = a5("Ah 2d 3c 4s 5h");
        assert_eq!(wheel.display_name, "5-4-3-2-A low");
        assert!(wheel > a5("Ah 2d 3c 4s 6h"));
        assert!(wheel > a5("2h 3d 4c 5s 6h"));
    }

    #[test]
    fn test_ace_to_five_ignores_flushes_and_straights() {
        assert_eq!(a5("Ah 2h 3h 4h 5h"), a5("Ah 2d 3c 4s 5h"));
    }

    #[test]
    fn test_ace_to_five_compares_from_the_top() {
        assert!(a5("8h 5d 4c 3s 2h") > a5("8h 6d 4c 3s 2h"));
        assert!(a5("7h 6d 5c 4s 3h") > a5("8h 4d 3c 2s Ah"));
    }

    #[test]
    fn test_ace_to_five_pair_loses_to_any_no_pair() {
        let pair = a5("Ah Ad 2c 3s 4h");
        assert_eq!(pair.display_name, "Pair of A");
        assert!(a5("Kh Qd Jc 9s 8h") > pair);
    }

    #[test]
    fn test_deuce_to_seven_best_hand() {
        let number_one = d27("7h 5d 4c 3s 2h");
        assert_eq!(number_one.display_name, "7-5-4-3-2 low");
        assert!(number_one > d27("7h 6d 4c 3s 2h"));
        assert!(number_one > d27("8h 5d 4c 3s 2h"));
    }

    #[test]
    fn test_deuce_to_seven_ace_plays_high() {
        let ace_low_attempt = d27("Ah 2d 3c 4s 5h");
        assert!(d27("Kh 9d 7c 4s 2h") > ace_low_attempt);
    }

    #[test]
    fn test_deuce_to_seven_straights_and_flushes_are_bad() {
        let straight = d27("3h 4d 5c 6s 7h");
        let flush = d27("7h 5h 4h 3h 2h");
        let king_high = d27("Kh Qd Jc 9s 8h");
        assert!(king_high > straight);
        assert!(king_high > flush);
        assert!(straight > flush);
        assert!(d27("2h 2d 5c 6s 7h") > straight);
    }

    #[test]
    fn test_deuce_to_seven_no_pair_beats_pair() {
        assert!(d27("Ah Kd Qc Js 9h") > d27("2h 2d 3c 4s 5h"));
    }

    #[test]
    fn test_qualifying_low() {
        let wheel = eight("Ah 2d 3c 4s 5h").unwrap();
        let eight_low = eight("8h 6d 4c 3s 2h").unwrap();
        assert!(wheel > eight_low);
        assert_eq!(eight_low.display_name, "8-6-4-3-2 low");
    }

    #[test]
    fn test_low_hand_no_qualifying() {
        assert!(eight("9h 6d 4c 3s 2h").is_none());
        assert!(eight("Kh Qd Jc Ts 9h").is_none());
    }

    #[test]
    fn test_low_hand_unique_ranks_required() {
        assert!(eight("Ah Ad 3c 4s 5h").is_none());
        assert!(eight("Ah 2d 3c 4s").is_none());
    }
}
