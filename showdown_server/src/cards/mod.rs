pub mod badugi;
pub mod high;
pub mod lowball;

use showdown_protocol::{Card, EvaluationResult, RankingFamily};
use std::cmp::Ordering;

pub const STANDARD_HAND_SIZE: usize = 5;

/// A comparison strategy for one ranking family.
///
/// `evaluate` returns `None` when the cards make no hand under the family,
/// which only happens for an empty hand or a non-qualifying eight-or-better
/// low. `compare` is a strict total order: greater is better.
pub trait Ranking {
    /// How many cards the family plays.
    fn hand_size(&self) -> usize;

    fn evaluate(&self, cards: &[Card]) -> Option<EvaluationResult>;

    fn compare(&self, a: &EvaluationResult, b: &EvaluationResult) -> Ordering {
        a.cmp(b)
    }
}

impl Ranking for RankingFamily {
    fn hand_size(&self) -> usize {
        match self {
            RankingFamily::Badugi | RankingFamily::Hidugi => badugi::BADUGI_HAND_SIZE,
            _ => STANDARD_HAND_SIZE,
        }
    }

    fn evaluate(&self, cards: &[Card]) -> Option<EvaluationResult> {
        match self {
            RankingFamily::High => high::evaluate(cards),
            RankingFamily::AceToFiveLow => lowball::evaluate_ace_to_five(cards),
            RankingFamily::DeuceToSevenLow => lowball::evaluate_deuce_to_seven(cards),
            RankingFamily::Badugi => badugi::evaluate(cards, badugi::Direction::Low),
            RankingFamily::Hidugi => badugi::evaluate(cards, badugi::Direction::High),
            RankingFamily::QualifyingLow => lowball::evaluate_qualifying_low(cards),
        }
    }
}
