use showdown_protocol::{value_label, Card, EvaluationResult};

pub const BADUGI_HAND_SIZE: usize = 4;

/// Which way card values count once the cardinality ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Badugi: ace plays low and lower values win.
    Low,
    /// Hidugi: ace plays high and higher values win.
    High,
}

fn is_rainbow(cards: &[Card]) -> bool {
    cards.iter().enumerate().all(|(i, a)| {
        cards[i + 1..]
            .iter()
            .all(|b| a.suit != b.suit && a.rank != b.rank)
    })
}

fn score(cards: &[Card], direction: Direction) -> EvaluationResult {
    let mut values: Vec<u8> = cards
        .iter()
        .map(|c| match direction {
            Direction::Low => c.rank.low_value(),
            Direction::High => c.rank.high_value(),
        })
        .collect();
    values.sort_unstable_by(|a, b| b.cmp(a));

    let tiebreak = values
        .iter()
        .map(|&v| match direction {
            Direction::Low => -(v as i32),
            Direction::High => v as i32,
        })
        .collect();
    let name = match direction {
        Direction::Low => "Badugi",
        Direction::High => "Hidugi",
    };
    let labels: Vec<String> = values.iter().map(|&v| value_label(v)).collect();

    EvaluationResult::new(
        values.len() as i32,
        tiebreak,
        format!("{}-card {}, {}", values.len(), name, labels.join("-")),
    )
}

/// Finds the best uniquely-suited, uniquely-ranked subset of the held cards.
///
/// More cards always win; equal counts compare from the highest value down.
/// Every subset is scored, so a pair of aces in different suits never costs
/// the hand a card it could otherwise keep.
pub fn evaluate(cards: &[Card], direction: Direction) -> Option<EvaluationResult> {
    if cards.is_empty() {
        return None;
    }

    let mut best: Option<EvaluationResult> = None;
    let mut subset = Vec::with_capacity(cards.len());
    for mask in 1u32..(1 << cards.len()) {
        subset.clear();
        subset.extend(
            cards
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, c)| *c),
        );
        if subset.len() > BADUGI_HAND_SIZE || !is_rainbow(&subset) {
            continue;
        }
        let candidate = score(&subset, direction);
        if best.as_ref().map_or(true, |b| candidate > *b) {
            best = Some(candidate);
        }
    }
    best
}
