use showdown_protocol::{value_label, Card, EvaluationResult, Rank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HandRank {
    HighCard = 1,
    Pair = 2,
    TwoPair = 3,
    ThreeOfAKind = 4,
    Straight = 5,
    Flush = 6,
    FullHouse = 7,
    FourOfAKind = 8,
    StraightFlush = 9,
    RoyalFlush = 10,
}

/// A made five-card hand in high-poker terms, before it is encoded for a family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MadeHand {
    pub rank: HandRank,
    /// Group values, most significant first.
    pub tiebreakers: Vec<u8>,
    pub description: String,
}

/// Groups values by multiplicity: larger groups first, then higher values.
pub fn group_values(values: &[u8]) -> Vec<(usize, u8)> {
    let mut groups: Vec<(usize, u8)> = Vec::new();
    for &value in values {
        match groups.iter_mut().find(|(_, v)| *v == value) {
            Some(group) => group.0 += 1,
            None => groups.push((1, value)),
        }
    }
    groups.sort_by(|a, b| b.cmp(a));
    groups
}

/// Ranks cards by their multiplicity pattern alone.
pub fn multiplicity_rank(groups: &[(usize, u8)]) -> HandRank {
    match (groups.first().map(|g| g.0), groups.get(1).map(|g| g.0)) {
        (Some(4), _) => HandRank::FourOfAKind,
        (Some(3), Some(2)) => HandRank::FullHouse,
        (Some(3), _) => HandRank::ThreeOfAKind,
        (Some(2), Some(2)) => HandRank::TwoPair,
        (Some(2), _) => HandRank::Pair,
        _ => HandRank::HighCard,
    }
}

/// Labels a paired hand from its groups.
pub fn multiplicity_description(rank: HandRank, groups: &[(usize, u8)]) -> String {
    let first = groups.first().map(|g| value_label(g.1)).unwrap_or_default();
    let second = groups.get(1).map(|g| value_label(g.1)).unwrap_or_default();
    match rank {
        HandRank::FourOfAKind => format!("Four of a Kind, {}", first),
        HandRank::FullHouse => format!("Full House, {} over {}", first, second),
        HandRank::ThreeOfAKind => format!("Three of a Kind, {}", first),
        HandRank::TwoPair => format!("Two Pair, {} and {}", first, second),
        HandRank::Pair => format!("Pair of {}", first),
        _ => format!("High Card, {}", first),
    }
}

fn is_flush(cards: &[Card]) -> bool {
    cards.len() == 5 && cards.iter().all(|c| c.suit == cards[0].suit)
}

/// Returns the straight's high card. With `wheel` set, A-2-3-4-5 counts as a 5-high straight.
fn straight_high(values: &[u8], wheel: bool) -> Option<u8> {
    if values.len() != 5 {
        return None;
    }
    let mut ranks = values.to_vec();
    ranks.sort_unstable();
    ranks.dedup();
    if ranks.len() != 5 {
        return None;
    }
    if ranks[4] - ranks[0] == 4 {
        return Some(ranks[4]);
    }
    if wheel && ranks == [2, 3, 4, 5, 14] {
        return Some(5);
    }
    None
}

fn straight_description(high: u8) -> String {
    if high == 5 {
        "5-4-3-2-A (Wheel)".to_string()
    } else {
        format!("{} high", value_label(high))
    }
}

/// Classifies up to five cards with the ace playing high.
///
/// `wheel` controls whether A-2-3-4-5 is a straight; deuce-to-seven lowball
/// plays the ace strictly high, so it passes `false`.
pub fn classify(cards: &[Card], wheel: bool) -> MadeHand {
    let values: Vec<u8> = cards.iter().map(|c| c.rank.high_value()).collect();
    let groups = group_values(&values);
    let flush = is_flush(cards);
    let straight = straight_high(&values, wheel);

    if let Some(high) = straight {
        if flush {
            if high == Rank::Ace as u8 {
                return MadeHand {
                    rank: HandRank::RoyalFlush,
                    tiebreakers: vec![high],
                    description: "Royal Flush".to_string(),
                };
            }
            return MadeHand {
                rank: HandRank::StraightFlush,
                tiebreakers: vec![high],
                description: format!("Straight Flush, {}", straight_description(high)),
            };
        }
    }

    let rank = multiplicity_rank(&groups);
    let tiebreakers: Vec<u8> = groups.iter().map(|g| g.1).collect();

    if rank >= HandRank::FullHouse {
        let description = multiplicity_description(rank, &groups);
        return MadeHand {
            rank,
            tiebreakers,
            description,
        };
    }

    if flush {
        let top = tiebreakers.first().copied().unwrap_or(0);
        return MadeHand {
            rank: HandRank::Flush,
            tiebreakers,
            description: format!("Flush, {}", value_label(top)),
        };
    }

    if let Some(high) = straight {
        return MadeHand {
            rank: HandRank::Straight,
            tiebreakers: vec![high],
            description: format!("Straight, {}", straight_description(high)),
        };
    }

    let description = multiplicity_description(rank, &groups);
    MadeHand {
        rank,
        tiebreakers,
        description,
    }
}

/// Standard high-poker ranking.
pub fn evaluate(cards: &[Card]) -> Option<EvaluationResult> {
    if cards.is_empty() {
        return None;
    }
    let made = classify(cards, true);
    Some(EvaluationResult::new(
        made.rank as i32,
        made.tiebreakers.iter().map(|&v| v as i32).collect(),
        made.description,
    ))
}
