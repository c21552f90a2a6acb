use crate::cards::Ranking;
use log::debug;
use serde::{Deserialize, Serialize};
use showdown_protocol::{Card, EvaluationResult};

/// How a player's playable hand is drawn from hole and board cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Any cards from hole and board combined.
    Free,
    /// Exactly `hole` hole cards and `board` board cards (Omaha uses 2 and 3).
    HoleAndBoard { hole: usize, board: usize },
}

impl SelectionMode {
    pub const OMAHA: SelectionMode = SelectionMode::HoleAndBoard { hole: 2, board: 3 };
}

/// The winning combination for one player under one family.
#[derive(Debug, Clone, PartialEq)]
pub struct BestHand {
    pub cards: Vec<Card>,
    pub result: EvaluationResult,
    pub hole_cards: Vec<Card>,
    pub board_cards: Vec<Card>,
}

/// Iterates every k-subset of `0..n` as a sorted index array, in
/// lexicographic order.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

pub fn combinations(n: usize, k: usize) -> Combinations {
    Combinations {
        n,
        indices: (0..k).collect(),
        done: k > n,
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();
        let k = self.indices.len();

        // Find the rightmost index that can still move right.
        let mut i = k;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.indices[i] < self.n - k + i {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                break;
            }
        }
        Some(current)
    }
}

fn consider<R: Ranking + ?Sized>(
    family: &R,
    best: &mut Option<BestHand>,
    hole_cards: Vec<Card>,
    board_cards: Vec<Card>,
) {
    let cards: Vec<Card> = hole_cards.iter().chain(board_cards.iter()).copied().collect();
    let Some(result) = family.evaluate(&cards) else {
        return;
    };
    let better = match best {
        Some(current) => family.compare(&result, &current.result).is_gt(),
        None => true,
    };
    if better {
        *best = Some(BestHand {
            cards,
            result,
            hole_cards,
            board_cards,
        });
    }
}

fn pick(cards: &[Card], indices: &[usize]) -> Vec<Card> {
    indices.iter().map(|&i| cards[i]).collect()
}

fn select_free<R: Ranking + ?Sized>(family: &R, hole: &[Card], board: &[Card]) -> Option<BestHand> {
    let mut best = None;
    let pool_size = hole.len() + board.len();
    let k = family.hand_size();

    if pool_size <= k {
        consider(family, &mut best, hole.to_vec(), board.to_vec());
        return best;
    }

    for indices in combinations(pool_size, k) {
        let hole_part: Vec<Card> = indices
            .iter()
            .filter(|&&i| i < hole.len())
            .map(|&i| hole[i])
            .collect();
        let board_part: Vec<Card> = indices
            .iter()
            .filter(|&&i| i >= hole.len())
            .map(|&i| board[i - hole.len()])
            .collect();
        consider(family, &mut best, hole_part, board_part);
    }
    best
}

fn select_constrained<R: Ranking + ?Sized>(
    family: &R,
    hole: &[Card],
    board: &[Card],
    hole_count: usize,
    board_count: usize,
) -> Option<BestHand> {
    let mut best = None;
    for hole_indices in combinations(hole.len(), hole_count) {
        for board_indices in combinations(board.len(), board_count) {
            consider(
                family,
                &mut best,
                pick(hole, &hole_indices),
                pick(board, &board_indices),
            );
        }
    }
    best
}

/// Returns the best hand a player can make under `family`, or `None` when no
/// combination makes a hand (an empty hand, or no qualifying low).
///
/// Ties between combinations keep the first one enumerated.
pub fn select_best<R: Ranking + ?Sized>(
    family: &R,
    mode: SelectionMode,
    hole: &[Card],
    board: &[Card],
) -> Option<BestHand> {
    match mode {
        SelectionMode::Free => select_free(family, hole, board),
        SelectionMode::HoleAndBoard {
            hole: hole_count,
            board: board_count,
        } => {
            if hole.len() < hole_count || board.len() < board_count {
                debug!(
                    "Constrained selection needs {}+{} cards, have {}+{}; using free choice",
                    hole_count,
                    board_count,
                    hole.len(),
                    board.len()
                );
                return select_free(family, hole, board);
            }
            select_constrained(family, hole, board, hole_count, board_count)
        }
    }
}
