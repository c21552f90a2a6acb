use crate::errors::CardParseError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'c' | 'C' | '♣' => Some(Suit::Clubs),
            'd' | 'D' | '♦' => Some(Suit::Diamonds),
            'h' | 'H' | '♥' => Some(Suit::Hearts),
            's' | 'S' | '♠' => Some(Suit::Spades),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Suit::Clubs => 'c',
            Suit::Diamonds => 'd',
            Suit::Hearts => 'h',
            Suit::Spades => 's',
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Suit::Clubs => write!(f, "♣"),
            Suit::Diamonds => write!(f, "♦"),
            Suit::Hearts => write!(f, "♥"),
            Suit::Spades => write!(f, "♠"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            2 => Some(Rank::Two),
            3 => Some(Rank::Three),
            4 => Some(Rank::Four),
            5 => Some(Rank::Five),
            6 => Some(Rank::Six),
            7 => Some(Rank::Seven),
            8 => Some(Rank::Eight),
            9 => Some(Rank::Nine),
            10 => Some(Rank::Ten),
            11 => Some(Rank::Jack),
            12 => Some(Rank::Queen),
            13 => Some(Rank::King),
            14 => Some(Rank::Ace),
            _ => None,
        }
    }

    /// Value with the ace playing high (14).
    pub fn high_value(&self) -> u8 {
        *self as u8
    }

    /// Value with the ace playing low (1), as in ace-to-five lowball and badugi.
    pub fn low_value(&self) -> u8 {
        match self {
            Rank::Ace => 1,
            other => *other as u8,
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "10" | "T" | "t" => Some(Rank::Ten),
            "J" | "j" => Some(Rank::Jack),
            "Q" | "q" => Some(Rank::Queen),
            "K" | "k" => Some(Rank::King),
            "A" | "a" => Some(Rank::Ace),
            digit if digit.len() == 1 => digit.parse::<u8>().ok().and_then(Rank::from_u8),
            _ => None,
        }
    }

    fn token(&self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "T",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

/// Renders a card value for hand labels; 1 is the ace playing low.
pub fn value_label(value: u8) -> String {
    match value {
        1 | 14 => "A".to_string(),
        other => Rank::from_u8(other)
            .map(|r| r.to_string())
            .unwrap_or_else(|| "?".to_string()),
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rank::Two => write!(f, "2"),
            Rank::Three => write!(f, "3"),
            Rank::Four => write!(f, "4"),
            Rank::Five => write!(f, "5"),
            Rank::Six => write!(f, "6"),
            Rank::Seven => write!(f, "7"),
            Rank::Eight => write!(f, "8"),
            Rank::Nine => write!(f, "9"),
            Rank::Ten => write!(f, "10"),
            Rank::Jack => write!(f, "J"),
            Rank::Queen => write!(f, "Q"),
            Rank::King => write!(f, "K"),
            Rank::Ace => write!(f, "A"),
        }
    }
}

/// A single playing card. Serialized as its short token, e.g. `"Ah"` or `"Td"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Self { suit, rank }
    }

    /// Short ASCII token, the inverse of `FromStr`.
    pub fn token(&self) -> String {
        format!("{}{}", self.rank.token(), self.suit.letter())
    }
}

impl FromStr for Card {
    type Err = CardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let suit_char = token
            .chars()
            .last()
            .ok_or_else(|| CardParseError::Empty)?;
        let suit = Suit::from_char(suit_char)
            .ok_or_else(|| CardParseError::InvalidSuit(token.to_string()))?;
        let rank_part = &token[..token.len() - suit_char.len_utf8()];
        let rank = Rank::from_token(rank_part)
            .ok_or_else(|| CardParseError::InvalidRank(token.to_string()))?;
        Ok(Card::new(suit, rank))
    }
}

impl TryFrom<String> for Card {
    type Error = CardParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.token()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

/// Parses a whitespace- or comma-separated list of card tokens.
pub fn parse_cards(tokens: &str) -> Result<Vec<Card>, CardParseError> {
    tokens
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(str::parse)
        .collect()
}

/// The outcome of ranking one hand under one ranking family.
///
/// Every family encodes its result so that the greater value is the better
/// hand: lowball families store negated values. Two results compare by
/// `category_rank` first, then lexicographically by `tiebreak`. The display
/// name never participates in comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub category_rank: i32,
    pub tiebreak: Vec<i32>,
    pub display_name: String,
}

impl EvaluationResult {
    pub fn new(category_rank: i32, tiebreak: Vec<i32>, display_name: impl Into<String>) -> Self {
        Self {
            category_rank,
            tiebreak,
            display_name: display_name.into(),
        }
    }
}

impl PartialEq for EvaluationResult {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EvaluationResult {}

impl Ord for EvaluationResult {
    fn cmp(&self, other: &Self) -> Ordering {
        self.category_rank
            .cmp(&other.category_rank)
            .then_with(|| self.tiebreak.cmp(&other.tiebreak))
    }
}

impl PartialOrd for EvaluationResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
