//! Seven-card hand classification.
//!
//! The evaluator never enumerates 5-card subsets. It builds a rank frequency table
//! and a suit frequency table once, then reads every category off those tables.
//! Scores are only comparable inside one category; two hands with equal category
//! and equal score compare as equal even when their kickers differ.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank, Suit};
use crate::error::{PokerError, Result};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl HandCategory {
    pub const ALL: [HandCategory; 9] = [
        HandCategory::HighCard,
        HandCategory::OnePair,
        HandCategory::TwoPair,
        HandCategory::ThreeOfAKind,
        HandCategory::Straight,
        HandCategory::Flush,
        HandCategory::FullHouse,
        HandCategory::FourOfAKind,
        HandCategory::StraightFlush,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HandCategory::HighCard => "High Card",
            HandCategory::OnePair => "One Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
        }
    }
}

impl Display for HandCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Category plus a category-scoped tie-break score. Field order gives the derived
/// ordering: category first, score second.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Evaluation {
    pub category: HandCategory,
    pub score: u32,
}

impl Evaluation {
    pub fn new(category: HandCategory, score: u32) -> Self {
        Self { category, score }
    }
}

/// Number of cards held per rank value, indexed by `Rank::value()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RankCounts([u8; 15]);

impl RankCounts {
    pub fn from_cards(cards: &[Card]) -> Self {
        let mut counts = [0u8; 15];
        for card in cards {
            counts[card.rank_value() as usize] += 1;
        }
        Self(counts)
    }

    /// Rank values holding at least `min` cards, strongest first.
    pub fn at_least(&self, min: u8) -> impl Iterator<Item = u8> + '_ {
        (2u8..=14).rev().filter(move |&v| self.0[v as usize] >= min)
    }

    /// Rank values holding exactly `n` cards, strongest first.
    pub fn exactly(&self, n: u8) -> impl Iterator<Item = u8> + '_ {
        (2u8..=14).rev().filter(move |&v| self.0[v as usize] == n)
    }

    /// Bit `v` is set when rank value `v` is present; bit 1 mirrors the Ace.
    pub fn rank_mask(&self) -> u16 {
        let mut mask = 0u16;
        for v in self.at_least(1) {
            mask |= 1 << v;
        }
        if mask & (1 << Rank::Ace.value()) != 0 {
            mask |= 1 << 1;
        }
        mask
    }
}

/// Number of cards held per suit, indexed by `Suit::index()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SuitCounts([u8; 4]);

impl SuitCounts {
    pub fn from_cards(cards: &[Card]) -> Self {
        let mut counts = [0u8; 4];
        for card in cards {
            counts[card.suit.index()] += 1;
        }
        Self(counts)
    }

    pub fn count(&self, suit: Suit) -> u8 {
        self.0[suit.index()]
    }

    /// The suit with five or more cards. Seven cards cannot hold two such suits.
    pub fn flush_suit(&self) -> Option<Suit> {
        Suit::ALL.into_iter().find(|&s| self.count(s) >= 5)
    }
}

/// High rank of the best five-in-a-row run in `mask`, scanning Ace-high down to the wheel.
pub fn straight_high(mask: u16) -> Option<u8> {
    (5u8..=14).rev().find(|&high| {
        let run = 0b1_1111u16 << (high - 4);
        mask & run == run
    })
}

/// Result of the pure count-based categories (everything except straights and flushes).
pub fn grouped_category(counts: &RankCounts) -> Evaluation {
    if let Some(quad) = counts.at_least(4).next() {
        return Evaluation::new(HandCategory::FourOfAKind, quad as u32 * 100);
    }

    if let Some(trips) = counts.at_least(3).next() {
        if let Some(pair) = counts.at_least(2).find(|&v| v != trips) {
            return Evaluation::new(HandCategory::FullHouse, trips as u32 * 100 + pair as u32);
        }
        return Evaluation::new(HandCategory::ThreeOfAKind, trips as u32);
    }

    let mut pairs = counts.exactly(2);
    match (pairs.next(), pairs.next()) {
        (Some(first), Some(second)) => {
            Evaluation::new(HandCategory::TwoPair, first as u32 * 100 + second as u32)
        }
        (Some(pair), None) => Evaluation::new(HandCategory::OnePair, pair as u32),
        _ => Evaluation::new(
            HandCategory::HighCard,
            counts.at_least(1).next().unwrap_or(0) as u32,
        ),
    }
}

fn check_cards(cards: &[Card]) -> Result<()> {
    if !(5..=7).contains(&cards.len()) {
        return Err(PokerError::InvalidCardCount(cards.len()));
    }
    let mut seen = 0u64;
    for card in cards {
        let bit = 1u64 << card.index();
        if seen & bit != 0 {
            return Err(PokerError::DuplicateCard(*card));
        }
        seen |= bit;
    }
    Ok(())
}

/// Classifies the best five-card hand among 5 to 7 distinct cards.
pub fn evaluate(cards: &[Card]) -> Result<Evaluation> {
    check_cards(cards)?;

    let ranks = RankCounts::from_cards(cards);
    let suits = SuitCounts::from_cards(cards);
    let flush_suit = suits.flush_suit();

    let flush_ranks = flush_suit.map(|suit| {
        let suited: Vec<Card> = cards.iter().copied().filter(|c| c.suit == suit).collect();
        RankCounts::from_cards(&suited)
    });

    if let Some(suited) = &flush_ranks
        && let Some(high) = straight_high(suited.rank_mask())
    {
        return Ok(Evaluation::new(HandCategory::StraightFlush, high as u32));
    }

    let grouped = grouped_category(&ranks);
    if grouped.category >= HandCategory::FullHouse {
        return Ok(grouped);
    }

    if let Some(suited) = &flush_ranks {
        let top = suited.at_least(1).next().unwrap_or(0);
        return Ok(Evaluation::new(HandCategory::Flush, top as u32));
    }

    if let Some(high) = straight_high(ranks.rank_mask()) {
        return Ok(Evaluation::new(HandCategory::Straight, high as u32));
    }

    Ok(grouped)
}

/// Evaluates two players over a shared board and reports which one holds the better hand.
pub fn compare_hands(first: &[Card], second: &[Card], board: &[Card]) -> Result<Ordering> {
    let first_cards: Vec<Card> = first.iter().chain(board).copied().collect();
    let second_cards: Vec<Card> = second.iter().chain(board).copied().collect();
    Ok(evaluate(&first_cards)?.cmp(&evaluate(&second_cards)?))
}
