use std::collections::HashSet;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::cards::{Card, Deck};
use crate::error::{PokerError, Result};
use crate::evaluator::evaluate;

pub const DEFAULT_TRIALS: u32 = 1000;

/// Trials handed to one rayon task in the parallel estimator.
const BATCH_SIZE: u32 = 250;

/// Upper bounds on one estimation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquityBudget {
    pub trials: u32,
    /// Wall-clock limit. At least one trial always runs.
    pub deadline: Option<Duration>,
}

impl EquityBudget {
    pub fn trials(trials: u32) -> Self {
        Self {
            trials,
            deadline: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EquityReport {
    pub wins: u32,
    pub trials_run: u32,
    pub win_rate: f64,
    pub elapsed: Duration,
}

/// Checks hole/board shape and uniqueness, returning every known card.
pub fn known_cards(hole: &[Card], board: &[Card]) -> Result<Vec<Card>> {
    if hole.len() != 2 {
        return Err(PokerError::WrongHoleCount(hole.len()));
    }
    if !matches!(board.len(), 0 | 3 | 4 | 5) {
        return Err(PokerError::InvalidBoardSize(board.len()));
    }
    let mut seen = HashSet::with_capacity(7);
    let mut known = Vec::with_capacity(7);
    for card in hole.iter().chain(board) {
        if !seen.insert(*card) {
            return Err(PokerError::DuplicateCard(*card));
        }
        known.push(*card);
    }
    Ok(known)
}

/// One showdown against a random opponent. Ties count as wins.
fn run_trial<R: Rng + ?Sized>(
    hole: &[Card],
    board: &[Card],
    unseen: &Deck,
    rng: &mut R,
) -> Result<bool> {
    let mut deck = unseen.clone();
    deck.shuffle(rng);

    let villain = deck.draw(2)?;
    let mut runout = board.to_vec();
    runout.extend(deck.draw(5 - board.len())?);

    let hero_cards: Vec<Card> = hole.iter().chain(&runout).copied().collect();
    let villain_cards: Vec<Card> = villain.iter().chain(&runout).copied().collect();

    Ok(evaluate(&hero_cards)? >= evaluate(&villain_cards)?)
}

/// Monte-Carlo win rate of `hole` against one uniformly random unseen hand.
pub fn estimate_win_rate<R: Rng + ?Sized>(
    hole: &[Card],
    board: &[Card],
    trials: u32,
    rng: &mut R,
) -> Result<f64> {
    estimate_with_budget(hole, board, EquityBudget::trials(trials), rng).map(|r| r.win_rate)
}

/// Runs up to `budget.trials` trials, stopping early once the deadline has passed.
pub fn estimate_with_budget<R: Rng + ?Sized>(
    hole: &[Card],
    board: &[Card],
    budget: EquityBudget,
    rng: &mut R,
) -> Result<EquityReport> {
    if budget.trials == 0 {
        return Err(PokerError::ZeroTrials);
    }
    let known = known_cards(hole, board)?;
    let unseen = Deck::excluding(&known);

    let started = Instant::now();
    let mut wins = 0u32;
    let mut trials_run = 0u32;
    while trials_run < budget.trials {
        if trials_run > 0
            && let Some(deadline) = budget.deadline
            && started.elapsed() >= deadline
        {
            break;
        }
        if run_trial(hole, board, &unseen, rng)? {
            wins += 1;
        }
        trials_run += 1;
    }

    let report = EquityReport {
        wins,
        trials_run,
        win_rate: wins as f64 / trials_run as f64,
        elapsed: started.elapsed(),
    };
    debug!(
        wins = report.wins,
        trials = report.trials_run,
        requested = budget.trials,
        elapsed_us = report.elapsed.as_micros() as u64,
        "equity estimated"
    );
    Ok(report)
}

fn batch_seed(seed: u64, batch: u32) -> u64 {
    seed ^ (batch as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Same contract as [`estimate_win_rate`], with trials split into batches across the
/// rayon pool. Each batch owns a generator derived from `seed`, so the result is
/// reproducible for a given seed regardless of scheduling.
pub fn estimate_win_rate_parallel(
    hole: &[Card],
    board: &[Card],
    trials: u32,
    seed: u64,
) -> Result<f64> {
    estimate_parallel(hole, board, EquityBudget::trials(trials), seed).map(|r| r.win_rate)
}

/// Parallel counterpart of [`estimate_with_budget`]. Every batch checks the deadline
/// before each trial; the first trial of batch 0 always runs. A run cut short by the
/// deadline is no longer reproducible from the seed alone.
pub fn estimate_parallel(
    hole: &[Card],
    board: &[Card],
    budget: EquityBudget,
    seed: u64,
) -> Result<EquityReport> {
    let trials = budget.trials;
    if trials == 0 {
        return Err(PokerError::ZeroTrials);
    }
    let known = known_cards(hole, board)?;
    let unseen = Deck::excluding(&known);
    let batches = trials.div_ceil(BATCH_SIZE);

    let started = Instant::now();
    let expired = || budget.deadline.is_some_and(|deadline| started.elapsed() >= deadline);
    let per_batch: Vec<(u32, u32)> = (0..batches)
        .into_par_iter()
        .map(|batch| -> Result<(u32, u32)> {
            let mut rng = StdRng::seed_from_u64(batch_seed(seed, batch));
            let count = BATCH_SIZE.min(trials - batch * BATCH_SIZE);
            let mut wins = 0u32;
            let mut run = 0u32;
            while run < count {
                if (batch > 0 || run > 0) && expired() {
                    break;
                }
                if run_trial(hole, board, &unseen, &mut rng)? {
                    wins += 1;
                }
                run += 1;
            }
            Ok((wins, run))
        })
        .collect::<Result<Vec<(u32, u32)>>>()?;

    let wins: u32 = per_batch.iter().map(|(wins, _)| wins).sum();
    let trials_run: u32 = per_batch.iter().map(|(_, run)| run).sum();
    let report = EquityReport {
        wins,
        trials_run,
        win_rate: wins as f64 / trials_run as f64,
        elapsed: started.elapsed(),
    };
    debug!(
        wins,
        trials = trials_run,
        requested = trials,
        batches,
        elapsed_us = report.elapsed.as_micros() as u64,
        "parallel equity estimated"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    #[test]
    fn shared_royal_flush_is_always_a_win() {
        // Every showdown ties on the board, and ties are scored as wins.
        let hole = parse_cards("2c 7d").unwrap();
        let board = parse_cards("As Ks Qs Js Ts").unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let rate = estimate_win_rate(&hole, &board, 200, &mut rng).unwrap();
        assert_eq!(rate, 1.0);
    }

    #[test]
    fn rejects_contract_violations() {
        let mut rng = StdRng::seed_from_u64(1);
        let hole = parse_cards("As Ah").unwrap();

        let one = parse_cards("As").unwrap();
        assert!(matches!(
            estimate_win_rate(&one, &[], 10, &mut rng),
            Err(PokerError::WrongHoleCount(1))
        ));

        let two_board = parse_cards("2c 3c").unwrap();
        assert!(matches!(
            estimate_win_rate(&hole, &two_board, 10, &mut rng),
            Err(PokerError::InvalidBoardSize(2))
        ));

        let clash = parse_cards("As 3c 4d").unwrap();
        assert!(matches!(
            estimate_win_rate(&hole, &clash, 10, &mut rng),
            Err(PokerError::DuplicateCard(_))
        ));

        assert!(matches!(
            estimate_win_rate(&hole, &[], 0, &mut rng),
            Err(PokerError::ZeroTrials)
        ));
    }

    #[test]
    fn expired_deadline_still_runs_one_trial() {
        let hole = parse_cards("As Ah").unwrap();
        let budget = EquityBudget {
            trials: 5_000,
            deadline: Some(Duration::ZERO),
        };
        let mut rng = StdRng::seed_from_u64(9);
        let report = estimate_with_budget(&hole, &[], budget, &mut rng).unwrap();
        assert_eq!(report.trials_run, 1);
        assert!(report.win_rate == 0.0 || report.win_rate == 1.0);
    }

    #[test]
    fn budget_without_deadline_runs_every_trial() {
        let hole = parse_cards("Kd Qd").unwrap();
        let board = parse_cards("2h 8c Jd").unwrap();
        let mut rng = StdRng::seed_from_u64(17);
        let report =
            estimate_with_budget(&hole, &board, EquityBudget::trials(64), &mut rng).unwrap();
        assert_eq!(report.trials_run, 64);
        assert!(report.wins <= 64);
        assert!((0.0..=1.0).contains(&report.win_rate));
    }

    #[test]
    fn parallel_estimate_is_reproducible_per_seed() {
        let hole = parse_cards("9s 9h").unwrap();
        let board = parse_cards("2c 5d Kh").unwrap();
        let a = estimate_win_rate_parallel(&hole, &board, 1_100, 77).unwrap();
        let b = estimate_win_rate_parallel(&hole, &board, 1_100, 77).unwrap();
        assert_eq!(a, b);
        assert!((0.0..=1.0).contains(&a));
    }

    #[test]
    fn parallel_run_stops_at_deadline() {
        let hole = parse_cards("Qs Jh").unwrap();
        let budget = EquityBudget {
            trials: 50_000,
            deadline: Some(Duration::ZERO),
        };
        let report = estimate_parallel(&hole, &[], budget, 3).unwrap();
        assert_eq!(report.trials_run, 1);
        assert!(report.wins <= 1);
    }

    #[test]
    fn batch_seeds_differ() {
        assert_ne!(batch_seed(1, 0), batch_seed(1, 1));
    }
}
