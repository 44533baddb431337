use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info, warn};

use crate::cards::Card;
use crate::config::AdvisorConfig;
use crate::equity::{EquityReport, estimate_parallel, estimate_with_budget};
use crate::error::Result;
use crate::evaluator::{Evaluation, evaluate};
use crate::policy::{Decision, DecisionInput, decide_with_win_rate};

/// Entry point for the surrounding game: owns the configuration and the single
/// generator every equity run and randomized decision draws from.
pub struct Advisor {
    config: AdvisorConfig,
    seed: u64,
    rng: StdRng,
}

impl Advisor {
    pub fn new(config: AdvisorConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        info!(
            seed,
            parallel = config.parallel,
            trials = config.policy.trials,
            "advisor seeded"
        );
        if config.parallel && config.deadline_ms.is_some() {
            warn!(
                deadline_ms = ?config.deadline_ms,
                "deadline applies to parallel estimates; runs it cuts short are not replayable"
            );
        }
        Self {
            config,
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(AdvisorConfig {
            seed: Some(seed),
            ..AdvisorConfig::default()
        })
    }

    /// The seed actually in use, so a run can be replayed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn evaluate(&self, cards: &[Card]) -> Result<Evaluation> {
        evaluate(cards)
    }

    /// Equity run under the configured budget, or `trials` when given. Either way the
    /// trial count is capped at `max_trials`.
    pub fn estimate(
        &mut self,
        hole: &[Card],
        board: &[Card],
        trials: Option<u32>,
    ) -> Result<EquityReport> {
        let mut budget = self.config.budget();
        if let Some(trials) = trials {
            budget.trials = trials.min(self.config.max_trials);
            if budget.trials < trials {
                debug!(requested = trials, cap = budget.trials, "trial request capped");
            }
        }

        if self.config.parallel {
            let seed = self.rng.next_u64();
            return estimate_parallel(hole, board, budget, seed);
        }
        estimate_with_budget(hole, board, budget, &mut self.rng)
    }

    pub fn estimate_win_rate(&mut self, hole: &[Card], board: &[Card]) -> Result<f64> {
        self.estimate(hole, board, None).map(|report| report.win_rate)
    }

    pub fn decide(&mut self, input: &DecisionInput) -> Result<Decision> {
        let win_rate = self.estimate_win_rate(&input.hole, &input.board)?;
        Ok(decide_with_win_rate(
            win_rate,
            input.pot,
            input.to_call,
            &self.config.policy,
            &mut self.rng,
        ))
    }
}
