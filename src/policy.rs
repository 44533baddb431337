//! Turns an equity estimate plus pot odds into a betting action.
//!
//! The decision table is an ordered list of [`Rule`]s; the first one that matches
//! picks the action. Two rules are randomized (value raises and bluffs) and take
//! their uniform draw from the caller's generator, only when they are reached.

use std::fmt::{Display, Formatter};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cards::Card;
use crate::equity::{DEFAULT_TRIALS, estimate_win_rate};
use crate::error::Result;

pub const DEFAULT_RAISE_AMOUNT: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Fold,
    Check,
    Call,
    Raise,
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Action::Fold => "FOLD",
            Action::Check => "CHECK",
            Action::Call => "CALL",
            Action::Raise => "RAISE",
        })
    }
}

/// One row of the decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Win rate above the strong threshold: raise.
    Strong,
    /// Priced in and above the value threshold: raise on a coin flip.
    ValueRaise,
    /// Priced in with nothing to call: check.
    FreeCheck,
    /// Priced in: call.
    Call,
    /// Priced out but nothing to call: check rather than fold.
    CheckBehind,
    /// Priced out: occasional bluff raise.
    Bluff,
    Fold,
}

impl Rule {
    /// Evaluation order of the table.
    pub const ALL: [Rule; 7] = [
        Rule::Strong,
        Rule::ValueRaise,
        Rule::FreeCheck,
        Rule::Call,
        Rule::CheckBehind,
        Rule::Bluff,
        Rule::Fold,
    ];

    fn matches<R: Rng + ?Sized>(self, spot: &Spot, config: &PolicyConfig, rng: &mut R) -> bool {
        match self {
            Rule::Strong => spot.win_rate > config.strong_threshold,
            Rule::ValueRaise => {
                spot.priced_in()
                    && spot.win_rate > config.value_threshold
                    && roll(rng) < config.value_raise_frequency
            }
            Rule::FreeCheck => spot.priced_in() && spot.to_call == 0,
            Rule::Call => spot.priced_in(),
            Rule::CheckBehind => spot.to_call == 0,
            Rule::Bluff => roll(rng) < config.bluff_frequency,
            Rule::Fold => true,
        }
    }

    fn action(self) -> Action {
        match self {
            Rule::Strong | Rule::ValueRaise | Rule::Bluff => Action::Raise,
            Rule::FreeCheck | Rule::CheckBehind => Action::Check,
            Rule::Call => Action::Call,
            Rule::Fold => Action::Fold,
        }
    }
}

fn roll<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(0.0..1.0)
}

#[derive(Debug, Clone, Copy)]
struct Spot {
    win_rate: f64,
    required_win_rate: f64,
    to_call: u64,
}

impl Spot {
    fn priced_in(&self) -> bool {
        self.win_rate >= self.required_win_rate
    }
}

/// Thresholds and frequencies of the decision table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Trials per equity estimate.
    pub trials: u32,
    /// Fixed raise size, independent of pot and street.
    pub raise_amount: u64,
    pub strong_threshold: f64,
    pub value_threshold: f64,
    pub value_raise_frequency: f64,
    pub bluff_frequency: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            raise_amount: DEFAULT_RAISE_AMOUNT,
            strong_threshold: 0.8,
            value_threshold: 0.6,
            value_raise_frequency: 0.5,
            bluff_frequency: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionInput {
    pub hole: Vec<Card>,
    #[serde(default)]
    pub board: Vec<Card>,
    pub pot: u64,
    pub to_call: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: Action,
    pub amount: u64,
    pub win_rate: f64,
    pub required_win_rate: f64,
    pub rule: Rule,
}

/// Break-even win rate for calling `to_call` into `pot`. Checking requires none.
pub fn required_win_rate(pot: u64, to_call: u64) -> f64 {
    if to_call == 0 {
        0.0
    } else {
        to_call as f64 / (pot as f64 + to_call as f64)
    }
}

/// Applies the decision table to an already known win rate.
pub fn decide_with_win_rate<R: Rng + ?Sized>(
    win_rate: f64,
    pot: u64,
    to_call: u64,
    config: &PolicyConfig,
    rng: &mut R,
) -> Decision {
    let spot = Spot {
        win_rate,
        required_win_rate: required_win_rate(pot, to_call),
        to_call,
    };
    let rule = Rule::ALL
        .into_iter()
        .find(|rule| rule.matches(&spot, config, rng))
        .unwrap_or(Rule::Fold);
    let action = rule.action();
    let amount = match action {
        Action::Raise => config.raise_amount,
        Action::Call => to_call,
        Action::Fold | Action::Check => 0,
    };

    debug!(
        win_rate,
        required = spot.required_win_rate,
        pot,
        to_call,
        ?rule,
        %action,
        amount,
        "decision made"
    );
    Decision {
        action,
        amount,
        win_rate,
        required_win_rate: spot.required_win_rate,
        rule,
    }
}

/// Estimates equity with `config.trials` trials, then applies the decision table.
pub fn decide<R: Rng + ?Sized>(
    input: &DecisionInput,
    config: &PolicyConfig,
    rng: &mut R,
) -> Result<Decision> {
    let win_rate = estimate_win_rate(&input.hole, &input.board, config.trials, rng)?;
    Ok(decide_with_win_rate(
        win_rate,
        input.pot,
        input.to_call,
        config,
        rng,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    /// Every uniform draw comes out as 0.0.
    fn low_rolls() -> StepRng {
        StepRng::new(0, 0)
    }

    /// Every uniform draw comes out just below 1.0.
    fn high_rolls() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn decide_fixed(win_rate: f64, pot: u64, to_call: u64, rng: &mut StepRng) -> Decision {
        decide_with_win_rate(win_rate, pot, to_call, &PolicyConfig::default(), rng)
    }

    #[test]
    fn pot_odds_match_call_share_of_final_pot() {
        assert_eq!(required_win_rate(100, 0), 0.0);
        assert!((required_win_rate(100, 50) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn huge_pots_do_not_overflow_pot_odds() {
        let tiny = required_win_rate(u64::MAX, 1);
        assert!(tiny.is_finite() && (0.0..1e-18).contains(&tiny));
        assert_eq!(required_win_rate(u64::MAX, u64::MAX), 0.5);

        let d = decide_fixed(0.5, u64::MAX - 5, 10, &mut high_rolls());
        assert_eq!((d.action, d.amount, d.rule), (Action::Call, 10, Rule::Call));
    }

    #[test]
    fn strong_hands_raise_regardless_of_price() {
        for (pot, to_call) in [(0, 0), (100, 50), (10, 1_000)] {
            let d = decide_fixed(0.85, pot, to_call, &mut high_rolls());
            assert_eq!((d.action, d.amount, d.rule), (Action::Raise, 50, Rule::Strong));
        }
    }

    #[test]
    fn value_raise_depends_on_draw() {
        let raised = decide_fixed(0.7, 100, 10, &mut low_rolls());
        assert_eq!((raised.action, raised.rule), (Action::Raise, Rule::ValueRaise));

        let called = decide_fixed(0.7, 100, 10, &mut high_rolls());
        assert_eq!((called.action, called.amount), (Action::Call, 10));

        let checked = decide_fixed(0.7, 100, 0, &mut high_rolls());
        assert_eq!(
            (checked.action, checked.rule),
            (Action::Check, Rule::FreeCheck)
        );
    }

    #[test]
    fn medium_equity_never_value_raises() {
        let d = decide_fixed(0.5, 100, 10, &mut low_rolls());
        assert_eq!((d.action, d.amount), (Action::Call, 10));
    }

    #[test]
    fn priced_out_folds_or_bluffs() {
        let folded = decide_fixed(0.05, 100, 50, &mut high_rolls());
        assert_eq!((folded.action, folded.amount), (Action::Fold, 0));

        let bluffed = decide_fixed(0.05, 100, 50, &mut low_rolls());
        assert_eq!(
            (bluffed.action, bluffed.amount, bluffed.rule),
            (Action::Raise, 50, Rule::Bluff)
        );
    }

    #[test]
    fn free_check_is_never_folded() {
        for mut rng in [low_rolls(), high_rolls()] {
            let d = decide_fixed(0.0, 40, 0, &mut rng);
            assert_eq!((d.action, d.amount), (Action::Check, 0));
        }
    }

    #[test]
    fn raise_size_ignores_pot() {
        let config = PolicyConfig {
            raise_amount: 75,
            ..PolicyConfig::default()
        };
        let d = decide_with_win_rate(0.95, 10_000, 0, &config, &mut high_rolls());
        assert_eq!(d.amount, 75);
    }

    #[test]
    fn actions_serialize_upper_case() {
        assert_eq!(serde_json::to_string(&Action::Raise).unwrap(), "\"RAISE\"");
        assert_eq!(Action::Fold.to_string(), "FOLD");
    }
}
