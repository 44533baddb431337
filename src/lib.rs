pub mod advisor;
pub mod cards;
pub mod config;
pub mod equity;
pub mod error;
pub mod evaluator;
pub mod policy;
pub mod web;

pub use advisor::Advisor;
pub use config::AdvisorConfig;
pub use error::PokerError;
pub use evaluator::{Evaluation, HandCategory, evaluate};
pub use policy::{Action, Decision, DecisionInput};
