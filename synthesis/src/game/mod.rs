use biodivine_lib_bdd::Bdd;

use crate::strategy::Transducer;

pub mod quantification;
pub mod reachability;
pub mod synthesizer;

#[cfg(test)]
mod test;

pub use quantification::Quantification;
pub use reachability::{Fixpoint, ReachabilitySynthesizer};
pub use synthesizer::GameSynthesizer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    Agent,
    Environment,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Agent => Player::Environment,
            Player::Environment => Player::Agent,
        }
    }
}

/// Whether the non-protagonist player opposes the protagonist or helps it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Regime {
    Adversarial,
    Cooperative,
}

/// Outcome of one reachability game.
#[derive(Clone)]
pub struct SynthesisResult {
    pub realizability: bool,
    pub winning_states: Bdd,
    /// Absent when the winning region is empty.
    pub transducer: Option<Transducer>,
}
