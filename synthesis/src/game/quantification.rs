use biodivine_lib_bdd::Bdd;

use crate::game::{Player, Regime};
use crate::vars::VarGroup;

/// Elimination of variable groups, fixed once per game.
///
/// The two-group variants apply the inner (second) quantifier first.
#[derive(Clone, Debug)]
pub enum Quantification {
    Identity,
    Exists(VarGroup),
    Forall(VarGroup),
    /// `∃ first. ∃ second. f`
    ExistsExists(VarGroup, VarGroup),
    /// `∀ first. ∃ second. f`
    ForallExists(VarGroup, VarGroup),
    /// `∃ first. ∀ second. f`
    ExistsForall(VarGroup, VarGroup),
}

impl Quantification {
    pub fn apply(&self, f: &Bdd) -> Bdd {
        match self {
            Quantification::Identity => f.clone(),
            Quantification::Exists(vars) => f.exists(vars),
            Quantification::Forall(vars) => f.for_all(vars),
            Quantification::ExistsExists(first, second) => f.exists(second).exists(first),
            Quantification::ForallExists(first, second) => f.exists(second).for_all(first),
            Quantification::ExistsForall(first, second) => f.for_all(second).exists(first),
        }
    }

    /// Returns the pair `(independent, non_state)` used by the preimage and by the projection of
    /// moves into states.
    ///
    /// When the protagonist moves first its choice cannot depend on the opponent's, so the
    /// opponent's variables go at the preimage and the protagonist's own at the projection.
    /// Otherwise both groups only go at the projection, the opponent's outermost.
    pub fn for_game(
        regime: Regime,
        starting_player: Player,
        protagonist_player: Player,
        inputs: &VarGroup,
        outputs: &VarGroup,
    ) -> (Quantification, Quantification) {
        let (own, opponent) = match protagonist_player {
            Player::Agent => (outputs.clone(), inputs.clone()),
            Player::Environment => (inputs.clone(), outputs.clone()),
        };

        match (regime, starting_player == protagonist_player) {
            (Regime::Adversarial, true) => (Quantification::Forall(opponent), Quantification::Exists(own)),
            (Regime::Adversarial, false) => (Quantification::Identity, Quantification::ForallExists(opponent, own)),
            (Regime::Cooperative, true) => (Quantification::Exists(opponent), Quantification::Exists(own)),
            (Regime::Cooperative, false) => (Quantification::Identity, Quantification::ExistsExists(opponent, own)),
        }
    }
}
