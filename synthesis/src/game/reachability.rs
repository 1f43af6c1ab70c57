use biodivine_lib_bdd::Bdd;

use crate::dfa::SymbolicDfa;
use crate::game::{GameSynthesizer, Player, Regime, SynthesisResult};
use crate::vars::equivalent;

/// Final regions of a reachability fixpoint.
#[derive(Clone)]
pub struct Fixpoint {
    pub realizable: bool,
    pub winning_states: Bdd,
    pub winning_moves: Bdd,
    pub iterations: usize,
}

/// Backward attractor towards `goal_states`, played inside `state_space`.
///
/// The regime decides whether the opponent is universally or existentially quantified; the
/// iteration itself is the same for both.
pub struct ReachabilitySynthesizer {
    game: GameSynthesizer,
    goal_states: Bdd,
    state_space: Bdd,
}

impl ReachabilitySynthesizer {
    pub fn new(
        arena: SymbolicDfa,
        regime: Regime,
        starting_player: Player,
        protagonist_player: Player,
        goal_states: Bdd,
        state_space: Bdd,
    ) -> Self {
        let game = GameSynthesizer::new(arena, regime, starting_player, protagonist_player);
        Self { game, goal_states, state_space }
    }

    pub fn adversarial(arena: SymbolicDfa, starting_player: Player, protagonist_player: Player, goal_states: Bdd, state_space: Bdd) -> Self {
        Self::new(arena, Regime::Adversarial, starting_player, protagonist_player, goal_states, state_space)
    }

    pub fn cooperative(arena: SymbolicDfa, starting_player: Player, protagonist_player: Player, goal_states: Bdd, state_space: Bdd) -> Self {
        Self::new(arena, Regime::Cooperative, starting_player, protagonist_player, goal_states, state_space)
    }

    pub fn game(&self) -> &GameSynthesizer {
        &self.game
    }

    pub fn fixpoint(&self) -> Fixpoint {
        self.fixpoint_with(|_| {})
    }

    /// Like [`fixpoint`](Self::fixpoint), reporting the winning states at the start of every iteration.
    pub fn fixpoint_with(&self, mut on_iteration: impl FnMut(&Bdd)) -> Fixpoint {
        let mut winning_states = self.state_space.and(&self.goal_states);
        let mut winning_moves = winning_states.clone();
        let mut iterations = 0;

        loop {
            on_iteration(&winning_states);
            iterations += 1;

            let fresh = self.state_space.and_not(&winning_states).and(&self.game.preimage(&winning_states));
            let new_moves = winning_moves.or(&fresh);
            let new_states = self.game.project_into_states(&new_moves);
            log::trace!("Iteration {iterations}: {} winning state nodes", new_states.size());

            let realizable = self.game.includes_initial_state(&new_states);
            if realizable || equivalent(&new_states, &winning_states) {
                log::debug!("Reachability fixpoint stopped after {iterations} iterations, realizable: {realizable}");
                return Fixpoint { realizable, winning_states: new_states, winning_moves: new_moves, iterations };
            }

            winning_states = new_states;
            winning_moves = new_moves;
        }
    }

    /// Solves the game and extracts a strategy from the winning moves, even when the initial
    /// state isn't winning.
    pub fn run(&self) -> SynthesisResult {
        let fixpoint = self.fixpoint();
        self.result_of(&fixpoint)
    }

    pub fn result_of(&self, fixpoint: &Fixpoint) -> SynthesisResult {
        let transducer = match fixpoint.winning_states.is_false() {
            true => None,
            false => Some(self.game.transducer(self.game.synthesize_strategy(&fixpoint.winning_moves))),
        };
        SynthesisResult { realizability: fixpoint.realizable, winning_states: fixpoint.winning_states.clone(), transducer }
    }
}
