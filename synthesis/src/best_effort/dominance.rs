use std::collections::VecDeque;

use biodivine_lib_bdd::Bdd;
use either::Either::{Left, Right};

use crate::dfa::SymbolicDfa;
use crate::game::{Fixpoint, Player};
use crate::strategy::OutputFunction;
use crate::vars::{StateVector, VarMgr};
use crate::Set;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dominance {
    Dominant,
    /// A reachable state where the agent has more than one cooperative choice.
    NotDominant(StateVector),
}

/// Every assignment of `count` variables.
fn assignments(count: usize) -> impl Iterator<Item = Vec<bool>> {
    assert!(count < u64::BITS as usize, "too many variables to enumerate");
    (0..1u64 << count).map(move |bits| (0..count).map(|i| (bits >> i) & 1 == 1).collect())
}

/// Moves that either win cooperatively or stay in the cooperative winning region.
pub fn cooperative_moves(arena: &SymbolicDfa, starting_player: Player, states: &Bdd, moves: &Bdd) -> Bdd {
    let var_mgr = arena.var_mgr();
    let mut staying = var_mgr.vector_compose(states, arena.automaton_id(), arena.transition_function());
    if starting_player == Player::Agent {
        staying = staying.exists(var_mgr.input_variables());
    }
    moves.or(&states.and(&staying))
}

/// Explores the states reachable under the cooperative strategy while the adversarial one
/// can't take over, looking for a state with two distinct cooperative choices.
///
/// When the agent moves first its choice in a state is fixed before any input is seen, so the
/// test compares output assignments per state. When the environment moves first the test is
/// per state and input, and the strategy is re-evaluated for every input.
pub struct DominanceCheck<'a> {
    arena: &'a SymbolicDfa,
    starting_player: Player,
    adversarial_states: &'a Bdd,
    cooperative: &'a Fixpoint,
    output_function: &'a OutputFunction,
}

impl<'a> DominanceCheck<'a> {
    pub fn new(
        arena: &'a SymbolicDfa,
        starting_player: Player,
        adversarial_states: &'a Bdd,
        cooperative: &'a Fixpoint,
        output_function: &'a OutputFunction,
    ) -> Self {
        Self { arena, starting_player, adversarial_states, cooperative, output_function }
    }

    pub fn run(&self) -> Dominance {
        let arena = self.arena;
        let var_mgr = arena.var_mgr();
        let inputs = var_mgr.input_variables();
        let outputs = var_mgr.output_variables();

        let region = &self.cooperative.winning_states;
        let all_moves = cooperative_moves(arena, self.starting_player, region, &self.cooperative.winning_moves);
        let cooperative_only = region.and_not(self.adversarial_states);

        let mut visited = Set::default();
        let mut frontier = VecDeque::new();
        visited.insert(arena.initial_state().clone());
        frontier.push_back(arena.initial_state().clone());

        while let Some(state) = frontier.pop_front() {
            let moves = all_moves.and(&var_mgr.state_to_bdd(arena.automaton_id(), &state));
            let witness = moves.and_not(&var_mgr.compatible_projection(&moves, outputs));
            if !witness.is_false() {
                log::debug!("State {state} admits distinct cooperative choices after {} states", visited.len());
                return Dominance::NotDominant(state);
            }

            let valuation = arena.valuation(&state);
            let choices = match self.starting_player {
                Player::Agent => {
                    let chosen = self.output_function.eval(&valuation);
                    Left(assignments(inputs.len()).map(move |input| (input, chosen.clone())))
                }
                Player::Environment => Right(assignments(inputs.len()).map(|input| {
                    let mut valuation = valuation.clone();
                    VarMgr::assign(&mut valuation, inputs, &input);
                    let chosen = self.output_function.eval(&valuation);
                    (input, chosen)
                })),
            };

            for (input, output) in choices {
                let next = arena.successor(&state, &input, &output);
                if arena.contains(&cooperative_only, &next) && visited.insert(next.clone()) {
                    frontier.push_back(next);
                }
            }
        }

        log::debug!("Explored {} cooperative-only states without a choice", visited.len());
        Dominance::Dominant
    }
}
