use std::rc::Rc;

use biodivine_lib_bdd::{Bdd, BddValuation};

use crate::dfa::SymbolicDfa;
use crate::game::{Player, Quantification, Regime};
use crate::strategy::{OutputFunction, Transducer};
use crate::vars::{equivalent, VarMgr};

/// The one-step machinery shared by every game played on a symbolic arena.
pub struct GameSynthesizer {
    arena: SymbolicDfa,
    starting_player: Player,
    initial_valuation: BddValuation,
    quantify_independent: Quantification,
    quantify_non_state: Quantification,
}

impl GameSynthesizer {
    pub fn new(arena: SymbolicDfa, regime: Regime, starting_player: Player, protagonist_player: Player) -> Self {
        let var_mgr = arena.var_mgr();
        let (quantify_independent, quantify_non_state) = Quantification::for_game(
            regime,
            starting_player,
            protagonist_player,
            var_mgr.input_variables(),
            var_mgr.output_variables(),
        );
        let initial_valuation = arena.valuation(arena.initial_state());

        Self { arena, starting_player, initial_valuation, quantify_independent, quantify_non_state }
    }

    pub fn arena(&self) -> &SymbolicDfa {
        &self.arena
    }

    pub fn var_mgr(&self) -> &Rc<VarMgr> {
        self.arena.var_mgr()
    }

    /// Moves leading into `states` in one step.
    pub fn preimage(&self, states: &Bdd) -> Bdd {
        let arena = &self.arena;
        let composed = self.var_mgr().vector_compose(states, arena.automaton_id(), arena.transition_function());
        self.quantify_independent.apply(&composed)
    }

    pub fn project_into_states(&self, moves: &Bdd) -> Bdd {
        self.quantify_non_state.apply(moves)
    }

    pub fn includes_initial_state(&self, states: &Bdd) -> bool {
        states.eval_in(&self.initial_valuation)
    }

    /// Solves `moves = 1` for the output variables.
    ///
    /// Outputs are eliminated from the last one down, then resolved from the first one up: each
    /// function sees the earlier outputs replaced by their own functions and the later ones
    /// existentially quantified, and picks `true` wherever both values work or neither does.
    /// The result only depends on state and input variables.
    ///
    /// Panics if substituting the functions back into `moves` doesn't give `∃ outputs. moves`.
    pub fn synthesize_strategy(&self, moves: &Bdd) -> OutputFunction {
        let var_mgr = self.var_mgr();
        let outputs = var_mgr.output_variables();

        let mut eliminated = vec![moves.clone()];
        for &output in outputs.iter().rev() {
            let last = &eliminated[eliminated.len() - 1];
            eliminated.push(last.var_exists(output));
        }
        eliminated.reverse();

        let mut functions: Vec<Bdd> = Vec::with_capacity(outputs.len());
        for (i, &output) in outputs.iter().enumerate() {
            let mut relation = eliminated[i + 1].clone();
            for (&resolved, function) in outputs.iter().zip(&functions) {
                relation = var_mgr.compose(&relation, resolved, function);
            }
            let high = relation.var_restrict(output, true);
            let low = relation.var_restrict(output, false);
            functions.push(high.or(&low.not()));
        }

        let verified = outputs.iter().zip(&functions).fold(moves.clone(), |acc, (&output, function)| var_mgr.compose(&acc, output, function));
        assert!(
            equivalent(&verified, &eliminated[0]),
            "strategy extraction produced output functions inconsistent with the winning moves"
        );

        let output_function = outputs.iter().copied().zip(functions).collect::<OutputFunction>();
        log::trace!("Extracted {} output functions", output_function.len());
        output_function
    }

    pub fn transducer(&self, output_function: OutputFunction) -> Transducer {
        Transducer::new(self.arena.clone(), output_function, self.starting_player)
    }
}
