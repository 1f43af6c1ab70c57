use std::path::Path;

use anyhow::Result;

use crate::dfa::SymbolicDfa;
use crate::game::Player;
use crate::strategy::OutputFunction;
use crate::vars::{StateVector, VarMgr};

/// A deterministic strategy: the output function together with the arena it moves in.
#[derive(Clone)]
pub struct Transducer {
    arena: SymbolicDfa,
    output_function: OutputFunction,
    starting_player: Player,
}

impl Transducer {
    pub fn new(arena: SymbolicDfa, output_function: OutputFunction, starting_player: Player) -> Self {
        Self { arena, output_function, starting_player }
    }

    pub fn output_function(&self) -> &OutputFunction {
        &self.output_function
    }

    pub fn initial_state(&self) -> &StateVector {
        self.arena.initial_state()
    }

    /// Outputs chosen in `state`. When the agent moves first they don't depend on `inputs`.
    pub fn outputs(&self, state: &StateVector, inputs: &[bool]) -> Vec<bool> {
        let mut valuation = self.arena.valuation(state);
        if self.starting_player == Player::Environment {
            VarMgr::assign(&mut valuation, self.arena.var_mgr().input_variables(), inputs);
        }
        self.output_function.eval(&valuation)
    }

    /// Plays one round from `state` against `inputs`, returning the outputs and the successor.
    pub fn step(&self, state: &StateVector, inputs: &[bool]) -> (Vec<bool>, StateVector) {
        let outputs = self.outputs(state, inputs);
        let next = self.arena.successor(state, inputs, &outputs);
        (outputs, next)
    }

    /// Outputs produced along the trace of `inputs`, starting from the initial state.
    pub fn replay<'a>(&self, inputs: impl IntoIterator<Item = &'a [bool]>) -> Vec<Vec<bool>> {
        let mut state = self.initial_state().clone();
        let mut trace = Vec::new();
        for inputs in inputs {
            let (outputs, next) = self.step(&state, inputs);
            trace.push(outputs);
            state = next;
        }
        trace
    }

    pub fn dump_dot(&self, path: &Path) -> Result<()> {
        let var_mgr = self.arena.var_mgr();
        let labelled = var_mgr.output_labels().into_iter().zip(self.output_function.iter().map(|(_, f)| f.clone()));
        var_mgr.dump_dot(&labelled.collect::<Vec<_>>(), path)
    }
}
