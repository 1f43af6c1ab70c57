use std::rc::Rc;

use anyhow::{bail, Context, Result};
use biodivine_lib_bdd::{Bdd, BddValuation};

use crate::dfa::explicit::{DfaStateId, ExplicitDfa};
use crate::index::AsIndex;
use crate::vars::{AutomatonId, InputOutputPartition, StateVar, StateVector, VarMgr, VarMgrBuilder};

/// An automaton whose states are assignments of its state variables.
///
/// Bit `i` of the successor of a state is `transition_function[i]` evaluated on the current
/// state bits together with the input and output variables. The state space is the region the
/// games are played in; it starts out as everything and only shrinks through [`restriction`].
///
/// [`restriction`]: SymbolicDfa::restriction
#[derive(Clone)]
pub struct SymbolicDfa {
    var_mgr: Rc<VarMgr>,
    automaton_id: AutomatonId,
    initial_state: StateVector,
    transition_function: Rc<[Bdd]>,
    final_states: Bdd,
    state_space: Bdd,
}

fn encode(state: DfaStateId, bits: usize) -> Vec<bool> {
    (0..bits).map(|bit| (state.to_usize() >> bit) & 1 == 1).collect()
}

impl SymbolicDfa {
    /// Binary encoding of `dfa` on the state variables reserved under `automaton_id`.
    pub fn from_explicit(var_mgr: &Rc<VarMgr>, automaton_id: AutomatonId, dfa: &ExplicitDfa) -> Result<Self> {
        let bits = var_mgr.state_variables(automaton_id).len();
        if bits < dfa.state_bits() {
            bail!("{} states don't fit in {bits} state variables", dfa.state_count())
        }

        let mut transition_function = vec![var_mgr.mk_false(); bits];
        let mut final_states = var_mgr.mk_false();

        for state in dfa.states() {
            let source = var_mgr.state_to_bdd(automaton_id, &encode(state, bits));
            let mut covered = var_mgr.mk_false();

            for (guard, target) in dfa.transitions_of(state) {
                let guard = var_mgr
                    .guard_to_bdd(guard)
                    .with_context(|| format!("Invalid guard on a transition from state {}", state.to_usize()))?;
                if !covered.and(&guard).is_false() {
                    bail!("State {} has overlapping transition guards", state.to_usize())
                }
                covered = covered.or(&guard);

                let step = source.and(&guard);
                for (bit, delta) in encode(*target, bits).into_iter().zip(&mut transition_function) {
                    if bit {
                        *delta = delta.or(&step);
                    }
                }
            }

            if !covered.is_true() {
                bail!("State {} has no transition for some assignment", state.to_usize())
            }
            if dfa.is_accepting(state) {
                final_states = final_states.or(&source);
            }
        }

        Ok(Self {
            var_mgr: var_mgr.clone(),
            automaton_id,
            initial_state: encode(dfa.initial(), bits).into(),
            transition_function: transition_function.into(),
            final_states,
            state_space: var_mgr.mk_true(),
        })
    }

    /// Encodes `dfas` over one fresh variable manager, each on its own state variables.
    pub fn encode_all(dfas: &[ExplicitDfa], partition: &InputOutputPartition) -> Result<Vec<Self>> {
        let mut builder = VarMgrBuilder::new();
        for dfa in dfas {
            builder.create_named_variables(dfa.names());
        }
        let ids = dfas.iter().map(|dfa| builder.create_state_variables(dfa.state_bits())).collect::<Vec<_>>();
        let var_mgr = Rc::new(builder.build(partition)?);

        dfas.iter().zip(ids).map(|(dfa, id)| Self::from_explicit(&var_mgr, id, dfa)).collect()
    }

    /// Runs `automata` side by side. A product state is final iff it is final in every component.
    pub fn product(automata: &[SymbolicDfa]) -> Self {
        assert!(!automata.is_empty(), "product of no automata");
        let var_mgr = automata[0].var_mgr.clone();

        let ids = automata.iter().map(|a| a.automaton_id).collect::<Vec<_>>();
        let automaton_id = var_mgr.register_product(&ids);

        let initial_state = automata.iter().flat_map(|a| a.initial_state.iter().copied()).collect();
        let transition_function = automata.iter().flat_map(|a| a.transition_function.iter().cloned()).collect();
        let final_states = automata.iter().fold(var_mgr.mk_true(), |acc, a| acc.and(&a.final_states));
        let state_space = automata.iter().fold(var_mgr.mk_true(), |acc, a| acc.and(&a.state_space));

        Self { var_mgr, automaton_id, initial_state, transition_function, final_states, state_space }
    }

    /// Removes `pruned` from the state space and from the final states.
    pub fn restriction(&self, pruned: &Bdd) -> Self {
        Self {
            final_states: self.final_states.and_not(pruned),
            state_space: self.state_space.and_not(pruned),
            ..self.clone()
        }
    }

    pub fn var_mgr(&self) -> &Rc<VarMgr> {
        &self.var_mgr
    }

    pub fn automaton_id(&self) -> AutomatonId {
        self.automaton_id
    }

    pub fn state_variables(&self) -> Rc<[StateVar]> {
        self.var_mgr.state_variables(self.automaton_id)
    }

    pub fn initial_state(&self) -> &StateVector {
        &self.initial_state
    }

    pub fn transition_function(&self) -> &Rc<[Bdd]> {
        &self.transition_function
    }

    pub fn final_states(&self) -> &Bdd {
        &self.final_states
    }

    pub fn state_space(&self) -> &Bdd {
        &self.state_space
    }

    pub fn initial_state_bdd(&self) -> Bdd {
        self.var_mgr.state_to_bdd(self.automaton_id, &self.initial_state)
    }

    pub fn valuation(&self, state: &StateVector) -> BddValuation {
        self.var_mgr.valuation(self.automaton_id, state)
    }

    /// Successor of the state encoded in `valuation`, which also fixes inputs and outputs.
    pub fn step(&self, valuation: &BddValuation) -> StateVector {
        self.transition_function.iter().map(|delta| delta.eval_in(valuation)).collect()
    }

    pub fn successor(&self, state: &StateVector, inputs: &[bool], outputs: &[bool]) -> StateVector {
        let mut valuation = self.valuation(state);
        VarMgr::assign(&mut valuation, self.var_mgr.input_variables(), inputs);
        VarMgr::assign(&mut valuation, self.var_mgr.output_variables(), outputs);
        self.step(&valuation)
    }

    /// Whether `state` belongs to the state set `states`.
    pub fn contains(&self, states: &Bdd, state: &StateVector) -> bool {
        states.eval_in(&self.valuation(state))
    }
}
