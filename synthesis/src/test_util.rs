use std::collections::VecDeque;

use itertools::Itertools;

use crate::dfa::{DfaStateId, ExplicitDfa, Guard, SymbolicDfa};
use crate::index::IndexedVec;
use crate::vars::{InputOutputPartition, StateVector};
use crate::Set;

pub fn var(name: &str) -> Guard {
    Guard::var(name)
}

pub fn not(name: &str) -> Guard {
    Guard::not(Guard::var(name))
}

pub fn and<const N: usize>(guards: [Guard; N]) -> Guard {
    Guard::and(guards)
}

pub fn or<const N: usize>(guards: [Guard; N]) -> Guard {
    Guard::or(guards)
}

pub fn dfa(names: &[&str], states: usize, accepting: &[usize], edges: Vec<(usize, Guard, usize)>) -> ExplicitDfa {
    let mut transitions = IndexedVec::from(vec![Vec::new(); states]);
    for (source, guard, target) in edges {
        transitions[DfaStateId(source)].push((guard, DfaStateId(target)));
    }
    let accepting = (0..states).map(|s| accepting.contains(&s)).collect();
    let names = names.iter().map(|n| n.to_string()).collect();
    ExplicitDfa::new(names, DfaStateId(0), accepting, transitions).unwrap()
}

pub fn partition(inputs: &[&str], outputs: &[&str]) -> InputOutputPartition {
    InputOutputPartition {
        inputs: inputs.iter().map(|s| s.to_string()).collect(),
        outputs: outputs.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn encode(dfa: &ExplicitDfa, partition: &InputOutputPartition) -> SymbolicDfa {
    SymbolicDfa::encode_all(std::slice::from_ref(dfa), partition).unwrap().remove(0)
}

pub fn assignments(count: usize) -> Vec<Vec<bool>> {
    match count {
        0 => vec![Vec::new()],
        _ => (0..count).map(|_| [false, true]).multi_cartesian_product().collect(),
    }
}

/// States reachable from the initial one under any inputs and outputs.
pub fn reachable(arena: &SymbolicDfa) -> Vec<StateVector> {
    let var_mgr = arena.var_mgr();
    let inputs = assignments(var_mgr.input_variables().len());
    let outputs = assignments(var_mgr.output_variables().len());

    let mut visited = Set::default();
    let mut queue = VecDeque::from([arena.initial_state().clone()]);
    visited.insert(arena.initial_state().clone());
    while let Some(state) = queue.pop_front() {
        for (input, output) in inputs.iter().cartesian_product(&outputs) {
            let next = arena.successor(&state, input, output);
            if visited.insert(next.clone()) {
                queue.push_back(next);
            }
        }
    }
    visited.into_iter().collect()
}

/// Binary encoding of the explicit state `code`.
pub fn state(code: usize, bits: usize) -> StateVector {
    (0..bits).map(|bit| (code >> bit) & 1 == 1).collect()
}
