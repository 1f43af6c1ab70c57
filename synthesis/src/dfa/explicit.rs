use anyhow::{bail, Result};

use crate::index::{AsIndex, IndexedSet, IndexedVec};
use crate::{new_index, IndexMap, Set};

new_index!(pub index DfaStateId);

/// Propositional label of an explicit transition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Guard {
    True,
    False,
    Var(String),
    Not(Box<Guard>),
    And(Vec<Guard>),
    Or(Vec<Guard>),
}

impl Guard {
    pub fn var(name: impl Into<String>) -> Guard {
        Guard::Var(name.into())
    }

    pub fn not(guard: Guard) -> Guard {
        match guard {
            Guard::True => Guard::False,
            Guard::False => Guard::True,
            Guard::Not(inner) => *inner,
            guard => Guard::Not(Box::new(guard)),
        }
    }

    pub fn and(guards: impl IntoIterator<Item = Guard>) -> Guard {
        let mut conjuncts = Vec::new();
        for guard in guards {
            match guard {
                Guard::True => {}
                Guard::False => return Guard::False,
                Guard::And(inner) => conjuncts.extend(inner),
                guard => conjuncts.push(guard),
            }
        }
        if conjuncts.iter().any(|guard| conjuncts.contains(&Guard::not(guard.clone()))) {
            return Guard::False;
        }
        match conjuncts.len() {
            0 => Guard::True,
            1 => conjuncts.pop().unwrap_or(Guard::True),
            _ => Guard::And(conjuncts),
        }
    }

    pub fn or(guards: impl IntoIterator<Item = Guard>) -> Guard {
        let mut disjuncts = Vec::new();
        for guard in guards {
            match guard {
                Guard::False => {}
                Guard::True => return Guard::True,
                Guard::Or(inner) => disjuncts.extend(inner),
                guard => disjuncts.push(guard),
            }
        }
        match disjuncts.len() {
            0 => Guard::False,
            1 => disjuncts.pop().unwrap_or(Guard::False),
            _ => Guard::Or(disjuncts),
        }
    }

    pub fn eval(&self, valuation: &impl Fn(&str) -> bool) -> bool {
        match self {
            Guard::True => true,
            Guard::False => false,
            Guard::Var(name) => valuation(name),
            Guard::Not(inner) => !inner.eval(valuation),
            Guard::And(guards) => guards.iter().all(|g| g.eval(valuation)),
            Guard::Or(guards) => guards.iter().any(|g| g.eval(valuation)),
        }
    }

    fn for_each_var<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            Guard::True | Guard::False => {}
            Guard::Var(name) => f(name),
            Guard::Not(inner) => inner.for_each_var(f),
            Guard::And(guards) | Guard::Or(guards) => guards.iter().for_each(|g| g.for_each_var(f)),
        }
    }
}

/// A complete deterministic automaton over finite traces, with transitions labelled by guards
/// over its named propositions.
#[derive(Clone, Debug)]
pub struct ExplicitDfa {
    names: Vec<String>,
    initial: DfaStateId,
    accepting: IndexedVec<DfaStateId, bool>,
    transitions: IndexedVec<DfaStateId, Vec<(Guard, DfaStateId)>>,
}

impl ExplicitDfa {
    pub fn new(
        names: Vec<String>,
        initial: DfaStateId,
        accepting: IndexedVec<DfaStateId, bool>,
        transitions: IndexedVec<DfaStateId, Vec<(Guard, DfaStateId)>>,
    ) -> Result<Self> {
        let state_count = transitions.len();
        if state_count == 0 {
            bail!("Automaton has no states")
        }
        if accepting.len() != state_count {
            bail!("Expected {state_count} acceptance flags, got {}", accepting.len())
        }
        if initial.to_usize() >= state_count {
            bail!("Initial state {} doesn't exist", initial.to_usize())
        }

        let mut declared = Set::default();
        for name in &names {
            if !declared.insert(name.as_str()) {
                bail!("Variable {name} is declared twice")
            }
        }

        for (source, edges) in transitions.enumerate() {
            for (guard, target) in edges {
                if target.to_usize() >= state_count {
                    bail!("Transition from {} targets missing state {}", source.to_usize(), target.to_usize())
                }
                let mut undeclared = None;
                guard.for_each_var(&mut |name| {
                    if !declared.contains(name) {
                        undeclared.get_or_insert(name);
                    }
                });
                if let Some(name) = undeclared {
                    bail!("Guard of a transition from {} uses undeclared variable {name}", source.to_usize())
                }
            }
        }

        Ok(Self { names, initial, accepting, transitions })
    }

    /// Accepts exactly the traces of length at least one.
    pub fn non_empty() -> Self {
        let transitions = vec![vec![(Guard::True, DfaStateId(1))], vec![(Guard::True, DfaStateId(1))]];
        Self {
            names: Vec::new(),
            initial: DfaStateId(0),
            accepting: vec![false, true].into(),
            transitions: transitions.into(),
        }
    }

    /// Synchronous product over the reachable tuples. Edges are followed unless their guard
    /// folds to `false`, which catches complementary conjuncts but not every contradiction.
    /// A tuple accepts iff every component does.
    pub fn product<'a>(dfas: impl IntoIterator<Item = &'a ExplicitDfa>) -> Self {
        let dfas = dfas.into_iter().collect::<Vec<_>>();

        let mut names = Set::default();
        for dfa in &dfas {
            names.extend(dfa.names.iter().cloned());
        }

        let mut tuples = IndexedSet::<DfaStateId, Box<[DfaStateId]>>::default();
        let (initial, _) = tuples.insert_full(dfas.iter().map(|dfa| dfa.initial).collect());
        let mut transitions = IndexedVec::<DfaStateId, Vec<(Guard, DfaStateId)>>::new();

        while transitions.len() < tuples.len() {
            let tuple = tuples[DfaStateId(transitions.len())].clone();

            let mut edges = vec![(Guard::True, Vec::with_capacity(dfas.len()))];
            for (dfa, &state) in dfas.iter().zip(&tuple[..]) {
                let mut extended = Vec::with_capacity(edges.len());
                for (guard, targets) in &edges {
                    for (label, target) in &dfa.transitions[state] {
                        let guard = Guard::and([guard.clone(), label.clone()]);
                        if guard == Guard::False {
                            continue;
                        }
                        let mut targets = targets.clone();
                        targets.push(*target);
                        extended.push((guard, targets));
                    }
                }
                edges = extended;
            }

            let mut merged = IndexMap::<DfaStateId, Vec<Guard>>::default();
            for (guard, targets) in edges {
                let (target, _) = tuples.insert_full(targets.into_boxed_slice());
                merged.entry(target).or_default().push(guard);
            }
            transitions.push(merged.into_iter().map(|(target, guards)| (Guard::or(guards), target)).collect());
        }

        let accepting = transitions
            .indexes()
            .map(|tuple| {
                let states = &tuples[tuple];
                dfas.iter().zip(&states[..]).all(|(dfa, &state)| dfa.accepting[state])
            })
            .collect();

        Self { names: names.into_iter().collect(), initial, accepting, transitions }
    }

    /// Complement over the same state set.
    pub fn negation(&self) -> Self {
        let mut negated = self.clone();
        negated.accepting = self.accepting.iter().map(|&a| !a).collect();
        negated
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn initial(&self) -> DfaStateId {
        self.initial
    }

    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn states(&self) -> impl Iterator<Item = DfaStateId> + '_ {
        self.transitions.indexes()
    }

    pub fn is_accepting(&self, state: DfaStateId) -> bool {
        self.accepting[state]
    }

    pub fn transitions_of(&self, state: DfaStateId) -> &[(Guard, DfaStateId)] {
        &self.transitions[state]
    }

    /// Number of bits of the binary state encoding, never less than one.
    pub fn state_bits(&self) -> usize {
        let max_code = self.state_count() - 1;
        usize::max(1, (usize::BITS - max_code.leading_zeros()) as usize)
    }

    /// Runs the automaton on a trace, each step listing the propositions that hold.
    pub fn accepts(&self, trace: &[&[&str]]) -> bool {
        let mut state = self.initial;
        for step in trace {
            let holds = |name: &str| step.contains(&name);
            match self.transitions[state].iter().find(|(guard, _)| guard.eval(&holds)) {
                Some(&(_, target)) => state = target,
                None => return false,
            }
        }
        self.accepting[state]
    }
}
