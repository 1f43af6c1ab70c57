use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::path::Path;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use biodivine_lib_bdd::{Bdd, BddValuation, BddVariable, BddVariableSet, BddVariableSetBuilder};

use crate::dfa::explicit::Guard;
use crate::index::{AsIndex, IndexedVec};
use crate::{new_index, IndexMap, Set};

new_index!(
    /// Namespace of the state variables of one symbolic automaton.
    pub index AutomatonId
);

/// An ordered group of variables, eliminated together by quantification.
pub type VarGroup = Rc<[BddVariable]>;

/// A state bit together with its primed copy, used as scratch space by [`VarMgr::vector_compose`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StateVar {
    pub current: BddVariable,
    pub next: BddVariable,
}

/// Split of the propositions between the environment (inputs) and the agent (outputs).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputOutputPartition {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

/// Assignment of every state bit of an automaton, usable as a hash key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StateVector(Box<[bool]>);

impl Deref for StateVector {
    type Target = [bool];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<bool>> for StateVector {
    fn from(bits: Vec<bool>) -> Self {
        Self(bits.into_boxed_slice())
    }
}

impl FromIterator<bool> for StateVector {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|&bit| f.write_str(if bit { "1" } else { "0" }))
    }
}

/// Collects every variable a synthesis run needs before the BDD variable set is frozen.
#[derive(Default)]
pub struct VarMgrBuilder {
    names: Set<String>,
    state_bits: IndexedVec<AutomatonId, usize>,
}

impl VarMgrBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_named_variables<S: AsRef<str>>(&mut self, names: impl IntoIterator<Item = S>) {
        for name in names {
            if !self.names.contains(name.as_ref()) {
                self.names.insert(name.as_ref().to_string());
            }
        }
    }

    pub fn create_state_variables(&mut self, bits: usize) -> AutomatonId {
        self.state_bits.push(bits)
    }

    pub fn build(mut self, partition: &InputOutputPartition) -> Result<VarMgr> {
        let inputs = partition.inputs.iter().map(String::as_str).collect::<Set<_>>();
        let outputs = partition.outputs.iter().map(String::as_str).collect::<Set<_>>();

        if let Some(name) = inputs.iter().find(|name| outputs.contains(*name)) {
            bail!("Variable {name} is both an input and an output")
        }
        if let Some(name) = self.names.iter().find(|name| !inputs.contains(name.as_str()) && !outputs.contains(name.as_str())) {
            bail!("Variable {name} is neither an input nor an output")
        }
        self.create_named_variables(&partition.inputs);
        self.create_named_variables(&partition.outputs);

        let mut builder = BddVariableSetBuilder::new();
        let mut named = IndexMap::default();
        for name in &self.names {
            named.insert(name.clone(), builder.make_variable(name));
        }

        let mut automata = IndexedVec::<AutomatonId, Rc<[StateVar]>>::new();
        for (id, &bits) in self.state_bits.enumerate() {
            let mut state_vars = Vec::with_capacity(bits);
            for bit in 0..bits {
                let current = format!("z{}_{bit}", id.to_usize());
                let next = format!("{current}_next");
                if self.names.contains(&current) || self.names.contains(&next) {
                    bail!("Proposition {current} clashes with a state variable name")
                }
                let current = builder.make_variable(&current);
                let next = builder.make_variable(&next);
                state_vars.push(StateVar { current, next });
            }
            automata.push(Rc::from(state_vars));
        }

        let group = |side: &Set<&str>| -> VarGroup {
            let mut group = named.iter().filter(|(name, _)| side.contains(name.as_str())).map(|(_, &var)| var).collect::<Vec<_>>();
            group.sort();
            group.into()
        };
        let inputs = group(&inputs);
        let outputs = group(&outputs);

        log::debug!("Created {} named and {} state variables", named.len(), 2 * self.state_bits.iter().sum::<usize>());

        Ok(VarMgr { variables: builder.build(), named, inputs, outputs, automata: RefCell::new(automata) })
    }
}

/// Semantic equality of two functions over the same variable set.
pub fn equivalent(a: &Bdd, b: &Bdd) -> bool {
    a.xor(b).is_false()
}

/// Owner of the BDD variable universe shared by every automaton, game and strategy of a run.
pub struct VarMgr {
    variables: BddVariableSet,
    named: IndexMap<String, BddVariable>,
    inputs: VarGroup,
    outputs: VarGroup,
    automata: RefCell<IndexedVec<AutomatonId, Rc<[StateVar]>>>,
}

impl VarMgr {
    pub fn variables(&self) -> &BddVariableSet {
        &self.variables
    }

    pub fn mk_true(&self) -> Bdd {
        self.variables.mk_true()
    }

    pub fn mk_false(&self) -> Bdd {
        self.variables.mk_false()
    }

    pub fn name_to_variable(&self, name: &str) -> Option<BddVariable> {
        self.named.get(name).copied()
    }

    pub fn input_variables(&self) -> &VarGroup {
        &self.inputs
    }

    pub fn output_variables(&self) -> &VarGroup {
        &self.outputs
    }

    pub fn output_labels(&self) -> Vec<String> {
        self.outputs.iter().map(|&var| self.variables.name_of(var)).collect()
    }

    pub fn state_variables(&self, id: AutomatonId) -> Rc<[StateVar]> {
        self.automata.borrow()[id].clone()
    }

    /// Opens a namespace whose state variables are those of `ids`, concatenated in order.
    pub fn register_product(&self, ids: &[AutomatonId]) -> AutomatonId {
        let mut automata = self.automata.borrow_mut();
        let state_vars = ids.iter().flat_map(|&id| automata[id].iter().copied()).collect::<Vec<_>>();
        automata.push(Rc::from(state_vars))
    }

    pub fn guard_to_bdd(&self, guard: &Guard) -> Result<Bdd> {
        Ok(match guard {
            Guard::True => self.mk_true(),
            Guard::False => self.mk_false(),
            Guard::Var(name) => {
                let var = self.name_to_variable(name).with_context(|| format!("Unknown variable {name}"))?;
                self.variables.mk_var(var)
            }
            Guard::Not(inner) => self.guard_to_bdd(inner)?.not(),
            Guard::And(guards) => guards.iter().try_fold(self.mk_true(), |acc, g| Ok::<_, anyhow::Error>(acc.and(&self.guard_to_bdd(g)?)))?,
            Guard::Or(guards) => guards.iter().try_fold(self.mk_false(), |acc, g| Ok::<_, anyhow::Error>(acc.or(&self.guard_to_bdd(g)?)))?,
        })
    }

    /// Characteristic function of a single state of automaton `id`.
    pub fn state_to_bdd(&self, id: AutomatonId, state: &[bool]) -> Bdd {
        let state_vars = self.state_variables(id);
        (state_vars.iter().zip(state)).fold(self.mk_true(), |acc, (var, &value)| acc.and(&self.variables.mk_literal(var.current, value)))
    }

    /// Evaluation vector placing `state` on the state bits of `id`; every other variable is false.
    pub fn valuation(&self, id: AutomatonId, state: &[bool]) -> BddValuation {
        let mut valuation = BddValuation::all_false(self.variables.num_vars());
        let state_vars = self.state_variables(id);
        for (var, &value) in state_vars.iter().zip(state) {
            valuation.set_value(var.current, value);
        }
        valuation
    }

    pub fn assign(valuation: &mut BddValuation, group: &[BddVariable], values: &[bool]) {
        for (&var, &value) in group.iter().zip(values) {
            valuation.set_value(var, value);
        }
    }

    /// `f[var := g]`.
    pub fn compose(&self, f: &Bdd, var: BddVariable, g: &Bdd) -> Bdd {
        let high = f.var_restrict(var, true);
        let low = f.var_restrict(var, false);
        g.and(&high).or(&g.not().and(&low))
    }

    /// Simultaneous substitution of the state bits of `id` by `transition`.
    ///
    /// Every bit is first moved to its primed copy, so that a substituted function can mention
    /// current bits that were not yet replaced without being captured by later substitutions.
    pub fn vector_compose(&self, f: &Bdd, id: AutomatonId, transition: &[Bdd]) -> Bdd {
        let state_vars = self.state_variables(id);
        let support = f.support_set();

        let mut composed = f.clone();
        let mut renamed = Vec::new();
        for (var, delta) in state_vars.iter().zip(transition) {
            if support.contains(&var.current) {
                composed = self.compose(&composed, var.current, &self.variables.mk_var(var.next));
                renamed.push((var.next, delta));
            }
        }
        for (next, delta) in renamed {
            composed = self.compose(&composed, next, delta);
        }
        composed
    }

    /// Keeps, for every assignment of the variables outside `group`, a single satisfying
    /// assignment of `group`: the lexicographically smallest one.
    pub fn compatible_projection(&self, f: &Bdd, group: &[BddVariable]) -> Bdd {
        let mut choice = f.clone();
        for &var in group {
            let low = choice.and(&self.variables.mk_not_var(var));
            let has_low = low.exists(group);
            let high = choice.and(&self.variables.mk_var(var)).and(&has_low.not());
            choice = low.or(&high);
        }
        choice
    }

    /// Writes one Graphviz digraph per labelled function.
    pub fn dump_dot(&self, functions: &[(String, Bdd)], path: &Path) -> Result<()> {
        let mut dot = String::new();
        for (label, function) in functions {
            dot.push_str(&format!("// {label}\n"));
            dot.push_str(&function.to_dot_string(&self.variables, true));
            dot.push('\n');
        }
        std::fs::write(path, dot).with_context(|| format!("Failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_util::partition;

    #[test]
    fn partition_must_cover_names() {
        let mut builder = VarMgrBuilder::new();
        builder.create_named_variables(["a", "b"]);
        assert!(builder.build(&partition(&["a"], &[])).is_err());

        let mut builder = VarMgrBuilder::new();
        builder.create_named_variables(["a"]);
        assert!(builder.build(&partition(&["a"], &["a"])).is_err());

        let mut builder = VarMgrBuilder::new();
        builder.create_named_variables(["a"]);
        let var_mgr = builder.build(&partition(&["a"], &["c"])).unwrap();
        assert_eq!(var_mgr.output_labels(), vec!["c".to_string()]);
        assert_eq!(var_mgr.input_variables().len(), 1);
    }

    #[test]
    fn vector_compose_is_simultaneous() {
        let mut builder = VarMgrBuilder::new();
        builder.create_named_variables(["x"]);
        let id = builder.create_state_variables(2);
        let var_mgr = builder.build(&partition(&["x"], &[])).unwrap();

        let vars = var_mgr.variables();
        let state_vars = var_mgr.state_variables(id);
        let (z0, z1) = (vars.mk_var(state_vars[0].current), vars.mk_var(state_vars[1].current));
        let x = vars.mk_var(var_mgr.name_to_variable("x").unwrap());

        // Swapping both bits must not let the first substitution leak into the second.
        let f = z0.and(&z1.not());
        let composed = var_mgr.vector_compose(&f, id, &[z1.clone(), z0.clone().or(&x)]);
        assert!(equivalent(&composed, &z1.and(&z0.or(&x).not())));
    }

    #[test]
    fn compatible_projection_keeps_one_choice() {
        let mut builder = VarMgrBuilder::new();
        builder.create_named_variables(["x", "y0", "y1"]);
        let var_mgr = builder.build(&partition(&["x"], &["y0", "y1"])).unwrap();

        let vars = var_mgr.variables();
        let var = |name| vars.mk_var(var_mgr.name_to_variable(name).unwrap());
        let (x, y0, y1) = (var("x"), var("y0"), var("y1"));

        // With x every output choice but (0, 0) is allowed; without x only (1, 1) is.
        let f = x.and(&y0.or(&y1)).or(&x.not().and(&y0).and(&y1));
        let projected = var_mgr.compatible_projection(&f, var_mgr.output_variables());

        assert!(equivalent(&projected, &x.and(&y0.not()).and(&y1).or(&x.not().and(&y0).and(&y1))));
        assert!(equivalent(&projected.exists(var_mgr.output_variables()), &f.exists(var_mgr.output_variables())));
    }
}
