use biodivine_lib_bdd::{Bdd, BddValuation, BddVariable};

use crate::IndexMap;

mod transducer;

pub use transducer::Transducer;

/// One function over state and input variables per output variable, in output order.
#[derive(Clone, Debug, Default)]
pub struct OutputFunction {
    functions: IndexMap<BddVariable, Bdd>,
}

impl OutputFunction {
    pub fn get(&self, output: BddVariable) -> Option<&Bdd> {
        self.functions.get(&output)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BddVariable, &Bdd)> {
        self.functions.iter().map(|(&var, f)| (var, f))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Output values chosen in the state and inputs fixed by `valuation`.
    pub fn eval(&self, valuation: &BddValuation) -> Vec<bool> {
        self.functions.values().map(|f| f.eval_in(valuation)).collect()
    }
}

impl FromIterator<(BddVariable, Bdd)> for OutputFunction {
    fn from_iter<I: IntoIterator<Item = (BddVariable, Bdd)>>(iter: I) -> Self {
        Self { functions: iter.into_iter().collect() }
    }
}
