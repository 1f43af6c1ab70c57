use std::fmt;

use anyhow::{Context, Result};

use crate::dfa::ExplicitDfa;
use crate::Map;

/// The formulas the orchestrators ask the translator for, built around opaque specifications.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Formula {
    Spec(String),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    /// Holds on every non-empty trace.
    NonEmpty,
}

impl Formula {
    pub fn spec(text: impl Into<String>) -> Formula {
        Formula::Spec(text.into())
    }

    pub fn not(formula: &Formula) -> Formula {
        Formula::Not(Box::new(formula.clone()))
    }

    pub fn and<'a>(formulas: impl IntoIterator<Item = &'a Formula>) -> Formula {
        Formula::And(formulas.into_iter().cloned().collect())
    }

    pub fn implies(premise: &Formula, conclusion: &Formula) -> Formula {
        Formula::Implies(Box::new(premise.clone()), Box::new(conclusion.clone()))
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Spec(text) => f.write_str(text),
            Formula::Not(inner) => write!(f, "!({inner})"),
            Formula::And(conjuncts) => {
                for (i, conjunct) in conjuncts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" && ")?;
                    }
                    write!(f, "({conjunct})")?;
                }
                Ok(())
            }
            Formula::Implies(premise, conclusion) => write!(f, "({premise}) -> ({conclusion})"),
            Formula::NonEmpty => f.write_str("F(true)"),
        }
    }
}

/// LTLf to DFA translation, with non-empty trace semantics.
pub trait DfaTranslator {
    fn translate(&self, formula: &Formula) -> Result<ExplicitDfa>;
}

/// Translator backed by ready-made automata for the atomic specifications. Compound formulas
/// are realised with explicit products and complements.
#[derive(Clone, Debug, Default)]
pub struct SpecLibrary {
    dfas: Map<String, ExplicitDfa>,
}

impl SpecLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, spec: impl Into<String>, dfa: ExplicitDfa) {
        self.dfas.insert(spec.into(), dfa);
    }

    fn compose(&self, formula: &Formula) -> Result<ExplicitDfa> {
        Ok(match formula {
            Formula::Spec(text) => self.dfas.get(text).cloned().with_context(|| format!("No automaton for {text}"))?,
            Formula::Not(inner) => self.compose(inner)?.negation(),
            Formula::And(conjuncts) => {
                let dfas = conjuncts.iter().map(|c| self.compose(c)).collect::<Result<Vec<_>>>()?;
                ExplicitDfa::product(&dfas)
            }
            Formula::Implies(premise, conclusion) => {
                let premise = self.compose(premise)?;
                let violated = self.compose(conclusion)?.negation();
                ExplicitDfa::product([&premise, &violated]).negation()
            }
            Formula::NonEmpty => ExplicitDfa::non_empty(),
        })
    }
}

impl DfaTranslator for SpecLibrary {
    fn translate(&self, formula: &Formula) -> Result<ExplicitDfa> {
        let dfa = self.compose(formula).with_context(|| format!("Failed to translate {formula}"))?;
        Ok(ExplicitDfa::product([&dfa, &ExplicitDfa::non_empty()]))
    }
}
