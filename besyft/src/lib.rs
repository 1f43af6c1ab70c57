use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use chumsky::error::Simple;
use synthesis::dfa::{DfaStateId, ExplicitDfa};
use synthesis::index::IndexedVec;
use synthesis::ltlf::SpecLibrary;
use synthesis::vars::InputOutputPartition;

mod parser;


pub use parser::{parse_dfa, parse_partition, DfaSyntax};

const MAX_STATES: usize = 1 << 20;

/// An explicit automaton together with the formula text it was translated from.
#[derive(Clone, Debug)]
pub struct DfaFile {
    pub formula: String,
    pub dfa: ExplicitDfa,
}

fn syntax_error(errors: Vec<Simple<char>>) -> anyhow::Error {
    let messages = errors.iter().map(|e| format!("{e} at {:?}", e.span())).collect::<Vec<_>>();
    anyhow!("Syntax error: {}", messages.join("; "))
}

impl DfaFile {
    pub fn parse(source: &str) -> Result<Self> {
        let DfaSyntax { formula, vars, states, initial, accepting, edges } = parse_dfa(source).map_err(syntax_error)?;

        if states > MAX_STATES {
            bail!("{states} states exceed the limit of {MAX_STATES}")
        }
        if initial >= states {
            bail!("Initial state {initial} doesn't exist")
        }
        for &state in &accepting {
            if state >= states {
                bail!("Accepting state {state} doesn't exist")
            }
        }
        let mut transitions = IndexedVec::from(vec![Vec::new(); states]);
        for (source, target, guard) in edges {
            if source >= states {
                bail!("Transition from missing state {source}")
            }
            if target >= states {
                bail!("Transition from {source} to missing state {target}")
            }
            transitions[DfaStateId(source)].push((guard, DfaStateId(target)));
        }
        let accepting = (0..states).map(|s| accepting.contains(&s)).collect();

        let dfa = ExplicitDfa::new(vars, DfaStateId(initial), accepting, transitions)
            .with_context(|| format!("Invalid automaton for {formula}"))?;
        Ok(Self { formula, dfa })
    }

    pub fn read(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

pub fn read_partition(path: &Path) -> Result<InputOutputPartition> {
    let source = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_partition(&source).map_err(syntax_error).with_context(|| format!("Failed to parse {}", path.display()))
}

/// A translator answering for the formulas of the given files.
pub fn load_library(files: &[DfaFile]) -> SpecLibrary {
    let mut library = SpecLibrary::new();
    for file in files {
        library.insert(file.formula.clone(), file.dfa.clone());
    }
    library
}
