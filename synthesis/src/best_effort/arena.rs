use std::time::Instant;

use anyhow::Result;
use biodivine_lib_bdd::Bdd;

use crate::dfa::{ExplicitDfa, SymbolicDfa};
use crate::ltlf::{DfaTranslator, Formula};
use crate::timing::{Phase, RunningTimes};
use crate::vars::InputOutputPartition;

/// How the three best-effort automata are obtained from the goal `Phi` and the assumption `E`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Construction {
    /// One translation per combined formula: `E -> Phi`, `!E` and `Phi && E`.
    Monolithic,
    /// Translations of `Phi` and `E` only, combined with explicit products and complements.
    ExplicitCompositional,
    /// Translations of `Phi`, `E` and `F(true)`, combined by the symbolic product.
    SymbolicCompositional,
}

/// The product arena shared by the three best-effort games, with one goal per game.
pub struct BestEffortArena {
    pub arena: SymbolicDfa,
    pub adversarial_goal: Bdd,
    pub negated_env_goal: Bdd,
    pub cooperative_goal: Bdd,
}

impl BestEffortArena {
    pub fn build(
        translator: &dyn DfaTranslator,
        construction: Construction,
        agent_goal: &Formula,
        env_assumption: &Formula,
        partition: &InputOutputPartition,
        running_times: &mut RunningTimes,
    ) -> Result<Self> {
        let now = Instant::now();
        let dfas = match construction {
            Construction::Monolithic => vec![
                translator.translate(&Formula::implies(env_assumption, agent_goal))?,
                translator.translate(&Formula::not(env_assumption))?,
                translator.translate(&Formula::and([agent_goal, env_assumption]))?,
            ],
            Construction::ExplicitCompositional => {
                let goal = translator.translate(agent_goal)?;
                let env = translator.translate(env_assumption)?;
                let non_empty = ExplicitDfa::non_empty();

                let implication = ExplicitDfa::product([&env, &goal.negation(), &non_empty]).negation();
                vec![
                    ExplicitDfa::product([&implication, &non_empty]),
                    ExplicitDfa::product([&env.negation(), &non_empty]),
                    ExplicitDfa::product([&env, &goal, &non_empty]),
                ]
            }
            Construction::SymbolicCompositional => vec![
                translator.translate(agent_goal)?,
                translator.translate(env_assumption)?,
                translator.translate(&Formula::NonEmpty)?,
            ],
        };
        log::debug!("Automata sizes: {:?}", dfas.iter().map(ExplicitDfa::state_count).collect::<Vec<_>>());
        running_times.record(Phase::DfaConstruction, now.elapsed());

        let now = Instant::now();
        let symbolic = SymbolicDfa::encode_all(&dfas, partition)?;
        let arena = SymbolicDfa::product(&symbolic);

        let [first, second, third] = [0, 1, 2].map(|i| symbolic[i].final_states().clone());
        let (adversarial_goal, negated_env_goal, cooperative_goal) = match construction {
            Construction::Monolithic | Construction::ExplicitCompositional => (first, second, third),
            Construction::SymbolicCompositional => {
                let (goal, env) = (first, second);
                let initial = arena.initial_state_bdd();
                (
                    implication_goal(&goal, &env, &initial),
                    env.not().and_not(&initial),
                    env.and(&goal).and_not(&initial),
                )
            }
        };
        running_times.record(Phase::SymbolicConstruction, now.elapsed());

        Ok(Self { arena, adversarial_goal, negated_env_goal, cooperative_goal })
    }
}

/// `(¬env ∨ goal) ∧ ¬initial`: the implication, restricted to non-empty traces.
pub(crate) fn implication_goal(goal: &Bdd, env: &Bdd, initial: &Bdd) -> Bdd {
    env.not().or(goal).and_not(initial)
}
