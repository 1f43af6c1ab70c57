use std::time::Instant;

use anyhow::Result;
use biodivine_lib_bdd::Bdd;

use crate::best_effort::implication_goal;
use crate::dfa::SymbolicDfa;
use crate::game::{Player, ReachabilitySynthesizer, SynthesisResult};
use crate::ltlf::{DfaTranslator, Formula};
use crate::timing::{Phase, RunningTimes};
use crate::vars::InputOutputPartition;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReactiveConstruction {
    /// Translates `E -> Phi` as a whole.
    Monolithic,
    /// Symbolic product of `Phi`, `E` and `F(true)`.
    SymbolicCompositional,
}

/// Plain reactive synthesis of `E -> Phi`: only the adversarial game is played.
pub struct ReactiveSynthesizer {
    arena: SymbolicDfa,
    goal: Bdd,
    starting_player: Player,
    running_times: RunningTimes,
}

impl ReactiveSynthesizer {
    pub fn new(
        translator: &dyn DfaTranslator,
        construction: ReactiveConstruction,
        agent_goal: &str,
        env_assumption: &str,
        partition: &InputOutputPartition,
        starting_player: Player,
    ) -> Result<Self> {
        let mut running_times = RunningTimes::default();
        let (goal, env) = (Formula::spec(agent_goal), Formula::spec(env_assumption));

        let now = Instant::now();
        let dfas = match construction {
            ReactiveConstruction::Monolithic => vec![translator.translate(&Formula::implies(&env, &goal))?],
            ReactiveConstruction::SymbolicCompositional => vec![
                translator.translate(&goal)?,
                translator.translate(&env)?,
                translator.translate(&Formula::NonEmpty)?,
            ],
        };
        running_times.record(Phase::DfaConstruction, now.elapsed());

        let now = Instant::now();
        let symbolic = SymbolicDfa::encode_all(&dfas, partition)?;
        let arena = SymbolicDfa::product(&symbolic);
        let goal = match construction {
            ReactiveConstruction::Monolithic => arena.final_states().clone(),
            ReactiveConstruction::SymbolicCompositional => {
                implication_goal(symbolic[0].final_states(), symbolic[1].final_states(), &arena.initial_state_bdd())
            }
        };
        running_times.record(Phase::SymbolicConstruction, now.elapsed());

        Ok(Self { arena, goal, starting_player, running_times })
    }

    pub fn arena(&self) -> &SymbolicDfa {
        &self.arena
    }

    pub fn running_times(&self) -> &RunningTimes {
        &self.running_times
    }

    pub fn run(&mut self) -> SynthesisResult {
        let now = Instant::now();
        let game = ReachabilitySynthesizer::adversarial(
            self.arena.clone(),
            self.starting_player,
            Player::Agent,
            self.goal.clone(),
            self.arena.state_space().clone(),
        );
        let result = game.run();
        self.running_times.record(Phase::AdversarialGame, now.elapsed());
        result
    }
}
