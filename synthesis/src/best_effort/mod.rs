use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use biodivine_lib_bdd::Bdd;

use crate::game::{Player, ReachabilitySynthesizer, SynthesisResult};
use crate::ltlf::{DfaTranslator, Formula};
use crate::strategy::{OutputFunction, Transducer};
use crate::timing::{Phase, RunningTimes};
use crate::vars::{InputOutputPartition, StateVector, VarMgr};

mod arena;
mod dominance;


pub use arena::{BestEffortArena, Construction};
pub(crate) use arena::implication_goal;
pub use dominance::{cooperative_moves, Dominance, DominanceCheck};

#[derive(Clone)]
pub struct BestEffortSynthesisResult {
    pub adversarial: SynthesisResult,
    pub cooperative: SynthesisResult,
    /// Only decided when the dominance check runs, except in the trivial cases where the
    /// adversarial game is won or the cooperative one is lost.
    pub dominant: bool,
    /// The state that disproves dominance, if one was found.
    pub witness: Option<StateVector>,
}

/// Best-effort synthesis of an agent goal under an environment assumption.
pub struct BestEffortSynthesizer {
    arena: BestEffortArena,
    starting_player: Player,
    dominance_check: bool,
    running_times: RunningTimes,
}

impl BestEffortSynthesizer {
    pub fn new(
        translator: &dyn DfaTranslator,
        construction: Construction,
        agent_goal: &str,
        env_assumption: &str,
        partition: &InputOutputPartition,
        starting_player: Player,
        dominance_check: bool,
    ) -> Result<Self> {
        let mut running_times = RunningTimes::default();
        let arena = BestEffortArena::build(
            translator,
            construction,
            &Formula::spec(agent_goal),
            &Formula::spec(env_assumption),
            partition,
            &mut running_times,
        )?;
        Ok(Self { arena, starting_player, dominance_check, running_times })
    }

    pub fn arena(&self) -> &BestEffortArena {
        &self.arena
    }

    pub fn var_mgr(&self) -> &VarMgr {
        self.arena.arena.var_mgr()
    }

    pub fn running_times(&self) -> &RunningTimes {
        &self.running_times
    }

    pub fn run(&mut self) -> BestEffortSynthesisResult {
        let BestEffortArena { arena, adversarial_goal, negated_env_goal, cooperative_goal } = &self.arena;
        let starting_player = self.starting_player;

        let now = Instant::now();
        let adversarial =
            ReachabilitySynthesizer::adversarial(arena.clone(), starting_player, Player::Agent, adversarial_goal.clone(), arena.state_space().clone())
                .run();
        self.running_times.record(Phase::AdversarialGame, now.elapsed());

        if adversarial.realizability {
            log::info!("Adversarially realizable, the winning strategy is also cooperative");
            return BestEffortSynthesisResult { cooperative: adversarial.clone(), adversarial, dominant: true, witness: None };
        }

        let now = Instant::now();
        let env_losing =
            ReachabilitySynthesizer::adversarial(arena.clone(), starting_player, Player::Agent, negated_env_goal.clone(), arena.state_space().clone())
                .fixpoint();
        let env_valid = arena.restriction(&env_losing.winning_states);
        let cooperative_game = ReachabilitySynthesizer::cooperative(
            env_valid.clone(),
            starting_player,
            Player::Agent,
            cooperative_goal.clone(),
            env_valid.state_space().clone(),
        );
        let cooperative_fixpoint = cooperative_game.fixpoint();
        let cooperative = cooperative_game.result_of(&cooperative_fixpoint);
        self.running_times.record(Phase::CooperativeGame, now.elapsed());

        let (dominant, witness) = match (&cooperative.transducer, cooperative.realizability, self.dominance_check) {
            (Some(transducer), true, true) => {
                let now = Instant::now();
                let check = DominanceCheck::new(
                    &env_valid,
                    starting_player,
                    &adversarial.winning_states,
                    &cooperative_fixpoint,
                    transducer.output_function(),
                );
                let dominance = check.run();
                self.running_times.record(Phase::DominanceCheck, now.elapsed());
                match dominance {
                    Dominance::Dominant => (true, None),
                    Dominance::NotDominant(state) => (false, Some(state)),
                }
            }
            (_, true, _) => (false, None),
            (_, false, _) => (true, None),
        };

        BestEffortSynthesisResult { adversarial, cooperative, dominant, witness }
    }

    /// The adversarial strategy on the adversarial winning region, the cooperative one on the
    /// rest of the cooperative winning region.
    pub fn merge(&self, result: &BestEffortSynthesisResult) -> OutputFunction {
        merge_strategies(self.var_mgr(), result)
    }

    pub fn dump_strategy(&self, result: &BestEffortSynthesisResult, path: &Path) -> Result<()> {
        let var_mgr = self.var_mgr();
        let merged = self.merge(result);
        let labelled = var_mgr.output_labels().into_iter().zip(merged.iter().map(|(_, f)| f.clone())).collect::<Vec<_>>();
        var_mgr.dump_dot(&labelled, path)
    }
}

pub fn merge_strategies(var_mgr: &VarMgr, result: &BestEffortSynthesisResult) -> OutputFunction {
    let adversarial_region = &result.adversarial.winning_states;
    let cooperative_region = result.cooperative.winning_states.and_not(adversarial_region);

    let restricted = |transducer: &Option<Transducer>, output, region: &Bdd| match transducer {
        Some(transducer) => transducer.output_function().get(output).map_or_else(|| var_mgr.mk_false(), |f| f.and(region)),
        None => var_mgr.mk_false(),
    };

    var_mgr
        .output_variables()
        .iter()
        .map(|&output| {
            let adversarial = restricted(&result.adversarial.transducer, output, adversarial_region);
            let cooperative = restricted(&result.cooperative.transducer, output, &cooperative_region);
            (output, adversarial.or(&cooperative))
        })
        .collect()
}
