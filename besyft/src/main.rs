use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use besyft::{load_library, read_partition, DfaFile};
use clap::{Parser, ValueEnum};
use synthesis::best_effort::{BestEffortSynthesizer, Construction};
use synthesis::game::Player;
use synthesis::reactive::{ReactiveConstruction, ReactiveSynthesizer};
use synthesis::timing::{Phase, RunningTimes};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StartingPlayer {
    Agent,
    Environment,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Algorithm {
    Monolithic,
    ExplicitCompositional,
    SymbolicCompositional,
    ReactiveMonolithic,
    ReactiveCompositional,
}

#[derive(Parser)]
#[command(author, version, about = "Reactive and best-effort synthesis of LTLf goals under LTLf assumptions", long_about = None)]
struct Args {
    /// DFA file of the agent goal
    #[arg(short, long)]
    agent_file: PathBuf,
    /// DFA file of the environment assumption
    #[arg(short, long)]
    env_file: PathBuf,
    #[arg(short, long)]
    partition_file: PathBuf,
    #[arg(short, long, value_enum)]
    starting_player: StartingPlayer,
    #[arg(short = 't', long, value_enum)]
    algorithm: Algorithm,
    /// Check whether the best-effort strategy is dominant
    #[arg(short = 'c', long)]
    dominance_check: bool,
    /// Write the output functions of the computed strategy as Graphviz digraphs
    #[arg(short = 'd', long)]
    print_strategy: Option<PathBuf>,
    /// Append a CSV row with the running times and the verdict
    #[arg(short = 'f', long)]
    save_results: Option<PathBuf>,
}

/// What ends up in the last columns of the results file.
struct Outcome {
    realizability: &'static str,
    dominance: &'static str,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let agent = DfaFile::read(&args.agent_file)?;
    let env = DfaFile::read(&args.env_file)?;
    let partition = read_partition(&args.partition_file)?;
    log::info!("Agent goal: {}", agent.formula);
    log::info!("Environment assumption: {}", env.formula);

    let library = load_library(&[agent.clone(), env.clone()]);
    let starting_player = match args.starting_player {
        StartingPlayer::Agent => Player::Agent,
        StartingPlayer::Environment => Player::Environment,
    };

    let construction = match args.algorithm {
        Algorithm::Monolithic => Some(Construction::Monolithic),
        Algorithm::ExplicitCompositional => Some(Construction::ExplicitCompositional),
        Algorithm::SymbolicCompositional => Some(Construction::SymbolicCompositional),
        Algorithm::ReactiveMonolithic | Algorithm::ReactiveCompositional => None,
    };

    let (running_times, outcome) = match construction {
        Some(construction) => {
            let mut synthesizer = BestEffortSynthesizer::new(
                &library,
                construction,
                &agent.formula,
                &env.formula,
                &partition,
                starting_player,
                args.dominance_check,
            )?;
            let result = synthesizer.run();

            let realizability = if result.adversarial.realizability {
                log::info!("Adversarially realizable, computed a winning strategy");
                "Adv"
            } else if result.cooperative.realizability {
                log::info!("Cooperatively realizable, computed a best-effort strategy");
                "Coop"
            } else {
                log::info!("Unrealizable, every strategy is best-effort");
                "Unr"
            };
            let dominance = match (args.dominance_check || !result.cooperative.realizability, result.dominant) {
                (_, true) => "Dom",
                (true, false) => "NoDom",
                (false, false) => "NA",
            };
            if let Some(state) = &result.witness {
                log::info!("Not dominant, state {state} admits distinct cooperative choices");
            }

            if let Some(path) = &args.print_strategy {
                synthesizer.dump_strategy(&result, path)?;
                log::info!("Strategy written to {}", path.display());
            }
            (synthesizer.running_times().clone(), Outcome { realizability, dominance })
        }
        None => {
            let construction = match args.algorithm {
                Algorithm::ReactiveMonolithic => ReactiveConstruction::Monolithic,
                _ => ReactiveConstruction::SymbolicCompositional,
            };
            let mut synthesizer =
                ReactiveSynthesizer::new(&library, construction, &agent.formula, &env.formula, &partition, starting_player)?;
            let result = synthesizer.run();

            let realizability = match result.realizability {
                true => "Real",
                false => "Unreal",
            };
            log::info!("{}", if result.realizability { "Realizable" } else { "Unrealizable" });

            if let (Some(path), Some(transducer)) = (&args.print_strategy, &result.transducer) {
                transducer.dump_dot(path)?;
                log::info!("Strategy written to {}", path.display());
            }
            (synthesizer.running_times().clone(), Outcome { realizability, dominance: "NA" })
        }
    };

    log::info!("Total running time: {:.3}s", running_times.total().as_secs_f64());

    if let Some(path) = &args.save_results {
        save_results(path, &args, &running_times, &outcome)?;
    }
    Ok(())
}

fn save_results(path: &Path, args: &Args, running_times: &RunningTimes, outcome: &Outcome) -> Result<()> {
    let algorithm = args.algorithm.to_possible_value().map(|v| v.get_name().to_string()).unwrap_or_default();
    let player = match args.starting_player {
        StartingPlayer::Agent => "Agent",
        StartingPlayer::Environment => "Environment",
    };
    let times = Phase::ALL.iter().map(|&phase| match running_times.get(phase) {
        Some(time) => time.as_secs_f64().to_string(),
        None => "NA".to_string(),
    });

    let mut row = vec![algorithm, args.agent_file.display().to_string(), args.env_file.display().to_string(), player.to_string()];
    row.extend(times);
    row.push(running_times.total().as_secs_f64().to_string());
    row.push(outcome.realizability.to_string());
    row.push(outcome.dominance.to_string());

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    writeln!(file, "{}", row.join(",")).with_context(|| format!("Failed to write {}", path.display()))
}
