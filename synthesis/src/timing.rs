use std::fmt;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    DfaConstruction,
    SymbolicConstruction,
    AdversarialGame,
    CooperativeGame,
    DominanceCheck,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::DfaConstruction,
        Phase::SymbolicConstruction,
        Phase::AdversarialGame,
        Phase::CooperativeGame,
        Phase::DominanceCheck,
    ];

    fn position(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::DfaConstruction => "DFA construction",
            Phase::SymbolicConstruction => "Symbolic construction",
            Phase::AdversarialGame => "Adversarial game",
            Phase::CooperativeGame => "Cooperative game",
            Phase::DominanceCheck => "Dominance check",
        })
    }
}

/// Wall-clock time of each phase of a run.
#[derive(Clone, Debug, Default)]
pub struct RunningTimes {
    times: [Option<Duration>; 5],
}

impl RunningTimes {
    /// Reported in place of the time of a phase that didn't run.
    pub const ABSENT: f64 = -1.0;

    pub fn record(&mut self, phase: Phase, duration: Duration) {
        log::info!("{phase} done in {:.3}s", duration.as_secs_f64());
        self.times[phase.position()] = Some(duration);
    }

    pub fn get(&self, phase: Phase) -> Option<Duration> {
        self.times[phase.position()]
    }

    /// Seconds per phase, in the order of [`Phase::ALL`].
    pub fn as_seconds(&self) -> Vec<f64> {
        self.times.iter().map(|time| time.map_or(Self::ABSENT, |d| d.as_secs_f64())).collect()
    }

    pub fn total(&self) -> Duration {
        self.times.iter().flatten().sum()
    }
}
