use std::fmt;

use serde::{Deserialize, Serialize};

/// Mission-wide flight phase.
///
/// Phases are totally ordered and only ever advance; `Idle` is the state
/// before the mission loop starts and is never re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Idle,
    Prelaunch,
    Launch,
    Liftoff,
    Pitch,
    Coast,
    Circularize,
    Finalize,
    Done,
}

impl Phase {
    pub const ALL: [Phase; 9] = [
        Phase::Idle,
        Phase::Prelaunch,
        Phase::Launch,
        Phase::Liftoff,
        Phase::Pitch,
        Phase::Coast,
        Phase::Circularize,
        Phase::Finalize,
        Phase::Done,
    ];

    /// Name reported on the status channel.
    pub fn name(self) -> &'static str {
        match self {
            Phase::Idle => "IDLE",
            Phase::Prelaunch => "PRELAUNCH",
            Phase::Launch => "LAUNCH",
            Phase::Liftoff => "LIFTOFF",
            Phase::Pitch => "PITCH",
            Phase::Coast => "COAST",
            Phase::Circularize => "CIRCULARIZE",
            Phase::Finalize => "FINALIZE",
            Phase::Done => "DONE",
        }
    }

    /// The phase that follows this one, `None` for `Done`.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Idle => Some(Phase::Prelaunch),
            Phase::Prelaunch => Some(Phase::Launch),
            Phase::Launch => Some(Phase::Liftoff),
            Phase::Liftoff => Some(Phase::Pitch),
            Phase::Pitch => Some(Phase::Coast),
            Phase::Coast => Some(Phase::Circularize),
            Phase::Circularize => Some(Phase::Finalize),
            Phase::Finalize => Some(Phase::Done),
            Phase::Done => None,
        }
    }

    /// Look a phase up by its status name.
    pub fn from_name(name: &str) -> Option<Phase> {
        Phase::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
