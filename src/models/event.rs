use std::fmt;

use super::{FinalStats, TimeStep, ID};
use crate::utils::constants::TIMELINE_PREFIX;

/// What happened to the dispatched process once its slice ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Requeued,
    Completed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Requeued => write!(f, "requeued"),
            Outcome::Completed => write!(f, "completed"),
        }
    }
}

/// An immutable record of one scheduling decision, handed to the presentation side.
///
/// A dispatch is reported as `Dispatch`, then the arrivals admitted while the slice
/// ran, then `SliceEnd` with what became of the dispatched process.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    Started {
        quantum: TimeStep,
    },
    Arrival {
        time: TimeStep,
        process: ID,
        name: String,
    },
    Dispatch {
        process: ID,
        name: String,
        start: TimeStep,
        end: TimeStep,
        outcome: Outcome,
    },
    SliceEnd {
        time: TimeStep,
        process: ID,
        name: String,
        outcome: Outcome,
    },
    // No process ready although work remains
    Idle {
        time: TimeStep,
    },
    Completion(FinalStats),
}

impl SimulationEvent {
    pub fn is_completion(&self) -> bool {
        matches!(self, SimulationEvent::Completion(_))
    }
}

/// Execution timeline lines, one function per kind of entry.
pub mod timeline {
    use super::{Outcome, TimeStep, TIMELINE_PREFIX};

    pub fn started(quantum: TimeStep) -> [String; 2] {
        [
            format!("{} Simulation started", TIMELINE_PREFIX),
            format!("{} Time quantum: {}", TIMELINE_PREFIX, quantum),
        ]
    }

    pub fn arrival(time: TimeStep, name: &str) -> String {
        format!("{} Time {}: {} arrived", TIMELINE_PREFIX, time, name)
    }

    pub fn dispatch(name: &str, start: TimeStep, end: TimeStep) -> String {
        format!(
            "{} Time {}-{}: {} executes for {} units",
            TIMELINE_PREFIX,
            start,
            end,
            name,
            end - start
        )
    }

    pub fn slice_end(time: TimeStep, name: &str, outcome: Outcome) -> String {
        format!("{} Time {}: {} {}", TIMELINE_PREFIX, time, name, outcome)
    }

    pub fn idle(time: TimeStep) -> String {
        format!("{} Time {}: CPU idle", TIMELINE_PREFIX, time)
    }

    pub fn completed() -> String {
        format!("{} Simulation completed", TIMELINE_PREFIX)
    }
}

impl fmt::Display for SimulationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationEvent::Started { quantum } => {
                let [started, quantum] = timeline::started(*quantum);
                write!(f, "{}\n{}", started, quantum)
            }
            SimulationEvent::Arrival { time, name, .. } => {
                write!(f, "{}", timeline::arrival(*time, name))
            }
            SimulationEvent::Dispatch { name, start, end, .. } => {
                write!(f, "{}", timeline::dispatch(name, *start, *end))
            }
            SimulationEvent::SliceEnd { time, name, outcome, .. } => {
                write!(f, "{}", timeline::slice_end(*time, name, *outcome))
            }
            SimulationEvent::Idle { time } => write!(f, "{}", timeline::idle(*time)),
            SimulationEvent::Completion(_) => write!(f, "{}", timeline::completed()),
        }
    }
}
