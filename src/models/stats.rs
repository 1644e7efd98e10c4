use std::fmt;

use average::Mean;
use serde::Serialize;

use super::{ExecutionSlice, ProcessSet, TimeStep, ID};

/// Final figures of one process, derived from the Gantt history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessStats {
    pub id: ID,
    pub name: String,
    pub arrival: TimeStep,
    pub burst: TimeStep,
    pub completion: TimeStep,
    pub turnaround: TimeStep, // completion - arrival
    pub waiting: TimeStep,    // turnaround - burst
    pub response: TimeStep,   // first dispatch - arrival
    pub slices: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinalStats {
    processes: Vec<ProcessStats>,
    average_turnaround: f64,
    average_waiting: f64,
    average_response: f64,
    makespan: TimeStep,
    busy_time: TimeStep,
}

impl FinalStats {
    /// Computes the statistics of a finished run.
    ///
    /// Completion and first dispatch of every process are read back from `gantt`,
    /// so the figures always agree with the recorded schedule. A process with no
    /// slice (only possible for an empty history) is reported as completing on arrival.
    pub fn from_history(process_set: &ProcessSet, gantt: &[ExecutionSlice]) -> Self {
        let processes: Vec<ProcessStats> = process_set
            .iter()
            .map(|process| {
                let own: Vec<&ExecutionSlice> =
                    gantt.iter().filter(|s| s.process == process.id()).collect();
                let first_start = own.first().map_or(process.arrival(), |s| s.start);
                let completion = own.last().map_or(process.arrival(), |s| s.end);
                let turnaround = completion - process.arrival();

                debug_assert!(
                    turnaround >= process.burst(),
                    "process {} finished before doing its work",
                    process.id()
                );

                ProcessStats {
                    id: process.id(),
                    name: process.name().to_string(),
                    arrival: process.arrival(),
                    burst: process.burst(),
                    completion,
                    turnaround,
                    waiting: turnaround.saturating_sub(process.burst()),
                    response: first_start - process.arrival(),
                    slices: own.len(),
                }
            })
            .collect();

        let mean = |f: fn(&ProcessStats) -> TimeStep| -> f64 {
            if processes.is_empty() {
                return 0.0;
            }
            processes.iter().map(|p| f(p) as f64).collect::<Mean>().mean()
        };
        let average_turnaround = mean(|p| p.turnaround);
        let average_waiting = mean(|p| p.waiting);
        let average_response = mean(|p| p.response);

        Self {
            average_turnaround,
            average_waiting,
            average_response,
            makespan: gantt.iter().map(|s| s.end).max().unwrap_or(0),
            busy_time: gantt.iter().map(|s| s.duration()).sum(),
            processes,
        }
    }

    pub fn processes(&self) -> &[ProcessStats] {
        &self.processes
    }

    pub fn get(&self, id: ID) -> Option<&ProcessStats> {
        self.processes.get(id)
    }

    /// First process reported under `name`; with duplicate names allowed, prefer `get`.
    pub fn by_name(&self, name: &str) -> Option<&ProcessStats> {
        self.processes.iter().find(|p| p.name == name)
    }

    pub fn average_turnaround(&self) -> f64 {
        self.average_turnaround
    }

    pub fn average_waiting(&self) -> f64 {
        self.average_waiting
    }

    pub fn average_response(&self) -> f64 {
        self.average_response
    }

    /// End of the last slice.
    pub fn makespan(&self) -> TimeStep {
        self.makespan
    }

    /// Fraction of `[0, makespan)` the CPU spent executing.
    pub fn utilisation(&self) -> f64 {
        if self.makespan == 0 {
            return 0.0;
        }
        self.busy_time as f64 / self.makespan as f64
    }
}

impl fmt::Display for FinalStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Process Statistics:")?;
        writeln!(
            f,
            "{:<10}{:<10}{:<8}{:<12}{:<12}{:<10}{:<10}",
            "Process", "Arrival", "Burst", "Completion", "Turnaround", "Waiting", "Response"
        )?;
        writeln!(f, "{}", "-".repeat(72))?;

        for p in &self.processes {
            writeln!(
                f,
                "{:<10}{:<10}{:<8}{:<12}{:<12}{:<10}{:<10}",
                p.name, p.arrival, p.burst, p.completion, p.turnaround, p.waiting, p.response
            )?;
        }

        if !self.processes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Average Turnaround Time: {:.2}", self.average_turnaround)?;
            writeln!(f, "Average Waiting Time: {:.2}", self.average_waiting)?;
            writeln!(f, "Average Response Time: {:.2}", self.average_response)?;
            write!(f, "CPU Utilisation: {:.2}%", self.utilisation() * 100.0)?;
        }
        Ok(())
    }
}

/// Slices grouped per process, in process order: the data behind a time-usage chart.
pub fn time_usage<'a>(
    process_set: &ProcessSet,
    gantt: &'a [ExecutionSlice],
) -> Vec<(ID, Vec<&'a ExecutionSlice>)> {
    process_set
        .iter()
        .map(|p| (p.id(), gantt.iter().filter(|s| s.process == p.id()).collect()))
        .collect()
}
