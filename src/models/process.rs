use super::{TimeStep, ID};

#[derive(Clone, Debug, PartialEq)]
pub struct Process {
    id: ID,
    name: String,
    arrival: TimeStep,                 // Time at which the process becomes eligible.
    burst: TimeStep,                   // Total CPU time required.
    remaining: TimeStep,               // CPU time still owed.
    first_dispatch: Option<TimeStep>,  // Set once, on the first slice.
    completion: Option<TimeStep>,      // Set once, when `remaining` reaches 0.
}

impl Process {
    pub fn new(id: ID, name: String, arrival: TimeStep, burst: TimeStep) -> Self {
        Self {
            id,
            name,
            arrival,
            burst,
            remaining: burst,
            first_dispatch: None,
            completion: None,
        }
    }

    pub fn id(&self) -> ID {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arrival(&self) -> TimeStep {
        self.arrival
    }

    pub fn burst(&self) -> TimeStep {
        self.burst
    }

    pub fn remaining(&self) -> TimeStep {
        self.remaining
    }

    pub fn first_dispatch(&self) -> Option<TimeStep> {
        self.first_dispatch
    }

    pub fn completion(&self) -> Option<TimeStep> {
        self.completion
    }

    /// A burst-0 process is not complete until it has been dispatched once.
    pub fn is_complete(&self) -> bool {
        self.completion.is_some()
    }

    pub fn has_arrived(&self, t: TimeStep) -> bool {
        self.arrival <= t
    }

    /// Runs the process for at most `quantum` units starting at `start`.
    ///
    /// Returns the length of the slice actually used.
    pub fn run(&mut self, start: TimeStep, quantum: TimeStep) -> TimeStep {
        if self.first_dispatch.is_none() {
            self.first_dispatch = Some(start);
        }

        let exec_time = quantum.min(self.remaining);
        self.remaining -= exec_time;

        if self.remaining == 0 {
            self.completion = Some(start + exec_time);
        }
        exec_time
    }

    pub fn reset(&mut self) {
        self.remaining = self.burst;
        self.first_dispatch = None;
        self.completion = None;
    }
}
