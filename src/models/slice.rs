use serde::Serialize;

use super::{TimeStep, ID};

/// One entry of the Gantt history: `process` ran over `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionSlice {
    pub process: ID,
    pub name: String,
    pub start: TimeStep,
    pub end: TimeStep,
}

impl ExecutionSlice {
    pub fn new(process: ID, name: &str, start: TimeStep, end: TimeStep) -> Self {
        Self {
            process,
            name: name.to_string(),
            start,
            end,
        }
    }

    pub fn duration(&self) -> TimeStep {
        self.end - self.start
    }
}
