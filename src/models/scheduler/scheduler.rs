use crate::core::Events;
use crate::models::{ExecutionSlice, FinalStats, SimulationEvent, TimeStep};

/// A step-wise scheduling engine.
///
/// The engine holds all of its state in its fields: a driver pauses it by not calling
/// `step` and resumes it by calling `step` again.
pub trait Scheduler {
    /// Takes exactly one scheduling decision and reports what happened.
    ///
    /// The first call opens with `Started`. Arrivals due at the current time come
    /// next, then the decision: `Idle`, the terminal `Completion`, or `Dispatch`
    /// followed by the arrivals during the slice and a closing `SliceEnd`.
    fn step(&mut self) -> Vec<SimulationEvent>;

    fn is_finished(&self) -> bool;

    /// Statistics of the run, once it has finished.
    fn stats(&self) -> Option<&FinalStats>;

    fn gantt(&self) -> &[ExecutionSlice];

    fn time(&self) -> TimeStep;

    /// Restores the state the engine had right after construction.
    fn reset(&mut self);

    /// Pull-based view of the run, one event at a time.
    fn events(&mut self) -> Events<'_, Self>
    where
        Self: Sized,
    {
        Events::new(self)
    }

    /// Steps until the terminal `Completion` event, which is the last element.
    fn run_all(&mut self) -> Vec<SimulationEvent>
    where
        Self: Sized,
    {
        self.events().collect()
    }
}
