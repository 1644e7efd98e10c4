use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

use log::info;

use crate::models::scheduler::Scheduler;
use crate::models::{timeline, FinalStats, Outcome, SimulationEvent, TimeStep};

/// Iterator over the events of a run, pulling one decision from the engine at a time.
///
/// Ends right after the `Completion` event; a fresh run needs a fresh (or reset) engine.
pub struct Events<'a, S: Scheduler> {
    scheduler: &'a mut S,
    pending: VecDeque<SimulationEvent>,
    done: bool,
}

impl<'a, S: Scheduler> Events<'a, S> {
    pub fn new(scheduler: &'a mut S) -> Self {
        Self {
            scheduler,
            pending: VecDeque::new(),
            done: false,
        }
    }
}

impl<S: Scheduler> Iterator for Events<'_, S> {
    type Item = SimulationEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending.is_empty() && !self.done {
            self.pending.extend(self.scheduler.step());
        }

        let event = self.pending.pop_front()?;
        if event.is_completion() {
            self.done = true;
        }
        Some(event)
    }
}

/// Receiver of the events of a run. It renders them and never influences scheduling.
pub trait PresentationSink {
    fn on_start(&mut self, _quantum: TimeStep) {}

    fn on_arrival(&mut self, time: TimeStep, name: &str);

    fn on_dispatch(&mut self, name: &str, start: TimeStep, end: TimeStep, outcome: Outcome);

    /// The dispatched process was requeued or completed, after this slice's arrivals.
    fn on_slice_end(&mut self, _time: TimeStep, _name: &str, _outcome: Outcome) {}

    fn on_idle(&mut self, time: TimeStep);

    fn on_complete(&mut self, stats: &FinalStats);
}

/// Routes one event to the matching sink callback.
pub fn deliver(event: &SimulationEvent, sink: &mut dyn PresentationSink) {
    match event {
        SimulationEvent::Started { quantum } => sink.on_start(*quantum),
        SimulationEvent::Arrival { time, name, .. } => sink.on_arrival(*time, name),
        SimulationEvent::Dispatch { name, start, end, outcome, .. } => {
            sink.on_dispatch(name, *start, *end, *outcome)
        }
        SimulationEvent::SliceEnd { time, name, outcome, .. } => {
            sink.on_slice_end(*time, name, *outcome)
        }
        SimulationEvent::Idle { time } => sink.on_idle(*time),
        SimulationEvent::Completion(stats) => sink.on_complete(stats),
    }
}

/// Drives `scheduler` to completion, feeding every event to `sink`.
///
/// # Arguments
/// * `scheduler` - The engine to drive.
/// * `sink` - Where the events go.
/// * `delay` - Pause after each decision, for an animated replay. `None` runs a tight loop.
///
/// # Returns
/// The final statistics of the run.
pub fn simulation<S: Scheduler>(
    scheduler: &mut S,
    sink: &mut dyn PresentationSink,
    delay: Option<Duration>,
) -> FinalStats {
    loop {
        let events = scheduler.step();
        for event in &events {
            deliver(event, sink);
        }

        if let Some(SimulationEvent::Completion(stats)) = events.last() {
            return stats.clone();
        }
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
    }
}

/// Sink keeping the execution timeline as text lines.
///
/// Lines are printed to stdout as they come when echoing, logged otherwise.
#[derive(Debug, Default)]
pub struct TimelineLog {
    lines: Vec<String>,
    echo: bool,
}

impl TimelineLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn echoing() -> Self {
        Self {
            lines: Vec::new(),
            echo: true,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn push(&mut self, line: String) {
        if self.echo {
            println!("{}", line);
        } else {
            info!("{}", line);
        }
        self.lines.push(line);
    }
}

impl PresentationSink for TimelineLog {
    fn on_start(&mut self, quantum: TimeStep) {
        for line in timeline::started(quantum) {
            self.push(line);
        }
    }

    fn on_arrival(&mut self, time: TimeStep, name: &str) {
        self.push(timeline::arrival(time, name));
    }

    fn on_dispatch(&mut self, name: &str, start: TimeStep, end: TimeStep, _: Outcome) {
        self.push(timeline::dispatch(name, start, end));
    }

    fn on_slice_end(&mut self, time: TimeStep, name: &str, outcome: Outcome) {
        self.push(timeline::slice_end(time, name, outcome));
    }

    fn on_idle(&mut self, time: TimeStep) {
        self.push(timeline::idle(time));
    }

    fn on_complete(&mut self, _: &FinalStats) {
        self.push(timeline::completed());
    }
}
