use std::collections::VecDeque;

use log::{debug, info, trace};

use super::scheduler::Scheduler;
use crate::models::{ExecutionSlice, FinalStats, Outcome, ProcessSet, SimulationEvent, TimeStep, ID};
use crate::utils::{NamePolicy, ValidationError};

/// Preemptive round-robin over a single CPU with a fixed quantum.
#[derive(Debug, Clone)]
pub struct RoundRobin {
    process_set: ProcessSet,
    quantum: TimeStep,
    time: TimeStep,
    queue: VecDeque<ID>,         // Ready queue, FIFO
    admitted: Vec<bool>,         // Whether each process has entered the queue once
    started: bool,               // Start and seeded arrivals have been reported
    gantt: Vec<ExecutionSlice>,
    stats: Option<FinalStats>,
}

impl RoundRobin {
    /// Creates a simulation, rejecting duplicate process names.
    ///
    /// # Arguments
    /// * `names` - Display names of the processes.
    /// * `arrivals` - Arrival time of each process.
    /// * `bursts` - CPU time required by each process.
    /// * `quantum` - Maximum length of one slice.
    pub fn new<S: AsRef<str>>(
        names: &[S],
        arrivals: &[i64],
        bursts: &[i64],
        quantum: i64,
    ) -> Result<Self, ValidationError> {
        Self::with_policy(names, arrivals, bursts, quantum, NamePolicy::default())
    }

    pub fn with_policy<S: AsRef<str>>(
        names: &[S],
        arrivals: &[i64],
        bursts: &[i64],
        quantum: i64,
        policy: NamePolicy,
    ) -> Result<Self, ValidationError> {
        let process_set = ProcessSet::from_columns(names, arrivals, bursts, policy)?;
        if quantum <= 0 {
            return Err(ValidationError::NonPositiveQuantum(quantum));
        }
        // A quantum beyond the clock range never preempts anything anyway
        Self::from_process_set(process_set, TimeStep::try_from(quantum).unwrap_or(TimeStep::MAX))
    }

    /// Creates a simulation from a process set built by `ProcessSet::from_columns`.
    pub fn from_process_set(process_set: ProcessSet, quantum: TimeStep) -> Result<Self, ValidationError> {
        if quantum == 0 {
            return Err(ValidationError::NonPositiveQuantum(0));
        }

        let mut scheduler = Self {
            admitted: vec![false; process_set.len()],
            process_set,
            quantum,
            time: 0,
            queue: VecDeque::new(),
            started: false,
            gantt: Vec::new(),
            stats: None,
        };
        scheduler.seed();
        Ok(scheduler)
    }

    fn seed(&mut self) {
        // Everything arriving at 0 is ready before the first decision
        for id in self.process_set.arrived_by(0, &self.admitted) {
            self.admitted[id] = true;
            self.queue.push_back(id);
        }
        info!(
            "Simulation of {} processes, quantum {}, {} ready at time 0",
            self.process_set.len(),
            self.quantum,
            self.queue.len()
        );
    }

    pub fn quantum(&self) -> TimeStep {
        self.quantum
    }

    pub fn process_set(&self) -> &ProcessSet {
        &self.process_set
    }

    pub fn ready_queue(&self) -> impl Iterator<Item = ID> + '_ {
        self.queue.iter().copied()
    }

    fn arrival_event(&self, id: ID, time: TimeStep) -> SimulationEvent {
        SimulationEvent::Arrival {
            time,
            process: id,
            name: self.process_set.get_processes()[id].name().to_string(),
        }
    }

    /// Appends every process arrived by `t` and not yet admitted to the queue tail.
    fn admit(&mut self, t: TimeStep) -> Vec<SimulationEvent> {
        let arrived = self.process_set.arrived_by(t, &self.admitted);
        let mut events = Vec::with_capacity(arrived.len());

        for id in arrived {
            self.admitted[id] = true;
            self.queue.push_back(id);
            debug!("t={} process {} admitted", t, id);
            events.push(self.arrival_event(id, t));
        }
        events
    }

    fn finish(&mut self) -> FinalStats {
        let stats = FinalStats::from_history(&self.process_set, &self.gantt);
        info!(
            "Simulation completed at t={}: average turnaround {:.2}, average waiting {:.2}",
            self.time,
            stats.average_turnaround(),
            stats.average_waiting()
        );
        self.stats = Some(stats.clone());
        stats
    }

    /// Runs the head of the queue for one slice.
    fn dispatch(&mut self, id: ID) -> (ExecutionSlice, Outcome) {
        let quantum = self.quantum;
        let start = self.time;
        let process = &mut self.process_set.get_processes_mut()[id];

        let exec_time = process.run(start, quantum);
        let end = start + exec_time;
        let outcome = if process.is_complete() {
            Outcome::Completed
        } else {
            Outcome::Requeued
        };
        let slice = ExecutionSlice::new(id, process.name(), start, end);

        self.gantt.push(slice.clone());
        self.time = end;
        (slice, outcome)
    }
}

impl Scheduler for RoundRobin {
    fn step(&mut self) -> Vec<SimulationEvent> {
        if let Some(stats) = &self.stats {
            return vec![SimulationEvent::Completion(stats.clone())];
        }

        let mut events = Vec::new();

        if !self.started {
            self.started = true;
            events.push(SimulationEvent::Started { quantum: self.quantum });
            events.extend(self.queue.iter().map(|&id| self.arrival_event(id, 0)));
        }
        events.extend(self.admit(self.time));

        let Some(id) = self.queue.pop_front() else {
            if self.process_set.all_complete() {
                events.push(SimulationEvent::Completion(self.finish()));
            } else {
                debug!("t={} idle", self.time);
                events.push(SimulationEvent::Idle { time: self.time });
                self.time += 1;
            }
            return events;
        };

        let (slice, outcome) = self.dispatch(id);
        debug!(
            "t={}..{} process {} ran {} units, {}",
            slice.start,
            slice.end,
            id,
            slice.duration(),
            outcome
        );

        events.push(SimulationEvent::Dispatch {
            process: id,
            name: slice.name.clone(),
            start: slice.start,
            end: slice.end,
            outcome,
        });

        // Arrivals during the slice queue up ahead of the preempted process
        events.extend(self.admit(slice.end));
        if outcome == Outcome::Requeued {
            self.queue.push_back(id);
        }
        trace!("t={} ready queue {:?}", self.time, self.queue);

        events.push(SimulationEvent::SliceEnd {
            time: slice.end,
            process: id,
            name: slice.name,
            outcome,
        });
        events
    }

    fn is_finished(&self) -> bool {
        self.stats.is_some()
    }

    fn stats(&self) -> Option<&FinalStats> {
        self.stats.as_ref()
    }

    fn gantt(&self) -> &[ExecutionSlice] {
        &self.gantt
    }

    fn time(&self) -> TimeStep {
        self.time
    }

    fn reset(&mut self) {
        self.process_set.reset();
        self.admitted.iter_mut().for_each(|a| *a = false);
        self.time = 0;
        self.queue.clear();
        self.started = false;
        self.gantt.clear();
        self.stats = None;
        self.seed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slices(scheduler: &RoundRobin) -> Vec<(&str, TimeStep, TimeStep)> {
        scheduler
            .gantt()
            .iter()
            .map(|s| (s.name.as_str(), s.start, s.end))
            .collect()
    }

    #[test]
    fn test_simultaneous_arrivals() {
        let mut rr = RoundRobin::new(&["A", "B", "C"], &[0, 0, 0], &[5, 3, 1], 2).unwrap();
        let events = rr.run_all();

        assert!(events.last().unwrap().is_completion());
        assert_eq!(
            slices(&rr),
            vec![("A", 0, 2), ("B", 2, 4), ("C", 4, 5), ("A", 5, 7), ("B", 7, 8), ("A", 8, 9)]
        );

        let stats = rr.stats().unwrap();
        let figures: Vec<_> = stats
            .processes()
            .iter()
            .map(|p| (p.completion, p.turnaround, p.waiting))
            .collect();
        assert_eq!(figures, vec![(9, 9, 4), (8, 8, 5), (5, 5, 4)]);
    }

    #[test]
    fn test_arrival_during_slice_queues_ahead_of_preempted() {
        let mut rr = RoundRobin::new(&["A", "B"], &[0, 1], &[4, 2], 2).unwrap();

        let first = rr.step();
        assert_eq!(
            first,
            vec![
                SimulationEvent::Started { quantum: 2 },
                SimulationEvent::Arrival { time: 0, process: 0, name: "A".to_string() },
                SimulationEvent::Dispatch {
                    process: 0,
                    name: "A".to_string(),
                    start: 0,
                    end: 2,
                    outcome: Outcome::Requeued,
                },
                SimulationEvent::Arrival { time: 2, process: 1, name: "B".to_string() },
                SimulationEvent::SliceEnd {
                    time: 2,
                    process: 0,
                    name: "A".to_string(),
                    outcome: Outcome::Requeued,
                },
            ]
        );
        assert_eq!(rr.ready_queue().collect::<Vec<_>>(), vec![1, 0]);

        rr.run_all();
        assert_eq!(slices(&rr), vec![("A", 0, 2), ("B", 2, 4), ("A", 4, 6)]);
        let stats = rr.stats().unwrap();
        assert_eq!(stats.get(0).unwrap().completion, 6);
        assert_eq!(stats.get(1).unwrap().completion, 4);
    }

    #[test]
    fn test_idle_until_first_arrival() {
        let mut rr = RoundRobin::new(&["A"], &[5], &[3], 2).unwrap();

        assert_eq!(
            rr.step(),
            vec![SimulationEvent::Started { quantum: 2 }, SimulationEvent::Idle { time: 0 }]
        );
        for t in 1..5 {
            assert_eq!(rr.step(), vec![SimulationEvent::Idle { time: t }]);
        }
        assert_eq!(rr.time(), 5);

        let events = rr.step();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            SimulationEvent::Arrival { time: 5, process: 0, name: "A".to_string() }
        );
        assert!(matches!(events[1], SimulationEvent::Dispatch { start: 5, end: 7, .. }));
        assert!(matches!(
            events[2],
            SimulationEvent::SliceEnd { time: 7, outcome: Outcome::Requeued, .. }
        ));

        rr.run_all();
        assert_eq!(slices(&rr), vec![("A", 5, 7), ("A", 7, 8)]);
        assert_eq!(rr.stats().unwrap().get(0).unwrap().response, 0);
    }

    #[test]
    fn test_gap_between_processes() {
        let mut rr = RoundRobin::new(&["A", "B"], &[0, 4], &[1, 1], 3).unwrap();
        let events = rr.run_all();

        let idles: Vec<TimeStep> = events
            .iter()
            .filter_map(|e| match e {
                SimulationEvent::Idle { time } => Some(*time),
                _ => None,
            })
            .collect();
        assert_eq!(idles, vec![1, 2, 3]);
        assert_eq!(slices(&rr), vec![("A", 0, 1), ("B", 4, 5)]);
    }

    #[test]
    fn test_zero_burst_completes_instantly() {
        let mut rr = RoundRobin::new(&["Z", "A", "Y"], &[0, 0, 3], &[0, 2, 0], 2).unwrap();
        rr.run_all();

        assert_eq!(slices(&rr), vec![("Z", 0, 0), ("A", 0, 2), ("Y", 3, 3)]);
        let stats = rr.stats().unwrap();
        assert_eq!(stats.get(0).unwrap().turnaround, 0);
        assert_eq!(stats.get(2).unwrap().completion, 3);
        assert_eq!(stats.get(2).unwrap().waiting, 0);
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(
            RoundRobin::new(&["A", "B"], &[0, 0], &[1], 2).unwrap_err(),
            ValidationError::LengthMismatch { names: 2, arrivals: 2, bursts: 1 }
        );
        assert_eq!(
            RoundRobin::new(&["A"], &[0], &[1], 0).unwrap_err(),
            ValidationError::NonPositiveQuantum(0)
        );
        assert_eq!(
            RoundRobin::new(&["A"], &[0], &[1], -3).unwrap_err(),
            ValidationError::NonPositiveQuantum(-3)
        );
        assert!(matches!(
            RoundRobin::new(&["A", "A"], &[0, 0], &[1, 1], 1),
            Err(ValidationError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_times_beyond_the_clock_are_rejected() {
        let huge = i64::MAX;
        assert_eq!(
            RoundRobin::new(&["A", "B", "C"], &[0, 0, 0], &[huge, huge, huge], huge).unwrap_err(),
            ValidationError::TimeOverflow
        );
    }

    #[test]
    fn test_from_process_set_rejects_zero_quantum() {
        let set = ProcessSet::from_columns(&["A"], &[0], &[1], NamePolicy::Reject).unwrap();

        assert_eq!(
            RoundRobin::from_process_set(set.clone(), 0).unwrap_err(),
            ValidationError::NonPositiveQuantum(0)
        );

        let mut rr = RoundRobin::from_process_set(set, 3).unwrap();
        rr.run_all();
        assert_eq!(slices(&rr), vec![("A", 0, 1)]);
    }

    #[test]
    fn test_duplicate_names_allowed_stay_distinct() {
        let mut rr =
            RoundRobin::with_policy(&["A", "A"], &[0, 0], &[3, 1], 2, NamePolicy::Allow).unwrap();
        rr.run_all();

        let stats = rr.stats().unwrap();
        assert_eq!(stats.get(0).unwrap().completion, 4);
        assert_eq!(stats.get(1).unwrap().completion, 3);
    }

    #[test]
    fn test_empty_input_completes_immediately() {
        let names: [&str; 0] = [];
        let mut rr = RoundRobin::new(&names, &[], &[], 4).unwrap();

        let events = rr.step();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], SimulationEvent::Started { quantum: 4 });
        assert!(events[1].is_completion());
        assert!(rr.is_finished());
        assert_eq!(rr.stats().unwrap().average_waiting(), 0.0);
    }

    #[test]
    fn test_step_after_completion_is_stable() {
        let mut rr = RoundRobin::new(&["A"], &[0], &[1], 1).unwrap();
        rr.run_all();
        let time = rr.time();

        let again = rr.step();
        assert_eq!(again.len(), 1);
        assert!(again[0].is_completion());
        assert_eq!(rr.time(), time);
        assert_eq!(rr.gantt().len(), 1);
    }

    #[test]
    fn test_reset_replays_identically() {
        let mut rr = RoundRobin::new(&["A", "B", "C"], &[0, 2, 3], &[4, 5, 2], 3).unwrap();
        let first = rr.run_all();
        let first_gantt = rr.gantt().to_vec();

        rr.reset();
        assert_eq!(rr.time(), 0);
        assert!(rr.stats().is_none());
        assert!(rr.gantt().is_empty());

        assert_eq!(rr.run_all(), first);
        assert_eq!(rr.gantt(), first_gantt.as_slice());
    }

    #[test]
    fn test_step_and_iterator_agree() {
        let mut stepped = RoundRobin::new(&["A", "B", "C"], &[1, 0, 6], &[3, 4, 2], 2).unwrap();
        let mut pulled = stepped.clone();

        let mut events = Vec::new();
        while !stepped.is_finished() {
            events.extend(stepped.step());
        }

        assert_eq!(pulled.events().collect::<Vec<_>>(), events);
        assert_eq!(pulled.stats(), stepped.stats());
    }

    #[test]
    fn test_determinism() {
        let build = || RoundRobin::new(&["P1", "P2", "P3", "P4"], &[0, 1, 1, 7], &[6, 3, 5, 2], 2).unwrap();
        let (mut left, mut right) = (build(), build());

        assert_eq!(left.run_all(), right.run_all());
        assert_eq!(left.gantt(), right.gantt());
        assert_eq!(left.stats(), right.stats());
    }

    #[test]
    fn test_each_ready_process_runs_once_per_round() {
        let mut rr = RoundRobin::new(&["A", "B", "C", "D"], &[0, 0, 0, 0], &[4, 4, 4, 4], 1).unwrap();
        rr.run_all();

        let order: Vec<&str> = rr.gantt().iter().map(|s| s.name.as_str()).collect();
        for round in order.chunks(4) {
            assert_eq!(round, ["A", "B", "C", "D"]);
        }
    }

    #[test]
    fn test_invariants_over_small_inputs() {
        let arrivals = [0i64, 1, 3];
        let bursts = [0i64, 1, 2, 5];
        let names = ["A", "B", "C"];

        for quantum in 1..=3 {
            for a0 in arrivals {
                for a1 in arrivals {
                    for a2 in arrivals {
                        for b0 in bursts {
                            for b1 in bursts {
                                for b2 in bursts {
                                    let arr = [a0, a1, a2];
                                    let bur = [b0, b1, b2];
                                    check_run(&names, &arr, &bur, quantum);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    fn check_run(names: &[&str], arrivals: &[i64], bursts: &[i64], quantum: i64) {
        let mut rr = RoundRobin::new(names, arrivals, bursts, quantum).unwrap();
        let total_burst = rr.process_set().total_burst();
        let max_arrival = *arrivals.iter().max().unwrap() as TimeStep;
        let bound = total_burst + names.len() + max_arrival + 1;

        let mut steps = 0;
        while !rr.is_finished() {
            rr.step();
            steps += 1;
            assert!(steps <= bound, "no termination for {:?} {:?} q={}", arrivals, bursts, quantum);
        }

        let executed: TimeStep = rr.gantt().iter().map(|s| s.duration()).sum();
        assert_eq!(executed, total_burst);
        assert!(rr.gantt().iter().all(|s| (s.duration() as i64) <= quantum));

        let stats = rr.stats().unwrap();
        for p in stats.processes() {
            assert!(p.completion >= p.arrival + p.burst);
            assert_eq!(p.waiting, p.turnaround - p.burst);

            let own: Vec<_> = rr.gantt().iter().filter(|s| s.process == p.id).collect();
            let contiguous = own.first().map_or(false, |s| s.start == p.arrival)
                && own.windows(2).all(|w| w[0].end == w[1].start);
            assert_eq!(p.completion == p.arrival + p.burst, contiguous);
        }

        check_fairness(rr.gantt(), arrivals, bursts, quantum);
    }

    /// Between two consecutive slices of one process, every other process runs at most
    /// once: the processes ahead of it in the queue each get their turn, and anyone
    /// requeued or arriving meanwhile lines up behind it.
    fn check_fairness(gantt: &[ExecutionSlice], arrivals: &[i64], bursts: &[i64], quantum: i64) {
        for (i, slice) in gantt.iter().enumerate() {
            let Some(offset) = gantt[i + 1..].iter().position(|s| s.process == slice.process) else {
                continue;
            };
            let between = &gantt[i + 1..i + 1 + offset];

            let mut ran: Vec<ID> = between.iter().map(|s| s.process).collect();
            ran.sort_unstable();
            let count = ran.len();
            ran.dedup();
            assert_eq!(
                ran.len(),
                count,
                "a process ran twice between two turns of process {} for {:?} {:?} q={}",
                slice.process,
                arrivals,
                bursts,
                quantum
            );
            // The queue never empties while the process waits for its next turn
            assert!(between.windows(2).all(|w| w[0].end == w[1].start));
            assert_eq!(between.first().map_or(slice.end, |s| s.start), slice.end);
        }
    }
}
