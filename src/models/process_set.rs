use std::collections::HashMap;

use super::{Process, TimeStep, ID};
use crate::utils::{NamePolicy, ValidationError};

/// The validated input of one simulation.
#[derive(Clone, Debug)]
pub struct ProcessSet {
    processes: Vec<Process>,
}

impl ProcessSet {
    pub(crate) fn new(processes: Vec<Process>) -> Self {
        Self { processes }
    }

    /// Builds a process set from the three parallel input columns.
    ///
    /// # Arguments
    /// * `names` - Display names, one per process.
    /// * `arrivals` - Arrival times, must not be negative.
    /// * `bursts` - Burst times, must not be negative.
    /// * `policy` - Whether duplicate names are rejected.
    ///
    /// # Returns
    /// The process set, or the first constraint the input violates. The set is
    /// rejected when its latest arrival plus its total burst overflows `TimeStep`,
    /// which bounds every clock value the simulation can reach.
    pub fn from_columns<S: AsRef<str>>(
        names: &[S],
        arrivals: &[i64],
        bursts: &[i64],
        policy: NamePolicy,
    ) -> Result<Self, ValidationError> {
        if names.len() != arrivals.len() || names.len() != bursts.len() {
            return Err(ValidationError::LengthMismatch {
                names: names.len(),
                arrivals: arrivals.len(),
                bursts: bursts.len(),
            });
        }

        let mut seen: HashMap<&str, ID> = HashMap::new();
        let mut processes = Vec::with_capacity(names.len());

        for (id, name) in names.iter().enumerate() {
            let name = name.as_ref();
            let arrival = arrivals[id];
            let burst = bursts[id];

            if arrival < 0 {
                return Err(ValidationError::NegativeArrival { process: id, value: arrival });
            }
            if burst < 0 {
                return Err(ValidationError::NegativeBurst { process: id, value: burst });
            }
            if policy == NamePolicy::Reject {
                if let Some(&first) = seen.get(name) {
                    return Err(ValidationError::DuplicateName {
                        name: name.to_string(),
                        first,
                        second: id,
                    });
                }
                seen.insert(name, id);
            }

            let arrival = TimeStep::try_from(arrival).map_err(|_| ValidationError::TimeOverflow)?;
            let burst = TimeStep::try_from(burst).map_err(|_| ValidationError::TimeOverflow)?;
            processes.push(Process::new(id, name.to_string(), arrival, burst));
        }

        let latest_arrival = processes.iter().map(|p| p.arrival()).max().unwrap_or(0);
        processes
            .iter()
            .try_fold(latest_arrival, |horizon, p| horizon.checked_add(p.burst()))
            .ok_or(ValidationError::TimeOverflow)?;

        Ok(Self::new(processes))
    }

    pub fn get_processes(&self) -> &Vec<Process> {
        &self.processes
    }

    pub fn get_processes_mut(&mut self) -> &mut Vec<Process> {
        &mut self.processes
    }

    pub fn get(&self, id: ID) -> Option<&Process> {
        self.processes.get(id)
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn total_burst(&self) -> TimeStep {
        self.processes.iter().map(|p| p.burst()).sum()
    }

    pub fn all_complete(&self) -> bool {
        self.processes.iter().all(|p| p.is_complete())
    }

    /// Ids of the processes that have arrived by `t` and are not in `admitted`,
    /// in ascending arrival order, ties broken by id.
    pub fn arrived_by(&self, t: TimeStep, admitted: &[bool]) -> Vec<ID> {
        let mut arrived: Vec<&Process> = self
            .processes
            .iter()
            .filter(|p| !admitted[p.id()] && p.has_arrived(t))
            .collect();
        arrived.sort_by_key(|p| (p.arrival(), p.id()));
        arrived.iter().map(|p| p.id()).collect()
    }

    pub fn reset(&mut self) {
        self.processes.iter_mut().for_each(Process::reset);
    }

    pub fn iter(&self) -> std::slice::Iter<Process> {
        self.processes.iter()
    }
}
