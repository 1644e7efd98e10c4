mod event;
mod process;
pub mod process_set;
pub mod scheduler;
mod slice;
pub mod stats;

pub use event::{timeline, Outcome, SimulationEvent};
pub use process::Process;
pub use process_set::ProcessSet;
pub use slice::ExecutionSlice;
pub use stats::{FinalStats, ProcessStats};

pub type TimeStep = usize;

pub type ID = usize;
