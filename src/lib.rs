pub mod core;
pub mod models;
pub mod utils;

pub use models::{
    scheduler, ExecutionSlice, FinalStats, Outcome, Process, ProcessSet, ProcessStats,
    SimulationEvent, TimeStep, ID,
};
pub use utils::{constants, errors, ValidationError};
