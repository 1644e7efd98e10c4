pub mod scheduler;
pub mod rr_scheduler;

pub use scheduler::Scheduler;
pub use rr_scheduler::RoundRobin;
