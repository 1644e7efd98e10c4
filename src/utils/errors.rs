use std::fmt;

use crate::models::ID;

/// Reasons a simulation could not be created from its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    LengthMismatch {
        names: usize,
        arrivals: usize,
        bursts: usize,
    },
    NonPositiveQuantum(i64),
    NegativeArrival { process: ID, value: i64 },
    NegativeBurst { process: ID, value: i64 },
    DuplicateName { name: String, first: ID, second: ID },
    // Latest arrival plus total burst does not fit the clock
    TimeOverflow,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::LengthMismatch { names, arrivals, bursts } => write!(
                f,
                "process count doesn't match: {} names, {} arrival times, {} burst times",
                names, arrivals, bursts
            ),
            ValidationError::NonPositiveQuantum(q) => {
                write!(f, "quantum must be positive, got {}", q)
            }
            ValidationError::NegativeArrival { process, value } => write!(
                f,
                "arrival time of process {} must not be negative, got {}",
                process, value
            ),
            ValidationError::NegativeBurst { process, value } => write!(
                f,
                "burst time of process {} must not be negative, got {}",
                process, value
            ),
            ValidationError::DuplicateName { name, first, second } => write!(
                f,
                "process name '{}' is used by both process {} and process {}",
                name, first, second
            ),
            ValidationError::TimeOverflow => write!(
                f,
                "latest arrival plus total burst time exceeds the largest representable time"
            ),
        }
    }
}

impl std::error::Error for ValidationError {}
