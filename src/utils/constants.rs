/// Exit codes of the command-line front end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExitStatus {
    Completed = 0,
    InvalidInput = 2,
    UnreadableInput = 5,
    ReportFailure = 6,
}

/// What to do when two processes share a display name.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum NamePolicy {
    #[default]
    Reject,
    /// Accept duplicates; reports stay unambiguous through the process index.
    Allow,
}

/// Prefix of every timeline line, as printed by the execution log.
pub const TIMELINE_PREFIX: &str = ">>>";
