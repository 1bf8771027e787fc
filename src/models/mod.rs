//! Data returned to callers

/// Formatted and serializable color statistics.
pub mod report;
