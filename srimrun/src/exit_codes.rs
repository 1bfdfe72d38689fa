//! Stable exit codes for srimrun CLI commands.

/// Command succeeded; for `run`, every fragment completed successfully.
pub const OK: i32 = 0;
/// Command failed due to invalid config/job/installation or other errors.
pub const INVALID: i32 = 1;
/// `srimrun run` finished, but at least one fragment failed.
pub const PARTIAL: i32 = 2;
