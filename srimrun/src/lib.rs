//! SRIM/TRIM automation harness.
//!
//! Drives the third-party SRIM binaries (through Wine on non-Windows
//! hosts) without ever sharing a working directory between runs. The
//! architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (element data, settings
//!   validation, ion-count fragmentation). No I/O, fully testable in
//!   isolation.
//! - **[`io`]**: Side-effecting operations (scratch directories, input
//!   staging, process execution, output harvesting). Isolated to enable
//!   scripted simulators in tests.
//!
//! [`apply`] coordinates core logic with I/O to implement the CLI
//! commands.

pub mod apply;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
