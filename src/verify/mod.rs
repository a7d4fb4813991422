//! Verification Module
//!
//! Drives write/cross-read scenarios and collects the results.
//!
//! ## Step State Machine
//! ```text
//! Idle ──put──▶ WriteIssued ──▶ ReadPending(n) ──▶ … ──▶ ReadPending(1)
//!                                                          │
//!                                  ┌───────────────────────┴──────┐
//!                                  ▼                              ▼
//!                              StepPassed                     StepFailed
//! ```
//!
//! The first read of every step goes back through the writer (self-read);
//! the rest follow [`ProtocolKind::ALL`](crate::ProtocolKind::ALL) order.

mod report;
mod scenario;
mod verifier;

pub use report::{Comparison, Report, StepOutcome};
pub use scenario::{Scenario, ScenarioStep};
pub use verifier::{StepState, Verifier};
