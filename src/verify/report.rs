//! Verification results

use std::fmt;

use crate::adapter::Lookup;
use crate::error::{CompatError, Result};
use crate::protocol::ProtocolKind;

/// Result of checking one read against the written value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// 1-based step number
    pub step: usize,
    pub key: String,
    pub writer: ProtocolKind,
    pub reader: ProtocolKind,
    pub expected: Vec<u8>,
    pub observed: Lookup,
    pub matched: bool,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {} [{}] written via {}, read via {}: expected {:?}, observed ",
            self.step, self.key, self.writer, self.reader, self.expected
        )?;
        match &self.observed {
            Lookup::Found(bytes) => write!(f, "{bytes:?}"),
            Lookup::Missing => f.write_str("absent"),
            Lookup::Undecodable => f.write_str("absent (undecodable payload)"),
        }
    }
}

/// Final state of one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: usize,
    pub key: String,
    pub writer: ProtocolKind,
    pub passed: bool,
}

/// Everything observed during a run
#[derive(Debug, Clone, Default)]
pub struct Report {
    comparisons: Vec<Comparison>,
    steps: Vec<StepOutcome>,
}

impl Report {
    /// Empty report; it is not a success until a step has passed
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_comparison(&mut self, comparison: Comparison) {
        self.comparisons.push(comparison);
    }

    pub(crate) fn record_step(&mut self, outcome: StepOutcome) {
        self.steps.push(outcome);
    }

    /// Every comparison, in the order reads were issued
    pub fn comparisons(&self) -> &[Comparison] {
        &self.comparisons
    }

    /// Outcome of every step that ran
    pub fn steps(&self) -> &[StepOutcome] {
        &self.steps
    }

    /// Comparisons that did not match
    pub fn divergences(&self) -> impl Iterator<Item = &Comparison> {
        self.comparisons.iter().filter(|c| !c.matched)
    }

    pub fn is_success(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|s| s.passed)
    }

    /// `Ok(self)` on full success, otherwise an error listing every divergence
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        Err(CompatError::Inconsistent {
            divergences: self.divergences().cloned().collect(),
        })
    }
}
