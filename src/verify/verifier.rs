//! Verification Orchestrator
//!
//! Runs scenario steps strictly in sequence: a step's write is acknowledged
//! before any of its reads, and a step finishes before the next starts.

use crate::adapter::AdapterSet;
use crate::config::FailurePolicy;
use crate::error::{CompatError, Result};
use crate::oracle;
use crate::protocol::ProtocolKind;

use super::{Comparison, Report, Scenario, ScenarioStep, StepOutcome};

/// Per-step state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Idle,
    WriteIssued,

    /// Reads still outstanding, including the one being issued
    ReadPending(usize),

    StepPassed,
    StepFailed,
}

/// Drives scenarios against a set of adapters
pub struct Verifier<'a> {
    adapters: &'a mut AdapterSet,
    policy: FailurePolicy,
}

impl<'a> Verifier<'a> {
    pub fn new(adapters: &'a mut AdapterSet, policy: FailurePolicy) -> Self {
        Self { adapters, policy }
    }

    /// Run every step and collect the comparisons
    ///
    /// Divergences are recorded in the report. Adapter errors and length
    /// mismatches abort the run with an error carrying step context.
    pub fn run(&mut self, scenario: &Scenario) -> Result<Report> {
        for step in scenario.steps() {
            if !self.adapters.contains(step.writer) {
                return Err(CompatError::Config(format!(
                    "step writes via {} but no such adapter is registered",
                    step.writer
                )));
            }
        }

        let mut report = Report::new();

        for (index, step) in scenario.steps().iter().enumerate() {
            let number = index + 1;
            let state = self.run_step(number, step, &mut report)?;
            let passed = state == StepState::StepPassed;

            report.record_step(StepOutcome {
                step: number,
                key: step.key.clone(),
                writer: step.writer,
                passed,
            });

            if passed {
                tracing::info!("Step {} [{}] via {} passed", number, step.key, step.writer);
            } else {
                tracing::error!("Step {} [{}] via {} failed", number, step.key, step.writer);
                if self.policy == FailurePolicy::AbortOnFirst {
                    break;
                }
            }
        }

        Ok(report)
    }

    fn run_step(
        &mut self,
        number: usize,
        step: &ScenarioStep,
        report: &mut Report,
    ) -> Result<StepState> {
        let mut state = StepState::Idle;

        advance(&mut state, StepState::WriteIssued, number);
        self.adapters
            .get_mut(step.writer)?
            .put(&step.key, &step.value)
            .map_err(|e| e.in_step(number, &step.key, step.writer))?;

        let readers = self.read_order(step.writer);
        let mut failed = false;

        for (i, &reader) in readers.iter().enumerate() {
            advance(&mut state, StepState::ReadPending(readers.len() - i), number);

            let observed = self
                .adapters
                .get_mut(reader)?
                .get(&step.key)
                .map_err(|e| e.in_step(number, &step.key, reader))?;

            let matched = oracle::equals(Some(step.value.as_slice()), observed.as_bytes())
                .map_err(|e| e.in_step(number, &step.key, reader))?;

            let comparison = Comparison {
                step: number,
                key: step.key.clone(),
                writer: step.writer,
                reader,
                expected: step.value.clone(),
                observed,
                matched,
            };

            if !matched {
                tracing::error!("Divergence: {}", comparison);
                failed = true;
            }
            report.record_comparison(comparison);

            if failed && self.policy == FailurePolicy::AbortOnFirst {
                break;
            }
        }

        let outcome = if failed {
            StepState::StepFailed
        } else {
            StepState::StepPassed
        };
        advance(&mut state, outcome, number);
        Ok(state)
    }

    /// The writer first, then every other adapter in fixed order
    fn read_order(&self, writer: ProtocolKind) -> Vec<ProtocolKind> {
        std::iter::once(writer)
            .chain(self.adapters.protocols().into_iter().filter(|&p| p != writer))
            .collect()
    }
}

fn advance(state: &mut StepState, next: StepState, step: usize) {
    tracing::trace!("Step {}: {:?} → {:?}", step, state, next);
    *state = next;
}
