//! Scenario definitions

use std::collections::HashSet;

use crate::error::{CompatError, Result};
use crate::protocol::ProtocolKind;

/// One write followed by reads through every front-end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioStep {
    /// Front-end the value is written through
    pub writer: ProtocolKind,

    pub key: String,

    pub value: Vec<u8>,
}

impl ScenarioStep {
    pub fn new(writer: ProtocolKind, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            writer,
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered list of steps; every key is written exactly once
#[derive(Debug, Clone)]
pub struct Scenario {
    steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Build a scenario; rejects an empty list and reused keys
    pub fn new(steps: Vec<ScenarioStep>) -> Result<Self> {
        if steps.is_empty() {
            return Err(CompatError::Config("scenario has no steps".to_string()));
        }

        let mut seen = HashSet::new();
        for step in &steps {
            if !seen.insert(step.key.as_str()) {
                return Err(CompatError::Config(format!(
                    "key {:?} is written more than once",
                    step.key
                )));
            }
        }

        Ok(Self { steps })
    }

    /// One write per front-end, each read back through all of them
    pub fn reference() -> Self {
        Self {
            steps: vec![
                ScenarioStep::new(ProtocolKind::HotRod, "KEY1", [1u8, 2, 3]),
                ScenarioStep::new(ProtocolKind::Rest, "KEY2", [4u8, 5, 6]),
                ScenarioStep::new(ProtocolKind::Memcached, "KEY3", [7u8, 8, 9]),
            ],
        }
    }

    pub fn steps(&self) -> &[ScenarioStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
