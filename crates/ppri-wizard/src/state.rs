use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::step::Step;

/// Where the questionnaire is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "phase", content = "step", rename_all = "snake_case")]
#[ts(export)]
pub enum Phase {
    /// Entering answers on a questionnaire step.
    Collecting(Step),
    /// Waiting on the prediction service after "generate".
    ResultPending,
    ResultReady,
    /// Clinician override entry.
    Summary,
    /// Persisted. Terminal until `reset`.
    Saved,
}

impl Phase {
    /// The form step this phase displays.
    pub fn step(self) -> Step {
        match self {
            Phase::Collecting(step) => step,
            Phase::ResultPending => Step::Epds,
            Phase::ResultReady => Step::Result,
            Phase::Summary | Phase::Saved => Step::ClinicianSummary,
        }
    }

    /// Phases that hold a generated result.
    pub fn has_result(self) -> bool {
        matches!(self, Phase::ResultReady | Phase::Summary | Phase::Saved)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Collecting(step) => write!(f, "collecting ({step})"),
            Phase::ResultPending => f.write_str("result pending"),
            Phase::ResultReady => f.write_str("result ready"),
            Phase::Summary => f.write_str("summary"),
            Phase::Saved => f.write_str("saved"),
        }
    }
}

/// Navigation state over [`Step::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WizardState {
    pub phase: Phase,
    /// Steps reached at least once; these can be jumped to directly.
    pub visited: BTreeSet<Step>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            phase: Phase::Collecting(Step::Demographics),
            visited: BTreeSet::from([Step::Demographics]),
        }
    }
}

impl WizardState {
    pub fn current_step(&self) -> Step {
        self.phase.step()
    }

    /// Always a valid index into [`Step::ALL`].
    pub fn current_step_index(&self) -> usize {
        self.current_step().index()
    }

    pub fn is_visited(&self, step: Step) -> bool {
        self.visited.contains(&step)
    }

    pub(crate) fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.visited.insert(phase.step());
    }
}
