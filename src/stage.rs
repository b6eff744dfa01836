use serde::{Deserialize, Serialize};

use crate::foundation::error::{ScrollyteError, ScrollyteResult};

/// Position of a stage within its set.
pub type StageIndex = usize;

/// Discrete stages inside a region, each entered at a progress threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageDef {
    /// Entry progress of each stage, non-decreasing, in `[0, 1]`.
    pub thresholds: Vec<f64>,
}

impl StageDef {
    /// Stages entered at the given thresholds.
    pub fn new(thresholds: impl Into<Vec<f64>>) -> Self {
        Self {
            thresholds: thresholds.into(),
        }
    }

    /// `count` stages spread evenly over the region, the first entered at progress 0.
    pub fn evenly(count: usize) -> Self {
        let n = count.max(1);
        Self::new((0..n).map(|i| i as f64 / n as f64).collect::<Vec<_>>())
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    /// Whether no stages are declared.
    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Reject empty, out-of-range or decreasing thresholds.
    pub fn validate(&self) -> ScrollyteResult<()> {
        if self.thresholds.is_empty() {
            return Err(ScrollyteError::validation("stage set must declare at least one stage"));
        }
        for (i, t) in self.thresholds.iter().enumerate() {
            if !(0.0..=1.0).contains(t) {
                return Err(ScrollyteError::validation(format!(
                    "stage {i} threshold {t} is outside [0, 1]"
                )));
            }
        }
        if self.thresholds.windows(2).any(|w| w[1] < w[0]) {
            return Err(ScrollyteError::validation("stage thresholds must be non-decreasing"));
        }
        Ok(())
    }

    /// Stage current at `progress`: the last one whose threshold has been reached, else stage 0.
    pub fn stage_at(&self, progress: f64) -> StageIndex {
        self.thresholds
            .partition_point(|t| *t <= progress)
            .saturating_sub(1)
    }
}

/// Current-stage transition reported to the owning section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StageChange {
    /// Owning section id.
    pub section: String,
    /// Previous stage.
    pub from: StageIndex,
    /// New stage.
    pub to: StageIndex,
}

/// Tracks which stage is current as progress moves.
#[derive(Clone, Debug)]
pub struct StageDispatcher {
    section: String,
    def: StageDef,
    current: StageIndex,
}

impl StageDispatcher {
    /// Dispatcher starting at stage 0.
    pub fn new(section: impl Into<String>, def: StageDef) -> ScrollyteResult<Self> {
        def.validate()?;
        Ok(Self {
            section: section.into(),
            def,
            current: 0,
        })
    }

    /// Current stage index.
    pub fn current(&self) -> StageIndex {
        self.current
    }

    /// Stage definition.
    pub fn def(&self) -> &StageDef {
        &self.def
    }

    /// Feed new progress; returns a change when the current stage moved.
    pub fn update(&mut self, progress: f64) -> Option<StageChange> {
        let next = self.def.stage_at(progress);
        if next == self.current {
            return None;
        }
        let change = StageChange {
            section: self.section.clone(),
            from: self.current,
            to: next,
        };
        self.current = next;
        tracing::debug!(section = %change.section, from = change.from, to = change.to, "stage change");
        Some(change)
    }
}

#[cfg(test)]
#[path = "../tests/unit/stage/dispatcher.rs"]
mod tests;
