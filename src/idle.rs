//! Ambient motion that runs on wall-clock time, independent of scroll.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    animation::proc::{ProcScalar, stable_hash64},
    foundation::core::{ElementId, Property},
    foundation::error::{ScrollyteError, ScrollyteResult},
    host::{FrameHandle, Host},
};

/// One procedurally driven property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdleDef {
    /// Animated element.
    pub target: ElementId,
    /// Animated property.
    pub property: Property,
    /// Signal sampled every frame.
    pub source: ProcScalar,
}

impl IdleDef {
    /// Gentle vertical float (`y` sine around 0).
    pub fn float(target: impl Into<ElementId>, amp_px: f64, period_secs: f64) -> Self {
        Self {
            target: target.into(),
            property: Property::Y,
            source: ProcScalar::Sine {
                amp: amp_px,
                freq_hz: 1.0 / period_secs.max(f64::EPSILON),
                phase: 0.0,
                offset: 0.0,
            },
        }
    }

    /// Continuous rotation at `deg_per_sec`, wrapped to a full turn.
    pub fn spin(target: impl Into<ElementId>, deg_per_sec: f64) -> Self {
        Self {
            target: target.into(),
            property: Property::Rotation,
            source: ProcScalar::Ramp {
                rate: deg_per_sec,
                offset: 0.0,
                wrap: Some(360.0),
            },
        }
    }

    fn seed(&self) -> u64 {
        stable_hash64(0, &format!("{}/{}", self.target, self.property.name()))
    }
}

/// Identifies whoever drives a property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OwnerId(pub u64);

/// Records which driver owns each `(element, property)` pair.
#[derive(Debug, Default)]
pub struct OwnershipLedger {
    owners: BTreeMap<(ElementId, Property), OwnerId>,
}

impl OwnershipLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim every pair for `owner`, or nothing if any pair already has another owner.
    pub fn claim<'a>(
        &mut self,
        owner: OwnerId,
        pairs: impl IntoIterator<Item = (&'a ElementId, &'a Property)>,
    ) -> ScrollyteResult<()> {
        let pairs: Vec<(ElementId, Property)> = pairs
            .into_iter()
            .map(|(e, p)| (e.clone(), p.clone()))
            .collect();
        for key in &pairs {
            if let Some(other) = self.owners.get(key) {
                if *other != owner {
                    return Err(ScrollyteError::validation(format!(
                        "'{}'.{} is already driven by another animation",
                        key.0,
                        key.1.name()
                    )));
                }
            }
        }
        for key in pairs {
            self.owners.insert(key, owner);
        }
        Ok(())
    }

    /// Drop every claim held by `owner`.
    pub fn release(&mut self, owner: OwnerId) {
        self.owners.retain(|_, o| *o != owner);
    }

    /// Current owner of a pair.
    pub fn owner(&self, el: &ElementId, prop: &Property) -> Option<OwnerId> {
        self.owners.get(&(el.clone(), prop.clone())).copied()
    }

    /// Number of claimed pairs.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Whether no pair is claimed.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Clock {
    Running { frame: FrameHandle },
    Paused { at: f64 },
    Stopped,
}

/// Runtime of a set of idle loops sharing one frame loop.
#[derive(Debug)]
pub struct IdleAnimator {
    defs: Vec<IdleDef>,
    seeds: Vec<u64>,
    started_at: f64,
    paused_total: f64,
    clock: Clock,
}

impl IdleAnimator {
    /// Start animating at wall-clock `now`.
    pub fn start(defs: Vec<IdleDef>, host: &mut dyn Host, now: f64) -> Self {
        let seeds = defs.iter().map(IdleDef::seed).collect();
        Self {
            defs,
            seeds,
            started_at: now,
            paused_total: 0.0,
            clock: Clock::Running {
                frame: host.request_frame(),
            },
        }
    }

    /// Animated definitions.
    pub fn defs(&self) -> &[IdleDef] {
        &self.defs
    }

    /// Whether the frame loop is live.
    pub fn is_running(&self) -> bool {
        matches!(self.clock, Clock::Running { .. })
    }

    /// Local animation time at wall-clock `now`, excluding paused spans.
    pub fn local_time(&self, now: f64) -> f64 {
        let end = match self.clock {
            Clock::Paused { at } => at,
            _ => now,
        };
        (end - self.started_at - self.paused_total).max(0.0)
    }

    /// Write the current sample of every loop; paused or stopped animators write nothing.
    ///
    /// Returns the number of writes that landed.
    pub fn tick(&self, host: &mut dyn Host, now: f64) -> usize {
        if !self.is_running() {
            return 0;
        }
        let t = self.local_time(now);
        let mut landed = 0;
        for (def, seed) in self.defs.iter().zip(&self.seeds) {
            let v = def.source.sample(t, *seed);
            if host.write(&def.target, &def.property, v) {
                landed += 1;
            } else {
                tracing::debug!(target_el = %def.target, "idle target absent, write skipped");
            }
        }
        landed
    }

    /// Freeze in place; the frame loop is cancelled.
    pub fn pause(&mut self, host: &mut dyn Host, now: f64) {
        if let Clock::Running { frame } = self.clock {
            host.cancel_frame(frame);
            self.clock = Clock::Paused { at: now };
        }
    }

    /// Continue from the frozen phase.
    pub fn resume(&mut self, host: &mut dyn Host, now: f64) {
        if let Clock::Paused { at } = self.clock {
            self.paused_total += (now - at).max(0.0);
            self.clock = Clock::Running {
                frame: host.request_frame(),
            };
        }
    }

    /// Cancel the frame loop for good. Safe to call repeatedly.
    pub fn stop(&mut self, host: &mut dyn Host) {
        if let Clock::Running { frame } = self.clock {
            host.cancel_frame(frame);
        }
        self.clock = Clock::Stopped;
    }
}

#[cfg(test)]
#[path = "../tests/unit/idle/idle.rs"]
mod tests;
