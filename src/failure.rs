/// Random device failure and timed recovery.
///
/// Every step runs a recovery pass followed by a failure pass. A device that
/// fails at time `t` comes back on the first step at or after
/// `t + recovery_delay`. A device recovered in a step may fail again in that
/// same step's failure pass.

use std::collections::BTreeMap;

use crate::activity::ActivityLog;
use crate::device::{Device, DeviceId};
use crate::rng::{DeterministicRng, RandomSource};
use crate::time::VirtualTime;

/// Status transitions applied during one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct FailureReport {
    pub recovered: Vec<DeviceId>,
    pub failed: Vec<DeviceId>,
}

impl FailureReport {
    pub fn is_empty(&self) -> bool {
        self.recovered.is_empty() && self.failed.is_empty()
    }
}

/// Policy that flips devices between ONLINE and FAILED.
///
/// Implementations change status only through `Device::fail` and
/// `Device::recover`.
pub trait FailureStrategy {
    fn apply(&mut self, now: VirtualTime, devices: &mut [Box<dyn Device>]) -> FailureReport;
}

/// Independent per-device failures with a fixed recovery delay.
pub struct RandomFailure {
    fail_probability: f64,
    recovery_delay: u64,
    /// Time each currently failed device went down.
    failed_at: BTreeMap<DeviceId, VirtualTime>,
    rng: Box<dyn RandomSource>,
    log: ActivityLog,
}

impl RandomFailure {
    pub fn new(fail_probability: f64, recovery_delay: u64, rng: Box<dyn RandomSource>) -> Self {
        RandomFailure {
            fail_probability,
            recovery_delay,
            failed_at: BTreeMap::new(),
            rng,
            log: ActivityLog::default(),
        }
    }

    /// Failures driven by a [`DeterministicRng`] seeded with `seed`.
    pub fn seeded(fail_probability: f64, recovery_delay: u64, seed: u64) -> Self {
        Self::new(
            fail_probability,
            recovery_delay,
            Box::new(DeterministicRng::new(seed)),
        )
    }

    pub fn with_log(mut self, log: ActivityLog) -> Self {
        self.log = log;
        self
    }

    pub fn fail_probability(&self) -> f64 {
        self.fail_probability
    }

    pub fn recovery_delay(&self) -> u64 {
        self.recovery_delay
    }

    /// When `device` went down, if this strategy failed it and it has not
    /// recovered yet.
    pub fn failed_since(&self, device: DeviceId) -> Option<VirtualTime> {
        self.failed_at.get(&device).copied()
    }
}

impl FailureStrategy for RandomFailure {
    fn apply(&mut self, now: VirtualTime, devices: &mut [Box<dyn Device>]) -> FailureReport {
        let mut report = FailureReport::default();

        for dev in devices.iter_mut().filter(|d| !d.is_alive()) {
            let id = dev.id();
            // Devices failed by someone else are not ours to recover.
            let Some(started) = self.failed_at.get(&id).copied() else {
                continue;
            };
            let due = now
                .since(started)
                .map_or(false, |down| down >= self.recovery_delay);
            if due && dev.recover() {
                self.failed_at.remove(&id);
                self.log.record(format!(
                    "[FAIL] device {} recovered at {} (down since {})",
                    id, now, started
                ));
                report.recovered.push(id);
            }
        }

        for dev in devices.iter_mut().filter(|d| d.is_alive()) {
            if self.rng.next_f64() < self.fail_probability && dev.fail() {
                let id = dev.id();
                self.failed_at.insert(id, now);
                self.log
                    .record(format!("[FAIL] device {} failed at {}", id, now));
                report.failed.push(id);
            }
        }

        report
    }
}
