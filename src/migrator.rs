/// Load-based process migration between devices.
///
/// Load is the number of READY or RUNNING processes on an alive device.
/// Failed devices are left out entirely; their backlog stays frozen until
/// they recover. At most one process moves per call.

use crate::activity::ActivityLog;
use crate::device::{Device, DeviceId};
use crate::process::Pid;

/// A completed move of one process's outstanding work.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Migration {
    pub source: DeviceId,
    pub target: DeviceId,
    /// Pid of the retired process on `source`.
    pub old_pid: Pid,
    /// Pid of the replacement on `target`, from the target's own sequence.
    pub new_pid: Pid,
    /// Work units carried over (the old process's `remaining`).
    pub transferred: u64,
    pub mem_required: u64,
}

/// Rebalancing policy run once per step.
pub trait TaskMigrator {
    /// Move work between `devices` if warranted. Returns the move made.
    fn rebalance(&mut self, devices: &mut [Box<dyn Device>]) -> Option<Migration>;
}

/// Moves one process from the most to the least loaded alive device when
/// their load differs by at least `imbalance_threshold`.
///
/// Ties go to the device that comes first in list order.
#[derive(Debug, Clone)]
pub struct LeastLoadedMigrator {
    imbalance_threshold: u64,
    log: ActivityLog,
}

impl LeastLoadedMigrator {
    pub fn new(imbalance_threshold: u64) -> Self {
        LeastLoadedMigrator {
            imbalance_threshold,
            log: ActivityLog::default(),
        }
    }

    pub fn with_log(mut self, log: ActivityLog) -> Self {
        self.log = log;
        self
    }

    pub fn imbalance_threshold(&self) -> u64 {
        self.imbalance_threshold
    }
}

/// First maximal and first minimal `(index, load)` among alive devices.
fn load_extremes(devices: &[Box<dyn Device>]) -> Option<((usize, usize), (usize, usize))> {
    let mut most: Option<(usize, usize)> = None;
    let mut least: Option<(usize, usize)> = None;

    for (idx, dev) in devices.iter().enumerate().filter(|(_, d)| d.is_alive()) {
        let load = dev.os().load();
        if most.map_or(true, |(_, max)| load > max) {
            most = Some((idx, load));
        }
        if least.map_or(true, |(_, min)| load < min) {
            least = Some((idx, load));
        }
    }

    Some((most?, least?))
}

impl TaskMigrator for LeastLoadedMigrator {
    fn rebalance(&mut self, devices: &mut [Box<dyn Device>]) -> Option<Migration> {
        if devices.len() < 2 {
            return None;
        }

        let ((most_idx, max_load), (least_idx, min_load)) = load_extremes(devices)?;
        if max_load == 0 || most_idx == least_idx {
            return None;
        }
        if ((max_load - min_load) as u64) < self.imbalance_threshold {
            return None;
        }

        let (old_pid, remaining, mem_required) = devices[most_idx]
            .os()
            .processes()
            .iter()
            .find(|p| p.state().is_runnable())
            .map(|p| (p.pid(), p.remaining(), p.mem_required()))?;

        let source = devices[most_idx].id();
        let target = devices[least_idx].id();

        let new_process = match devices[least_idx]
            .os_mut()
            .create_process(remaining, mem_required)
        {
            Ok(p) => p,
            Err(e) => {
                log::debug!(
                    "migration of {} pid={} to {} skipped: {}",
                    source,
                    old_pid.raw(),
                    target,
                    e
                );
                return None;
            }
        };

        let transferred = devices[most_idx].os_mut().mark_migrated(old_pid)?;

        self.log.record(format!(
            "[MIGRATION] moved pid={} with cpu_time={} from device {} to device {} (new pid={})",
            old_pid.raw(),
            transferred,
            source,
            target,
            new_process.pid().raw()
        ));

        Some(Migration {
            source,
            target,
            old_pid,
            new_pid: new_process.pid(),
            transferred,
            mem_required,
        })
    }
}
