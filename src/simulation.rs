/// Simulation engine: one global, synchronous time step at a time.
///
/// A step runs four phases in a fixed order:
///
/// 1. failure strategy (recoveries, then new failures),
/// 2. message delivery from the bus into each device's inbox,
/// 3. one tick of every device in list order,
/// 4. one rebalancing pass of the task migrator.
///
/// Administrative calls (adding devices and processes, sending messages)
/// happen between steps. Nothing here blocks, yields or spawns.

use crate::activity::ActivityLog;
use crate::api::{DeviceSnapshot, FleetSnapshot};
use crate::bus::{Message, MessageBus, MessagePayload, SimpleMessageBus};
use crate::device::{Device, DeviceId, SimpleDevice};
use crate::error::{SimError, SimResult};
use crate::failure::{FailureReport, FailureStrategy};
use crate::migrator::{Migration, TaskMigrator};
use crate::os::{BasicOs, OperatingSystem};
use crate::process::Process;
use crate::time::VirtualTime;

/// What happened during one call to [`SimulationEngine::step`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    pub time: VirtualTime,
    pub failures: FailureReport,
    /// Messages moved from the bus into inboxes.
    pub delivered: usize,
    pub migration: Option<Migration>,
}

/// Top-level driver owning the fleet and its policies.
pub struct SimulationEngine {
    devices: Vec<Box<dyn Device>>,
    failure_strategy: Option<Box<dyn FailureStrategy>>,
    task_migrator: Option<Box<dyn TaskMigrator>>,
    bus: Box<dyn MessageBus>,
    log: ActivityLog,
    time: VirtualTime,
    next_device_id: u64,
}

impl SimulationEngine {
    /// An empty fleet with no failures, no migration and a fresh bus.
    pub fn new(log: ActivityLog) -> Self {
        SimulationEngine {
            devices: Vec::new(),
            failure_strategy: None,
            task_migrator: None,
            bus: Box::new(SimpleMessageBus::with_log(log.clone())),
            log,
            time: VirtualTime::ZERO,
            next_device_id: 1,
        }
    }

    pub fn with_failure_strategy(mut self, strategy: Box<dyn FailureStrategy>) -> Self {
        self.failure_strategy = Some(strategy);
        self
    }

    pub fn with_task_migrator(mut self, migrator: Box<dyn TaskMigrator>) -> Self {
        self.task_migrator = Some(migrator);
        self
    }

    pub fn with_message_bus(mut self, bus: Box<dyn MessageBus>) -> Self {
        self.bus = bus;
        self
    }

    // ── Stepping ──────────────────────────────────────────────────

    /// Advance the whole fleet by one time unit.
    pub fn step(&mut self) -> StepReport {
        self.time = self.time.next();
        self.log
            .record(format!("[SIM] === Step t={} ===", self.time.ticks()));

        let failures = match self.failure_strategy.as_mut() {
            Some(strategy) => strategy.apply(self.time, &mut self.devices),
            None => FailureReport::default(),
        };

        let mut delivered = 0;
        for dev in self.devices.iter_mut() {
            let inbox = self.bus.poll_for_device(dev.id());
            if !inbox.is_empty() {
                delivered += inbox.len();
                dev.os_mut().deliver_messages(inbox);
            }
        }

        for dev in self.devices.iter_mut() {
            dev.tick();
        }

        let migration = self
            .task_migrator
            .as_mut()
            .and_then(|m| m.rebalance(&mut self.devices));

        StepReport {
            time: self.time,
            failures,
            delivered,
            migration,
        }
    }

    /// Run `steps` consecutive steps. Returns the report of each.
    pub fn run_for(&mut self, steps: u64) -> Vec<StepReport> {
        (0..steps).map(|_| self.step()).collect()
    }

    // ── Administration ────────────────────────────────────────────

    /// Add an ONLINE device with `total_memory` units of bounded memory and
    /// round-robin scheduling.
    pub fn add_device(&mut self, total_memory: u64) -> DeviceId {
        let os = BasicOs::with_memory(total_memory, self.log.clone());
        let id = self.add_device_with_os(Box::new(os));
        self.log.record(format!(
            "[CMD] Added device {} with memory={}",
            id.raw(),
            total_memory
        ));
        id
    }

    /// Add an ONLINE device running a caller-supplied operating system.
    pub fn add_device_with_os(&mut self, os: Box<dyn OperatingSystem>) -> DeviceId {
        let id = DeviceId::new(self.next_device_id);
        self.next_device_id += 1;
        self.devices.push(Box::new(SimpleDevice::new(id, os)));
        id
    }

    /// Create a process on `device`.
    pub fn create_process(
        &mut self,
        device: DeviceId,
        cpu_time: u64,
        mem_required: u64,
    ) -> SimResult<Process> {
        let dev = self.device_mut(device)?;
        let process = dev.os_mut().create_process(cpu_time, mem_required)?;
        self.log.record(format!(
            "[CMD] Created process pid={} on device {}",
            process.pid().raw(),
            device.raw()
        ));
        Ok(process)
    }

    /// Queue a message on the bus. It reaches `to` on the next step.
    pub fn send(
        &mut self,
        from: DeviceId,
        to: DeviceId,
        payload: impl Into<MessagePayload>,
    ) -> SimResult<()> {
        self.device(from)?;
        self.device(to)?;
        self.bus.send(Message::new(from, to, payload));
        Ok(())
    }

    // ── Inspection ────────────────────────────────────────────────

    pub fn time(&self) -> VirtualTime {
        self.time
    }

    pub fn devices(&self) -> &[Box<dyn Device>] {
        &self.devices
    }

    pub fn device(&self, id: DeviceId) -> SimResult<&dyn Device> {
        self.devices
            .iter()
            .find(|d| d.id() == id)
            .map(|d| d.as_ref())
            .ok_or(SimError::DeviceNotFound(id))
    }

    fn device_mut(&mut self, id: DeviceId) -> SimResult<&mut Box<dyn Device>> {
        self.devices
            .iter_mut()
            .find(|d| d.id() == id)
            .ok_or(SimError::DeviceNotFound(id))
    }

    pub fn pending_messages(&self) -> usize {
        self.bus.pending_count()
    }

    pub fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot::capture(self.time, &self.devices, self.bus.pending_count())
    }

    pub fn device_snapshot(&self, id: DeviceId) -> SimResult<DeviceSnapshot> {
        self.device(id).map(DeviceSnapshot::capture)
    }

    /// The newest `n` activity log lines, oldest first.
    pub fn recent_log(&self, n: usize) -> Vec<String> {
        self.log.last(n)
    }

    pub fn activity_log(&self) -> &ActivityLog {
        &self.log
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new(ActivityLog::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::RandomFailure;
    use crate::migrator::LeastLoadedMigrator;
    use crate::process::{Pid, ProcessState};
    use crate::rng::ScriptedRandom;

    #[test]
    fn test_single_process_runs_three_steps() {
        let mut sim = SimulationEngine::default();
        let d = sim.add_device(10);
        let p = sim.create_process(d, 3, 4).unwrap();
        assert_eq!(p.pid(), Pid::new(1));
        assert_eq!(sim.device(d).unwrap().os().memory().used(), 4);

        sim.step();
        let snap = sim.device_snapshot(d).unwrap();
        assert_eq!(snap.processes[0].state, ProcessState::Running);
        assert_eq!(snap.processes[0].remaining, 2);

        sim.step();
        sim.step();
        let snap = sim.device_snapshot(d).unwrap();
        assert!(snap.processes.is_empty());
        assert_eq!(snap.memory_used, 0);
        assert_eq!(sim.time(), VirtualTime::new(3));
    }

    #[test]
    fn test_device_ids_sequential() {
        let mut sim = SimulationEngine::default();
        assert_eq!(sim.add_device(5), DeviceId::new(1));
        assert_eq!(sim.add_device(5), DeviceId::new(2));
        assert_eq!(sim.add_device(5), DeviceId::new(3));
    }

    #[test]
    fn test_unknown_device_is_not_found() {
        let mut sim = SimulationEngine::default();
        let d = sim.add_device(5);
        let ghost = DeviceId::new(9);

        assert_eq!(sim.create_process(ghost, 1, 1).unwrap_err(), SimError::DeviceNotFound(ghost));
        assert_eq!(sim.send(d, ghost, "hi").unwrap_err(), SimError::DeviceNotFound(ghost));
        assert_eq!(sim.send(ghost, d, "hi").unwrap_err(), SimError::DeviceNotFound(ghost));
        assert!(sim.device(ghost).is_err());
        assert_eq!(sim.pending_messages(), 0);
    }

    #[test]
    fn test_create_denied_reported_as_value() {
        let mut sim = SimulationEngine::default();
        let d = sim.add_device(3);
        assert!(matches!(
            sim.create_process(d, 1, 4),
            Err(SimError::AllocationDenied { requested: 4, available: 3 })
        ));
        assert!(sim.device(d).unwrap().os().processes().is_empty());
    }

    #[test]
    fn test_message_delivered_next_step_then_consumed() {
        let mut sim = SimulationEngine::default();
        let a = sim.add_device(5);
        let b = sim.add_device(5);
        sim.send(a, b, "hello").unwrap();
        sim.send(a, b, "again").unwrap();
        assert_eq!(sim.pending_messages(), 2);

        let report = sim.step();
        assert_eq!(report.delivered, 2);
        assert_eq!(sim.pending_messages(), 0);
        // Delivered before the tick, then cleared by it.
        assert_eq!(sim.device_snapshot(b).unwrap().inbox_len, 0);
        assert!(sim
            .recent_log(20)
            .iter()
            .any(|l| l == "[OS] Processing 2 incoming messages"));
    }

    #[test]
    fn test_failed_device_keeps_inbox_until_recovered() {
        let mut sim = SimulationEngine::default().with_failure_strategy(Box::new(
            RandomFailure::new(0.5, 2, Box::new(ScriptedRandom::new(vec![0.0, 0.9]))),
        ));
        let a = sim.add_device(5);
        sim.send(a, a, "self").unwrap();

        let r1 = sim.step();
        assert_eq!(r1.failures.failed, vec![a]);
        assert_eq!(r1.delivered, 1);
        assert_eq!(sim.device_snapshot(a).unwrap().inbox_len, 1);

        sim.step();
        let r3 = sim.step();
        assert_eq!(r3.failures.recovered, vec![a]);
        assert_eq!(sim.device_snapshot(a).unwrap().inbox_len, 0);
    }

    #[test]
    fn test_round_robin_completion_order() {
        let mut sim = SimulationEngine::default();
        let d = sim.add_device(100);
        for _ in 0..4 {
            sim.create_process(d, 3, 1).unwrap();
        }

        let mut finished: Vec<(u64, u64)> = Vec::new();
        let mut alive: Vec<Pid> = (1..=4).map(Pid::new).collect();
        for _ in 0..12 {
            let report = sim.step();
            let snap = sim.device_snapshot(d).unwrap();
            alive.retain(|pid| {
                let still = snap.processes.iter().any(|p| p.pid == *pid);
                if !still {
                    finished.push((pid.raw(), report.time.ticks()));
                }
                still
            });
        }
        assert_eq!(finished, vec![(1, 3), (2, 6), (3, 9), (4, 12)]);
    }

    #[test]
    fn test_migration_after_ticks() {
        let mut sim = SimulationEngine::default()
            .with_task_migrator(Box::new(LeastLoadedMigrator::new(1)));
        let a = sim.add_device(20);
        let b = sim.add_device(20);
        for _ in 0..3 {
            sim.create_process(a, 5, 2).unwrap();
        }

        let report = sim.step();
        let m = report.migration.unwrap();
        assert_eq!((m.source, m.target), (a, b));
        // The running process is first in table order and carries 4 units.
        assert_eq!(m.old_pid, Pid::new(1));
        assert_eq!(m.transferred, 4);

        let snap = sim.snapshot();
        assert_eq!(snap.device(a).unwrap().load(), 2);
        assert_eq!(snap.device(b).unwrap().load(), 1);
        assert_eq!(snap.device(b).unwrap().processes[0].cpu_time, 4);

        // The migrated original is reaped on its owner's next tick.
        sim.step();
        let a_snap = sim.device_snapshot(a).unwrap();
        assert!(a_snap.processes.iter().all(|p| p.pid != Pid::new(1)));
        assert_eq!(a_snap.memory_used, 4);
    }

    #[test]
    fn test_step_log_header() {
        let mut sim = SimulationEngine::default();
        sim.step();
        sim.step();
        assert!(sim.recent_log(5).contains(&"[SIM] === Step t=2 ===".to_string()));
    }

    #[test]
    fn test_custom_os_plugs_in() {
        let mut sim = SimulationEngine::default();
        let os = BasicOs::with_memory(7, ActivityLog::with_capacity(4));
        let id = sim.add_device_with_os(Box::new(os));
        assert_eq!(sim.device(id).unwrap().os().memory().total(), 7);
    }
}
