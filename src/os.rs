/// Per-device operating system.
///
/// Owns one memory manager, one scheduler, the live process table, the
/// single running process and an inbox of delivered messages. Advances by
/// exactly one unit of work per `tick`.

use crate::activity::ActivityLog;
use crate::bus::Message;
use crate::error::{SimError, SimResult};
use crate::memory::{BoundedMemory, MemoryManager};
use crate::process::{Pid, Process};
use crate::scheduler::{RoundRobinScheduler, Scheduler};

// ── OperatingSystem trait ─────────────────────────────────────────────

/// The capabilities a device needs from its operating system.
///
/// # Contract
/// - `create_process` either reserves memory and registers a READY process,
///   or returns `AllocationDenied` and changes nothing.
/// - `tick` performs at most one unit of work and always ends with a reap.
/// - `reap` removes every FINISHED/MIGRATED process exactly once; calling it
///   again without intervening changes does nothing.
pub trait OperatingSystem {
    fn create_process(&mut self, cpu_time: u64, mem_required: u64) -> SimResult<Process>;

    /// Every process currently owned, in creation order, whatever its state.
    fn processes(&self) -> &[Process];

    /// Queue a batch of delivered messages.
    fn deliver_messages(&mut self, messages: Vec<Message>);

    fn pending_messages(&self) -> &[Message];

    /// Advance by one time unit.
    fn tick(&mut self);

    /// Drop terminal processes and release their memory. Returns how many
    /// processes were removed.
    fn reap(&mut self) -> usize;

    /// Retire a READY/RUNNING process whose work moved elsewhere. Returns the
    /// work handed over, or `None` if `pid` is not owned or not runnable.
    fn mark_migrated(&mut self, pid: Pid) -> Option<u64>;

    fn memory(&self) -> &dyn MemoryManager;

    /// The process currently holding the CPU, if any.
    fn current(&self) -> Option<Pid>;

    /// Number of READY or RUNNING processes.
    fn load(&self) -> usize {
        self.processes()
            .iter()
            .filter(|p| p.state().is_runnable())
            .count()
    }
}

// ── BasicOs ───────────────────────────────────────────────────────────

/// Run-to-completion operating system over a pluggable scheduler.
///
/// A process keeps the CPU until it finishes (or is migrated away); only
/// then is the scheduler asked for the next one.
pub struct BasicOs {
    memory: Box<dyn MemoryManager>,
    scheduler: Box<dyn Scheduler>,
    processes: Vec<Process>,
    current: Option<Pid>,
    next_pid: u64,
    inbox: Vec<Message>,
    log: ActivityLog,
}

impl BasicOs {
    pub fn new(
        memory: Box<dyn MemoryManager>,
        scheduler: Box<dyn Scheduler>,
        log: ActivityLog,
    ) -> Self {
        BasicOs {
            memory,
            scheduler,
            processes: Vec::new(),
            current: None,
            next_pid: 1,
            inbox: Vec::new(),
            log,
        }
    }

    /// Bounded memory of `total` units with round-robin scheduling.
    pub fn with_memory(total: u64, log: ActivityLog) -> Self {
        Self::new(
            Box::new(BoundedMemory::new(total)),
            Box::new(RoundRobinScheduler::new()),
            log,
        )
    }

    /// The pid the next created process will receive.
    pub fn next_pid(&self) -> Pid {
        Pid::new(self.next_pid)
    }

    fn current_is_runnable(&self) -> bool {
        match self.current {
            Some(pid) => self
                .processes
                .iter()
                .any(|p| p.pid() == pid && p.state().is_runnable()),
            None => false,
        }
    }

    /// Ask the scheduler for the next runnable process. Entries left over
    /// from terminal processes are skipped; they are removed by the reap at
    /// the end of the tick.
    fn pick_new_current(&mut self) {
        self.current = None;
        for _ in 0..self.scheduler.len() {
            let Some(pid) = self.scheduler.pick_next() else {
                break;
            };
            if let Some(p) = self
                .processes
                .iter_mut()
                .find(|p| p.pid() == pid && p.state().is_runnable())
            {
                p.mark_running();
                self.current = Some(pid);
                break;
            }
        }
    }
}

impl OperatingSystem for BasicOs {
    fn create_process(&mut self, cpu_time: u64, mem_required: u64) -> SimResult<Process> {
        if !self.memory.alloc(mem_required) {
            self.log.record(format!(
                "[OS] Cannot allocate memory for new process (cpu_time={}, mem={})",
                cpu_time, mem_required
            ));
            return Err(SimError::AllocationDenied {
                requested: mem_required,
                available: self.memory.available(),
            });
        }

        let pid = Pid::new(self.next_pid);
        self.next_pid += 1;

        let process = Process::new(pid, cpu_time, mem_required);
        self.scheduler.add(pid);
        self.processes.push(process.clone());

        self.log.record(format!(
            "[OS] Created process pid={}, cpu_time={}, mem={}",
            pid.raw(),
            cpu_time,
            mem_required
        ));
        Ok(process)
    }

    fn processes(&self) -> &[Process] {
        &self.processes
    }

    fn deliver_messages(&mut self, messages: Vec<Message>) {
        if messages.is_empty() {
            return;
        }
        self.log
            .record(format!("[OS] Received {} messages", messages.len()));
        self.inbox.extend(messages);
    }

    fn pending_messages(&self) -> &[Message] {
        &self.inbox
    }

    fn tick(&mut self) {
        // Payloads are counted, never interpreted.
        if !self.inbox.is_empty() {
            self.log.record(format!(
                "[OS] Processing {} incoming messages",
                self.inbox.len()
            ));
            self.inbox.clear();
        }

        if !self.current_is_runnable() {
            self.pick_new_current();
        }

        let Some(pid) = self.current else {
            self.reap();
            return;
        };

        if let Some(p) = self.processes.iter_mut().find(|p| p.pid() == pid) {
            if p.run_one() {
                self.log
                    .record(format!("[OS] Process pid={} finished", pid.raw()));
                self.current = None;
            }
        }

        self.reap();
    }

    fn reap(&mut self) -> usize {
        if !self.processes.iter().any(|p| p.state().is_terminal()) {
            return 0;
        }

        let (dead, alive): (Vec<Process>, Vec<Process>) = std::mem::take(&mut self.processes)
            .into_iter()
            .partition(|p| p.state().is_terminal());
        self.processes = alive;

        for p in &dead {
            self.scheduler.remove(p.pid());
            self.memory.free(p.mem_required());
            if self.current == Some(p.pid()) {
                self.current = None;
            }
            self.log.record(format!(
                "[OS] Reaped {} process pid={}, mem={}",
                p.state().as_str().to_lowercase(),
                p.pid().raw(),
                p.mem_required()
            ));
        }
        dead.len()
    }

    fn mark_migrated(&mut self, pid: Pid) -> Option<u64> {
        self.processes
            .iter_mut()
            .find(|p| p.pid() == pid && p.state().is_runnable())
            .map(|p| p.mark_migrated())
    }

    fn memory(&self) -> &dyn MemoryManager {
        self.memory.as_ref()
    }

    fn current(&self) -> Option<Pid> {
        self.current
    }
}
