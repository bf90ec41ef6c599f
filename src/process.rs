//! Simulated processes and their lifecycle states.

/// Process identifier, unique only within the operating system that
/// allocated it. Use `(DeviceId, Pid)` when a fleet-wide identity is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Pid(u64);

impl Pid {
    #[inline]
    pub fn new(raw: u64) -> Self {
        Pid(raw)
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Lifecycle state of a process.
///
/// ```text
/// READY ──scheduled──▶ RUNNING ──remaining=0──▶ FINISHED
///   │                     │
///   └──────migrated───────┴──────────────────▶ MIGRATED
/// ```
///
/// `FINISHED` and `MIGRATED` are terminal and get reaped on the owner's next
/// cleanup pass. `BLOCKED` exists in the model but nothing enters it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum ProcessState {
    Ready,
    Running,
    Blocked,
    Finished,
    Migrated,
}

impl ProcessState {
    /// READY or RUNNING: counts towards load and may be scheduled or migrated.
    #[inline]
    pub fn is_runnable(self) -> bool {
        matches!(self, ProcessState::Ready | ProcessState::Running)
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, ProcessState::Finished | ProcessState::Migrated)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProcessState::Ready => "READY",
            ProcessState::Running => "RUNNING",
            ProcessState::Blocked => "BLOCKED",
            ProcessState::Finished => "FINISHED",
            ProcessState::Migrated => "MIGRATED",
        }
    }
}

impl std::fmt::Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of simulated work.
///
/// `cpu_time` and `mem_required` are fixed at creation. `remaining` starts
/// at `cpu_time` and only ever decreases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pid: Pid,
    cpu_time: u64,
    remaining: u64,
    mem_required: u64,
    state: ProcessState,
}

impl Process {
    /// A fresh READY process with all of its work outstanding.
    pub fn new(pid: Pid, cpu_time: u64, mem_required: u64) -> Self {
        Process {
            pid,
            cpu_time,
            remaining: cpu_time,
            mem_required,
            state: ProcessState::Ready,
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn cpu_time(&self) -> u64 {
        self.cpu_time
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn mem_required(&self) -> u64 {
        self.mem_required
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// Move a READY process onto the CPU. Terminal processes stay put.
    pub(crate) fn mark_running(&mut self) {
        if !self.state.is_terminal() {
            self.state = ProcessState::Running;
        }
    }

    /// Burn one unit of work. Returns `true` once the process has finished.
    pub(crate) fn run_one(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = ProcessState::Finished;
            return true;
        }
        false
    }

    /// Retire the process after its work was handed to another device.
    /// Returns the work that was transferred.
    pub(crate) fn mark_migrated(&mut self) -> u64 {
        let transferred = self.remaining;
        self.remaining = 0;
        self.state = ProcessState::Migrated;
        transferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_process_is_ready_with_full_work() {
        let p = Process::new(Pid::new(1), 3, 4);
        assert_eq!(p.state(), ProcessState::Ready);
        assert_eq!(p.remaining(), 3);
        assert_eq!(p.cpu_time(), 3);
        assert_eq!(p.mem_required(), 4);
    }

    #[test]
    fn test_run_to_completion() {
        let mut p = Process::new(Pid::new(1), 2, 0);
        p.mark_running();
        assert!(!p.run_one());
        assert_eq!(p.state(), ProcessState::Running);
        assert!(p.run_one());
        assert_eq!(p.state(), ProcessState::Finished);
        assert_eq!(p.remaining(), 0);
    }

    #[test]
    fn test_zero_cost_process_finishes_on_first_run() {
        let mut p = Process::new(Pid::new(7), 0, 1);
        p.mark_running();
        assert!(p.run_one());
        assert_eq!(p.remaining(), 0);
    }

    #[test]
    fn test_terminal_states_are_sticky() {
        let mut p = Process::new(Pid::new(1), 5, 1);
        assert_eq!(p.mark_migrated(), 5);
        p.mark_running();
        assert_eq!(p.state(), ProcessState::Migrated);
        assert_eq!(p.remaining(), 0);
    }

    #[test]
    fn test_state_predicates() {
        assert!(ProcessState::Ready.is_runnable());
        assert!(ProcessState::Running.is_runnable());
        assert!(!ProcessState::Blocked.is_runnable());
        assert!(ProcessState::Finished.is_terminal());
        assert!(ProcessState::Migrated.is_terminal());
        assert_eq!(ProcessState::Migrated.to_string(), "MIGRATED");
    }
}
