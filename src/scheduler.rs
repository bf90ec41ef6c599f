/// Per-device process scheduling.
///
/// The scheduler only orders pids; the operating system owns the processes
/// and decides which picks are actually runnable. Swapping in another policy
/// means implementing [`Scheduler`] and handing it to `BasicOs`.

use std::collections::VecDeque;

use crate::process::Pid;

/// Ordering policy for ready processes.
///
/// # Contract
/// - `add` registers a pid; it stays registered until `remove`.
/// - `pick_next` never drops a pid: the caller removes pids that should not
///   be reconsidered.
/// - `remove` of an unknown pid is a no-op.
pub trait Scheduler {
    fn add(&mut self, pid: Pid);

    /// Next pid to run, or `None` when nothing is registered.
    fn pick_next(&mut self) -> Option<Pid>;

    fn remove(&mut self, pid: Pid);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Round-robin queue: the picked pid is rotated to the tail.
#[derive(Debug, Clone, Default)]
pub struct RoundRobinScheduler {
    queue: VecDeque<Pid>,
}

impl RoundRobinScheduler {
    pub fn new() -> Self {
        RoundRobinScheduler {
            queue: VecDeque::new(),
        }
    }

    /// Current queue order, head first.
    pub fn order(&self) -> Vec<Pid> {
        self.queue.iter().copied().collect()
    }
}

impl Scheduler for RoundRobinScheduler {
    fn add(&mut self, pid: Pid) {
        self.queue.push_back(pid);
    }

    fn pick_next(&mut self) -> Option<Pid> {
        let pid = self.queue.pop_front()?;
        self.queue.push_back(pid);
        Some(pid)
    }

    fn remove(&mut self, pid: Pid) {
        if let Some(pos) = self.queue.iter().position(|p| *p == pid) {
            self.queue.remove(pos);
        }
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pids(raw: &[u64]) -> Vec<Pid> {
        raw.iter().map(|r| Pid::new(*r)).collect()
    }

    #[test]
    fn test_pick_rotates_head_to_tail() {
        let mut sched = RoundRobinScheduler::new();
        for p in pids(&[1, 2, 3]) {
            sched.add(p);
        }

        assert_eq!(sched.pick_next(), Some(Pid::new(1)));
        assert_eq!(sched.order(), pids(&[2, 3, 1]));
        assert_eq!(sched.pick_next(), Some(Pid::new(2)));
        assert_eq!(sched.pick_next(), Some(Pid::new(3)));
        // Full cycle before any repeat.
        assert_eq!(sched.pick_next(), Some(Pid::new(1)));
        assert_eq!(sched.len(), 3);
    }

    #[test]
    fn test_empty_scheduler() {
        let mut sched = RoundRobinScheduler::new();
        assert!(sched.is_empty());
        assert!(sched.pick_next().is_none());
    }

    #[test]
    fn test_remove_present_and_absent() {
        let mut sched = RoundRobinScheduler::new();
        for p in pids(&[1, 2, 3]) {
            sched.add(p);
        }
        sched.remove(Pid::new(2));
        assert_eq!(sched.order(), pids(&[1, 3]));

        sched.remove(Pid::new(42));
        assert_eq!(sched.order(), pids(&[1, 3]));
    }

    #[test]
    fn test_deterministic_pick_order() {
        fn run() -> Vec<Pid> {
            let mut sched = RoundRobinScheduler::new();
            for p in pids(&[4, 9, 2]) {
                sched.add(p);
            }
            (0..7).filter_map(|_| sched.pick_next()).collect()
        }
        assert_eq!(run(), run());
        assert_eq!(run(), pids(&[4, 9, 2, 4, 9, 2, 4]));
    }
}
