//! Bounded, shared activity log.
//!
//! Every component of an engine appends human-readable lines to the same
//! [`ActivityLog`]. The log keeps at most `max_lines` entries and silently
//! drops the oldest ones. Each line is also forwarded to the `log` facade so
//! a binary can stream activity to the terminal.
//!
//! The handle is `Rc`-backed: the simulator is single-threaded and every
//! component lives inside one engine.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Default number of lines retained.
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

#[derive(Debug)]
struct LogRing {
    lines: VecDeque<String>,
    max_lines: usize,
    dropped: u64,
}

/// Cloneable handle to a fixed-capacity ring of log lines.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    inner: Rc<RefCell<LogRing>>,
}

impl ActivityLog {
    /// Create a log that keeps at most `max_lines` lines (minimum 1).
    pub fn with_capacity(max_lines: usize) -> Self {
        let max_lines = max_lines.max(1);
        ActivityLog {
            inner: Rc::new(RefCell::new(LogRing {
                lines: VecDeque::with_capacity(max_lines.min(DEFAULT_LOG_CAPACITY)),
                max_lines,
                dropped: 0,
            })),
        }
    }

    /// Append a line, evicting the oldest lines once over capacity.
    pub fn record(&self, line: impl Into<String>) {
        let line = line.into();
        log::debug!(target: "fleetsim", "{}", line);

        let mut ring = self.inner.borrow_mut();
        ring.lines.push_back(line);
        while ring.lines.len() > ring.max_lines {
            ring.lines.pop_front();
            ring.dropped += 1;
        }
    }

    /// The newest `n` lines, oldest first. `n == 0` yields nothing.
    pub fn last(&self, n: usize) -> Vec<String> {
        let ring = self.inner.borrow();
        let skip = ring.lines.len().saturating_sub(n);
        ring.lines.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.borrow().max_lines
    }

    /// Lines evicted since creation.
    pub fn dropped(&self) -> u64 {
        self.inner.borrow().dropped
    }

    /// `true` if both handles point at the same ring.
    pub fn shares_with(&self, other: &ActivityLog) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_returns_newest_in_order() {
        let log = ActivityLog::with_capacity(10);
        for i in 0..5 {
            log.record(format!("line {}", i));
        }
        assert_eq!(log.last(2), vec!["line 3", "line 4"]);
        assert_eq!(log.last(100).len(), 5);
        assert!(log.last(0).is_empty());
    }

    #[test]
    fn test_oldest_lines_dropped_over_capacity() {
        let log = ActivityLog::with_capacity(3);
        for i in 0..7 {
            log.record(format!("{}", i));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.dropped(), 4);
        assert_eq!(log.last(3), vec!["4", "5", "6"]);
    }

    #[test]
    fn test_clones_share_ring() {
        let a = ActivityLog::with_capacity(4);
        let b = a.clone();
        b.record("from b");
        assert_eq!(a.last(1), vec!["from b"]);
        assert!(a.shares_with(&b));
        assert!(!a.shares_with(&ActivityLog::default()));
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let log = ActivityLog::with_capacity(0);
        log.record("a");
        log.record("b");
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.last(5), vec!["b"]);
    }
}
