/// Logical simulation clock.
///
/// One tick is one global step of the engine. Nothing in the simulator
/// reads wall-clock time; the clock only moves when `SimulationEngine::step`
/// runs.

/// A point in simulated time, measured in whole steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualTime(u64);

impl VirtualTime {
    /// Time before the first step has run.
    pub const ZERO: VirtualTime = VirtualTime(0);

    #[inline]
    pub fn new(ticks: u64) -> Self {
        VirtualTime(ticks)
    }

    #[inline]
    pub fn ticks(self) -> u64 {
        self.0
    }

    /// The time one step later. Saturates at `u64::MAX`.
    #[inline]
    pub fn next(self) -> VirtualTime {
        VirtualTime(self.0.saturating_add(1))
    }

    /// Ticks elapsed between `earlier` and `self`, or `None` if `earlier`
    /// is actually in the future.
    #[inline]
    pub fn since(self, earlier: VirtualTime) -> Option<u64> {
        self.0.checked_sub(earlier.0)
    }
}

impl std::fmt::Display for VirtualTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t={}", self.0)
    }
}
