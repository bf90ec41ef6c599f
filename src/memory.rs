//! Per-device memory accounting.

/// Capacity bookkeeping for one device.
///
/// # Contract
/// - `alloc` is all-or-nothing: on `false` nothing changed.
/// - `free` never drives `used` below zero; over-freeing is not an error.
/// - `used() <= total()` always holds.
pub trait MemoryManager {
    /// `true` iff `used + amount <= total`.
    fn can_alloc(&self, amount: u64) -> bool;

    /// Reserve `amount` units if they fit.
    fn alloc(&mut self, amount: u64) -> bool;

    /// Release `amount` units, clamped at zero.
    fn free(&mut self, amount: u64);

    fn total(&self) -> u64;

    fn used(&self) -> u64;

    fn available(&self) -> u64 {
        self.total().saturating_sub(self.used())
    }
}

/// A flat pool of `total` units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedMemory {
    total: u64,
    used: u64,
}

impl BoundedMemory {
    pub fn new(total: u64) -> Self {
        BoundedMemory { total, used: 0 }
    }
}

impl MemoryManager for BoundedMemory {
    fn can_alloc(&self, amount: u64) -> bool {
        self.used
            .checked_add(amount)
            .map_or(false, |after| after <= self.total)
    }

    fn alloc(&mut self, amount: u64) -> bool {
        if !self.can_alloc(amount) {
            return false;
        }
        self.used += amount;
        true
    }

    fn free(&mut self, amount: u64) {
        self.used = self.used.saturating_sub(amount);
    }

    fn total(&self) -> u64 {
        self.total
    }

    fn used(&self) -> u64 {
        self.used
    }
}
