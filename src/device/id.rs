//! Device ID — a lightweight, ordered, copyable device identifier.

/// A fleet-wide device identifier.
///
/// Assigned sequentially by the engine starting at 1; never reused because
/// devices are never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceId(u64);

impl DeviceId {
    #[inline]
    pub fn new(id: u64) -> Self {
        DeviceId(id)
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "D{}", self.0)
    }
}
