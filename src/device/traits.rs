//! `Device` trait and device status.

use crate::os::OperatingSystem;

use super::id::DeviceId;

/// Whether a device is doing work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum DeviceState {
    Online,
    Failed,
}

impl DeviceState {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceState::Online => "ONLINE",
            DeviceState::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for DeviceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A simulated host running exactly one operating system.
///
/// # Contract
///
/// - Status changes only through [`fail`](Device::fail) and
///   [`recover`](Device::recover). Failure policies must not reach around
///   them.
/// - `tick` forwards to the operating system only while ONLINE. A failed
///   device keeps its processes and memory frozen as they are.
pub trait Device {
    fn id(&self) -> DeviceId;

    fn state(&self) -> DeviceState;

    fn os(&self) -> &dyn OperatingSystem;

    fn os_mut(&mut self) -> &mut dyn OperatingSystem;

    /// Advance the owned operating system by one tick if ONLINE.
    fn tick(&mut self);

    /// Take the device offline. Returns `false` if it already was.
    fn fail(&mut self) -> bool;

    /// Bring the device back online. Returns `false` if it already was.
    fn recover(&mut self) -> bool;

    fn is_alive(&self) -> bool {
        self.state() == DeviceState::Online
    }
}
