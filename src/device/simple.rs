//! `SimpleDevice` — the default `Device` implementation.

use crate::os::OperatingSystem;

use super::id::DeviceId;
use super::traits::{Device, DeviceState};

/// A device that owns one boxed operating system for its whole lifetime.
pub struct SimpleDevice {
    id: DeviceId,
    os: Box<dyn OperatingSystem>,
    state: DeviceState,
}

impl SimpleDevice {
    /// A new ONLINE device.
    pub fn new(id: DeviceId, os: Box<dyn OperatingSystem>) -> Self {
        SimpleDevice {
            id,
            os,
            state: DeviceState::Online,
        }
    }
}

impl Device for SimpleDevice {
    fn id(&self) -> DeviceId {
        self.id
    }

    fn state(&self) -> DeviceState {
        self.state
    }

    fn os(&self) -> &dyn OperatingSystem {
        self.os.as_ref()
    }

    fn os_mut(&mut self) -> &mut dyn OperatingSystem {
        self.os.as_mut()
    }

    fn tick(&mut self) {
        if self.state == DeviceState::Online {
            self.os.tick();
        }
    }

    fn fail(&mut self) -> bool {
        if self.state == DeviceState::Failed {
            return false;
        }
        self.state = DeviceState::Failed;
        true
    }

    fn recover(&mut self) -> bool {
        if self.state == DeviceState::Online {
            return false;
        }
        self.state = DeviceState::Online;
        true
    }
}
