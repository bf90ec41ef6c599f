//! Tests for `SimpleDevice` driving a `BasicOs`.

use crate::activity::ActivityLog;
use crate::device::{Device, DeviceId, DeviceState, SimpleDevice};
use crate::os::BasicOs;
use crate::process::ProcessState;

fn device(id: u64, memory: u64) -> SimpleDevice {
    SimpleDevice::new(
        DeviceId::new(id),
        Box::new(BasicOs::with_memory(memory, ActivityLog::with_capacity(64))),
    )
}

#[test]
fn test_new_device_is_online() {
    let dev = device(1, 10);
    assert_eq!(dev.id(), DeviceId::new(1));
    assert_eq!(dev.state(), DeviceState::Online);
    assert!(dev.is_alive());
    assert_eq!(dev.os().memory().total(), 10);
}

#[test]
fn test_fail_and_recover_transitions() {
    let mut dev = device(1, 10);

    assert!(dev.fail());
    assert!(!dev.fail());
    assert_eq!(dev.state(), DeviceState::Failed);
    assert!(!dev.is_alive());

    assert!(dev.recover());
    assert!(!dev.recover());
    assert!(dev.is_alive());
}

#[test]
fn test_failed_device_does_not_advance() {
    let mut dev = device(1, 10);
    dev.os_mut().create_process(3, 2).unwrap();

    dev.tick();
    assert_eq!(dev.os().processes()[0].remaining(), 2);

    dev.fail();
    for _ in 0..5 {
        dev.tick();
    }
    let p = &dev.os().processes()[0];
    assert_eq!(p.remaining(), 2);
    assert_eq!(p.state(), ProcessState::Running);
    assert_eq!(dev.os().memory().used(), 2);

    dev.recover();
    dev.tick();
    dev.tick();
    assert!(dev.os().processes().is_empty());
    assert_eq!(dev.os().memory().used(), 0);
}

#[test]
fn test_device_display_id() {
    assert_eq!(DeviceId::new(3).to_string(), "D3");
    assert_eq!(DeviceState::Failed.to_string(), "FAILED");
}
