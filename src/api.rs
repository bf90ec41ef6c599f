/// Read-only views of the fleet for external drivers.
///
/// A [`FleetSnapshot`] is a plain-data copy of everything a console needs
/// to render: device status, memory, and process tables. Snapshots compare
/// with `==` and hash deterministically, which is how replay determinism is
/// checked.
///
/// JSON export uses `serde_json` when the `serialize` feature is on and a
/// hand-built string otherwise.

use crate::device::{Device, DeviceId, DeviceState};
use crate::process::{Pid, ProcessState};
use crate::time::VirtualTime;

// ── Hash utility ──────────────────────────────────────────────────────

/// Combine two u64 hashes deterministically.
pub fn hash_combine(a: u64, b: u64) -> u64 {
    let mut h = a;
    h = h.wrapping_mul(0x517cc1b727220a95);
    h = h.wrapping_add(b);
    h ^= h >> 32;
    h
}

fn process_state_code(s: ProcessState) -> u64 {
    match s {
        ProcessState::Ready => 1,
        ProcessState::Running => 2,
        ProcessState::Blocked => 3,
        ProcessState::Finished => 4,
        ProcessState::Migrated => 5,
    }
}

// ── Snapshots ─────────────────────────────────────────────────────────

/// One row of a device's process table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessSnapshot {
    pub pid: Pid,
    pub state: ProcessState,
    pub remaining: u64,
    pub cpu_time: u64,
    pub mem_required: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceSnapshot {
    pub id: DeviceId,
    pub state: DeviceState,
    pub memory_total: u64,
    pub memory_used: u64,
    pub processes: Vec<ProcessSnapshot>,
    /// Messages delivered but not yet consumed by a tick.
    pub inbox_len: usize,
}

impl DeviceSnapshot {
    pub fn capture(dev: &dyn Device) -> Self {
        let os = dev.os();
        DeviceSnapshot {
            id: dev.id(),
            state: dev.state(),
            memory_total: os.memory().total(),
            memory_used: os.memory().used(),
            processes: os
                .processes()
                .iter()
                .map(|p| ProcessSnapshot {
                    pid: p.pid(),
                    state: p.state(),
                    remaining: p.remaining(),
                    cpu_time: p.cpu_time(),
                    mem_required: p.mem_required(),
                })
                .collect(),
            inbox_len: os.pending_messages().len(),
        }
    }

    pub fn memory_free(&self) -> u64 {
        self.memory_total.saturating_sub(self.memory_used)
    }

    /// READY or RUNNING processes.
    pub fn load(&self) -> usize {
        self.processes
            .iter()
            .filter(|p| p.state.is_runnable())
            .count()
    }
}

/// The whole fleet at one point in simulated time.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct FleetSnapshot {
    pub time: VirtualTime,
    pub devices: Vec<DeviceSnapshot>,
    /// Messages still on the bus.
    pub pending_messages: usize,
}

impl FleetSnapshot {
    pub fn capture(
        time: VirtualTime,
        devices: &[Box<dyn Device>],
        pending_messages: usize,
    ) -> Self {
        FleetSnapshot {
            time,
            devices: devices
                .iter()
                .map(|d| DeviceSnapshot::capture(d.as_ref()))
                .collect(),
            pending_messages,
        }
    }

    pub fn device(&self, id: DeviceId) -> Option<&DeviceSnapshot> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// Deterministic hash over every field of the snapshot.
    pub fn state_hash(&self) -> u64 {
        let mut h = hash_combine(0, self.time.ticks());
        h = hash_combine(h, self.pending_messages as u64);
        for dev in &self.devices {
            h = hash_combine(h, dev.id.raw());
            h = hash_combine(h, matches!(dev.state, DeviceState::Online) as u64);
            h = hash_combine(h, dev.memory_total);
            h = hash_combine(h, dev.memory_used);
            h = hash_combine(h, dev.inbox_len as u64);
            for p in &dev.processes {
                h = hash_combine(h, p.pid.raw());
                h = hash_combine(h, process_state_code(p.state));
                h = hash_combine(h, p.remaining);
                h = hash_combine(h, p.cpu_time);
                h = hash_combine(h, p.mem_required);
            }
        }
        h
    }

    /// Export as a JSON string.
    #[cfg(feature = "serialize")]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".into())
    }

    /// Export as a JSON string.
    #[cfg(not(feature = "serialize"))]
    pub fn to_json(&self) -> String {
        let mut s = String::from("{\n");
        s.push_str(&format!(
            "  \"time\": {},\n  \"pending_messages\": {},\n",
            self.time.ticks(),
            self.pending_messages
        ));

        s.push_str("  \"devices\": [\n");
        for (i, dev) in self.devices.iter().enumerate() {
            s.push_str(&format!(
                "    {{\"id\": {}, \"state\": \"{}\", \"memory_total\": {}, \"memory_used\": {}, \"inbox_len\": {}, \"processes\": [",
                dev.id.raw(),
                dev.state,
                dev.memory_total,
                dev.memory_used,
                dev.inbox_len
            ));
            let rows: Vec<String> = dev
                .processes
                .iter()
                .map(|p| {
                    format!(
                        "{{\"pid\": {}, \"state\": \"{}\", \"remaining\": {}, \"cpu_time\": {}, \"mem_required\": {}}}",
                        p.pid.raw(),
                        p.state,
                        p.remaining,
                        p.cpu_time,
                        p.mem_required
                    )
                })
                .collect();
            s.push_str(&rows.join(", "));
            s.push_str("]}");
            if i < self.devices.len() - 1 {
                s.push(',');
            }
            s.push('\n');
        }
        s.push_str("  ]\n");

        s.push('}');
        s
    }
}

impl std::fmt::Display for FleetSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Fleet  {}", self.time)?;
        for dev in &self.devices {
            writeln!(f, "Device {}: {}", dev.id.raw(), dev.state)?;
            writeln!(
                f,
                "  Memory: total={:03} used={:03} free={:03}",
                dev.memory_total,
                dev.memory_used,
                dev.memory_free()
            )?;
            if dev.processes.is_empty() {
                writeln!(f, "  (no processes)")?;
            } else {
                writeln!(f, "  PID  | STATE    | REMAIN | MEM ")?;
                writeln!(f, "  -----+----------+--------+-----")?;
                for p in &dev.processes {
                    writeln!(
                        f,
                        "  {:4} | {:<8} | {:6} | {:4}",
                        p.pid.raw(),
                        p.state.as_str(),
                        p.remaining,
                        p.mem_required
                    )?;
                }
            }
            if dev.inbox_len > 0 {
                writeln!(f, "  Inbox: {} message(s)", dev.inbox_len)?;
            }
        }
        Ok(())
    }
}
