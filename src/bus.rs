/// Device-to-device message bus.
///
/// Messages sit on the bus until the engine polls for their destination.
/// Delivery is pull-based: a message addressed to a device that is never
/// polled stays queued forever.

use crate::activity::ActivityLog;
use crate::device::DeviceId;

// ── MessagePayload ────────────────────────────────────────────────────

/// Opaque message body. The simulator moves payloads around but never
/// interprets them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum MessagePayload {
    /// Raw bytes.
    Data(Vec<u8>),
    /// Human-readable text (what the console sends).
    Text(String),
    /// Empty payload (heartbeats, pings).
    Empty,
}

impl From<&str> for MessagePayload {
    fn from(s: &str) -> Self {
        MessagePayload::Text(s.to_string())
    }
}

impl From<String> for MessagePayload {
    fn from(s: String) -> Self {
        MessagePayload::Text(s)
    }
}

impl std::fmt::Display for MessagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessagePayload::Data(d) => write!(f, "Data({} bytes)", d.len()),
            MessagePayload::Text(s) => {
                if s.chars().count() > 32 {
                    let head: String = s.chars().take(32).collect();
                    write!(f, "{:?}…", head)
                } else {
                    write!(f, "{:?}", s)
                }
            }
            MessagePayload::Empty => write!(f, "Empty"),
        }
    }
}

// ── Message ───────────────────────────────────────────────────────────

/// An immutable `(from, to, payload)` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    from: DeviceId,
    to: DeviceId,
    payload: MessagePayload,
}

impl Message {
    pub fn new(from: DeviceId, to: DeviceId, payload: impl Into<MessagePayload>) -> Self {
        Message {
            from,
            to,
            payload: payload.into(),
        }
    }

    pub fn from_device(&self) -> DeviceId {
        self.from
    }

    pub fn to_device(&self) -> DeviceId {
        self.to
    }

    pub fn payload(&self) -> &MessagePayload {
        &self.payload
    }
}

// ── MessageBus ────────────────────────────────────────────────────────

/// Mailbox keyed by destination device.
///
/// # Contract
/// - `send` enqueues; it never delivers by itself.
/// - `poll_for_device` removes and returns every pending message for that
///   device in send order, and leaves all other messages untouched.
pub trait MessageBus {
    fn send(&mut self, message: Message);

    fn poll_for_device(&mut self, device: DeviceId) -> Vec<Message>;

    /// Messages still waiting for any destination.
    fn pending_count(&self) -> usize;
}

/// A single ordered queue partitioned on poll.
#[derive(Debug, Clone, Default)]
pub struct SimpleMessageBus {
    pending: Vec<Message>,
    log: ActivityLog,
}

impl SimpleMessageBus {
    pub fn new() -> Self {
        SimpleMessageBus::default()
    }

    pub fn with_log(log: ActivityLog) -> Self {
        SimpleMessageBus {
            pending: Vec::new(),
            log,
        }
    }
}

impl MessageBus for SimpleMessageBus {
    fn send(&mut self, message: Message) {
        self.log.record(format!(
            "[IPC] {} → {}: {}",
            message.from, message.to, message.payload
        ));
        self.pending.push(message);
    }

    fn poll_for_device(&mut self, device: DeviceId) -> Vec<Message> {
        if !self.pending.iter().any(|m| m.to == device) {
            return Vec::new();
        }

        let (batch, rest): (Vec<Message>, Vec<Message>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|m| m.to == device);
        self.pending = rest;

        self.log.record(format!(
            "[IPC] Delivered {} messages to device {}",
            batch.len(),
            device
        ));
        batch
    }

    fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
