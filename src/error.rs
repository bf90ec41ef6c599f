//! Structured error types for the fleet simulator.
//!
//! Simulation operations only ever fail in two recoverable ways: a device
//! does not have enough free memory, or a device id does not exist. Both are
//! returned as values; nothing inside a step panics or aborts. The builder
//! and config layer add a third variant for rejected configuration.

use crate::device::DeviceId;

/// The top-level error type for the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum SimError {
    // ── Simulation errors ─────────────────────────────────

    /// The target memory manager cannot fit the requested reservation.
    AllocationDenied { requested: u64, available: u64 },

    /// A device id was referenced but no such device exists.
    DeviceNotFound(DeviceId),

    // ── Config errors ─────────────────────────────────────

    /// A configuration value was out of range or could not be parsed.
    InvalidConfig(String),
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::AllocationDenied { requested, available } => write!(
                f,
                "allocation denied: requested {} units, {} available",
                requested, available
            ),
            SimError::DeviceNotFound(id) => write!(f, "device {} not found", id),
            SimError::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for SimError {}

/// Convenience alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_device_not_found() {
        let e = SimError::DeviceNotFound(DeviceId::new(5));
        assert_eq!(e.to_string(), "device D5 not found");
    }

    #[test]
    fn test_error_display_allocation_denied() {
        let e = SimError::AllocationDenied { requested: 8, available: 3 };
        let s = e.to_string();
        assert!(s.contains("requested 8"));
        assert!(s.contains("3 available"));
    }

    #[test]
    fn test_error_is_std_error() {
        let e: Box<dyn std::error::Error> = Box::new(SimError::InvalidConfig("x".into()));
        assert!(e.to_string().contains("invalid config"));
    }
}
