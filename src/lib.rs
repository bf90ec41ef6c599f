//! # fleetsim — Deterministic Device Fleet Simulator
//!
//! A small fleet of simulated devices, each running its own operating
//! system (scheduler, bounded memory, process table, inbox). A global
//! engine drives synchronized steps that inject random failures and
//! recoveries, deliver bus messages, tick every device and migrate work
//! from the most to the least loaded device. Single-threaded, no wall-clock
//! time: identical seeds give identical runs.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │            SimulationEngine               │ ← one step at a time
//! │  FailureStrategy → MessageBus → ticks →   │
//! │                    TaskMigrator           │
//! │  ┌────────────────────────────────────┐  │
//! │  │ Device (ONLINE / FAILED)            │  │
//! │  │  ┌──────────────────────────────┐  │  │
//! │  │  │ OperatingSystem              │  │  │
//! │  │  │  Scheduler · MemoryManager   │  │  │
//! │  │  │  processes · inbox           │  │  │
//! │  │  └──────────────────────────────┘  │  │
//! │  └────────────────────────────────────┘  │
//! └──────────────────────────────────────────┘
//! ```

pub mod activity;
pub mod api;
pub mod bus;
pub mod config;
pub mod device;
pub mod dsl;
pub mod error;
pub mod failure;
pub mod memory;
pub mod migrator;
pub mod os;
pub mod process;
pub mod rng;
pub mod scheduler;
pub mod simulation;
pub mod time;

// Re-exports for convenience.
pub use activity::ActivityLog;
pub use api::{DeviceSnapshot, FleetSnapshot, ProcessSnapshot};
pub use bus::{Message, MessageBus, MessagePayload, SimpleMessageBus};
pub use config::SimConfig;
pub use device::{Device, DeviceId, DeviceState, SimpleDevice};
pub use dsl::SimulationBuilder;
pub use error::{SimError, SimResult};
pub use failure::{FailureReport, FailureStrategy, RandomFailure};
pub use memory::{BoundedMemory, MemoryManager};
pub use migrator::{LeastLoadedMigrator, Migration, TaskMigrator};
pub use os::{BasicOs, OperatingSystem};
pub use process::{Pid, Process, ProcessState};
pub use rng::{DeterministicRng, RandomSource, ScriptedRandom};
pub use scheduler::{RoundRobinScheduler, Scheduler};
pub use simulation::{SimulationEngine, StepReport};
pub use time::VirtualTime;
