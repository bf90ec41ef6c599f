/// Fluent builder for simulation setup.
///
/// Hides the wiring of a [`SimulationEngine`]: one shared activity log, the
/// default failure and migration policies configured from a [`SimConfig`],
/// and any devices and processes that should exist before the first step.

use crate::activity::ActivityLog;
use crate::config::SimConfig;
use crate::device::DeviceId;
use crate::error::SimResult;
use crate::failure::RandomFailure;
use crate::migrator::LeastLoadedMigrator;
use crate::rng::{DeterministicRng, RandomSource};
use crate::simulation::SimulationEngine;

/// Fluent builder for a [`SimulationEngine`].
///
/// # Example
/// ```rust
/// use fleetsim::dsl::SimulationBuilder;
///
/// let mut sim = SimulationBuilder::new()
///     .device(20)
///     .device(20)
///     .process(1, 5, 2)
///     .process(1, 6, 2)
///     .failures(0.1, 2)
///     .seed(42)
///     .imbalance_threshold(1)
///     .build()
///     .unwrap();
/// sim.run_for(10);
/// ```
pub struct SimulationBuilder {
    config: SimConfig,
    devices: Vec<u64>,
    processes: Vec<(u64, u64, u64)>,
    failures: bool,
    migration: bool,
    rng: Option<Box<dyn RandomSource>>,
}

impl SimulationBuilder {
    /// Default config with failures and migration both enabled.
    pub fn new() -> Self {
        SimulationBuilder {
            config: SimConfig::default(),
            devices: Vec::new(),
            processes: Vec::new(),
            failures: true,
            migration: true,
            rng: None,
        }
    }

    /// Replace the whole config.
    pub fn config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    // ── Fleet ─────────────────────────────────────────────────

    /// Add a device with `total_memory` units. Ids are assigned from 1 in
    /// call order.
    pub fn device(mut self, total_memory: u64) -> Self {
        self.devices.push(total_memory);
        self
    }

    /// Add `count` identical devices.
    pub fn devices(mut self, count: usize, total_memory: u64) -> Self {
        self.devices
            .extend(std::iter::repeat(total_memory).take(count));
        self
    }

    /// Create a process on device `device` before the first step.
    pub fn process(mut self, device: u64, cpu_time: u64, mem_required: u64) -> Self {
        self.processes.push((device, cpu_time, mem_required));
        self
    }

    // ── Policies ──────────────────────────────────────────────

    pub fn failures(mut self, fail_probability: f64, recovery_delay: u64) -> Self {
        self.failures = true;
        self.config.fail_probability = fail_probability;
        self.config.recovery_delay = recovery_delay;
        self
    }

    pub fn no_failures(mut self) -> Self {
        self.failures = false;
        self
    }

    /// Seed for the default [`DeterministicRng`].
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Drive failures from a custom source instead of the seeded RNG.
    pub fn random_source(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn imbalance_threshold(mut self, threshold: u64) -> Self {
        self.migration = true;
        self.config.imbalance_threshold = threshold;
        self
    }

    pub fn no_migration(mut self) -> Self {
        self.migration = false;
        self
    }

    pub fn log_capacity(mut self, lines: usize) -> Self {
        self.config.log_capacity = lines;
        self
    }

    // ── Build ─────────────────────────────────────────────────

    /// Validate the config and assemble the engine.
    ///
    /// Fails with `InvalidConfig` for out-of-range settings,
    /// `DeviceNotFound` for a process aimed at an unknown device, and
    /// `AllocationDenied` for a process that does not fit.
    pub fn build(self) -> SimResult<SimulationEngine> {
        self.config.validate()?;

        let log = ActivityLog::with_capacity(self.config.log_capacity);
        let mut engine = SimulationEngine::new(log.clone());

        if self.failures {
            let seed = self.config.seed;
            let rng = self
                .rng
                .unwrap_or_else(|| Box::new(DeterministicRng::new(seed)) as Box<dyn RandomSource>);
            let strategy = RandomFailure::new(
                self.config.fail_probability,
                self.config.recovery_delay,
                rng,
            )
            .with_log(log.clone());
            engine = engine.with_failure_strategy(Box::new(strategy));
        }

        if self.migration {
            let migrator =
                LeastLoadedMigrator::new(self.config.imbalance_threshold).with_log(log.clone());
            engine = engine.with_task_migrator(Box::new(migrator));
        }

        for total in self.devices {
            engine.add_device(total);
        }
        for (device, cpu_time, mem_required) in self.processes {
            engine.create_process(DeviceId::new(device), cpu_time, mem_required)?;
        }

        log::info!(
            "built simulation: {} devices, threshold={}, fail_probability={}, seed={}",
            engine.devices().len(),
            self.config.imbalance_threshold,
            self.config.fail_probability,
            self.config.seed
        );
        Ok(engine)
    }
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
