//! State Machine / Simulator: advances the engine through its operating
//! states and yields one `SimulationSample` per sampling interval.
//!
//! The simulator owns no I/O. It keeps smoothed internal channel values
//! that chase the active state's targets under per-sample slew limits,
//! then adds bounded jitter to each emitted sample, so consecutive
//! samples never jump by more than `slew + 2 * jitter` per channel.

pub mod schedule;

use crate::derived::DerivedConstants;
use crate::error::SimulatorError;
use crate::SimulationSample;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Simulated run length in time units.
pub const SIM_DURATION: f64 = 45.0;
/// One sample per unit, 45 samples per run.
pub const SAMPLE_INTERVAL: f64 = 1.0;
/// Seed used by `Simulator::new`, kept fixed so runs are reproducible.
pub const DEFAULT_SEED: u64 = 0xB005_75ED;

// Jitter applied on top of the smoothed channels
pub const RPM_JITTER: f64 = 25.0;
pub const MAP_JITTER: f64 = 0.25;
pub const TPS_JITTER: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngineState {
    Idle,
    Cruise,
    Acceleration,
    Deceleration,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EngineState::Idle => "idle",
            EngineState::Cruise => "cruise",
            EngineState::Acceleration => "acceleration",
            EngineState::Deceleration => "deceleration",
        };
        write!(f, "{}", name)
    }
}

/// Finite, non-restartable sample source for one 45-unit run.
pub struct Simulator {
    constants: DerivedConstants,
    segments: Vec<schedule::Segment>,
    rng: StdRng,
    step: usize,
    total_steps: usize,
    // smoothed channel values, jitter-free
    rpm: f64,
    map_psi: f64,
    tps: f64,
}

impl Simulator {
    /// Builds a simulator with the fixed default seed. Fails if the
    /// constants do not pass the defensive sanity check.
    pub fn new(constants: DerivedConstants) -> Result<Simulator, SimulatorError> {
        Simulator::with_seed(constants, DEFAULT_SEED)
    }

    pub fn with_seed(constants: DerivedConstants, seed: u64) -> Result<Simulator, SimulatorError> {
        constants.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let segments = schedule::build(&mut rng);
        let rpm = constants.idle.rpm_mid();
        let map_psi = constants.idle.map_mid();
        Ok(Simulator {
            constants,
            segments,
            rng,
            step: 0,
            total_steps: (SIM_DURATION / SAMPLE_INTERVAL).round() as usize,
            rpm,
            map_psi,
            tps: 0.0,
        })
    }

    /// Channel targets for the active state. The acceleration MAP target
    /// follows the boost-to-pressure mapping of the current RPM rather
    /// than a fixed band value.
    fn targets(&self, state: EngineState) -> (f64, f64, f64) {
        let c = &self.constants;
        match state {
            EngineState::Idle => (c.idle.rpm_mid(), c.idle.map_mid(), c.idle.tps_mid()),
            EngineState::Cruise => (c.cruise.rpm_mid(), c.cruise.map_mid(), c.cruise.tps_mid()),
            EngineState::Acceleration => (
                c.acceleration.rpm_max,
                c.boost_map_target(self.rpm),
                c.acceleration.tps_mid(),
            ),
            EngineState::Deceleration => (
                c.deceleration.rpm_min,
                c.deceleration.map_mid(),
                c.deceleration.tps_mid(),
            ),
        }
    }
}

// move `current` toward `target` by at most `slew`
fn chase(current: f64, target: f64, slew: f64) -> f64 {
    current + (target - current).max(-slew).min(slew)
}

impl Iterator for Simulator {
    type Item = SimulationSample;

    fn next(&mut self) -> Option<SimulationSample> {
        if self.step >= self.total_steps {
            return None;
        }
        let time = self.step as f64 * SAMPLE_INTERVAL;
        let state = schedule::state_at(&self.segments, time);

        let (rpm_target, map_target, tps_target) = self.targets(state);
        self.rpm = chase(self.rpm, rpm_target, self.constants.slew.rpm);
        self.map_psi = chase(self.map_psi, map_target, self.constants.slew.map);
        self.tps = chase(self.tps, tps_target, self.constants.slew.tps);

        let rpm = self.rpm + self.rng.gen_range(-RPM_JITTER..=RPM_JITTER);
        let map_psi = self.map_psi + self.rng.gen_range(-MAP_JITTER..=MAP_JITTER);
        let tps = self.tps + self.rng.gen_range(-TPS_JITTER..=TPS_JITTER);
        let throttle_pct = tps.max(0.0).min(100.0);

        self.step += 1;
        Some(SimulationSample {
            time,
            rpm,
            map_psi,
            throttle_pct,
            state,
            estimated_hp: self.constants.estimated_hp(rpm, map_psi),
        })
    }
}
