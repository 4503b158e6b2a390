//! # boost_engine_simulator
//!
//! The `boost_engine_simulator` crate simulates a boosted reciprocating
//! engine's operating parameters (RPM, manifold absolute pressure and
//! throttle position) over a fixed 45-unit run and plots the manifold
//! pressure trace.
//!
//! The pipeline: validated inputs become an [`EngineSpec`], the Parameter
//! Deriver turns it into [`DerivedConstants`], the [`Simulator`] walks the
//! engine through idle, cruise, acceleration and deceleration producing
//! [`SimulationSample`]s, and a [`render::SampleSink`] folds over them to
//! produce `engine_simulation.png`.

use ndarray::*;
use serde::Serialize;

pub mod derived;
pub mod engine_spec;
pub mod error;
pub mod input;
pub mod render;
pub mod sim;

// Re-exporting
pub use crate::derived::DerivedConstants;
pub use crate::engine_spec::EngineSpec;
pub use crate::error::SimulatorError;
pub use crate::sim::{EngineState, Simulator};

/// One sampled operating point of the simulated engine.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSample {
    pub time: f64,         // [time units since run start]
    pub rpm: f64,          // [RPM]
    pub map_psi: f64,      // [PSI]
    pub throttle_pct: f64, // [%]
    pub state: EngineState,
    pub estimated_hp: f64, // [hp]
}

impl SimulationSample {
    pub fn storable_data(&self) -> Array1<f64> {
        array![
            self.time,
            self.rpm,
            self.map_psi,
            self.throttle_pct,
            self.estimated_hp
        ]
    }
}

impl std::fmt::Display for SimulationSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "t={:>4.1} [{}] {:>5.0} RPM  MAP {:>5.2} PSI  throttle {:>5.1} %  ~{:>4.0} hp",
            self.time, self.state, self.rpm, self.map_psi, self.throttle_pct, self.estimated_hp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_row_keeps_column_order() {
        let sample = SimulationSample {
            time: 3.0,
            rpm: 820.0,
            map_psi: 4.4,
            throttle_pct: 0.0,
            state: EngineState::Idle,
            estimated_hp: 12.0,
        };
        let row = sample.storable_data();
        assert_eq!(row.len(), 5);
        assert_eq!(row[0], 3.0);
        assert_eq!(row[2], 4.4);
    }
}
