use crate::derived::atmospheric_pressure_psi;
use crate::error::SimulatorError;
use ansi_term::Style;
use serde::Serialize;

// Accepted input ranges
pub const ELEVATION_MIN_M: f64 = -400.0;
pub const ELEVATION_MAX_M: f64 = 8000.0;
pub const NA_PEAK_HP_MIN: f64 = 1.0;
pub const BOOST_MAX_PSI: f64 = 45.0;
pub const REDLINE_RPM_MIN: u32 = 5000;
pub const REDLINE_RPM_MAX: u32 = 10_000;
pub const IDLE_RPM_MIN: u32 = 500;
pub const IDLE_RPM_MAX: u32 = 1000;

/// The five user-supplied engine specifications. Immutable once built;
/// `EngineSpec::new` is the only constructor and re-checks every range.
#[derive(Debug, Clone, Serialize)]
pub struct EngineSpec {
    pub elevation_m: f64,       // [m]
    pub na_peak_hp: f64,        // [hp] - naturally-aspirated peak
    pub target_boost_psi: f64,  // [PSI] - absolute, includes atmospheric
    pub redline_rpm: u32,       // [RPM]
    pub idle_rpm: u32,          // [RPM]
}

impl EngineSpec {
    pub fn new(
        elevation_m: f64,
        na_peak_hp: f64,
        target_boost_psi: f64,
        redline_rpm: u32,
        idle_rpm: u32,
    ) -> Result<EngineSpec, SimulatorError> {
        if elevation_m < ELEVATION_MIN_M || elevation_m > ELEVATION_MAX_M {
            return Err(SimulatorError::validation(
                "elevation",
                format!(
                    "{} m is outside [{}, {}]",
                    elevation_m, ELEVATION_MIN_M, ELEVATION_MAX_M
                ),
            ));
        }
        if na_peak_hp < NA_PEAK_HP_MIN {
            return Err(SimulatorError::validation(
                "naturally aspirated peak horsepower",
                format!("{} hp is below the minimum of {}", na_peak_hp, NA_PEAK_HP_MIN),
            ));
        }
        let atmospheric_psi = atmospheric_pressure_psi(elevation_m);
        if target_boost_psi < atmospheric_psi {
            return Err(SimulatorError::validation(
                "target peak boost pressure",
                format!(
                    "{:.2} PSI is below the atmospheric pressure of {:.2} PSI at {} m",
                    target_boost_psi, atmospheric_psi, elevation_m
                ),
            ));
        }
        if target_boost_psi > BOOST_MAX_PSI {
            return Err(SimulatorError::validation(
                "target peak boost pressure",
                format!("{:.2} PSI is above the maximum of {} PSI", target_boost_psi, BOOST_MAX_PSI),
            ));
        }
        if redline_rpm < REDLINE_RPM_MIN || redline_rpm > REDLINE_RPM_MAX {
            return Err(SimulatorError::validation(
                "redline RPM",
                format!(
                    "{} RPM is outside [{}, {}]",
                    redline_rpm, REDLINE_RPM_MIN, REDLINE_RPM_MAX
                ),
            ));
        }
        if idle_rpm < IDLE_RPM_MIN || idle_rpm > IDLE_RPM_MAX {
            return Err(SimulatorError::validation(
                "idle RPM",
                format!("{} RPM is outside [{}, {}]", idle_rpm, IDLE_RPM_MIN, IDLE_RPM_MAX),
            ));
        }
        // Always true given the disjoint ranges above, checked anyway
        if idle_rpm >= redline_rpm {
            return Err(SimulatorError::validation(
                "idle RPM",
                format!("idle RPM {} must be below redline RPM {}", idle_rpm, redline_rpm),
            ));
        }
        Ok(EngineSpec {
            elevation_m,
            na_peak_hp,
            target_boost_psi,
            redline_rpm,
            idle_rpm,
        })
    }
}

impl std::fmt::Display for EngineSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:
        elevation: {:.0} [m]
        naturally-aspirated peak power: {:.0} [hp]
        target peak boost: {:.1} [PSI]
        redline: {} [RPM]
        idle: {} [RPM]",
            Style::new().bold().paint("engine specification"),
            self.elevation_m,
            self.na_peak_hp,
            self.target_boost_psi,
            self.redline_rpm,
            self.idle_rpm,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(
        elevation_m: f64,
        na_peak_hp: f64,
        target_boost_psi: f64,
        redline_rpm: u32,
        idle_rpm: u32,
    ) -> Result<EngineSpec, SimulatorError> {
        EngineSpec::new(elevation_m, na_peak_hp, target_boost_psi, redline_rpm, idle_rpm)
    }

    #[test]
    fn accepts_sea_level_reference_engine() {
        let s = spec(0.0, 300.0, 20.7, 7000, 800).unwrap();
        assert_eq!(s.redline_rpm, 7000);
        assert_eq!(s.idle_rpm, 800);
    }

    #[test]
    fn rejects_elevation_outside_range() {
        assert!(spec(-401.0, 300.0, 20.7, 7000, 800).is_err());
        assert!(spec(8001.0, 300.0, 20.7, 7000, 800).is_err());
        assert!(spec(-400.0, 300.0, 20.7, 7000, 800).is_ok());
        assert!(spec(8000.0, 300.0, 20.7, 7000, 800).is_ok());
    }

    #[test]
    fn rejects_zero_horsepower() {
        assert!(spec(0.0, 0.0, 20.7, 7000, 800).is_err());
        assert!(spec(0.0, 1.0, 20.7, 7000, 800).is_ok());
    }

    #[test]
    fn rejects_boost_below_atmospheric() {
        // ~14.7 PSI at sea level
        assert!(spec(0.0, 300.0, 14.0, 7000, 800).is_err());
        assert!(spec(0.0, 300.0, 15.0, 7000, 800).is_ok());
    }

    #[test]
    fn rejects_boost_above_maximum() {
        assert!(spec(0.0, 300.0, 45.1, 7000, 800).is_err());
        assert!(spec(0.0, 300.0, 45.0, 7000, 800).is_ok());
    }

    #[test]
    fn rejects_redline_outside_range() {
        assert!(spec(0.0, 300.0, 20.7, 4999, 800).is_err());
        assert!(spec(0.0, 300.0, 20.7, 10_001, 800).is_err());
        assert!(spec(0.0, 300.0, 20.7, 5000, 800).is_ok());
        assert!(spec(0.0, 300.0, 20.7, 10_000, 800).is_ok());
    }

    #[test]
    fn rejects_idle_outside_range() {
        assert!(spec(0.0, 300.0, 20.7, 7000, 499).is_err());
        assert!(spec(0.0, 300.0, 20.7, 7000, 1001).is_err());
        assert!(spec(0.0, 300.0, 20.7, 7000, 500).is_ok());
        assert!(spec(0.0, 300.0, 20.7, 7000, 1000).is_ok());
    }

    #[test]
    fn boost_bound_follows_elevation() {
        // At 4000 m the atmosphere is ~8.94 PSI, so 10 PSI absolute is valid
        assert!(spec(4000.0, 300.0, 10.0, 7000, 800).is_ok());
        assert!(spec(4000.0, 300.0, 8.0, 7000, 800).is_err());
    }
}
