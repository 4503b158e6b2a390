//! Parameter Deriver: turns a validated `EngineSpec` into the constants
//! the simulator runs on. Pure functions, no side effects.

use crate::engine_spec::EngineSpec;
use crate::error::SimulatorError;
use serde::Serialize;

/// 1 kPa = ~0.145 PSI
pub const KPA_TO_PSI: f64 = 0.145_037_737_73;

// Barometric formula constants (SI units)
const P0_KPA: f64 = 101.325; // sea level standard pressure [kPa]
const LAPSE_RATE: f64 = 0.0065; // temperature lapse rate [K/m]
const T0_K: f64 = 288.15; // standard sea level temperature [K]
const GRAVITY: f64 = 9.80665; // [m/s²]
const MOLAR_MASS_AIR: f64 = 0.0289644; // [kg/mol]
const GAS_CONST: f64 = 8.31447; // [J/(mol.K)]

// State calibrations
pub const ACCEL_RPM_MIN: f64 = 5000.0;
const IDLE_MAP_FACTOR: f64 = 0.3;
const CRUISE_MAP_MIN_FACTOR: f64 = 0.4;
const CRUISE_MAP_MAX_FACTOR: f64 = 0.7;
const NA_WOT_MAP_FACTOR: f64 = 0.95;
const DECEL_MAP_KPA: f64 = 20.0; // manifold vacuum while decelerating
const PEAK_HP_RPM_FACTOR: f64 = 0.8;
const MAX_BOOST_RPM_FACTOR: f64 = 0.9;
const IDLE_RPM_SPREAD: f64 = 50.0;
const MAP_SPREAD_PSI: f64 = 0.5;
const CRUISE_TPS_MIN: f64 = 10.0;
const CRUISE_TPS_MAX: f64 = 30.0;
const ACCEL_TPS_MIN: f64 = 70.0;
const ACCEL_TPS_MAX: f64 = 100.0;

// Estimated-horsepower floor and cap
const HP_MIN_RPM: f64 = 500.0;
const HP_MIN_MAP_PSI: f64 = 2.0;
const HP_CAP_FACTOR: f64 = 2.5;

/// Atmospheric pressure in PSI at the given elevation, by the standard
/// barometric approximation. Strictly decreasing with elevation. The
/// input is clamped to the supported [-400, 8000] m window.
pub fn atmospheric_pressure_psi(elevation_m: f64) -> f64 {
    let elevation = elevation_m
        .max(crate::engine_spec::ELEVATION_MIN_M)
        .min(crate::engine_spec::ELEVATION_MAX_M);
    let exponent = GRAVITY * MOLAR_MASS_AIR / (GAS_CONST * LAPSE_RATE);
    let pressure_kpa = P0_KPA * (1.0 - LAPSE_RATE * elevation / T0_K).powf(exponent);
    pressure_kpa * KPA_TO_PSI
}

/// Per-state operating envelope. Bands are inclusive; a pinned value is a
/// band of zero width.
#[derive(Debug, Clone, Serialize)]
pub struct StateBounds {
    pub rpm_min: f64, // [RPM]
    pub rpm_max: f64, // [RPM]
    pub map_min: f64, // [PSI]
    pub map_max: f64, // [PSI]
    pub tps_min: f64, // [%]
    pub tps_max: f64, // [%]
}

impl StateBounds {
    pub fn rpm_mid(&self) -> f64 {
        0.5 * (self.rpm_min + self.rpm_max)
    }
    pub fn map_mid(&self) -> f64 {
        0.5 * (self.map_min + self.map_max)
    }
    pub fn tps_mid(&self) -> f64 {
        0.5 * (self.tps_min + self.tps_max)
    }
}

/// Largest per-sample change the simulator may apply to each channel.
#[derive(Debug, Clone, Serialize)]
pub struct SlewBounds {
    pub rpm: f64, // [RPM/sample]
    pub map: f64, // [PSI/sample]
    pub tps: f64, // [%/sample]
}

/// Everything the simulator needs, computed once from an `EngineSpec`
/// and read-only thereafter.
#[derive(Debug, Clone, Serialize)]
pub struct DerivedConstants {
    pub atmospheric_psi: f64,  // [PSI] at the spec's elevation
    pub na_wot_map_psi: f64,   // [PSI] assumed MAP at NA wide-open throttle
    pub peak_hp_rpm: f64,      // [RPM] where NA peak power is assumed
    pub hp_unit_factor: f64,   // normalization scalar, see `estimated_hp`
    pub boost_onset_psi: f64,  // [PSI] MAP above this counts as boost
    pub rpm_at_max_boost: f64, // [RPM] where MAP reaches the boost target
    pub target_boost_psi: f64, // [PSI]
    pub na_peak_hp: f64,       // [hp]
    pub idle: StateBounds,
    pub cruise: StateBounds,
    pub acceleration: StateBounds,
    pub deceleration: StateBounds,
    pub slew: SlewBounds,
}

impl DerivedConstants {
    pub fn from_spec(spec: &EngineSpec) -> DerivedConstants {
        let atm = atmospheric_pressure_psi(spec.elevation_m);
        let redline = spec.redline_rpm as f64;
        let idle_rpm = spec.idle_rpm as f64;

        let na_wot_map_psi = NA_WOT_MAP_FACTOR * atm;

        // NA peak power is assumed near 80% of redline, boost tops out
        // near 90% of redline
        let mut peak_hp_rpm = PEAK_HP_RPM_FACTOR * redline;
        if peak_hp_rpm < ACCEL_RPM_MIN {
            peak_hp_rpm = ACCEL_RPM_MIN + 500.0;
        }
        let mut rpm_at_max_boost = MAX_BOOST_RPM_FACTOR * redline;
        if rpm_at_max_boost < ACCEL_RPM_MIN {
            rpm_at_max_boost = ACCEL_RPM_MIN + 500.0;
        }

        let boost_ratio = spec.target_boost_psi / atm;
        let hp_unit_factor = spec.na_peak_hp * boost_ratio / (peak_hp_rpm * na_wot_map_psi);

        let idle_map = IDLE_MAP_FACTOR * atm;
        let decel_map = DECEL_MAP_KPA * KPA_TO_PSI;

        let idle = StateBounds {
            rpm_min: idle_rpm - IDLE_RPM_SPREAD,
            rpm_max: idle_rpm + IDLE_RPM_SPREAD,
            map_min: idle_map - MAP_SPREAD_PSI,
            map_max: idle_map + MAP_SPREAD_PSI,
            tps_min: 0.0,
            tps_max: 0.0,
        };
        let cruise = StateBounds {
            rpm_min: 1.5 * idle_rpm,
            rpm_max: 0.9 * ACCEL_RPM_MIN,
            map_min: CRUISE_MAP_MIN_FACTOR * atm,
            map_max: CRUISE_MAP_MAX_FACTOR * atm,
            tps_min: CRUISE_TPS_MIN,
            tps_max: CRUISE_TPS_MAX,
        };
        let acceleration = StateBounds {
            rpm_min: ACCEL_RPM_MIN,
            rpm_max: redline,
            map_min: na_wot_map_psi,
            map_max: spec.target_boost_psi,
            tps_min: ACCEL_TPS_MIN,
            tps_max: ACCEL_TPS_MAX,
        };
        let deceleration = StateBounds {
            rpm_min: idle_rpm + 100.0,
            rpm_max: ACCEL_RPM_MIN - 100.0,
            map_min: decel_map - MAP_SPREAD_PSI,
            map_max: decel_map + MAP_SPREAD_PSI,
            tps_min: 0.0,
            tps_max: 0.0,
        };

        let slew = SlewBounds {
            rpm: (redline - idle_rpm) / 6.0,
            map: (spec.target_boost_psi - decel_map) / 6.0,
            tps: 25.0,
        };

        DerivedConstants {
            atmospheric_psi: atm,
            na_wot_map_psi,
            peak_hp_rpm,
            hp_unit_factor,
            boost_onset_psi: atm,
            rpm_at_max_boost,
            target_boost_psi: spec.target_boost_psi,
            na_peak_hp: spec.na_peak_hp,
            idle,
            cruise,
            acceleration,
            deceleration,
            slew,
        }
    }

    /// MAP target while accelerating: ramps from NA wide-open-throttle
    /// pressure toward the boost target as RPM approaches
    /// `rpm_at_max_boost`.
    pub fn boost_map_target(&self, rpm: f64) -> f64 {
        let span = self.rpm_at_max_boost - ACCEL_RPM_MIN;
        let target = if span > 0.0 {
            let progress = ((rpm - ACCEL_RPM_MIN) / span).max(0.0).min(1.0);
            self.atmospheric_psi + progress * (self.target_boost_psi - self.atmospheric_psi)
        } else {
            self.target_boost_psi
        };
        target.max(self.na_wot_map_psi)
    }

    /// Estimated output power at an operating point. Zero below the
    /// minimum RPM/MAP thresholds, capped well above the NA peak to keep
    /// extreme samples readable.
    pub fn estimated_hp(&self, rpm: f64, map_psi: f64) -> f64 {
        if rpm < HP_MIN_RPM || map_psi < HP_MIN_MAP_PSI {
            return 0.0;
        }
        let hp = self.hp_unit_factor * rpm * map_psi;
        hp.min(HP_CAP_FACTOR * self.na_peak_hp)
    }

    /// Defensive sanity check run before simulation. An `Err` here means
    /// a derivation bug, not bad user input.
    pub fn validate(&self) -> Result<(), SimulatorError> {
        let pressures = [
            ("atmospheric pressure", self.atmospheric_psi),
            ("NA WOT MAP", self.na_wot_map_psi),
            ("target boost", self.target_boost_psi),
            ("boost onset", self.boost_onset_psi),
        ];
        for (name, value) in pressures.iter() {
            if !value.is_finite() || *value <= 0.0 {
                return Err(SimulatorError::InvalidConstants(format!(
                    "{} must be finite and positive, got {}",
                    name, value
                )));
            }
        }
        if !self.hp_unit_factor.is_finite() || self.hp_unit_factor <= 0.0 {
            return Err(SimulatorError::InvalidConstants(format!(
                "horsepower unit factor must be finite and positive, got {}",
                self.hp_unit_factor
            )));
        }
        for (name, bounds) in [
            ("idle", &self.idle),
            ("cruise", &self.cruise),
            ("acceleration", &self.acceleration),
            ("deceleration", &self.deceleration),
        ]
        .iter()
        {
            if bounds.rpm_min > bounds.rpm_max
                || bounds.map_min > bounds.map_max
                || bounds.tps_min > bounds.tps_max
            {
                return Err(SimulatorError::InvalidConstants(format!(
                    "{} bounds are inverted: {:?}",
                    name, bounds
                )));
            }
            if !bounds.rpm_min.is_finite() || !bounds.map_min.is_finite() {
                return Err(SimulatorError::InvalidConstants(format!(
                    "{} bounds contain non-finite values: {:?}",
                    name, bounds
                )));
            }
        }
        // RPM bands must stack idle < cruise < acceleration
        if self.idle.rpm_max >= self.cruise.rpm_min
            || self.cruise.rpm_max >= self.acceleration.rpm_min
        {
            return Err(SimulatorError::InvalidConstants(
                "idle, cruise and acceleration RPM bands overlap".to_string(),
            ));
        }
        // Deceleration happens under vacuum
        if self.deceleration.map_max >= self.atmospheric_psi {
            return Err(SimulatorError::InvalidConstants(
                "deceleration MAP must stay below atmospheric pressure".to_string(),
            ));
        }
        if self.slew.rpm <= 0.0 || self.slew.map <= 0.0 || self.slew.tps <= 0.0 {
            return Err(SimulatorError::InvalidConstants(
                "slew bounds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_spec::EngineSpec;

    fn reference_spec() -> EngineSpec {
        EngineSpec::new(0.0, 300.0, 20.7, 7000, 800).unwrap()
    }

    #[test]
    fn sea_level_pressure() {
        let psi = atmospheric_pressure_psi(0.0);
        assert!((psi - 14.7).abs() < 0.1, "got {}", psi);
    }

    #[test]
    fn high_altitude_pressure() {
        let psi = atmospheric_pressure_psi(4000.0);
        assert!((psi - 8.94).abs() < 0.01, "got {}", psi);
    }

    #[test]
    fn below_sea_level_pressure() {
        let psi = atmospheric_pressure_psi(-300.0);
        assert!((psi - 15.23).abs() < 0.01, "got {}", psi);
    }

    #[test]
    fn pressure_decreases_with_elevation() {
        let mut last = atmospheric_pressure_psi(-400.0);
        for elevation in (-300..=8000).step_by(100) {
            let psi = atmospheric_pressure_psi(elevation as f64);
            assert!(psi < last, "pressure did not drop at {} m", elevation);
            assert!(psi.is_finite() && psi > 0.0);
            last = psi;
        }
    }

    #[test]
    fn unit_factor_is_finite_and_positive() {
        let constants = DerivedConstants::from_spec(&reference_spec());
        assert!(constants.hp_unit_factor.is_finite());
        assert!(constants.hp_unit_factor > 0.0);
        assert!(constants.atmospheric_psi.is_finite());
        assert!(constants.atmospheric_psi > 0.0);
    }

    #[test]
    fn unit_factor_increases_with_boost() {
        let mut last = 0.0;
        for boost in [15.0, 18.0, 21.0, 30.0, 45.0].iter() {
            let spec = EngineSpec::new(0.0, 300.0, *boost, 7000, 800).unwrap();
            let huf = DerivedConstants::from_spec(&spec).hp_unit_factor;
            assert!(huf > last, "factor did not grow at {} PSI", boost);
            last = huf;
        }
    }

    #[test]
    fn unit_factor_increases_with_base_horsepower() {
        let mut last = 0.0;
        for hp in [100.0, 200.0, 300.0, 600.0].iter() {
            let spec = EngineSpec::new(0.0, *hp, 20.7, 7000, 800).unwrap();
            let huf = DerivedConstants::from_spec(&spec).hp_unit_factor;
            assert!(huf > last, "factor did not grow at {} hp", hp);
            last = huf;
        }
    }

    #[test]
    fn reference_constants_are_ordered() {
        let constants = DerivedConstants::from_spec(&reference_spec());
        constants.validate().unwrap();
        assert!((constants.atmospheric_psi - 14.7).abs() < 0.1);
        assert!(constants.idle.rpm_max < constants.cruise.rpm_min);
        assert!(constants.cruise.rpm_max < constants.acceleration.rpm_min);
        assert!(constants.deceleration.map_max < constants.atmospheric_psi);
        assert!(constants.acceleration.map_max <= constants.target_boost_psi);
        assert!((constants.rpm_at_max_boost - 6300.0).abs() < 1e-6);
        assert!((constants.peak_hp_rpm - 5600.0).abs() < 1e-6);
    }

    #[test]
    fn low_redline_pins_boost_rpm_above_accel_floor() {
        let spec = EngineSpec::new(0.0, 300.0, 20.7, 5000, 800).unwrap();
        let constants = DerivedConstants::from_spec(&spec);
        assert_eq!(constants.rpm_at_max_boost, ACCEL_RPM_MIN + 500.0);
        assert_eq!(constants.peak_hp_rpm, ACCEL_RPM_MIN + 500.0);
    }

    #[test]
    fn boost_map_target_ramps_with_rpm() {
        let constants = DerivedConstants::from_spec(&reference_spec());
        let low = constants.boost_map_target(ACCEL_RPM_MIN);
        let mid = constants.boost_map_target(5650.0);
        let high = constants.boost_map_target(constants.rpm_at_max_boost);
        assert!(low >= constants.na_wot_map_psi);
        assert!(low < mid && mid < high);
        assert!((high - constants.target_boost_psi).abs() < 1e-9);
        // past the max-boost RPM the target stays pinned
        assert!((constants.boost_map_target(7000.0) - high).abs() < 1e-9);
    }

    #[test]
    fn estimated_hp_floor_and_cap() {
        let constants = DerivedConstants::from_spec(&reference_spec());
        assert_eq!(constants.estimated_hp(400.0, 14.0), 0.0);
        assert_eq!(constants.estimated_hp(3000.0, 1.0), 0.0);
        let hp = constants.estimated_hp(5600.0, constants.na_wot_map_psi);
        assert!(hp > 0.0);
        let capped = constants.estimated_hp(10_000.0, 45.0);
        assert!(capped <= 2.5 * 300.0 + 1e-9);
    }

    #[test]
    fn validate_rejects_broken_constants() {
        let mut constants = DerivedConstants::from_spec(&reference_spec());
        constants.hp_unit_factor = f64::NAN;
        assert!(constants.validate().is_err());

        let mut constants = DerivedConstants::from_spec(&reference_spec());
        constants.atmospheric_psi = -1.0;
        assert!(constants.validate().is_err());

        let mut constants = DerivedConstants::from_spec(&reference_spec());
        constants.idle.rpm_min = constants.idle.rpm_max + 1.0;
        assert!(constants.validate().is_err());
    }
}
