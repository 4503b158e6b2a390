//! Plot rendering. The simulator feeds samples into a `SampleSink` one at
//! a time; at stream exhaustion `finalize` persists the MAP trace as a
//! PNG in the working directory.

use crate::derived::DerivedConstants;
use crate::error::SimulatorError;
use crate::sim::SIM_DURATION;
use crate::SimulationSample;
use gnuplot::{AxesCommon, Caption, Color, DashType, Figure, Fix, LineStyle, LineWidth};
use ndarray::Array1;
use std::path::PathBuf;

pub const OUTPUT_FILE: &str = "engine_simulation.png";
const MAP_GAUGE_HEADROOM_PSI: f64 = 7.5;

/// Sink end of the producer/consumer split: the simulator produces, a
/// sink consumes each sample as it appears and persists on `finalize`.
pub trait SampleSink {
    fn accept(&mut self, sample: &SimulationSample);
    fn finalize(&mut self) -> Result<PathBuf, SimulatorError>;
}

/// Gnuplot-backed MAP-over-time plot with peak-performance tracking.
pub struct MapPlot {
    atmospheric_psi: f64,
    target_boost_psi: f64,
    boost_onset_psi: f64,
    times: Vec<f64>,
    maps: Vec<f64>,
    peak_hp: f64,
    rpm_at_peak_hp: f64,
    map_at_peak_hp: f64,
    peak_boost_psi: Option<f64>,
    output: PathBuf,
}

impl MapPlot {
    pub fn new(constants: &DerivedConstants) -> MapPlot {
        MapPlot {
            atmospheric_psi: constants.atmospheric_psi,
            target_boost_psi: constants.target_boost_psi,
            boost_onset_psi: constants.boost_onset_psi,
            times: Vec::new(),
            maps: Vec::new(),
            peak_hp: 0.0,
            rpm_at_peak_hp: 0.0,
            map_at_peak_hp: 0.0,
            peak_boost_psi: None,
            output: PathBuf::from(OUTPUT_FILE),
        }
    }

    /// Peak levels seen so far, for the plot title and the final console
    /// report.
    pub fn peak_summary(&self) -> String {
        let boost = match self.peak_boost_psi {
            Some(psi) => format!("{:.1} PSI", psi),
            None => "N/A (no boost hit)".to_string(),
        };
        format!(
            "Peak HP: {:.0} @ {:.1} PSI | Peak RPM: {:.0} | Highest boost: {}",
            self.peak_hp, self.map_at_peak_hp, self.rpm_at_peak_hp, boost
        )
    }

    fn title(&self) -> String {
        format!(
            "Simulated engine data - {} | Atmospheric pressure: {:.1} PSI",
            self.peak_summary(),
            self.atmospheric_psi
        )
    }
}

impl SampleSink for MapPlot {
    fn accept(&mut self, sample: &SimulationSample) {
        self.times.push(sample.time);
        self.maps.push(sample.map_psi);
        if sample.estimated_hp > self.peak_hp {
            self.peak_hp = sample.estimated_hp;
            self.rpm_at_peak_hp = sample.rpm;
            self.map_at_peak_hp = sample.map_psi;
        }
        if sample.map_psi > self.boost_onset_psi {
            let best = self.peak_boost_psi.unwrap_or(self.boost_onset_psi);
            self.peak_boost_psi = Some(best.max(sample.map_psi));
        }
    }

    fn finalize(&mut self) -> Result<PathBuf, SimulatorError> {
        let time = Array1::from(self.times.clone());
        let map = Array1::from(self.maps.clone());
        let edges = [0.0, SIM_DURATION];
        let boost_line = [self.target_boost_psi, self.target_boost_psi];
        let atm_line = [self.atmospheric_psi, self.atmospheric_psi];
        let boost_label = format!("Maximum boost: {:.1} PSI", self.target_boost_psi);
        let atm_label = format!("Atmospheric pressure: {:.1} PSI", self.atmospheric_psi);

        let mut fg = Figure::new();
        fg.set_terminal("pngcairo size 1000,600", &self.output.to_string_lossy());
        fg.axes2d()
            .set_title(&self.title(), &[])
            .set_x_label("Time (s)", &[])
            .set_y_label("MAP (PSI)", &[])
            .set_x_range(Fix(0.0), Fix(SIM_DURATION))
            .set_y_range(Fix(0.0), Fix(self.target_boost_psi + MAP_GAUGE_HEADROOM_PSI))
            .set_x_grid(true)
            .set_y_grid(true)
            .lines(
                time.iter(),
                map.iter(),
                &[Caption("MAP"), Color("blue"), LineWidth(2.0)],
            )
            .lines(
                edges.iter(),
                boost_line.iter(),
                &[
                    Caption(&boost_label),
                    Color("orange"),
                    LineStyle(DashType::Dash),
                ],
            )
            .lines(
                edges.iter(),
                atm_line.iter(),
                &[Caption(&atm_label), Color("red"), LineStyle(DashType::Dot)],
            );
        fg.show();

        // gnuplot reports nothing back; the file on disk is the contract
        match std::fs::metadata(&self.output) {
            Ok(_) => Ok(self.output.clone()),
            Err(source) => Err(SimulatorError::Io {
                path: self.output.clone(),
                source,
            }),
        }
    }
}
