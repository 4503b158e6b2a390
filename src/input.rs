//! Interactive input collection. Thin I/O glue: prompts for the five
//! engine specifications, re-prompting with the accepted range until the
//! value parses and fits. Generic over the reader/writer so the retry
//! loops are testable.

use crate::derived::atmospheric_pressure_psi;
use crate::engine_spec::{self, EngineSpec};
use std::io::{BufRead, Error, ErrorKind, Write};

const BOOST_PROMPT: &str = "Enter target peak boost pressure (PSI):
*To find target peak boost PSI, add your boost system's
pressure to the atmospheric pressure. For example, if
the atmospheric pressure is 10 PSI and your boost
system provides 6 PSI, the target peak boost pressure
would be 10+6=16 PSI.*
";

/// Prompts for the five engine specifications in order and returns the
/// validated `EngineSpec`. Only I/O failures bubble up; bad values are
/// handled locally by asking again.
pub fn collect_engine_spec<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> std::io::Result<EngineSpec> {
    loop {
        let elevation_m = prompt_f64(
            input,
            output,
            "Enter elevation (meters): ",
            Some(engine_spec::ELEVATION_MIN_M),
            Some(engine_spec::ELEVATION_MAX_M),
        )?;
        let atmospheric_psi = atmospheric_pressure_psi(elevation_m);
        writeln!(
            output,
            "Estimated atmospheric pressure at {} meters: {:.2} PSI",
            elevation_m, atmospheric_psi
        )?;

        let na_peak_hp = prompt_f64(
            input,
            output,
            "Enter naturally aspirated peak horsepower: ",
            Some(engine_spec::NA_PEAK_HP_MIN),
            None,
        )?;
        let target_boost_psi = prompt_f64(
            input,
            output,
            BOOST_PROMPT,
            Some(atmospheric_psi),
            Some(engine_spec::BOOST_MAX_PSI),
        )?;
        let redline_rpm = prompt_u32(
            input,
            output,
            "Enter redline RPM: ",
            engine_spec::REDLINE_RPM_MIN,
            engine_spec::REDLINE_RPM_MAX,
        )?;
        let idle_rpm = prompt_u32(
            input,
            output,
            "Enter idle RPM: ",
            engine_spec::IDLE_RPM_MIN,
            engine_spec::IDLE_RPM_MAX,
        )?;

        // The per-field prompts already enforce every range, but the
        // constructor has the final word.
        match EngineSpec::new(elevation_m, na_peak_hp, target_boost_psi, redline_rpm, idle_rpm) {
            Ok(spec) => return Ok(spec),
            Err(err) => writeln!(output, "{}. Starting over.", err)?,
        }
    }
}

fn prompt_f64<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    min: Option<f64>,
    max: Option<f64>,
) -> std::io::Result<f64> {
    loop {
        write!(output, "{}", prompt)?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(Error::new(ErrorKind::UnexpectedEof, "input closed while prompting"));
        }
        let value: f64 = match line.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                writeln!(output, "Invalid input. Please enter a number.")?;
                continue;
            }
        };
        if let Some(min) = min {
            if value < min {
                writeln!(output, "Value must be at least {:.2}. Try again.", min)?;
                continue;
            }
        }
        if let Some(max) = max {
            if value > max {
                writeln!(output, "Value must be no more than {:.2}. Try again.", max)?;
                continue;
            }
        }
        return Ok(value);
    }
}

fn prompt_u32<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    min: u32,
    max: u32,
) -> std::io::Result<u32> {
    let value = prompt_f64(input, output, prompt, Some(min as f64), Some(max as f64))?;
    Ok(value as u32)
}
