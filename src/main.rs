use ansi_term::Style;
use boost_engine_simulator::render::{MapPlot, SampleSink};
use boost_engine_simulator::sim::SIM_DURATION;
use boost_engine_simulator::{input, DerivedConstants, Simulator};
use std::io;
use std::time::Duration;

// Pacing delay between samples, so the console trace reads like a live run
const SAMPLE_PACING: Duration = Duration::from_millis(100);

fn main() {
    println!(
        "{}",
        Style::new()
            .bold()
            .paint("*** Welcome To Your Engine Performance Simulator! ***")
    );

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout();
    let spec = match input::collect_engine_spec(&mut reader, &mut writer) {
        Ok(spec) => spec,
        Err(err) => {
            eprintln!("Error while reading input:\n {}", err);
            std::process::exit(1)
        }
    };

    let constants = DerivedConstants::from_spec(&spec);
    println!("{}", spec);
    match serde_json::to_string_pretty(&constants) {
        Ok(json) => println!("Derived constants:\n{}", json),
        Err(err) => {
            eprintln!("Error while reporting derived constants:\n {}", err);
            std::process::exit(1)
        }
    }

    let simulator = match Simulator::new(constants.clone()) {
        Ok(simulator) => simulator,
        Err(err) => {
            eprintln!("Error before simulation:\n {}", err);
            std::process::exit(1)
        }
    };

    println!("Simulation started for {} seconds.", SIM_DURATION);
    println!("Simulation running...");
    let mut plot = MapPlot::new(&constants);
    for sample in simulator {
        println!("{}", sample);
        plot.accept(&sample);
        std::thread::sleep(SAMPLE_PACING);
    }
    println!("Simulation finished.");

    match plot.finalize() {
        Ok(path) => {
            println!("{}", plot.peak_summary());
            println!("Simulation complete. Image saved to {}", path.display());
        }
        Err(err) => {
            eprintln!("Error while saving the plot:\n {}", err);
            std::process::exit(1)
        }
    }
}
