//! Counter testbench example.
//!
//! Drives the behavioral up/down counter through the default stimulus
//! scenario and prints one line per tick followed by a run summary.
//!
//! Usage:
//!   cargo run --example counter_tb
//!   cargo run --example counter_tb -- scenario.yaml
//!   cargo run --example counter_tb -- scenario.yaml dump.vcd

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;

use tickbench::config::TestbenchConfig;
use tickbench::duts::CounterDut;
use tickbench::{LineReporter, Reporter, SignalSnapshot, Testbench, VcdReporter};

/// Fans each snapshot out to the console and an optional waveform dump.
struct Tee<W: std::io::Write> {
    lines: LineReporter<std::io::Stdout>,
    vcd: Option<VcdReporter<W>>,
}

impl<W: std::io::Write> Reporter for Tee<W> {
    fn report(&mut self, snapshot: &SignalSnapshot) {
        self.lines.report(snapshot);
        if let Some(vcd) = self.vcd.as_mut() {
            vcd.report(snapshot);
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => TestbenchConfig::from_file(&path)?,
        None => TestbenchConfig::default(),
    };
    tickbench::init_logging(&config.simulation.log_level);

    let vcd = match args.next() {
        Some(path) => Some(VcdReporter::new(BufWriter::new(File::create(path)?), "counter_tb")?),
        None => None,
    };

    println!("==== Counter testbench ====");
    println!("{} stimulus rule(s)\n", config.rule_count());

    let mut tb = Testbench::new(CounterDut::new(), &config);
    let summary = tb.run(Tee {
        lines: LineReporter::stdout(),
        vcd,
    })?;

    println!();
    print!("{}", summary.summary()?);
    println!("Final count: {:#x}", tb.dut().count());
    Ok(())
}
