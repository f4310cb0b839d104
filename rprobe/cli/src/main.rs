use anyhow::Result;
use clap::Parser;
use log::{debug, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use rprobe_core::probe::Probe;

mod cli;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let (probe, verbose) = match args.command {
        cli::Commands::Exchange { verbose } => (Probe::exchange(), verbose),
        cli::Commands::Oneway { verbose } => (Probe::oneway(), verbose),
    };

    init_logging(verbose)?;

    if verbose {
        println!("probing {}:{}", probe.host, probe.port);
    }

    let report = probe.run();
    debug!("outcome: {:?}", report.outcome());

    for line in report.lines() {
        println!("{}", line);
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    Ok(())
}
