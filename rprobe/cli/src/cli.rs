use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send the 16-byte probe and wait for a single reply
    Exchange {
        #[arg(long, short, default_value_t = false)]
        verbose: bool,
    },

    /// Send the 20-byte probe, linger, and close without reading
    Oneway {
        #[arg(long, short, default_value_t = false)]
        verbose: bool,
    },
}
