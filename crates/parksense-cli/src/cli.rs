// Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ParkSense - read a parking sign photo and tell whether you can park now
#[derive(Parser, Debug)]
#[command(name = "parksense")]
#[command(bin_name = "parksense")]
#[command(about = "Read a parking sign photo and tell whether you can park right now")]
#[command(version)]
#[command(author = "ParkSense Contributors")]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file layered over the user and project files
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Analyze a photo of a parking sign
    #[command(about = "Analyze a parking sign photo")]
    Analyze {
        /// Photo of the sign (PNG, JPEG, GIF or WebP)
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Use mock results even if an API key is configured
        #[arg(long)]
        mock: bool,

        /// Pick mock results from the sign catalog instead of the clock
        #[arg(long)]
        random: bool,

        /// Vision model to ask
        #[arg(long, value_name = "MODEL")]
        model: Option<String>,

        /// Simulated latency of mock results, in milliseconds
        #[arg(long, value_name = "MS")]
        mock_delay_ms: Option<u64>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a mock result without a photo
    #[command(about = "Print a mock analysis result")]
    Mock {
        /// Evaluate the time-of-day mock at this RFC 3339 instant
        #[arg(long, value_name = "TIMESTAMP", conflicts_with = "random")]
        at: Option<String>,

        /// Pick from the sign catalog instead of the clock
        #[arg(long)]
        random: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}
