//! boolcheck CLI - Command-line interface for the boolcheck analyzer
//!
//! Finds misuse of boolean values in C and C++ sources.

mod commands;
mod logging;
mod output;
mod reducer;

use clap::Parser;
use commands::Commands;
use logging::LogLevel;

#[derive(Parser, Debug)]
#[command(
    name = "boolcheck",
    author,
    version,
    about = "Fast checker for boolean misuse in C and C++ code",
    long_about = "boolcheck reports suspicious uses of boolean values in C and C++:\n\n\
                  bitwise operators on booleans, booleans compared with integers,\n\
                  relational comparisons of boolean results and booleans assigned\n\
                  to pointers."
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "warn",
        help = "Set the log level"
    )]
    pub log_level: LogLevel,

    #[arg(long, global = true, help = "Output logs in JSON format")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level, cli.log_json);

    match cli.command {
        Commands::Check(args) => args.run(),
        Commands::Explain(args) => args.run(),
        Commands::Reduce(args) => args.run(),
    }
}
