//! CLI command implementations

pub mod check;
pub mod explain;
pub mod reduce;

pub use check::CheckArgs;
pub use explain::ExplainArgs;
pub use reduce::ReduceArgs;

use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze C/C++ files for boolean misuse
    Check(CheckArgs),

    /// Show detailed explanation for a specific rule
    Explain(ExplainArgs),

    /// Shrink a file while a finding on a given line still reproduces
    Reduce(ReduceArgs),
}
