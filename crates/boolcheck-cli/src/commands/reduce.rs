//! Reduce command - shrinks a file while a finding still reproduces

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use crate::reducer::{EngineOracle, Reducer};

#[derive(Args, Debug)]
pub struct ReduceArgs {
    /// Source file that produces the finding
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Line the finding is reported on
    #[arg(value_name = "LINE")]
    pub line: usize,

    /// Where to write the reduced file (default: __out__.<ext>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ReduceArgs {
    pub fn run(&self) -> Result<()> {
        let source = fs::read_to_string(&self.file)
            .with_context(|| format!("Failed to read {}", self.file.display()))?;

        println!("make sure the finding at line {} reproduces", self.line);

        let oracle = EngineOracle::new(&self.file.to_string_lossy(), self.line);
        let mut reducer = Reducer::new(oracle);
        let reduced = reducer.reduce(&source)?;

        for step in reducer.steps() {
            println!("{step}");
        }

        let output = self.output_path();
        fs::write(&output, reduced)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        println!("reduced code written to {}", output.display());

        Ok(())
    }

    fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => default_output(&self.file),
        }
    }
}

fn default_output(file: &Path) -> PathBuf {
    match file.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => PathBuf::from(format!("__out__.{ext}")),
        None => PathBuf::from("__out__"),
    }
}
