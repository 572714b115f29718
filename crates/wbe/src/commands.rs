mod config;
mod open;

use std::process::ExitCode;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Subcommand;

use crate::args::Output;

pub trait Command {
    async fn execute(&self, output: Output) -> Result<ExitCode>;
}

#[derive(Debug, Subcommand)]
pub enum WbeCommand {
    /// Open files headlessly and keep their editors in line with the disk
    Open(self::open::Open),
    /// Print the effective settings as JSON
    Config(self::config::Config),
}

impl WbeCommand {
    pub async fn execute(&self, output: Output) -> Result<ExitCode> {
        match self {
            Self::Open(command) => command.execute(output).await,
            Self::Config(command) => command.execute(output).await,
        }
    }
}

fn resolve_project_root() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|_| anyhow::anyhow!("Current directory is not valid UTF-8"))
}
