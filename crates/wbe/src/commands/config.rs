use std::process::ExitCode;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use wbe_conf::Settings;

use crate::args::Output;
use crate::commands::resolve_project_root;
use crate::commands::Command;

#[derive(Debug, Parser)]
pub struct Config {
    /// Project directory to read `wbe.toml` from. Defaults to the current
    /// directory.
    #[arg(long)]
    root: Option<Utf8PathBuf>,
}

impl Command for Config {
    async fn execute(&self, _output: Output) -> Result<ExitCode> {
        let root = match &self.root {
            Some(root) => root.clone(),
            None => resolve_project_root()?,
        };
        let settings = Settings::new(root.as_std_path()).context("Failed to load settings")?;
        let json =
            serde_json::to_string_pretty(&settings).context("Failed to serialize settings")?;
        println!("{json}");
        Ok(ExitCode::SUCCESS)
    }
}
