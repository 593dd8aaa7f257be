//! CLI for the modbuild bundle assembler.

mod report;

use anyhow::Result;
use clap::Parser;
use modbuild_core::config::{self, Config};
use modbuild_core::fetch::Strategies;
use modbuild_core::pipeline::{self, RunPaths};
use std::path::PathBuf;

pub const DEFAULT_CONFIG: &str = "build_mods.toml";

/// Download, verify and package mod bundles for every configured build.
#[derive(Debug, Parser)]
#[command(name = "modbuild")]
#[command(about = "modbuild: download, verify and package game mod bundles", long_about = None)]
pub struct Cli {
    /// The configuration file.
    #[arg(long = "cfg", value_name = "PATH", default_value = DEFAULT_CONFIG)]
    pub cfg: PathBuf,
}

impl Cli {
    /// Parses arguments, runs the pipeline and returns the process exit code.
    pub fn run_from_args() -> Result<i32> {
        Cli::parse().run()
    }

    pub fn run(&self) -> Result<i32> {
        println!("Using config file: {}", self.cfg.display());
        let cfg = Config::load(&self.cfg)?;
        let work_root = config::work_root();
        tracing::debug!(work_root = %work_root.display(), "resolved work root");

        let paths = RunPaths::new(&work_root, &cfg);
        let strategies = Strategies::new(&cfg.hosts);
        let fetch = pipeline::fetch_phase(&cfg, &paths, &strategies)?;
        report::print_fetch(&fetch);

        let outcome = pipeline::build_phase(&cfg, &paths, fetch)?;
        report::print_builds(&outcome);
        Ok(outcome.exit_code())
    }
}
