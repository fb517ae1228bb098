use anyhow::Result;
use std::io;
use std::path::PathBuf;

use flare_join::config::PipelineConfig;
use flare_join::{pipeline, report};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Optional JSON config path; defaults reproduce the reference dataset layout
    let config = match std::env::args_os().nth(1) {
        Some(path) => PipelineConfig::from_json_file(&PathBuf::from(path))?,
        None => PipelineConfig::default(),
    };
    log::debug!("Config: {:?}", config);

    let output = pipeline::run(&config)?;

    let mut stdout = io::stdout().lock();
    report::write_report(&mut stdout, &output)?;
    Ok(())
}
