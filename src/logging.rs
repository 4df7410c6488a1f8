use anyhow::Result;
use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use std::fs::OpenOptions;
use crate::config::ServerConfig;

/// Logs to stderr, and to `--log-file` when one is given.
pub fn init(config: &ServerConfig) -> Result<()> {
    let log_config = ConfigBuilder::new()
        .set_target_level(log::LevelFilter::Error)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        config.log_level,
        log_config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if let Some(path) = &config.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        loggers.push(WriteLogger::new(config.log_level, log_config, file));
    }

    CombinedLogger::init(loggers)?;
    Ok(())
}
