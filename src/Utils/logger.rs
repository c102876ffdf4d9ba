use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::File;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("cannot create log file: {0}")]
    LogFile(#[from] std::io::Error),
    #[error("logger is already initialised: {0}")]
    AlreadyInitialised(#[from] log::SetLoggerError),
}

/// Terminal logger, plus a file logger when `log_file` is given. Can be called once per process.
pub fn init_logger(level: LevelFilter, log_file: Option<&str>) -> Result<(), LoggerError> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));
    if let Some(path) = log_file {
        loggers.push(WriteLogger::new(level, Config::default(), File::create(path)?));
    }
    CombinedLogger::init(loggers)?;
    Ok(())
}
