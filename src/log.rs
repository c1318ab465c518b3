/*!

Logging setup. The library only emits records through the `log` facade; a binary that wants to
see them calls [`enable_logging`] or [`set_log_level`], which install a `log4rs` console logger
the first time and reconfigure it afterwards.

*/

use crate::error::ContagionError;
use log4rs::{
    Handle,
    append::console::ConsoleAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use std::sync::{Mutex, PoisonError};

pub use log::{LevelFilter, debug, error, info, trace, warn};

const DEFAULT_LOG_PATTERN: &str = "{h({l:<5})} {t} - {m}{n}";

static LOG_HANDLE: Mutex<Option<Handle>> = Mutex::new(None);

fn build_config(level: LevelFilter) -> Result<Config, ContagionError> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(DEFAULT_LOG_PATTERN)))
        .build();

    Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))
        .map_err(|errors| ContagionError::Logging(errors.to_string()))
}

/// Installs the console logger on first use and changes its level afterwards.
pub fn set_log_level(level: LevelFilter) -> Result<(), ContagionError> {
    let config = build_config(level)?;
    let mut handle = LOG_HANDLE.lock().unwrap_or_else(PoisonError::into_inner);

    match handle.as_ref() {
        Some(handle) => handle.set_config(config),
        None => {
            let new_handle = log4rs::init_config(config)
                .map_err(|error| ContagionError::Logging(error.to_string()))?;
            *handle = Some(new_handle);
        }
    }
    Ok(())
}

/// Logs at `Info` and above.
pub fn enable_logging() -> Result<(), ContagionError> {
    set_log_level(LevelFilter::Info)
}

pub fn disable_logging() -> Result<(), ContagionError> {
    set_log_level(LevelFilter::Off)
}
