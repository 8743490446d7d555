use std::fs::OpenOptions;

use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

use crate::config::Settings;

/// Forces debug logging regardless of settings.json
const DEBUG_ENV: &str = "DESKTHEME_DEBUG";

pub fn parse_level(level: &str) -> LevelFilter {
    match level.trim().to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Warn,
    }
}

fn effective_level(settings: &Settings) -> LevelFilter {
    let forced = std::env::var(DEBUG_ENV).map(|v| v == "1").unwrap_or(false);
    if forced {
        LevelFilter::Debug
    } else {
        parse_level(&settings.log_level)
    }
}

/// Logs go to stderr, and to `log_file` too when configured.
/// Progress lines for the user are printed separately on stdout.
pub fn setup_logger(settings: &Settings) -> Result<(), log::SetLoggerError> {
    let level = effective_level(settings);

    let colors = ColoredLevelConfig::new()
        .trace(Color::BrightBlack)
        .debug(Color::BrightBlue)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red);

    let stderr = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                colors.color(record.level()),
                message
            ))
        })
        .chain(std::io::stderr());

    let mut dispatch = fern::Dispatch::new().level(level).chain(stderr);

    if let Some(file_path) = settings.log_file.as_deref() {
        match OpenOptions::new().create(true).append(true).open(file_path) {
            Ok(file) => {
                let file_output = fern::Dispatch::new()
                    .format(|out, message, record| {
                        out.finish(format_args!(
                            "[{} {} {}] {}",
                            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                            record.level(),
                            record.target(),
                            message
                        ))
                    })
                    .chain(file);
                dispatch = dispatch.chain(file_output);
            }
            Err(e) => {
                eprintln!("Warning: Failed to open log file '{}': {}", file_path, e);
                eprintln!("Continuing without file logging.");
            }
        }
    }

    dispatch.apply()?;
    log::debug!("Logger initialized with level: {}", level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level(" INFO "), LevelFilter::Info);
        assert_eq!(parse_level("off"), LevelFilter::Off);
        assert_eq!(parse_level("verbose"), LevelFilter::Warn);
    }
}
