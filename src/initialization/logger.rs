//! Logger initialization.

use std::io::Write;

use colored::{ColoredString, Colorize};
use log::{Level, LevelFilter, Record};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Dependencies whose logs are clamped regardless of the requested level.
const QUIET_MODULES: &[(&str, LevelFilter)] = &[
    ("sqlx", LevelFilter::Warn),
    ("reqwest", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
    // hickory logs every malformed reply from a phishing host's name server
    ("hickory_proto", LevelFilter::Error),
];

/// Initializes the logger with the specified level and format.
///
/// `RUST_LOG` is read first and `level` then applies on top of it, so
/// per-module filters from the environment keep working for dependencies.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=reqwest=debug phish_track --log-level info run
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    for (module, clamp) in QUIET_MODULES {
        builder.filter_module(module, *clamp);
    }
    builder.filter_module("phish_track", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| writeln!(buf, "{}", json_line(record)));
        }
        LogFormat::Plain => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{} {} [{}] {}",
                    chrono::Local::now().format("%H:%M:%S").to_string().dimmed(),
                    record.target().cyan(),
                    paint(record.level()),
                    record.args()
                )
            });
        }
    }

    builder.try_init()?;
    Ok(())
}

fn paint(level: Level) -> ColoredString {
    let text = level.to_string();
    match level {
        Level::Error => text.red(),
        Level::Warn => text.yellow(),
        Level::Info => text.green(),
        Level::Debug => text.blue(),
        Level::Trace => text.purple(),
    }
}

/// One JSON object per record: `ts`, `level`, `target`, `msg`.
fn json_line(record: &Record<'_>) -> String {
    serde_json::json!({
        "ts": chrono::Utc::now().to_rfc3339(),
        "level": record.level().as_str(),
        "target": record.target(),
        "msg": record.args().to_string(),
    })
    .to_string()
}
