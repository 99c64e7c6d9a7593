use env_logger::Builder;
use log::{LevelFilter, SetLoggerError};
use std::io::Write;

/// Installs the global logger. `RUST_LOG` takes precedence over `level`.
pub fn log_init(level: LevelFilter) -> Result<(), SetLoggerError> {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}]: {}",
                chrono::Local::now().format("%m-%dT%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, level)
        .parse_default_env()
        .try_init()
}
