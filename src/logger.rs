
//! Log output.
//!
//! Records go to stderr through `fern`. The level comes from the
//! `GAMETRACKER_LOG` environment variable (`error`, `warn`, `info`,
//! `debug` or `trace`) and defaults to `info`.

use log::LevelFilter;

use std::env;
use std::str::FromStr;
use std::time::SystemTime;

pub const LOG_LEVEL_ENV_VAR: &str = "GAMETRACKER_LOG";

pub fn init() -> Result<(), log::SetLoggerError> {
  let level = env::var(LOG_LEVEL_ENV_VAR)
    .ok()
    .and_then(|level| LevelFilter::from_str(&level).ok())
    .unwrap_or(LevelFilter::Info);
  fern::Dispatch::new()
    .format(|out, message, record| {
      out.finish(format_args!(
        "[{} {} {}] {}",
        humantime::format_rfc3339_seconds(SystemTime::now()),
        record.level(),
        record.target(),
        message,
      ))
    })
    .level(level)
    // Rocket logs every request at info.
    .level_for("rocket::server", LevelFilter::Warn)
    .chain(std::io::stderr())
    .apply()
}
