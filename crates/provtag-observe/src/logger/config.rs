use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::{
    error::{LoggerError, LoggerResult},
    format::LoggerFormat,
    level::LoggerLevel,
    timer::LoggerTimeZone,
};

/// Filter directive override, e.g. `PROVTAG_LOG=provtag_core=debug,info`.
pub const ENV_LOG: &str = "PROVTAG_LOG";
/// Output format override (`text`, `json`, `journald`).
pub const ENV_LOG_FORMAT: &str = "PROVTAG_LOG_FORMAT";
/// Timestamp timezone override (`utc`, `local`).
pub const ENV_LOG_TZ: &str = "PROVTAG_LOG_TZ";
/// Any non-empty value disables colors (<https://no-color.org>).
pub const ENV_NO_COLOR: &str = "NO_COLOR";

/// Logger configuration.
///
/// Missing fields fall back to their defaults when deserialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directive (e.g. `"info"`, `"provtag_core=debug,info"`).
    pub level: LoggerLevel,
    pub tz: LoggerTimeZone,
    /// Include module targets in each line.
    pub with_targets: bool,
    /// Allow ANSI colors; still off when stdout is not a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Apply `PROVTAG_LOG*` and `NO_COLOR` from the process environment.
    pub fn with_env(self) -> LoggerResult<Self> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Unset or empty variables leave the current value in place.
    pub fn with_env_from<F>(mut self, lookup: F) -> LoggerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = var(ENV_LOG) {
            self.level = v.parse().map_err(|_| LoggerError::InvalidEnv {
                var: ENV_LOG,
                value: v.clone(),
            })?;
        }
        if let Some(v) = var(ENV_LOG_FORMAT) {
            self.format = v.parse()?;
        }
        if let Some(v) = var(ENV_LOG_TZ) {
            self.tz = v.parse()?;
        }
        if var(ENV_NO_COLOR).is_some() {
            self.use_color = false;
        }
        Ok(self)
    }

    /// Whether ANSI colors should be emitted right now.
    ///
    /// Requires `use_color` and a terminal on stdout; call at logger setup, not at parse time.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}
