//! Environment-driven settings shared by the app and the probe tool.
//!
//! Every knob falls back to its default when the variable is unset, blank or
//! does not parse. On wasm there is no environment, so the defaults apply.

use std::str::FromStr;

pub const DEFAULT_PENGUINS: usize = 8;
pub const DEFAULT_FLOWERS: usize = 80;
pub const DEFAULT_MANIFEST: &str = "penguin-videos.json";
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;
pub const DEFAULT_VIDEO_SLOTS: usize = 3;
pub const DEFAULT_CONSOLE_LINES: usize = 50;
pub const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeadowConfig {
    pub penguin_count: usize,
    pub flower_count: usize,
    /// Path or `http(s)` URL of the prefetched pool manifest.
    pub pool_manifest: String,
    pub max_attempts: usize,
    /// Native only; the web counts `.video-card` elements instead.
    pub video_slots: usize,
    pub debug_console: bool,
    pub console_lines: usize,
    /// Lowest level that reaches the debug console.
    pub log_level: log::LevelFilter,
}

impl Default for MeadowConfig {
    fn default() -> Self {
        Self {
            penguin_count: DEFAULT_PENGUINS,
            flower_count: DEFAULT_FLOWERS,
            pool_manifest: DEFAULT_MANIFEST.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            video_slots: DEFAULT_VIDEO_SLOTS,
            debug_console: true,
            console_lines: DEFAULT_CONSOLE_LINES,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl MeadowConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup (the environment in practice).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        let value = |name: &str| lookup(name).filter(|s| !s.trim().is_empty());

        Self {
            penguin_count: parse_or(value("MEADOW_PENGUINS"), d.penguin_count),
            flower_count: parse_or(value("MEADOW_FLOWERS"), d.flower_count),
            pool_manifest: value("MEADOW_POOL_MANIFEST")
                .map(|s| s.trim().to_string())
                .unwrap_or(d.pool_manifest),
            // Zero attempts would skip verification entirely.
            max_attempts: parse_or(value("MEADOW_MAX_ATTEMPTS"), d.max_attempts).max(1),
            video_slots: parse_or(value("MEADOW_VIDEO_SLOTS"), d.video_slots),
            debug_console: value("MEADOW_DEBUG_CONSOLE")
                .map(|v| truthy(&v))
                .unwrap_or(d.debug_console),
            console_lines: parse_or(value("MEADOW_CONSOLE_LINES"), d.console_lines).max(1),
            log_level: parse_or(value("MEADOW_LOG"), d.log_level),
        }
    }
}

pub fn truthy(v: &str) -> bool {
    matches!(v.trim(), "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "on")
}

fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(MeadowConfig::from_lookup(|_| None), MeadowConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let cfg = MeadowConfig::from_lookup(lookup(&[
            ("MEADOW_PENGUINS", "12"),
            ("MEADOW_FLOWERS", " 20 "),
            ("MEADOW_POOL_MANIFEST", "https://example.org/pool.json"),
            ("MEADOW_DEBUG_CONSOLE", "0"),
            ("MEADOW_LOG", "debug"),
        ]));
        assert_eq!(cfg.penguin_count, 12);
        assert_eq!(cfg.flower_count, 20);
        assert_eq!(cfg.pool_manifest, "https://example.org/pool.json");
        assert!(!cfg.debug_console);
        assert_eq!(cfg.log_level, log::LevelFilter::Debug);
    }

    #[test]
    fn bad_values_fall_back() {
        let cfg = MeadowConfig::from_lookup(lookup(&[
            ("MEADOW_PENGUINS", "lots"),
            ("MEADOW_MAX_ATTEMPTS", "0"),
            ("MEADOW_POOL_MANIFEST", "   "),
            ("MEADOW_CONSOLE_LINES", "-3"),
            ("MEADOW_LOG", "chatty"),
        ]));
        assert_eq!(cfg.penguin_count, DEFAULT_PENGUINS);
        assert_eq!(cfg.max_attempts, 1);
        assert_eq!(cfg.pool_manifest, DEFAULT_MANIFEST);
        assert_eq!(cfg.console_lines, DEFAULT_CONSOLE_LINES);
        assert_eq!(cfg.log_level, DEFAULT_LOG_LEVEL);
    }
}
