use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DB_PATH: &str = "./data/cycletime.db";
const DEFAULT_STATIC_DIR: &str = "./frontend/dist/public";
const DEFAULT_TRACKER_TIMEOUT_SECS: u64 = 30;

/// Process settings, read once at startup from `CT_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind_addr: String,
    pub db_path: PathBuf,
    pub static_dir: PathBuf,
    pub tracker_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            tracker_timeout: Duration::from_secs(DEFAULT_TRACKER_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup; blank values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let tracker_timeout = match get("CT_TRACKER_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!("ignoring invalid CT_TRACKER_TIMEOUT_SECS={raw:?}");
                    defaults.tracker_timeout
                }
            },
            None => defaults.tracker_timeout,
        };

        Self {
            bind_addr: get("CT_BIND_ADDR").unwrap_or(defaults.bind_addr),
            db_path: get("CT_DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path),
            static_dir: get("CT_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            tracker_timeout,
        }
    }
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Settings::from_lookup(lookup(&[])), Settings::default());
    }

    #[test]
    fn overrides_and_bad_timeout() {
        let s = Settings::from_lookup(lookup(&[
            ("CT_BIND_ADDR", "127.0.0.1:8080"),
            ("CT_DB_PATH", " /tmp/ct.db "),
            ("CT_TRACKER_TIMEOUT_SECS", "zero"),
        ]));
        assert_eq!(s.bind_addr, "127.0.0.1:8080");
        assert_eq!(s.db_path, PathBuf::from("/tmp/ct.db"));
        assert_eq!(s.tracker_timeout, Duration::from_secs(DEFAULT_TRACKER_TIMEOUT_SECS));
    }
}
