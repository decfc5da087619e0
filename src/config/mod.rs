use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use directories::BaseDirs;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let mut map = default_map();
        let config_path = default_config_path();

        // Read .apexecrc if exists
        if config_path.exists() {
            if let Ok(file) = fs::File::open(&config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().flatten() {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((k, v)) = line.split_once('=') {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
            }
        }

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path }
    }

    /// Build a config from explicit pairs, bypassing file and environment.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let inner = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { inner, config_path: PathBuf::new() }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        // ENV first, unless this config was built from explicit pairs
        if !self.config_path.as_os_str().is_empty() {
            if let Ok(v) = env::var(key) {
                return Some(v);
            }
        }
        self.inner.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.parse::<usize>().ok())
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).map(PathBuf::from)
    }
}

fn is_config_key(k: &str) -> bool {
    // Accept known keys or SF_*/APEXEC_* for forward-compat
    const KEYS: &[&str] = &[
        "SF_INSTANCE_URL",
        "SF_ACCESS_TOKEN",
        "SF_API_VERSION",
        "REQUEST_TIMEOUT",
        "DEBUG_LEVEL",
    ];

    KEYS.contains(&k) || k.starts_with("SF_") || k.starts_with("APEXEC_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("apexec").join(".apexecrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    // Numbers
    m.insert("REQUEST_TIMEOUT".into(), "60".into());

    // Strings
    m.insert("SF_API_VERSION".into(), "50.0".into());
    m.insert("DEBUG_LEVEL".into(), "DEBUGONLY".into());

    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_present() {
        let cfg = Config::from_pairs(default_map());
        assert_eq!(cfg.get("SF_API_VERSION").as_deref(), Some("50.0"));
        assert_eq!(cfg.get_usize("REQUEST_TIMEOUT"), Some(60));
        assert_eq!(cfg.get("DEBUG_LEVEL").as_deref(), Some("DEBUGONLY"));
    }

    #[test]
    fn explicit_pairs_bypass_environment() {
        let cfg = Config::from_pairs([("SF_INSTANCE_URL", "https://na1.salesforce.com")]);
        assert_eq!(
            cfg.get("SF_INSTANCE_URL").as_deref(),
            Some("https://na1.salesforce.com")
        );
        assert!(cfg.get("SF_ACCESS_TOKEN").is_none());
        assert!(!cfg.get_bool("SF_ACCESS_TOKEN"));
    }
}
