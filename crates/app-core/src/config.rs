//! Layered, hot-reloadable application settings.
//!
//! Values come from a YAML file and can be overridden per key through
//! environment variables prefixed with `QUIZDECK__`, using `__` as the path
//! separator (`QUIZDECK__USOS__CONSUMER_KEY` overrides `usos.consumer_key`).

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, mpsc};
use std::thread;
use std::time::Duration;

use config::{Config as RawConfig, Environment, File};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use serde::de::DeserializeOwned;
use thiserror::Error;

pub const ENV_PREFIX: &str = "QUIZDECK";
const ENV_SEPARATOR: &str = "__";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load or parse configuration")]
    Load(#[from] config::ConfigError),

    #[error("Failed to initialize file watcher")]
    Watch(#[from] notify::Error),

    #[error("Configuration lock was poisoned, indicating a panic in another thread")]
    LockPoisoned,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug)]
pub struct Config {
    inner: Arc<RwLock<RawConfig>>,
    // Dropping the watcher stops the reload thread.
    _watcher: Option<RecommendedWatcher>,
}

impl Config {
    pub fn builder<P: AsRef<Path>>(path: P) -> ConfigBuilder {
        ConfigBuilder::new(path.as_ref().to_path_buf())
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        let guard = self.inner.read().map_err(|_| ConfigError::LockPoisoned)?;
        guard.get(key).map_err(ConfigError::from)
    }

    /// Like [`Config::get`], falling back to `default` when the key is absent
    /// or cannot be read as `T`.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }
}

pub struct ConfigBuilder {
    path: PathBuf,
    env_prefix: Option<String>,
    watch: bool,
    watch_interval: Duration,
}

impl ConfigBuilder {
    fn new(path: PathBuf) -> Self {
        Self { path, env_prefix: Some(ENV_PREFIX.to_string()), watch: false, watch_interval: Duration::from_secs(2) }
    }

    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    pub fn without_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    pub fn watch(mut self) -> Self {
        self.watch = true;
        self
    }

    pub fn watch_interval(mut self, interval: Duration) -> Self {
        self.watch_interval = interval;
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        let raw_config = Self::load(&self.path, self.env_prefix.as_deref())?;
        let config_arc = Arc::new(RwLock::new(raw_config));
        let mut watcher = None;

        if self.watch {
            let path_clone = self.path.clone();
            let prefix_clone = self.env_prefix.clone();
            let config_clone = Arc::clone(&config_arc);
            let (tx, rx) = mpsc::channel();

            let mut w = RecommendedWatcher::new(tx, notify::Config::default().with_poll_interval(self.watch_interval))?;
            w.watch(&self.path, RecursiveMode::NonRecursive)?;

            thread::spawn(move || {
                tracing::info!(path = %path_clone.to_string_lossy(), "Watching configuration file for changes");
                while let Ok(event_result) = rx.recv() {
                    match event_result {
                        Ok(Event { kind: notify::EventKind::Modify(_), .. }) => {
                            match Self::load(&path_clone, prefix_clone.as_deref()) {
                                Ok(new_config) => match config_clone.write() {
                                    Ok(mut guard) => {
                                        *guard = new_config;
                                        tracing::info!("Configuration reloaded");
                                    },
                                    Err(_) => tracing::error!("Failed to acquire write lock for reloading config"),
                                },
                                Err(e) => tracing::error!("Failed to reload configuration file: {}", e),
                            }
                        },
                        Err(e) => tracing::error!("File watcher error: {:?}", e),
                        _ => {},
                    }
                }
            });
            watcher = Some(w);
        }

        Ok(Config { inner: config_arc, _watcher: watcher })
    }

    fn load(path: &Path, env_prefix: Option<&str>) -> Result<RawConfig, config::ConfigError> {
        let mut builder = RawConfig::builder().add_source(File::from(path).required(true));
        if let Some(prefix) = env_prefix {
            builder = builder.add_source(Environment::with_prefix(prefix).separator(ENV_SEPARATOR).try_parsing(true));
        }
        builder.build()
    }
}

#[cfg(any(test, feature = "testing"))]
pub mod test_utils {
    use std::collections::HashMap;

    use config::Value;

    use super::*;

    #[derive(Default)]
    pub struct TestConfigBuilder {
        values: HashMap<String, Value>,
    }

    impl TestConfigBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with<T: Into<Value>>(mut self, key: &str, value: T) -> Self {
            self.values.insert(key.to_string(), value.into());
            self
        }

        pub fn build(self) -> Config {
            let mut builder = RawConfig::builder();

            for (key, value) in self.values {
                builder = builder.set_override(key, value).expect("invalid test config key");
            }

            let raw_config = builder.build().expect("Failed to create config from test values");

            Config { inner: Arc::new(RwLock::new(raw_config)), _watcher: None }
        }
    }
}
