//! Configuration sources for configuration injection.
//!
//! Keys are hierarchical, separated by `:` and compared case-insensitively.
//! Sources are flat key/value views: a section is every key below a prefix,
//! list elements are the children `key:0`, `key:1`, ...

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::Path;

use serde_json::Value;

use crate::{DiError, DiResult};

mod binding;

pub use binding::{bind_scalar, format_time_span, parse_time_span, ConfigBindable, ConfigScalar};

/// Key separator for hierarchical configuration keys
pub const KEY_DELIMITER: &str = ":";

/// Read access to configuration values.
///
/// Registered in the container as `dyn Configuration` and read by
/// [`Resolution::Configuration`](crate::Resolution::Configuration) and
/// [`ConfigurationSelector`](crate::ConfigurationSelector).
pub trait Configuration: Send + Sync {
    /// Raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Immediate children of the section at `key`.
    ///
    /// Children are ordered with numeric keys first in numeric order, then the
    /// remaining keys case-insensitively.
    fn children(&self, key: &str) -> Vec<ConfigEntry>;
}

/// One child of a configuration section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    /// Last segment of the child's key
    pub key: String,
    /// Full path of the child
    pub path: String,
    /// Value of the child; `None` for pure sections
    pub value: Option<String>,
}

/// Orders configuration keys the way list indices expect.
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase()),
    }
}

/// In-memory configuration.
///
/// # Examples
///
/// ```
/// use ferrous_wire::{Configuration, MemoryConfiguration};
///
/// let config = MemoryConfiguration::from_json_str(r#"{
///     "Http": { "Timeout": "00:00:30", "Hosts": ["a", "b"] }
/// }"#).unwrap();
///
/// assert_eq!(config.get("http:timeout").as_deref(), Some("00:00:30"));
/// assert_eq!(config.children("Http:Hosts").len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct MemoryConfiguration {
    // Lowercased key -> (original key, value)
    values: BTreeMap<String, (String, String)>,
}

impl MemoryConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut config = Self::new();
        for (key, value) in pairs {
            config.set(key, value);
        }
        config
    }

    /// Flattens a JSON document into `:`-separated keys.
    ///
    /// Arrays contribute their elements under numeric keys; `null` leaves are
    /// skipped.
    pub fn from_json(value: &Value) -> Self {
        let mut config = Self::new();
        config.flatten_json(String::new(), value);
        config
    }

    pub fn from_json_str(json: &str) -> DiResult<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| DiError::Custom(format!("Invalid JSON configuration: {}", e)))?;
        Ok(Self::from_json(&value))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> DiResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DiError::Custom(format!("Cannot read configuration file {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// Reads environment variables starting with `prefix`.
    ///
    /// The prefix is stripped and `__` in the remaining name becomes the key
    /// separator, so `APP_Http__Timeout` with prefix `APP_` is `Http:Timeout`.
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn from_env(prefix: &str) -> Self {
        let prefix_lower = prefix.to_ascii_lowercase();
        let mut config = Self::new();
        for (name, value) in env::vars_os() {
            let (Ok(name), Ok(value)) = (name.into_string(), value.into_string()) else {
                continue;
            };
            if !name.to_ascii_lowercase().starts_with(&prefix_lower) {
                continue;
            }
            if let Some(rest) = name.get(prefix.len()..).filter(|rest| !rest.is_empty()) {
                config.set(rest.replace("__", KEY_DELIMITER), value);
            }
        }
        config
    }

    /// Sets a value, replacing any value under the same key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        self.values.insert(key.to_ascii_lowercase(), (key, value.into()));
        self
    }

    /// Layers `other` over this configuration; its values win.
    pub fn merge(mut self, other: MemoryConfiguration) -> Self {
        self.values.extend(other.values);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn flatten_json(&mut self, path: String, value: &Value) {
        let child = |key: &str| {
            if path.is_empty() {
                key.to_string()
            } else {
                format!("{}{}{}", path, KEY_DELIMITER, key)
            }
        };

        match value {
            Value::Null => {}
            Value::Bool(b) => {
                self.set(path, b.to_string());
            }
            Value::Number(n) => {
                self.set(path, n.to_string());
            }
            Value::String(s) => {
                self.set(path, s.clone());
            }
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    self.flatten_json(child(&index.to_string()), item);
                }
            }
            Value::Object(map) => {
                for (key, item) in map {
                    self.flatten_json(child(key), item);
                }
            }
        }
    }
}

impl Configuration for MemoryConfiguration {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .get(&key.to_ascii_lowercase())
            .map(|(_, value)| value.clone())
    }

    fn children(&self, key: &str) -> Vec<ConfigEntry> {
        let prefix = format!("{}{}", key.to_ascii_lowercase(), KEY_DELIMITER);
        let mut seen: BTreeMap<String, ConfigEntry> = BTreeMap::new();

        for (lower, (original, _)) in self.values.range(prefix.clone()..) {
            if !lower.starts_with(&prefix) {
                break;
            }
            let rest = &original[prefix.len()..];
            let segment = rest.split(KEY_DELIMITER).next().unwrap_or(rest);
            seen.entry(segment.to_ascii_lowercase()).or_insert_with(|| {
                let path = format!("{}{}{}", key, KEY_DELIMITER, segment);
                ConfigEntry { key: segment.to_string(), value: self.get(&path), path }
            });
        }

        let mut children: Vec<ConfigEntry> = seen.into_values().collect();
        children.sort_by(|a, b| compare_keys(&a.key, &b.key));
        children
    }
}

impl fmt::Debug for MemoryConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.values.values().map(|(k, v)| (k, v)))
            .finish()
    }
}

/// Configuration sources checked in priority order.
///
/// The first source holding a key provides its value; sections merge the
/// children of every source.
#[derive(Default)]
pub struct LayeredConfiguration {
    sources: Vec<Box<dyn Configuration>>,
}

impl LayeredConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a configuration source (higher priority sources should be added first)
    pub fn add_source(mut self, source: impl Configuration + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }
}

impl Configuration for LayeredConfiguration {
    fn get(&self, key: &str) -> Option<String> {
        self.sources.iter().find_map(|source| source.get(key))
    }

    fn children(&self, key: &str) -> Vec<ConfigEntry> {
        let mut seen: BTreeMap<String, ConfigEntry> = BTreeMap::new();
        for source in &self.sources {
            for entry in source.children(key) {
                seen.entry(entry.key.to_ascii_lowercase()).or_insert(entry);
            }
        }

        let mut children: Vec<ConfigEntry> = seen
            .into_values()
            .map(|entry| ConfigEntry { value: self.get(&entry.path), ..entry })
            .collect();
        children.sort_by(|a, b| compare_keys(&a.key, &b.key));
        children
    }
}

impl fmt::Debug for LayeredConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayeredConfiguration")
            .field("sources", &format!("{} sources", self.sources.len()))
            .finish()
    }
}
