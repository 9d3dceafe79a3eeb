//! Configuration lookups.
//!
//! The ensurer reads its settings through [`ConfigSource`], a small typed
//! key/value interface addressed by dotted paths. Two sources ship with the
//! crate:
//!
//! - [`MemoryConfig`]: a string map, handy for tests and for applications that
//!   already hold their settings in memory
//! - [`FigmentConfig`] (feature `figment`, on by default): any
//!   [`figment::Figment`], typically built from environment variables
//!
//! # Keys
//!
//! | key | type | required |
//! |-----|------|----------|
//! | `database.name` | string | yes, unless passed by the caller |
//! | `database.throughput` | positive int | yes |
//! | `database.throughput_mode` | string | yes |
//! | `database.endpoint` | URI | no, paired with `database.account_key` |
//! | `database.account_key` | string | no, paired with `database.endpoint` |
//! | `database.replace_throughput` | bool | no, defaults to `false` |

mod error;
#[cfg(feature = "figment")]
mod figment_source;
pub(crate) mod settings;

pub use error::ConfigError;
#[cfg(feature = "figment")]
pub use figment_source::FigmentConfig;
pub use settings::Settings;

use std::collections::HashMap;

/// Well-known configuration keys.
pub mod keys {
    /// Name of the database to ensure.
    pub const DATABASE_NAME: &str = "database.name";
    /// Throughput units, a positive integer.
    pub const THROUGHPUT: &str = "database.throughput";
    /// `"autoscale"` (any case) or anything else for manual.
    pub const THROUGHPUT_MODE: &str = "database.throughput_mode";
    /// Account endpoint for a dedicated client.
    pub const ENDPOINT: &str = "database.endpoint";
    /// Account key for a dedicated client.
    pub const ACCOUNT_KEY: &str = "database.account_key";
    /// Whether to replace throughput on an existing database.
    pub const REPLACE_THROUGHPUT: &str = "database.replace_throughput";
}

/// Typed key/value lookups by dotted path.
///
/// The lenient getters return `Ok(None)` for an absent key and
/// [`ConfigError::InvalidValue`] for a value of the wrong type. The `require_*`
/// variants also fail with [`ConfigError::Missing`] when the key is absent.
pub trait ConfigSource: Send + Sync {
    /// Look up a string value.
    fn get_string(&self, key: &str) -> Result<Option<String>, ConfigError>;

    /// Look up an integer value.
    fn get_int(&self, key: &str) -> Result<Option<i64>, ConfigError>;

    /// Look up a boolean value.
    fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError>;

    /// Look up a string value that must be present.
    fn require_string(&self, key: &str) -> Result<String, ConfigError> {
        self.get_string(key)?
            .ok_or_else(|| ConfigError::missing(key))
    }

    /// Look up an integer value that must be present.
    fn require_int(&self, key: &str) -> Result<i64, ConfigError> {
        self.get_int(key)?.ok_or_else(|| ConfigError::missing(key))
    }

    /// Look up a boolean value that must be present.
    fn require_bool(&self, key: &str) -> Result<bool, ConfigError> {
        self.get_bool(key)?.ok_or_else(|| ConfigError::missing(key))
    }
}

impl<C: ConfigSource + ?Sized> ConfigSource for std::sync::Arc<C> {
    fn get_string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        (**self).get_string(key)
    }

    fn get_int(&self, key: &str) -> Result<Option<i64>, ConfigError> {
        (**self).get_int(key)
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        (**self).get_bool(key)
    }
}

/// An in-memory configuration holding every value as a string.
///
/// Integers and booleans are parsed on read, so `"400"` satisfies
/// [`get_int`](ConfigSource::get_int) and `"True"` satisfies
/// [`get_bool`](ConfigSource::get_bool).
///
/// ```rust
/// use database_setup::config::{keys, ConfigSource, MemoryConfig};
///
/// let config = MemoryConfig::new()
///     .with(keys::DATABASE_NAME, "orders")
///     .with(keys::THROUGHPUT, "4000");
///
/// assert_eq!(config.require_string(keys::DATABASE_NAME).unwrap(), "orders");
/// assert_eq!(config.get_int(keys::THROUGHPUT).unwrap(), Some(4000));
/// assert_eq!(config.get_bool(keys::REPLACE_THROUGHPUT).unwrap(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryConfig {
    values: HashMap<String, String>,
}

impl MemoryConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a value.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Add or replace a value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        self.values.insert(key.into(), value.to_string());
    }

    /// Remove a value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }
}

impl ConfigSource for MemoryConfig {
    fn get_string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.values.get(key).cloned())
    }

    fn get_int(&self, key: &str) -> Result<Option<i64>, ConfigError> {
        self.values
            .get(key)
            .map(|raw| parse_int(key, raw))
            .transpose()
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        self.values
            .get(key)
            .map(|raw| parse_bool(key, raw))
            .transpose()
    }
}

pub(crate) fn parse_int(key: &str, raw: &str) -> Result<i64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::invalid(key, format!("expected an integer, got '{}'", raw)))
}

pub(crate) fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    let raw_trimmed = raw.trim();
    if raw_trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw_trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConfigError::invalid(
            key,
            format!("expected true or false, got '{}'", raw),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_config_lenient_getters() {
        let config = MemoryConfig::new()
            .with("a.int", 42)
            .with("a.bool", "TRUE")
            .with("a.text", "hello");

        assert_eq!(config.get_int("a.int").unwrap(), Some(42));
        assert_eq!(config.get_bool("a.bool").unwrap(), Some(true));
        assert_eq!(config.get_string("a.text").unwrap(), Some("hello".to_string()));
        assert_eq!(config.get_string("a.absent").unwrap(), None);
    }

    #[test]
    fn test_memory_config_wrong_type() {
        let config = MemoryConfig::new().with("a.text", "hello");

        let err = config.get_int("a.text").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(err.key(), Some("a.text"));

        assert!(config.get_bool("a.text").is_err());
    }

    #[test]
    fn test_require_reports_missing_key() {
        let config = MemoryConfig::new();

        assert!(matches!(
            config.require_int(keys::THROUGHPUT),
            Err(ConfigError::Missing { ref key }) if key == keys::THROUGHPUT
        ));
        assert!(config.require_string(keys::DATABASE_NAME).is_err());
        assert!(config.require_bool(keys::REPLACE_THROUGHPUT).is_err());
    }

    #[test]
    fn test_set_and_remove() {
        let mut config = MemoryConfig::new();
        config.set("k", "v");
        assert_eq!(config.remove("k"), Some("v".to_string()));
        assert_eq!(config.get_string("k").unwrap(), None);
    }

    #[test]
    fn test_arc_source_delegates() {
        let config = std::sync::Arc::new(MemoryConfig::new().with("k", 7));
        assert_eq!(config.require_int("k").unwrap(), 7);
    }
}
