//! [`ConfigSource`] over a [`Figment`].

use figment::providers::Env;
use figment::value::Value;
use figment::Figment;

use super::{parse_bool, parse_int, ConfigError, ConfigSource};

/// Reads settings from a [`Figment`].
///
/// Environment variables map onto dotted keys with `__` as the separator, so
/// with the prefix `APP_` the variable `APP_DATABASE__THROUGHPUT_MODE` is read
/// as `database.throughput_mode`.
///
/// ```rust
/// use database_setup::config::{keys, ConfigSource, FigmentConfig};
/// use figment::Figment;
///
/// let config = FigmentConfig::new(
///     Figment::new()
///         .merge((keys::DATABASE_NAME, "orders"))
///         .merge((keys::THROUGHPUT, 400)),
/// );
///
/// assert_eq!(config.require_string(keys::DATABASE_NAME).unwrap(), "orders");
/// assert_eq!(config.require_int(keys::THROUGHPUT).unwrap(), 400);
/// ```
#[derive(Debug, Clone)]
pub struct FigmentConfig {
    figment: Figment,
}

impl FigmentConfig {
    /// Wrap an existing figment.
    pub fn new(figment: Figment) -> Self {
        Self { figment }
    }

    /// Read `PREFIX`-ed environment variables, splitting nested keys on `__`.
    pub fn from_env(prefix: &str) -> Self {
        Self::new(Figment::new().merge(Env::prefixed(prefix).split("__")))
    }

    /// The underlying figment.
    pub fn figment(&self) -> &Figment {
        &self.figment
    }

    fn find(&self, key: &str) -> Result<Option<Value>, ConfigError> {
        match self.figment.find_value(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.missing() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl ConfigSource for FigmentConfig {
    fn get_string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let Some(value) = self.find(key)? else {
            return Ok(None);
        };
        if let Some(s) = value.as_str() {
            return Ok(Some(s.to_string()));
        }
        // Env values that look like numbers, chars or booleans are parsed eagerly by figment.
        if let Some(c) = value.to_char() {
            return Ok(Some(c.to_string()));
        }
        if let Some(n) = integer(&value) {
            return Ok(Some(n.to_string()));
        }
        if let Some(f) = value.to_f64() {
            return Ok(Some(f.to_string()));
        }
        if let Some(b) = value.to_bool() {
            return Ok(Some(b.to_string()));
        }
        Err(ConfigError::invalid(key, "expected a string"))
    }

    fn get_int(&self, key: &str) -> Result<Option<i64>, ConfigError> {
        let Some(value) = self.find(key)? else {
            return Ok(None);
        };
        if let Some(n) = integer(&value) {
            return i64::try_from(n)
                .map(Some)
                .map_err(|_| ConfigError::invalid(key, "integer out of range"));
        }
        match value.as_str() {
            Some(s) => parse_int(key, s).map(Some),
            None => Err(ConfigError::invalid(key, "expected an integer")),
        }
    }

    fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        let Some(value) = self.find(key)? else {
            return Ok(None);
        };
        if let Some(b) = value.to_bool() {
            return Ok(Some(b));
        }
        match value.as_str() {
            Some(s) => parse_bool(key, s).map(Some),
            None => Err(ConfigError::invalid(key, "expected a boolean")),
        }
    }
}

/// Signed or unsigned numbers as `i128`. `Env` stores non-negative values unsigned.
fn integer(value: &Value) -> Option<i128> {
    value
        .to_i128()
        .or_else(|| value.to_u128().and_then(|u| i128::try_from(u).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::keys;

    fn config() -> FigmentConfig {
        FigmentConfig::new(
            Figment::new()
                .merge((keys::DATABASE_NAME, "orders"))
                .merge((keys::THROUGHPUT, 4000))
                .merge((keys::THROUGHPUT_MODE, "autoscale"))
                .merge((keys::REPLACE_THROUGHPUT, true)),
        )
    }

    #[test]
    fn test_typed_lookups() {
        let config = config();
        assert_eq!(
            config.get_string(keys::DATABASE_NAME).unwrap(),
            Some("orders".to_string())
        );
        assert_eq!(config.get_int(keys::THROUGHPUT).unwrap(), Some(4000));
        assert_eq!(config.get_bool(keys::REPLACE_THROUGHPUT).unwrap(), Some(true));
    }

    #[test]
    fn test_missing_key_is_none() {
        let config = config();
        assert_eq!(config.get_string(keys::ENDPOINT).unwrap(), None);
        assert_eq!(config.get_int("other.throughput").unwrap(), None);
        assert!(matches!(
            config.require_string(keys::ACCOUNT_KEY),
            Err(ConfigError::Missing { .. })
        ));
    }

    #[test]
    fn test_wrong_type_is_invalid() {
        let config = config();
        assert!(matches!(
            config.get_int(keys::DATABASE_NAME),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.get_bool(keys::THROUGHPUT_MODE),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let config = FigmentConfig::new(
            Figment::new()
                .merge((keys::THROUGHPUT, "800"))
                .merge((keys::REPLACE_THROUGHPUT, "False")),
        );
        assert_eq!(config.get_int(keys::THROUGHPUT).unwrap(), Some(800));
        assert_eq!(config.get_bool(keys::REPLACE_THROUGHPUT).unwrap(), Some(false));
    }

    #[test]
    fn test_unsigned_numbers_are_read() {
        let config = FigmentConfig::new(
            Figment::new()
                .merge((keys::DATABASE_NAME, 12345u64))
                .merge((keys::THROUGHPUT, 400usize)),
        );
        assert_eq!(
            config.get_string(keys::DATABASE_NAME).unwrap(),
            Some("12345".to_string())
        );
        assert_eq!(config.get_int(keys::THROUGHPUT).unwrap(), Some(400));
    }

    #[test]
    fn test_unsigned_out_of_range() {
        let config = FigmentConfig::new(Figment::new().merge((keys::THROUGHPUT, u64::MAX)));
        assert!(matches!(
            config.get_int(keys::THROUGHPUT),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_from_env_reads_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LEDGER_DATABASE__NAME", "12345");
            jail.set_env("LEDGER_DATABASE__THROUGHPUT", "400");
            jail.set_env("LEDGER_DATABASE__THROUGHPUT_MODE", "manual");
            jail.set_env("LEDGER_DATABASE__REPLACE_THROUGHPUT", "true");

            let config = FigmentConfig::from_env("LEDGER_");
            assert_eq!(
                config.get_string(keys::DATABASE_NAME).unwrap(),
                Some("12345".to_string())
            );
            assert_eq!(config.get_int(keys::THROUGHPUT).unwrap(), Some(400));
            assert_eq!(
                config.get_string(keys::THROUGHPUT_MODE).unwrap(),
                Some("manual".to_string())
            );
            assert_eq!(config.get_bool(keys::REPLACE_THROUGHPUT).unwrap(), Some(true));
            assert_eq!(config.get_string(keys::ENDPOINT).unwrap(), None);
            Ok(())
        });
    }
}
