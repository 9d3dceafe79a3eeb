//! Resolution of the ensurer's settings from a [`ConfigSource`].

use tracing::debug;

use super::{keys, ConfigError, ConfigSource};
use crate::model::{Credentials, DatabaseId, ThroughputMode, ThroughputSpec};

/// Settings read once per ensure call, before any store traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Target throughput.
    pub throughput: ThroughputSpec,
    /// Whether to replace throughput after create-if-absent.
    pub replace_throughput: bool,
}

impl Settings {
    /// Read throughput and the replace flag.
    pub fn resolve<C: ConfigSource + ?Sized>(config: &C) -> Result<Self, ConfigError> {
        Ok(Self {
            throughput: throughput(config)?,
            replace_throughput: config.get_bool(keys::REPLACE_THROUGHPUT)?.unwrap_or(false),
        })
    }
}

/// Read `database.name`.
pub(crate) fn database_id<C: ConfigSource + ?Sized>(config: &C) -> Result<DatabaseId, ConfigError> {
    DatabaseId::new(
        config.require_string(keys::DATABASE_NAME)?,
        keys::DATABASE_NAME,
    )
}

/// Read `database.endpoint` and `database.account_key`.
///
/// Both absent means the default client. Only one of them set is an error.
pub(crate) fn credentials<C: ConfigSource + ?Sized>(
    config: &C,
) -> Result<Option<Credentials>, ConfigError> {
    let endpoint = non_blank(config.get_string(keys::ENDPOINT)?);
    let account_key = non_blank(config.get_string(keys::ACCOUNT_KEY)?);

    match (endpoint, account_key) {
        (None, None) => Ok(None),
        (Some(endpoint), Some(account_key)) => {
            Credentials::new(&endpoint, account_key).map(Some)
        }
        (Some(_), None) => Err(ConfigError::missing(keys::ACCOUNT_KEY)),
        (None, Some(_)) => Err(ConfigError::missing(keys::ENDPOINT)),
    }
}

fn throughput<C: ConfigSource + ?Sized>(config: &C) -> Result<ThroughputSpec, ConfigError> {
    let units = config.require_int(keys::THROUGHPUT)?;
    let units = u32::try_from(units)
        .ok()
        .filter(|u| *u > 0)
        .ok_or_else(|| {
            ConfigError::invalid(
                keys::THROUGHPUT,
                format!("expected a positive integer, got {}", units),
            )
        })?;

    let mode = config.require_string(keys::THROUGHPUT_MODE)?;
    if mode.trim().is_empty() {
        return Err(ConfigError::invalid(
            keys::THROUGHPUT_MODE,
            "throughput mode must not be empty",
        ));
    }

    let spec = ThroughputSpec::new(ThroughputMode::from_setting(&mode), units)?;
    debug!(mode = %spec.mode(), units = spec.units(), "resolved database throughput");
    Ok(spec)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfig;

    fn base() -> MemoryConfig {
        MemoryConfig::new()
            .with(keys::THROUGHPUT, 4000)
            .with(keys::THROUGHPUT_MODE, "Autoscale")
    }

    #[test]
    fn test_resolve_defaults_replace_to_false() {
        let settings = Settings::resolve(&base()).unwrap();
        assert_eq!(settings.throughput, ThroughputSpec::autoscale(4000).unwrap());
        assert!(!settings.replace_throughput);
    }

    #[test]
    fn test_resolve_manual_mode_and_replace_flag() {
        let config = base()
            .with(keys::THROUGHPUT_MODE, "manual")
            .with(keys::REPLACE_THROUGHPUT, "true");

        let settings = Settings::resolve(&config).unwrap();
        assert_eq!(settings.throughput.mode(), ThroughputMode::Manual);
        assert!(settings.replace_throughput);
    }

    #[test]
    fn test_missing_units() {
        let mut config = base();
        config.remove(keys::THROUGHPUT);

        assert!(matches!(
            Settings::resolve(&config),
            Err(ConfigError::Missing { ref key }) if key == keys::THROUGHPUT
        ));
    }

    #[test]
    fn test_non_positive_units() {
        for bad in ["0", "-400", "99999999999"] {
            let config = base().with(keys::THROUGHPUT, bad);
            let err = Settings::resolve(&config).unwrap_err();
            assert_eq!(err.key(), Some(keys::THROUGHPUT), "value {}", bad);
        }
    }

    #[test]
    fn test_missing_or_blank_mode() {
        let mut config = base();
        config.remove(keys::THROUGHPUT_MODE);
        assert!(matches!(
            Settings::resolve(&config),
            Err(ConfigError::Missing { .. })
        ));

        let config = base().with(keys::THROUGHPUT_MODE, " ");
        assert!(matches!(
            Settings::resolve(&config),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_database_id_from_config() {
        let config = MemoryConfig::new().with(keys::DATABASE_NAME, "orders");
        assert_eq!(database_id(&config).unwrap().as_str(), "orders");

        let blank = MemoryConfig::new().with(keys::DATABASE_NAME, "");
        assert!(matches!(
            database_id(&blank),
            Err(ConfigError::InvalidValue { .. })
        ));

        assert!(matches!(
            database_id(&MemoryConfig::new()),
            Err(ConfigError::Missing { .. })
        ));
    }

    #[test]
    fn test_credentials_pairing() {
        assert_eq!(credentials(&MemoryConfig::new()).unwrap(), None);

        let both = MemoryConfig::new()
            .with(keys::ENDPOINT, "https://acct.example.com/")
            .with(keys::ACCOUNT_KEY, "key");
        assert!(credentials(&both).unwrap().is_some());

        let endpoint_only = MemoryConfig::new().with(keys::ENDPOINT, "https://acct.example.com/");
        assert!(matches!(
            credentials(&endpoint_only),
            Err(ConfigError::Missing { ref key }) if key == keys::ACCOUNT_KEY
        ));

        let key_only = MemoryConfig::new().with(keys::ACCOUNT_KEY, "key");
        assert!(credentials(&key_only).is_err());

        let bad_uri = MemoryConfig::new()
            .with(keys::ENDPOINT, "::nope::")
            .with(keys::ACCOUNT_KEY, "key");
        assert!(matches!(
            credentials(&bad_uri),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
