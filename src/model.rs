//! Value types passed between the ensurer, configuration and the store.

use std::fmt;

use url::Url;

use crate::config::ConfigError;

/// The name of a logical database. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseId(String);

impl DatabaseId {
    /// Validate and wrap a database name.
    ///
    /// `key` names where the value came from and is reported in the error.
    ///
    /// ```rust
    /// use database_setup::DatabaseId;
    ///
    /// assert_eq!(DatabaseId::new("orders", "name").unwrap().as_str(), "orders");
    /// assert!(DatabaseId::new("  ", "name").is_err());
    /// ```
    pub fn new(name: impl Into<String>, key: &str) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::invalid(key, "database name must not be empty"));
        }
        Ok(Self(name))
    }

    /// The database name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How provisioned throughput scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ThroughputMode {
    /// Elastic throughput; `units` is the ceiling.
    Autoscale,
    /// Fixed throughput of exactly `units`.
    Manual,
}

impl ThroughputMode {
    /// `"autoscale"` in any letter case selects [`Autoscale`](Self::Autoscale);
    /// every other string selects [`Manual`](Self::Manual).
    pub fn from_setting(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("autoscale") {
            Self::Autoscale
        } else {
            Self::Manual
        }
    }
}

impl fmt::Display for ThroughputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Autoscale => f.write_str("autoscale"),
            Self::Manual => f.write_str("manual"),
        }
    }
}

/// Target throughput for a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ThroughputSpec {
    mode: ThroughputMode,
    units: u32,
}

impl ThroughputSpec {
    /// Build a spec, rejecting zero units.
    pub fn new(mode: ThroughputMode, units: u32) -> Result<Self, ConfigError> {
        if units == 0 {
            return Err(ConfigError::invalid(
                crate::config::keys::THROUGHPUT,
                "throughput units must be positive",
            ));
        }
        Ok(Self { mode, units })
    }

    /// Autoscale throughput with `units` as the maximum.
    pub fn autoscale(units: u32) -> Result<Self, ConfigError> {
        Self::new(ThroughputMode::Autoscale, units)
    }

    /// Fixed throughput of `units`.
    pub fn manual(units: u32) -> Result<Self, ConfigError> {
        Self::new(ThroughputMode::Manual, units)
    }

    /// The scaling mode.
    pub fn mode(&self) -> ThroughputMode {
        self.mode
    }

    /// The unit count.
    pub fn units(&self) -> u32 {
        self.units
    }
}

impl fmt::Display for ThroughputSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} units", self.mode, self.units)
    }
}

/// A secret account key. Its value never appears in `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountKey(String);

impl AccountKey {
    /// The raw key, for handing to the store client.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccountKey(<redacted>)")
    }
}

/// Credentials for a dedicated client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    endpoint: Url,
    account_key: AccountKey,
}

impl Credentials {
    /// Validate an endpoint URI and a non-empty account key.
    pub fn new(endpoint: &str, account_key: impl Into<String>) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(endpoint.trim()).map_err(|e| {
            ConfigError::invalid(
                crate::config::keys::ENDPOINT,
                format!("not a valid URI: {}", e),
            )
        })?;
        let account_key = account_key.into();
        if account_key.trim().is_empty() {
            return Err(ConfigError::invalid(
                crate::config::keys::ACCOUNT_KEY,
                "account key must not be empty",
            ));
        }
        Ok(Self {
            endpoint,
            account_key: AccountKey(account_key),
        })
    }

    /// The account endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The account key.
    pub fn account_key(&self) -> &AccountKey {
        &self.account_key
    }
}
