//! Retry and greylist configuration.
//!
//! Both configuration types are plain values: build them with the fallible
//! builders, deserialize them (durations use humantime strings such as
//! `"500ms"`), or start from one of the presets.

use std::time::Duration;

use fabric_sdk_types::RetryableCodes;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::error::{ConfigSnafu, Result};

/// Default number of retries.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Default backoff before the first retry.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(500);

/// Default upper bound for a single backoff.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Default multiplicative backoff growth.
pub const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;

/// Default time a failed peer stays greylisted.
pub const DEFAULT_GREYLIST_EXPIRY: Duration = Duration::from_secs(10);

/// Retry options.
///
/// # Validation Rules
///
/// - `initial_backoff` must be > 0
/// - `initial_backoff` must be <= `max_backoff`
/// - `backoff_factor` must be finite and >= 1.0
///
/// An empty `retryable_codes` table is replaced by
/// [`RetryableCodes::sdk_default`] when the policy is constructed.
///
/// # Example
///
/// ```
/// # use std::time::Duration;
/// # use fabric_sdk::RetryOpts;
/// let opts = RetryOpts::builder()
///     .attempts(5)
///     .initial_backoff(Duration::from_millis(250))
///     .max_backoff(Duration::from_secs(5))
///     .build()
///     .expect("valid retry options");
/// assert_eq!(opts.attempts, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RetryOpts {
    /// Maximum number of retries, not counting the initial attempt.
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Backoff before the first retry.
    #[serde(default = "default_initial_backoff", with = "humantime_serde")]
    #[schemars(with = "String")]
    pub initial_backoff: Duration,

    /// Upper bound for a single backoff.
    #[serde(default = "default_max_backoff", with = "humantime_serde")]
    #[schemars(with = "String")]
    pub max_backoff: Duration,

    /// Multiplicative growth of the backoff per retry.
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// `(group, code)` pairs considered transient.
    #[serde(default)]
    pub retryable_codes: RetryableCodes,
}

#[bon::bon]
impl RetryOpts {
    /// Creates validated retry options.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Config`](crate::SdkError::Config) if any value
    /// violates the validation rules.
    #[builder]
    pub fn new(
        #[builder(default = DEFAULT_ATTEMPTS)] attempts: u32,
        #[builder(default = DEFAULT_INITIAL_BACKOFF)] initial_backoff: Duration,
        #[builder(default = DEFAULT_MAX_BACKOFF)] max_backoff: Duration,
        #[builder(default = DEFAULT_BACKOFF_FACTOR)] backoff_factor: f64,
        #[builder(default = RetryableCodes::sdk_default())] retryable_codes: RetryableCodes,
    ) -> Result<Self> {
        let opts = Self { attempts, initial_backoff, max_backoff, backoff_factor, retryable_codes };
        opts.validate()?;
        Ok(opts)
    }
}

impl RetryOpts {
    /// Options for channel clients: five retries capped at five seconds,
    /// with the [`RetryableCodes::channel_client`] table.
    #[must_use]
    pub fn channel_client() -> Self {
        Self {
            attempts: 5,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: Duration::from_secs(5),
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            retryable_codes: RetryableCodes::channel_client(),
        }
    }

    /// Options for resource management clients.
    #[must_use]
    pub fn resource_management() -> Self {
        Self {
            attempts: 5,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(5),
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            retryable_codes: RetryableCodes::resource_management(),
        }
    }

    /// Options that never retry.
    #[must_use]
    pub fn no_retry() -> Self {
        Self { attempts: 0, ..Self::default() }
    }

    /// Fills unset values from the defaults.
    ///
    /// Zero durations, a zero backoff factor and an empty code table are
    /// replaced. `attempts` is kept as is since zero means "never retry".
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        if self.initial_backoff.is_zero() {
            self.initial_backoff = DEFAULT_INITIAL_BACKOFF;
        }
        if self.max_backoff.is_zero() {
            self.max_backoff = DEFAULT_MAX_BACKOFF;
        }
        if self.backoff_factor == 0.0 {
            self.backoff_factor = DEFAULT_BACKOFF_FACTOR;
        }
        if self.retryable_codes.is_empty() {
            self.retryable_codes = RetryableCodes::sdk_default();
        }
        self
    }

    /// Validates the option values.
    ///
    /// Call after deserialization to ensure values are within valid ranges.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Config`](crate::SdkError::Config) if any value is
    /// out of range.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.initial_backoff.is_zero(),
            ConfigSnafu { message: "initial_backoff must be > 0" }
        );
        ensure!(
            self.initial_backoff <= self.max_backoff,
            ConfigSnafu {
                message: format!(
                    "initial_backoff ({:?}) must not exceed max_backoff ({:?})",
                    self.initial_backoff, self.max_backoff
                )
            }
        );
        ensure!(
            self.backoff_factor.is_finite() && self.backoff_factor >= 1.0,
            ConfigSnafu {
                message: format!("backoff_factor must be >= 1.0, got {}", self.backoff_factor)
            }
        );
        Ok(())
    }
}

impl Default for RetryOpts {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            retryable_codes: RetryableCodes::sdk_default(),
        }
    }
}

fn default_attempts() -> u32 {
    DEFAULT_ATTEMPTS
}

fn default_initial_backoff() -> Duration {
    DEFAULT_INITIAL_BACKOFF
}

fn default_max_backoff() -> Duration {
    DEFAULT_MAX_BACKOFF
}

fn default_backoff_factor() -> f64 {
    DEFAULT_BACKOFF_FACTOR
}

/// Greylist configuration.
///
/// # Validation Rules
///
/// - `expiry` must be > 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GreylistConfig {
    /// How long a peer stays excluded after a connection failure.
    #[serde(default = "default_greylist_expiry", with = "humantime_serde")]
    #[schemars(with = "String")]
    pub expiry: Duration,
}

#[bon::bon]
impl GreylistConfig {
    /// Creates a validated greylist configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Config`](crate::SdkError::Config) if `expiry` is zero.
    #[builder]
    pub fn new(#[builder(default = DEFAULT_GREYLIST_EXPIRY)] expiry: Duration) -> Result<Self> {
        let config = Self { expiry };
        config.validate()?;
        Ok(config)
    }
}

impl GreylistConfig {
    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Config`](crate::SdkError::Config) if `expiry` is zero.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.expiry.is_zero(), ConfigSnafu { message: "greylist expiry must be > 0" });
        Ok(())
    }
}

impl Default for GreylistConfig {
    fn default() -> Self {
        Self { expiry: DEFAULT_GREYLIST_EXPIRY }
    }
}

fn default_greylist_expiry() -> Duration {
    DEFAULT_GREYLIST_EXPIRY
}

/// Duration serialization using humantime format.
mod humantime_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use fabric_sdk_types::{ClientCode, Group};

    use super::*;

    #[test]
    fn test_retry_opts_builder_defaults() {
        let opts = RetryOpts::builder().build().expect("defaults should be valid");
        assert_eq!(opts.attempts, 3);
        assert_eq!(opts.initial_backoff, Duration::from_millis(500));
        assert_eq!(opts.max_backoff, Duration::from_secs(60));
        assert_eq!(opts.backoff_factor, 2.0);
        assert_eq!(opts.retryable_codes, RetryableCodes::sdk_default());
        assert_eq!(opts, RetryOpts::default());
    }

    #[test]
    fn test_retry_opts_builder_explicit_codes() {
        let opts = RetryOpts::builder()
            .retryable_codes(RetryableCodes::test())
            .build()
            .expect("valid retry options");
        assert_eq!(opts.retryable_codes, RetryableCodes::test());
    }

    #[test]
    fn test_retry_opts_rejects_factor_below_one() {
        let result = RetryOpts::builder().backoff_factor(0.5).build();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("backoff_factor"));

        assert!(RetryOpts::builder().backoff_factor(f64::NAN).build().is_err());
        assert!(RetryOpts::builder().backoff_factor(1.0).build().is_ok());
    }

    #[test]
    fn test_retry_opts_rejects_inverted_bounds() {
        let result = RetryOpts::builder()
            .initial_backoff(Duration::from_secs(10))
            .max_backoff(Duration::from_secs(1))
            .build();
        assert!(result.unwrap_err().to_string().contains("max_backoff"));
    }

    #[test]
    fn test_retry_opts_rejects_zero_initial_backoff() {
        let result = RetryOpts::builder().initial_backoff(Duration::ZERO).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_channel_client_preset() {
        let opts = RetryOpts::channel_client();
        assert_eq!(opts.attempts, 5);
        assert_eq!(opts.max_backoff, Duration::from_secs(5));
        assert!(
            opts.retryable_codes
                .contains(Group::EndorserClient, ClientCode::ConnectionFailed.as_code())
        );
        opts.validate().expect("preset should be valid");
        RetryOpts::resource_management().validate().expect("preset should be valid");
    }

    #[test]
    fn test_with_defaults_fills_zero_values() {
        let opts = RetryOpts {
            attempts: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            backoff_factor: 0.0,
            retryable_codes: RetryableCodes::new(),
        }
        .with_defaults();

        assert_eq!(opts.attempts, 0);
        assert_eq!(opts.initial_backoff, DEFAULT_INITIAL_BACKOFF);
        assert_eq!(opts.max_backoff, DEFAULT_MAX_BACKOFF);
        assert_eq!(opts.backoff_factor, DEFAULT_BACKOFF_FACTOR);
        assert_eq!(opts.retryable_codes, RetryableCodes::sdk_default());
    }

    #[test]
    fn test_retry_opts_deserialize_humantime() {
        let opts: RetryOpts = serde_json::from_str(
            r#"{
                "attempts": 4,
                "initial_backoff": "250ms",
                "max_backoff": "3s",
                "retryable_codes": {"test": [12]}
            }"#,
        )
        .expect("valid json");

        assert_eq!(opts.attempts, 4);
        assert_eq!(opts.initial_backoff, Duration::from_millis(250));
        assert_eq!(opts.max_backoff, Duration::from_secs(3));
        assert_eq!(opts.backoff_factor, DEFAULT_BACKOFF_FACTOR);
        assert!(opts.retryable_codes.contains(Group::Test, 12));
        opts.validate().expect("deserialized opts should be valid");
    }

    #[test]
    fn test_retry_opts_serialize_round_trip() {
        let opts = RetryOpts::channel_client();
        let json = serde_json::to_string(&opts).expect("serialize");
        assert!(json.contains("\"500ms\""));
        let back: RetryOpts = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, opts);
    }

    #[test]
    fn test_greylist_config() {
        let config = GreylistConfig::builder().build().expect("defaults should be valid");
        assert_eq!(config.expiry, Duration::from_secs(10));
        assert_eq!(config, GreylistConfig::default());

        assert!(GreylistConfig::builder().expiry(Duration::ZERO).build().is_err());

        let config: GreylistConfig =
            serde_json::from_str(r#"{"expiry": "2m"}"#).expect("valid json");
        assert_eq!(config.expiry, Duration::from_secs(120));
    }
}
