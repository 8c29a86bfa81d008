//! Runtime configuration for the interview transports.
//!
//! Configuration is assembled from [`PartialConfig`] layers. Each layer only
//! sets the values it knows about; [`PartialConfig::with_fallback`] merges a
//! layer over a less specific one, and [`build`] fills in defaults and
//! validates the result.

mod error;
mod parse;

use serde::{Deserialize, Serialize};
use tracing::trace;
use url::Url;

pub use error::Error;
use error::Result;
pub use parse::{
    CONFIG_FILE_ENV_VAR, DEFAULT_CONFIG_FILE, config_file, load_envs, load_envs_from, load_partial,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";
pub const DEFAULT_LANGUAGE_CODE: &str = "en";

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Base URL of the interview API, e.g. `https://example.com/api/v1`.
    ///
    /// The speech socket URL is derived from it.
    pub base_url: String,

    /// Ask the speech backend to synthesize the answer as audio.
    pub tts_enabled: bool,

    /// Language of the user's recordings.
    pub language_code: String,

    /// Treat a speech socket that closes without the completion sentinel as
    /// a failure.
    pub strict_close: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            tts_enabled: true,
            language_code: DEFAULT_LANGUAGE_CODE.to_owned(),
            strict_close: false,
        }
    }
}

/// A configuration layer. Unset fields defer to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tts_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_close: Option<bool>,
}

impl PartialConfig {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The default values, as a layer.
    #[must_use]
    pub fn default_values() -> Self {
        let Config {
            base_url,
            tts_enabled,
            language_code,
            strict_close,
        } = Config::default();

        Self {
            base_url: Some(base_url),
            tts_enabled: Some(tts_enabled),
            language_code: Some(language_code),
            strict_close: Some(strict_close),
        }
    }

    /// Merge `self` over `fallback`: values set in `self` win.
    #[must_use]
    pub fn with_fallback(self, fallback: Self) -> Self {
        Self {
            base_url: self.base_url.or(fallback.base_url),
            tts_enabled: self.tts_enabled.or(fallback.tts_enabled),
            language_code: self.language_code.or(fallback.language_code),
            strict_close: self.strict_close.or(fallback.strict_close),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::empty()
    }
}

/// Build the final configuration from a (merged) partial configuration.
///
/// Unset values take their defaults. The base URL must be an absolute
/// `http` or `https` URL.
pub fn build(partial: PartialConfig) -> Result<Config> {
    trace!(?partial, "Building configuration.");

    let defaults = Config::default();
    let config = Config {
        base_url: partial.base_url.unwrap_or(defaults.base_url),
        tts_enabled: partial.tts_enabled.unwrap_or(defaults.tts_enabled),
        language_code: partial.language_code.unwrap_or(defaults.language_code),
        strict_close: partial.strict_close.unwrap_or(defaults.strict_close),
    };

    validate_base_url(&config.base_url)?;

    if config.language_code.trim().is_empty() {
        return Err(Error::InvalidValue {
            key: "language_code",
            value: config.language_code,
            reason: "must not be empty".to_owned(),
        });
    }

    Ok(config)
}

fn validate_base_url(value: &str) -> Result<()> {
    let invalid = |reason: String| Error::InvalidValue {
        key: "base_url",
        value: value.to_owned(),
        reason,
    };

    let url = Url::parse(value).map_err(|error| invalid(error.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(format!(
            "unsupported scheme `{scheme}`, expected `http` or `https`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_empty_partial_builds_defaults() {
        assert_eq!(build(PartialConfig::empty()).unwrap(), Config::default());
        assert_eq!(
            build(PartialConfig::default_values()).unwrap(),
            Config::default()
        );
    }

    #[test]
    fn test_specific_layer_wins() {
        let file = PartialConfig {
            base_url: Some("https://file.example/api/v1".to_owned()),
            tts_enabled: Some(false),
            ..Default::default()
        };
        let env = PartialConfig {
            base_url: Some("https://env.example/api/v1".to_owned()),
            ..Default::default()
        };

        let config = build(env.with_fallback(file)).unwrap();

        assert_eq!(config, Config {
            base_url: "https://env.example/api/v1".to_owned(),
            tts_enabled: false,
            language_code: "en".to_owned(),
            strict_close: false,
        });
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let partial = PartialConfig {
            base_url: Some("not a url".to_owned()),
            ..Default::default()
        };

        assert_matches!(
            build(partial),
            Err(Error::InvalidValue { key: "base_url", .. })
        );

        let partial = PartialConfig {
            base_url: Some("ftp://example.com".to_owned()),
            ..Default::default()
        };

        assert_matches!(
            build(partial),
            Err(Error::InvalidValue { key: "base_url", reason, .. }) if reason.contains("ftp")
        );
    }

    #[test]
    fn test_blank_language_is_rejected() {
        let partial = PartialConfig {
            language_code: Some("  ".to_owned()),
            ..Default::default()
        };

        assert_matches!(
            build(partial),
            Err(Error::InvalidValue {
                key: "language_code",
                ..
            })
        );
    }

    #[test]
    fn test_is_empty() {
        assert!(PartialConfig::empty().is_empty());
        assert!(!PartialConfig::default_values().is_empty());
    }
}
