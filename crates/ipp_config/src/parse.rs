use std::{
    env, fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, trace};

use crate::{
    PartialConfig,
    error::{Error, Result},
};

/// Environment variable naming the configuration file.
pub const CONFIG_FILE_ENV_VAR: &str = "IPP_CONFIG_FILE";

/// File loaded from the working directory when no file is named.
pub const DEFAULT_CONFIG_FILE: &str = "ipp.toml";

const BASE_URL_ENV_VAR: &str = "IPP_BASE_URL";
const LANGUAGE_CODE_ENV_VAR: &str = "IPP_LANGUAGE_CODE";
const TTS_ENABLED_ENV_VAR: &str = "IPP_TTS_ENABLED";
const STRICT_CLOSE_ENV_VAR: &str = "IPP_STRICT_CLOSE";

/// Resolve which configuration file to load, and whether it must exist.
///
/// An explicit path wins, then `$IPP_CONFIG_FILE`. Both must exist. Without
/// either, `ipp.toml` in the working directory is used if present.
#[must_use]
pub fn config_file(explicit: Option<&Path>) -> (PathBuf, bool) {
    if let Some(path) = explicit {
        return (path.to_path_buf(), true);
    }

    match env::var_os(CONFIG_FILE_ENV_VAR) {
        Some(path) if !path.is_empty() => (PathBuf::from(path), true),
        _ => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    }
}

/// Load a partial configuration from the TOML file at `path`.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_partial(path: &Path) -> Result<Option<PartialConfig>> {
    if !path.is_file() {
        debug!(path = %path.display(), "No configuration file found.");
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let partial = toml::from_str(&contents).map_err(|source| Error::Toml {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), "Loaded configuration file.");
    Ok(Some(partial))
}

/// Load environment variables into a partial configuration, over `base`.
pub fn load_envs(base: PartialConfig) -> Result<PartialConfig> {
    load_envs_from(base, |key| env::var(key).ok())
}

/// Like [`load_envs`], reading variables through `lookup`.
pub fn load_envs_from(
    base: PartialConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<PartialConfig> {
    trace!("Loading environment variable configuration.");

    let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    let partial = PartialConfig {
        base_url: var(BASE_URL_ENV_VAR),
        language_code: var(LANGUAGE_CODE_ENV_VAR),
        tts_enabled: var(TTS_ENABLED_ENV_VAR)
            .map(|value| parse_bool("tts_enabled", &value))
            .transpose()?,
        strict_close: var(STRICT_CLOSE_ENV_VAR)
            .map(|value| parse_bool("strict_close", &value))
            .transpose()?,
    };

    Ok(partial.with_fallback(base))
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidValue {
            key,
            value: value.to_owned(),
            reason: "expected a boolean".to_owned(),
        }),
    }
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
