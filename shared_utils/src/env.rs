use std::{env::VarError, path::PathBuf};

use thiserror::Error;

/// Errors raised while reading process environment settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable required by the application is not set.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// The variable is set but does not hold valid unicode.
    #[error("Environment variable {0} is not valid unicode")]
    NotUnicode(String),

    /// The variable is set but blank after trimming.
    #[error("Environment variable {0} is empty")]
    Empty(String),
}

/// Reads an environment variable, returning a structured error if it's missing.
///
/// The value is trimmed; a blank value is reported as [`ConfigError::Empty`]
/// so callers never have to special-case `FOO=""`.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(v) if v.trim().is_empty() => Err(ConfigError::Empty(name.to_string())),
        Ok(v) => Ok(v.trim().to_string()),
        Err(VarError::NotPresent) => Err(ConfigError::MissingEnvVar(name.to_string())),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(name.to_string())),
    }
}

/// Like [`get_env_var`] but treats a missing or blank variable as "not configured".
pub fn get_optional_env_var(name: &str) -> Result<Option<String>, ConfigError> {
    match get_env_var(name) {
        Ok(v) => Ok(Some(v)),
        Err(ConfigError::MissingEnvVar(_)) | Err(ConfigError::Empty(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Reads a filesystem path from an environment variable.
pub fn get_env_path(name: &str) -> Result<PathBuf, ConfigError> {
    get_env_var(name).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test owns a distinct variable name so they can run in parallel.

    #[test]
    fn missing_variable_is_reported_by_name() {
        let err = get_env_var("SHARED_UTILS_TEST_DEFINITELY_UNSET").unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingEnvVar("SHARED_UTILS_TEST_DEFINITELY_UNSET".into())
        );
        assert!(err.to_string().contains("SHARED_UTILS_TEST_DEFINITELY_UNSET"));
    }

    #[test]
    fn optional_variable_absent_is_none() {
        assert_eq!(
            get_optional_env_var("SHARED_UTILS_TEST_OPTIONAL_UNSET").unwrap(),
            None
        );
    }

    #[test]
    fn value_is_trimmed_and_blank_is_empty() {
        // SAFETY: the variable names are unique to these tests.
        unsafe {
            std::env::set_var("SHARED_UTILS_TEST_TRIMMED", "  /tmp/impact.toml \n");
            std::env::set_var("SHARED_UTILS_TEST_BLANK", "   ");
        }
        assert_eq!(
            get_env_path("SHARED_UTILS_TEST_TRIMMED").unwrap(),
            PathBuf::from("/tmp/impact.toml")
        );
        assert_eq!(
            get_env_var("SHARED_UTILS_TEST_BLANK").unwrap_err(),
            ConfigError::Empty("SHARED_UTILS_TEST_BLANK".into())
        );
        assert_eq!(get_optional_env_var("SHARED_UTILS_TEST_BLANK").unwrap(), None);
    }
}
