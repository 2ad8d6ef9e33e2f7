//! Space-Track account credentials.
//!
//! Credentials are read from the environment, optionally seeded from a
//! `.env` file, never from the configuration file. The password is kept in
//! a [`SecretString`].

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::error::ConfigError;

/// Environment variable holding the Space-Track account name.
pub const USERNAME_VAR: &str = "SPACE_TRACK_USERNAME";

/// Environment variable holding the Space-Track password.
pub const PASSWORD_VAR: &str = "SPACE_TRACK_PASSWORD";

/// Login identity for the catalog service.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    /// Creates credentials from an account name and password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::new(password.into().into_boxed_str()),
        }
    }

    /// Loads credentials from `SPACE_TRACK_USERNAME` / `SPACE_TRACK_PASSWORD`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] if either variable is
    /// unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads credentials through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] if either value is
    /// missing or empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fetch = |variable: &'static str| {
            lookup(variable)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingCredential { variable })
        };

        let username = fetch(USERNAME_VAR)?;
        let password = fetch(PASSWORD_VAR)?;
        Ok(Self::new(username, password))
    }

    /// Loads credentials from the environment, falling back to the
    /// variables defined in `path`.
    ///
    /// Process environment values take precedence over the file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EnvFileError`] if the file cannot be read or
    /// parsed, and [`ConfigError::MissingCredential`] if a value is missing
    /// from both sources.
    pub fn from_env_file(path: &Path) -> Result<Self, ConfigError> {
        let file = read_env_file(path)?;
        debug!(path = %path.display(), "Loaded environment file");
        Self::from_lookup(|name| std::env::var(name).ok().or_else(|| file.get(name).cloned()))
    }

    /// Returns the account name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password. Callers must not log the value.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Loads `.env` from the working directory or its parents into the
/// process environment, without overriding variables already set.
///
/// Returns the path of the file that was loaded. A missing file is not an
/// error; an unreadable one is logged and skipped.
pub fn load_dotenv() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            debug!(path = %path.display(), "Loaded environment file");
            Some(path)
        }
        Err(e) if e.not_found() => None,
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable .env file");
            None
        }
    }
}

/// Reads the variables defined in an environment file.
fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let env_file_error = |e: dotenvy::Error| ConfigError::EnvFileError {
        path: path.to_path_buf(),
        message: match e {
            dotenvy::Error::LineParse(_, index) => format!("syntax error at character {index}"),
            other => other.to_string(),
        },
    };

    dotenvy::from_path_iter(path)
        .map_err(env_file_error)?
        .map(|entry| entry.map_err(env_file_error))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let owned: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| {
            owned
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn loads_both_values() {
        let creds = Credentials::from_lookup(lookup_from(&[
            (USERNAME_VAR, "observer"),
            (PASSWORD_VAR, "hunter2"),
        ]))
        .unwrap();
        assert_eq!(creds.username(), "observer");
        assert_eq!(creds.password(), "hunter2");
    }

    #[test]
    fn missing_password_is_rejected() {
        let err = Credentials::from_lookup(lookup_from(&[(USERNAME_VAR, "observer")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingCredential {
                variable: PASSWORD_VAR
            }
        ));
    }

    #[test]
    fn empty_username_counts_as_missing() {
        let err = Credentials::from_lookup(lookup_from(&[
            (USERNAME_VAR, "  "),
            (PASSWORD_VAR, "hunter2"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingCredential {
                variable: USERNAME_VAR
            }
        ));
    }

    #[test]
    fn debug_redacts_password() {
        let creds = Credentials::new("observer", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("observer"));
        assert!(!rendered.contains("hunter2"));
    }

    fn env_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn reads_credentials_from_env_file() {
        let file = env_file(
            "# Space-Track account\nSPACE_TRACK_USERNAME=observer\nSPACE_TRACK_PASSWORD=\"hunter 2\"\n",
        );

        let values = read_env_file(file.path()).unwrap();
        let creds = Credentials::from_lookup(|name| values.get(name).cloned()).unwrap();
        assert_eq!(creds.username(), "observer");
        assert_eq!(creds.password(), "hunter 2");
    }

    #[test]
    fn env_file_without_password_is_rejected() {
        let file = env_file("SPACE_TRACK_USERNAME=observer\n");

        let values = read_env_file(file.path()).unwrap();
        let err = Credentials::from_lookup(|name| values.get(name).cloned()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingCredential {
                variable: PASSWORD_VAR
            }
        ));
    }

    #[test]
    fn missing_env_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Credentials::from_env_file(&dir.path().join(".env")).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFileError { .. }));
    }

    #[test]
    fn malformed_env_file_does_not_echo_values() {
        let file = env_file("SPACE_TRACK_PASSWORD='hunter2\n");

        let err = read_env_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFileError { .. }));
        assert!(!err.to_string().contains("hunter2"));
    }
}
