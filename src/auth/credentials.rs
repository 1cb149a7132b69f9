//! Credential lookup implementation
//!
//! Precedence for each field: environment variable, then the profile, then
//! (password only) an interactive prompt when stdin is a terminal.

use std::env;
use std::fmt;
use std::io;

use crate::config::ProfileConfig;
use crate::constants::{api, env as env_constants};
use crate::errors::{ConfigError, ConfigResult};

/// Login credentials for one salt-api profile
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// External auth backend, e.g. `pam` or `ldap`
    pub eauth: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .field("eauth", &self.eauth)
            .finish()
    }
}

/// Resolve credentials from the process environment and the terminal
///
/// # Errors
///
/// Returns `ConfigError::MissingField` when no username or password can be
/// found anywhere.
pub fn resolve_credentials(profile_name: &str, profile: &ProfileConfig) -> ConfigResult<Credentials> {
    // a missing .env file is fine
    dotenv::dotenv().ok();

    resolve_credentials_with(
        profile_name,
        profile,
        |key| env::var(key).ok(),
        |prompt| {
            if atty::is(atty::Stream::Stdin) {
                rpassword::prompt_password(prompt).map(Some)
            } else {
                Ok(None)
            }
        },
    )
}

/// Resolve credentials with injectable environment and prompt sources
pub fn resolve_credentials_with<E, P>(
    profile_name: &str,
    profile: &ProfileConfig,
    lookup_env: E,
    prompt_password: P,
) -> ConfigResult<Credentials>
where
    E: Fn(&str) -> Option<String>,
    P: FnOnce(&str) -> io::Result<Option<String>>,
{
    let missing = |field: &str| ConfigError::MissingField {
        field: format!("{}.{}", profile_name, field),
    };

    let username = lookup_env(env_constants::USERNAME)
        .or_else(|| profile.username.clone())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| missing("username"))?;

    let password = match lookup_env(env_constants::PASSWORD).or_else(|| profile.password.clone()) {
        Some(password) => password,
        None => {
            tracing::debug!("No password configured for profile {}, prompting", profile_name);
            prompt_password(&format!("Password for {}: ", username))
                .map_err(|e| ConfigError::InvalidValue {
                    field: format!("{}.password", profile_name),
                    value: String::new(),
                    reason: e.to_string(),
                })?
                .ok_or_else(|| missing("password"))?
        }
    };

    let eauth = profile
        .auth
        .clone()
        .unwrap_or_else(|| api::DEFAULT_EAUTH.to_string());

    Ok(Credentials {
        username,
        password,
        eauth,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(username: Option<&str>, password: Option<&str>) -> ProfileConfig {
        ProfileConfig {
            url: "https://salt:8000".to_string(),
            username: username.map(str::to_string),
            password: password.map(str::to_string),
            auth: None,
        }
    }

    fn no_prompt(_: &str) -> io::Result<Option<String>> {
        panic!("prompt should not be used")
    }

    #[test]
    fn test_profile_values_used() {
        let creds =
            resolve_credentials_with("netapi", &profile(Some("salt"), Some("pw")), |_| None, no_prompt)
                .unwrap();
        assert_eq!(creds.username, "salt");
        assert_eq!(creds.password, "pw");
        assert_eq!(creds.eauth, "pam");
    }

    #[test]
    fn test_environment_overrides_profile() {
        let lookup = |key: &str| match key {
            "SALT_COURIER_USERNAME" => Some("ops".to_string()),
            "SALT_COURIER_PASSWORD" => Some("from-env".to_string()),
            _ => None,
        };
        let creds =
            resolve_credentials_with("netapi", &profile(Some("salt"), Some("pw")), lookup, no_prompt)
                .unwrap();
        assert_eq!(creds.username, "ops");
        assert_eq!(creds.password, "from-env");
    }

    #[test]
    fn test_prompt_when_password_missing() {
        let creds = resolve_credentials_with("netapi", &profile(Some("salt"), None), |_| None, |prompt| {
            assert_eq!(prompt, "Password for salt: ");
            Ok(Some("typed".to_string()))
        })
        .unwrap();
        assert_eq!(creds.password, "typed");
    }

    #[test]
    fn test_missing_fields() {
        let err = resolve_credentials_with("netapi", &profile(None, Some("pw")), |_| None, no_prompt)
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { ref field } if field == "netapi.username"));

        let err = resolve_credentials_with("netapi", &profile(Some("salt"), None), |_| None, |_| Ok(None))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { ref field } if field == "netapi.password"));
    }

    #[test]
    fn test_debug_hides_password() {
        let creds = Credentials {
            username: "salt".to_string(),
            password: "hunter2".to_string(),
            eauth: "pam".to_string(),
        };
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}
