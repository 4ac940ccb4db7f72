//! Environment-driven configuration helpers shared by every service binary.

use std::{
    env,
    error::Error,
    fmt::{self, Display},
    str::FromStr,
    time::Duration,
};

/// A configuration variable that is set but can't be used.
#[derive(Debug)]
pub struct ConfigErr {
    pub var: String,
    pub value: String,
    pub reason: String,
}

impl Display for ConfigErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid value {:?} for {}: {}",
            self.value, self.var, self.reason
        )
    }
}

impl Error for ConfigErr {}

/// Reads a string variable.
///
/// # Returns
/// The variable's value, or `default` if it's unset or empty.
pub fn var_or(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default.to_string(),
    }
}

/// Reads and parses a variable.
///
/// # Returns
/// The parsed value, `default` if it's unset, or a `ConfigErr` if it
/// doesn't parse.
pub fn parse_or<T>(name: &str, default: T) -> Result<T, ConfigErr>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            value.trim().parse().map_err(|e: T::Err| ConfigErr {
                var: name.to_string(),
                value: value.clone(),
                reason: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}

/// Reads a duration expressed in milliseconds.
pub fn millis_or(name: &str, default_ms: u64) -> Result<Duration, ConfigErr> {
    parse_or(name, default_ms).map(Duration::from_millis)
}
