use std::{env, fmt::Display, str::FromStr};

/// Reads and parses the environment variable `name`.
///
/// * `Ok(None)` if the variable is not set, or is blank.
/// * `Err(msg)` if the value could not be parsed. The message is suitable for logging.
pub fn parse_env_var<T>(name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(s) if s.trim().is_empty() => Ok(None),
        Ok(s) => s.trim().parse::<T>().map(Some).map_err(|e| format!("Invalid value for {name} ({s}). {e}")),
        Err(_) => Ok(None),
    }
}
