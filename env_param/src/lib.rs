//! Global tuning parameters that can be overridden through environment variables.
//!
//! An [`EnvParam`] holds the name of an environment variable and the textual representation of its default value.
//! It is meant for internal knobs (e.g. limits of a transformation) that do not deserve a command line option.
//!
//! ```
//! use env_param::EnvParam;
//! static MAX_DEPTH: EnvParam<u32> = EnvParam::new("MY_CRATE_MAX_DEPTH", "16");
//!
//! // environment variable not set, using the default value
//! assert_eq!(MAX_DEPTH.get(), 16);
//! ```
//!
//! The value is read once, on first access. Later changes to the environment are ignored.
//! [`EnvParam::set`] forces the value of a parameter that was not read yet.
//!
//! ```
//! use env_param::EnvParam;
//! static MAX_DEPTH: EnvParam<u32> = EnvParam::new("MY_CRATE_MAX_DEPTH", "16");
//!
//! MAX_DEPTH.set(4).unwrap();
//! assert_eq!(MAX_DEPTH.get(), 4);
//! // already initialized
//! assert!(MAX_DEPTH.set(8).is_err());
//! ```

use std::fmt::Display;
use std::str::FromStr;

use once_cell::sync::OnceCell;

pub struct EnvParam<T> {
    value: OnceCell<T>,
    env: &'static str,
    default: &'static str,
}

/// Error returned when attempting to set a parameter whose value was already fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyInitialized(pub &'static str);

impl Display for AlreadyInitialized {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parameter {} is already initialized", self.0)
    }
}

impl std::error::Error for AlreadyInitialized {}

impl<T> EnvParam<T> {
    /// Creates a parameter read from the environment variable `env`, or from `default` if the variable is not set.
    pub const fn new(env: &'static str, default: &'static str) -> EnvParam<T> {
        EnvParam {
            value: OnceCell::new(),
            env,
            default,
        }
    }

    /// Name of the environment variable backing this parameter.
    pub fn name(&self) -> &'static str {
        self.env
    }
}

impl<T: FromStr> EnvParam<T> {
    fn parse_default(&self) -> T {
        match T::from_str(self.default) {
            Ok(v) => v,
            Err(_) => panic!("[env_param] {}: invalid default value \"{}\"", self.env, self.default),
        }
    }

    fn read(&self) -> T {
        match std::env::var(self.env) {
            Ok(param) => match T::from_str(&param) {
                Ok(value) => {
                    tracing::debug!(param = self.env, value = %param, "parameter read from environment");
                    value
                }
                Err(_) => {
                    tracing::warn!(
                        "could not parse value \"{}\" of {}, using default \"{}\"",
                        param,
                        self.env,
                        self.default
                    );
                    self.parse_default()
                }
            },
            Err(std::env::VarError::NotPresent) => self.parse_default(),
            Err(err) => {
                tracing::warn!("{}: {}, using default \"{}\"", self.env, err, self.default);
                self.parse_default()
            }
        }
    }

    /// Returns the value of the parameter, reading it from the environment on first access.
    ///
    /// # Panic
    /// Panics if the default value cannot be parsed.
    pub fn get(&self) -> T
    where
        T: Copy,
    {
        *self.get_ref()
    }

    /// Same as [`EnvParam::get`] but returns a reference, for parameters that are not `Copy`.
    pub fn get_ref(&self) -> &T {
        self.value.get_or_init(|| self.read())
    }

    /// Fixes the value of the parameter, unless it was already set or read.
    pub fn set(&self, value: T) -> Result<(), AlreadyInitialized> {
        self.value.set(value).map_err(|_| AlreadyInitialized(self.env))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    static UNSET: EnvParam<usize> = EnvParam::new("ENV_PARAM_TEST_NEVER_SET", "42");
    static FORCED: EnvParam<usize> = EnvParam::new("ENV_PARAM_TEST_FORCED", "1");

    #[test]
    fn default_value() {
        assert_eq!(UNSET.get(), 42);
        assert_eq!(UNSET.name(), "ENV_PARAM_TEST_NEVER_SET");
    }

    #[test]
    fn set_before_read() {
        assert!(FORCED.set(7).is_ok());
        assert_eq!(FORCED.get(), 7);
        assert_eq!(FORCED.set(8), Err(AlreadyInitialized("ENV_PARAM_TEST_FORCED")));
        assert_eq!(FORCED.get(), 7);
    }

    #[test]
    #[should_panic]
    fn invalid_default() {
        let param: EnvParam<usize> = EnvParam::new("ENV_PARAM_TEST_INVALID_DEFAULT", "many");
        param.get();
    }
}
