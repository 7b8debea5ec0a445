#![forbid(unsafe_code)]

mod error;
mod format;
mod measure;

pub use error::Error;
pub use format::Format;
pub use measure::Measure;

use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of environment variables that override config values, with `__`
/// separating sections: `MTIME_FORMAT__PRECISION=3`.
pub const ENV_PREFIX: &str = "MTIME_";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub format: Format,
    pub measure: Measure,
}

impl Config {
    /// Built-in defaults, ignoring the environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `MTIME_*` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::figment().extract::<Self>()?.validate()
    }

    /// Defaults, then the TOML file at `path`, then `MTIME_*` environment
    /// variables, each layer overriding the one before.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::InvalidPath(path.to_owned()));
        }
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Self::env())
            .extract::<Self>()?
            .validate()
    }

    /// Render as a TOML document.
    pub fn to_toml(&self) -> Result<String, Error> {
        Ok(toml_edit::ser::to_string_pretty(self)?)
    }

    fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Self::env())
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }

    fn validate(self) -> Result<Self, Error> {
        if self.measure.runs == 0 {
            return Err(Error::InvalidValue {
                key: "measure.runs",
                reason: "must be at least 1".into(),
            });
        }
        if self.measure.pause.is_negative() {
            return Err(Error::InvalidValue {
                key: "measure.pause",
                reason: format!("{} is negative", self.measure.pause),
            });
        }
        Ok(self)
    }
}
