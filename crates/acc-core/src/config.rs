//! Flat key/value configuration.
//!
//! Parameters are organised in named groups (`GravityModel`,
//! `accessibility`, …) of string-valued keys.  Typed configs in the other
//! crates pull values out with the `require_*` / `*_or` getters, which turn
//! missing or malformed values into [`AccError::Config`] before any
//! computation starts.
//!
//! # TOML form
//!
//! ```toml
//! [GravityModel]
//! zones = 4
//! partition = "symmetric"
//! betaDistance = -1.0
//! ```
//!
//! Every group must be a table of scalars; arrays of scalars are joined
//! with `,` and read back with [`ConfigGroup::list`].

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::{AccError, AccResult};

// ── ConfigGroup ───────────────────────────────────────────────────────────────

/// One named group of string parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigGroup {
    name:   String,
    params: BTreeMap<String, String>,
}

impl ConfigGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), params: BTreeMap::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set `key` to `value`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The raw value of `key`, or a configuration error naming the group.
    pub fn require(&self, key: &str) -> AccResult<&str> {
        self.get(key).ok_or_else(|| self.missing(key))
    }

    /// Parse `key` as `T`; missing keys yield `Ok(None)`.
    pub fn parse<T: FromStr>(&self, key: &str) -> AccResult<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
                AccError::Config(format!(
                    "param {key:?} in group {:?} has invalid value {raw:?}",
                    self.name
                ))
            }),
        }
    }

    /// Parse `key` as `T`; missing keys are a configuration error.
    pub fn require_parsed<T: FromStr>(&self, key: &str) -> AccResult<T> {
        match self.parse(key)? {
            Some(v) => Ok(v),
            None => Err(self.missing(key)),
        }
    }

    fn missing(&self, key: &str) -> AccError {
        AccError::Config(format!("param {key:?} in group {:?} is not defined", self.name))
    }

    /// Parse `key` as `T`, falling back to `default` when absent.
    pub fn parsed_or<T: FromStr>(&self, key: &str, default: T) -> AccResult<T> {
        Ok(self.parse(key)?.unwrap_or(default))
    }

    /// Comma-separated list value; absent keys give an empty list.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ── Config ────────────────────────────────────────────────────────────────────

/// A set of named [`ConfigGroup`]s.
#[derive(Clone, Debug, Default)]
pub struct Config {
    groups: BTreeMap<String, ConfigGroup>,
}

/// On-disk shape: `{ group: { key: scalar } }`.
#[derive(Deserialize)]
#[serde(transparent)]
struct RawConfig(BTreeMap<String, BTreeMap<String, toml::Value>>);

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a group.
    pub fn add_group(&mut self, group: ConfigGroup) {
        self.groups.insert(group.name.clone(), group);
    }

    pub fn group(&self, name: &str) -> Option<&ConfigGroup> {
        self.groups.get(name)
    }

    /// The named group, or a configuration error if it is missing.
    pub fn require_group(&self, name: &str) -> AccResult<&ConfigGroup> {
        self.group(name)
            .ok_or_else(|| AccError::Config(format!("config group {name:?} is not defined")))
    }

    /// Look up `key` in group `group`.
    pub fn find_param(&self, group: &str, key: &str) -> Option<&str> {
        self.group(group).and_then(|g| g.get(key))
    }

    pub fn groups(&self) -> impl Iterator<Item = &ConfigGroup> {
        self.groups.values()
    }

    /// Load groups from a TOML file.
    pub fn from_toml_file(path: &Path) -> AccResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Parse groups from TOML text.
    pub fn from_toml_str(text: &str) -> AccResult<Self> {
        let raw: RawConfig =
            toml::from_str(text).map_err(|e| AccError::Config(format!("invalid TOML: {e}")))?;

        let mut config = Config::new();
        for (name, entries) in raw.0 {
            let mut group = ConfigGroup::new(name.clone());
            for (key, value) in entries {
                group.set(key.clone(), scalar_to_string(&value).ok_or_else(|| {
                    AccError::Config(format!(
                        "param {key:?} in group {name:?} must be a scalar or a list of scalars"
                    ))
                })?);
            }
            config.add_group(group);
        }
        log::debug!("loaded {} config groups", config.groups.len());
        Ok(config)
    }
}

fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s)  => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f)   => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Array(items) => items
            .iter()
            .map(|v| match v {
                toml::Value::Array(_) | toml::Value::Table(_) => None,
                other => scalar_to_string(other),
            })
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(",")),
        toml::Value::Datetime(_) | toml::Value::Table(_) => None,
    }
}
