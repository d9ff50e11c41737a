/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use anyhow::{Context, anyhow};
use chrono::Local;
use yaml_rust::{Yaml, yaml};

use ldd_types::level::Level;

const DEFAULT_APP_NAME: &str = "adonis-app";
const DEFAULT_ALLOW_ENV: &str = "production";

#[derive(Clone, Debug, PartialEq)]
pub struct DriverConfig {
    pub name: String,
    pub level: Level,
    pub index_meta: bool,
    pub timestamp: String,
    pub allow_env: Vec<String>,
    pub env: Option<String>,
    /// Keys unknown to the driver, handed over to the remote sink as is.
    pub pass_through: yaml::Hash,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            name: DEFAULT_APP_NAME.to_string(),
            level: Level::Info,
            index_meta: true,
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            allow_env: vec![DEFAULT_ALLOW_ENV.to_string()],
            env: None,
            pass_through: yaml::Hash::new(),
        }
    }
}

impl DriverConfig {
    /// Apply `overrides` on top of `defaults`, leaving both untouched.
    pub fn merge(defaults: &DriverConfig, overrides: &ConfigOverrides) -> DriverConfig {
        let mut pass_through = defaults.pass_through.clone();
        for (k, v) in overrides.pass_through.iter() {
            pass_through.insert(k.clone(), v.clone());
        }

        DriverConfig {
            name: overrides.name.clone().unwrap_or_else(|| defaults.name.clone()),
            level: overrides.level.unwrap_or(defaults.level),
            index_meta: overrides.index_meta.unwrap_or(defaults.index_meta),
            timestamp: overrides
                .timestamp
                .clone()
                .unwrap_or_else(|| defaults.timestamp.clone()),
            allow_env: overrides
                .allow_env
                .clone()
                .unwrap_or_else(|| defaults.allow_env.clone()),
            env: overrides.env.clone().or_else(|| defaults.env.clone()),
            pass_through,
        }
    }

    pub fn remote_enabled(&self) -> bool {
        self.env
            .as_ref()
            .is_some_and(|env| self.allow_env.contains(env))
    }

    pub fn pass_through_yaml(&self) -> Yaml {
        Yaml::Hash(self.pass_through.clone())
    }
}

/// A partial driver config, as given by the host.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigOverrides {
    pub name: Option<String>,
    pub level: Option<Level>,
    pub index_meta: Option<bool>,
    pub timestamp: Option<String>,
    pub allow_env: Option<Vec<String>>,
    pub env: Option<String>,
    pub pass_through: yaml::Hash,
}

impl ConfigOverrides {
    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        let mut overrides = ConfigOverrides::default();
        match v {
            Yaml::Null => Ok(overrides),
            Yaml::Hash(map) => {
                ldd_yaml::foreach_kv(map, |k, v| match ldd_yaml::key::normalize(k).as_str() {
                    "name" => {
                        overrides.name = Some(ldd_yaml::value::as_string(v)?);
                        Ok(())
                    }
                    "level" => {
                        let s = ldd_yaml::value::as_string(v)?;
                        overrides.level = Some(Level::from_str(&s)?);
                        Ok(())
                    }
                    "index_meta" => {
                        overrides.index_meta = Some(ldd_yaml::value::as_bool(v)?);
                        Ok(())
                    }
                    "timestamp" => {
                        overrides.timestamp = Some(ldd_yaml::value::as_string(v)?);
                        Ok(())
                    }
                    "allowenv" | "allow_env" => {
                        let list = ldd_yaml::value::as_string_seq(v)
                            .context(format!("invalid environment list value for key {k}"))?;
                        overrides.allow_env = Some(list);
                        Ok(())
                    }
                    "env" => {
                        overrides.env = Some(ldd_yaml::value::as_string(v)?);
                        Ok(())
                    }
                    _ => {
                        overrides
                            .pass_through
                            .insert(Yaml::String(k.to_string()), v.clone());
                        Ok(())
                    }
                })?;
                Ok(overrides)
            }
            _ => Err(anyhow!("yaml value type for driver config should be 'map'")),
        }
    }
}
