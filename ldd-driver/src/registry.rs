/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;

use anyhow::{Context, anyhow};
use foldhash::fast::FixedState;
use log::warn;
use yaml_rust::Yaml;

use super::LogDriver;

pub type DriverFactory = Box<dyn Fn() -> Box<dyn LogDriver> + Send + Sync>;

/// Named log driver factories, the host side of driver registration.
pub struct DriverRegistry {
    factories: HashMap<String, DriverFactory, FixedState>,
}

impl Default for DriverRegistry {
    fn default() -> Self {
        DriverRegistry::new()
    }
}

impl DriverRegistry {
    pub fn new() -> Self {
        DriverRegistry {
            factories: HashMap::with_hasher(FixedState::with_seed(0)),
        }
    }

    /// Add a driver factory under `key`, replacing any previous one.
    pub fn extend<F>(&mut self, key: &str, factory: F) -> anyhow::Result<()>
    where
        F: Fn() -> Box<dyn LogDriver> + Send + Sync + 'static,
    {
        if key.is_empty() {
            return Err(anyhow!("empty log driver name"));
        }
        if self
            .factories
            .insert(key.to_string(), Box::new(factory))
            .is_some()
        {
            warn!("log driver {key} registered again, the old one is replaced");
        }
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.factories.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        keys
    }

    /// A new, unconfigured driver instance.
    pub fn make(&self, key: &str) -> Option<Box<dyn LogDriver>> {
        self.factories.get(key).map(|f| f())
    }

    pub fn make_configured(&self, key: &str, config: &Yaml) -> anyhow::Result<Box<dyn LogDriver>> {
        let mut driver = self
            .make(key)
            .ok_or_else(|| anyhow!("no log driver {key} registered"))?;
        driver
            .set_config(config)
            .context(format!("failed to configure log driver {key}"))?;
        Ok(driver)
    }
}
