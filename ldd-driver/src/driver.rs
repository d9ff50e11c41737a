/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use log::debug;
use yaml_rust::Yaml;

use ldd_engine::{BoxTransport, Engine};
use ldd_types::level::{Level, LevelTable};
use ldd_types::meta::LogMeta;

use super::{ConfigOverrides, DriverConfig, LogDriver, SinkFactory, StdSinkFactory};

const CONSOLE_SINK_INDEX: usize = 0;

struct Configured {
    config: DriverConfig,
    engine: Engine,
}

/// The `logdna` driver.
///
/// It always logs to the console, and also ships to LogDNA when the
/// configured `env` is one of `allowEnv`. Nothing is logged before the
/// first successful [`LogDriver::set_config`] or [`LogDnaDriver::configure`].
pub struct LogDnaDriver {
    sinks: Box<dyn SinkFactory>,
    inner: Option<Configured>,
}

impl Default for LogDnaDriver {
    fn default() -> Self {
        LogDnaDriver::with_sink_factory(Box::new(StdSinkFactory))
    }
}

impl LogDnaDriver {
    pub fn with_sink_factory(sinks: Box<dyn SinkFactory>) -> Self {
        LogDnaDriver { sinks, inner: None }
    }

    /// The fixed syslog level table used to resolve ranks.
    pub fn levels(&self) -> LevelTable {
        LevelTable::SYSLOG
    }

    pub fn config(&self) -> Option<&DriverConfig> {
        self.inner.as_ref().map(|c| &c.config)
    }

    pub fn engine(&self) -> Option<&Engine> {
        self.inner.as_ref().map(|c| &c.engine)
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.engine()
            .map(|e| e.transports().iter().map(|t| t.name()).collect())
            .unwrap_or_default()
    }

    /// Rebuild the sinks from a merged config.
    ///
    /// On error the driver keeps its previous state.
    pub fn configure(&mut self, config: DriverConfig) -> anyhow::Result<()> {
        let mut transports: Vec<BoxTransport> = Vec::with_capacity(2);
        let console = self
            .sinks
            .console(&config)
            .context("failed to create console sink")?;
        transports.push(console);

        if config.remote_enabled() {
            let remote = self
                .sinks
                .remote(&config)
                .context("failed to create logdna sink")?;
            transports.push(remote);
        } else {
            debug!(
                "logdna sink disabled for env {}",
                config.env.as_deref().unwrap_or("<unset>")
            );
        }

        let mut engine = Engine::new(self.levels(), transports);
        engine.set_levels(self.levels());
        self.inner = Some(Configured { config, engine });
        Ok(())
    }
}

impl LogDriver for LogDnaDriver {
    fn set_config(&mut self, config: &Yaml) -> anyhow::Result<()> {
        let overrides =
            ConfigOverrides::parse_yaml(config).context("invalid logdna driver config")?;
        let config = DriverConfig::merge(&DriverConfig::default(), &overrides);
        self.configure(config)
    }

    fn level(&self) -> Option<Level> {
        self.engine()?
            .transport(CONSOLE_SINK_INDEX)
            .map(|t| t.level())
    }

    fn set_level(&mut self, level: Level) -> anyhow::Result<()> {
        let inner = self
            .inner
            .as_mut()
            .ok_or_else(|| anyhow!("logdna driver is not configured"))?;
        let console = inner
            .engine
            .transport_mut(CONSOLE_SINK_INDEX)
            .ok_or_else(|| anyhow!("no console sink found"))?;
        console.set_level(level);
        Ok(())
    }

    fn log(&self, level: u8, msg: &str, meta: Vec<LogMeta>) {
        let Some(engine) = self.engine() else {
            return;
        };
        let meta: Vec<LogMeta> = meta.into_iter().map(LogMeta::sanitize).collect();
        engine.log(self.levels().name_of(level), msg, &meta);
    }
}
