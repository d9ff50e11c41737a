/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use ldd_engine::BoxTransport;
use ldd_logdna::{LogDnaClientConfig, LogDnaTransport};
use ldd_stdlog::ConsoleTransport;
use ldd_types::log::AsyncLogConfig;

use super::DriverConfig;

const CONSOLE_THREAD_NAME: &str = "log-console";
const LOGDNA_THREAD_NAME: &str = "log-logdna";

/// Builds the sinks of a driver from its merged config.
pub trait SinkFactory: Send + Sync {
    fn console(&self, config: &DriverConfig) -> anyhow::Result<BoxTransport>;
    fn remote(&self, config: &DriverConfig) -> anyhow::Result<BoxTransport>;
}

/// Stdout console sink and the LogDNA ingest sink.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdSinkFactory;

impl SinkFactory for StdSinkFactory {
    fn console(&self, config: &DriverConfig) -> anyhow::Result<BoxTransport> {
        let async_conf = AsyncLogConfig::with_name(CONSOLE_THREAD_NAME);
        let transport = ConsoleTransport::new(&async_conf, config.level, true);
        Ok(Box::new(transport))
    }

    fn remote(&self, config: &DriverConfig) -> anyhow::Result<BoxTransport> {
        let mut client_config =
            LogDnaClientConfig::parse_yaml(&config.pass_through_yaml(), &config.name)?;
        client_config.set_env(config.env.clone());
        client_config.set_level(config.level);
        client_config.set_index_meta(config.index_meta);
        let transport = LogDnaTransport::new(Arc::new(client_config), LOGDNA_THREAD_NAME)?;
        Ok(Box::new(transport))
    }
}
