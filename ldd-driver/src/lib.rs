/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use yaml_rust::Yaml;

pub use ldd_engine::{BoxTransport, Engine, Transport};
pub use ldd_types::level::{Level, LevelTable};
pub use ldd_types::log::{LogRecord, LogStats, LogStatsSnapshot};
pub use ldd_types::meta::{LogMeta, SysCallErrorMeta};

mod config;
pub use config::{ConfigOverrides, DriverConfig};

mod sink;
pub use sink::{SinkFactory, StdSinkFactory};

mod driver;
pub use driver::LogDnaDriver;

mod registry;
pub use registry::{DriverFactory, DriverRegistry};

mod provider;
pub use provider::{DRIVER_NAME, register};

mod bridge;
pub use bridge::DriverLogger;

/// What the host logging facade expects from a driver.
pub trait LogDriver: Send + Sync {
    /// Merge `config` over the driver defaults and (re)build the sinks.
    fn set_config(&mut self, config: &Yaml) -> anyhow::Result<()>;

    /// Current threshold of the console sink, `None` before configuration.
    fn level(&self) -> Option<Level>;

    /// Change the threshold of the console sink only.
    fn set_level(&mut self, level: Level) -> anyhow::Result<()>;

    /// Log `msg` at syslog rank `level` (0 = emerg .. 7 = debug).
    fn log(&self, level: u8, msg: &str, meta: Vec<LogMeta>);
}
