/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use log::{LevelFilter, Metadata, Record, SetLoggerError};
use serde_json::json;

use ldd_types::level::Level;
use ldd_types::meta::LogMeta;

use super::LogDriver;

// records from the sinks themselves are never fed back
const SELF_TARGET_PREFIX: &str = "ldd_";

/// Route `log` crate records into a configured driver.
pub struct DriverLogger {
    driver: Box<dyn LogDriver>,
    max_level: LevelFilter,
}

impl DriverLogger {
    pub fn new(driver: Box<dyn LogDriver>, max_level: LevelFilter) -> Self {
        DriverLogger { driver, max_level }
    }

    /// Install as the global `log` logger.
    pub fn init(driver: Box<dyn LogDriver>, max_level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(DriverLogger::new(driver, max_level)))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

fn syslog_rank(level: log::Level) -> u8 {
    let level = match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warning,
        log::Level::Info => Level::Info,
        log::Level::Debug | log::Level::Trace => Level::Debug,
    };
    level.rank()
}

impl log::Log for DriverLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level && !metadata.target().starts_with(SELF_TARGET_PREFIX)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // the message is already formatted
        let msg = record.args().to_string().replace('%', "%%");
        let meta = vec![LogMeta::from(json!({"target": record.target()}))];
        self.driver.log(syslog_rank(record.level()), &msg, meta);
    }

    fn flush(&self) {}
}
