/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use log::warn;

use ldd_types::level::{Level, LevelTable};
use ldd_types::log::{LogRecord, LogStats};
use ldd_types::meta::LogMeta;

/// A log destination owned by the [`Engine`].
pub trait Transport: Send + Sync {
    fn name(&self) -> &str;

    /// Minimum severity this transport accepts.
    fn level(&self) -> Level;
    fn set_level(&mut self, level: Level);

    fn log(&self, record: &LogRecord<'_>);

    fn stats(&self) -> Arc<LogStats>;
}

pub type BoxTransport = Box<dyn Transport>;

/// Fan out of level-resolved records to an ordered list of transports.
pub struct Engine {
    levels: LevelTable,
    transports: Vec<BoxTransport>,
    stats: Arc<LogStats>,
}

impl Engine {
    pub fn new(levels: LevelTable, transports: Vec<BoxTransport>) -> Self {
        Engine {
            levels,
            transports,
            stats: Arc::new(LogStats::default()),
        }
    }

    pub fn set_levels(&mut self, levels: LevelTable) {
        self.levels = levels;
    }

    pub fn levels(&self) -> LevelTable {
        self.levels
    }

    pub fn transports(&self) -> &[BoxTransport] {
        &self.transports
    }

    pub fn transport(&self, i: usize) -> Option<&dyn Transport> {
        self.transports.get(i).map(|t| t.as_ref())
    }

    pub fn transport_mut(&mut self, i: usize) -> Option<&mut BoxTransport> {
        self.transports.get_mut(i)
    }

    /// Records rejected by the engine itself, before any transport.
    pub fn stats(&self) -> Arc<LogStats> {
        Arc::clone(&self.stats)
    }

    pub fn log(&self, level_name: Option<&str>, msg: &str, meta: &[LogMeta]) {
        self.stats.add_total();

        let Some(level) = level_name.and_then(|name| self.levels.level_of(name)) else {
            self.stats.add_format_failed();
            warn!("unknown logger level: {}", level_name.unwrap_or("<none>"));
            return;
        };

        let record = LogRecord::new(level, msg, meta);
        let mut passed = false;
        for t in &self.transports {
            if level.passes(t.level()) {
                t.log(&record);
                passed = true;
            }
        }
        if passed {
            self.stats.add_passed(1, msg.len());
        }
    }
}
