/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    // system is unusable
    Emerg,
    // action must be taken immediately
    Alert,
    // critical conditions
    Crit,
    // error conditions
    Error,
    // warning conditions
    Warning,
    // normal, but significant, condition
    Notice,
    // informational message
    Info,
    // debug-level message
    Debug,
}

impl Level {
    pub const ALL: [Level; 8] = [
        Level::Emerg,
        Level::Alert,
        Level::Crit,
        Level::Error,
        Level::Warning,
        Level::Notice,
        Level::Info,
        Level::Debug,
    ];

    pub const fn rank(&self) -> u8 {
        match self {
            Level::Emerg => 0,
            Level::Alert => 1,
            Level::Crit => 2,
            Level::Error => 3,
            Level::Warning => 4,
            Level::Notice => 5,
            Level::Info => 6,
            Level::Debug => 7,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Emerg => "emerg",
            Level::Alert => "alert",
            Level::Crit => "crit",
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Notice => "notice",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }

    pub fn from_rank(rank: u8) -> Option<Level> {
        Level::ALL.get(rank as usize).copied()
    }

    /// Whether a record at `self` passes a sink whose threshold is `threshold`.
    #[inline]
    pub fn passes(&self, threshold: Level) -> bool {
        self.rank() <= threshold.rank()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LevelTable::SYSLOG
            .level_of(s)
            .ok_or_else(|| anyhow!("unknown log level {s}"))
    }
}

/// Name <-> rank mapping shared by the driver and the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelTable {
    entries: &'static [Level],
}

impl LevelTable {
    pub const SYSLOG: LevelTable = LevelTable {
        entries: &Level::ALL,
    };

    pub fn entries(&self) -> &'static [Level] {
        self.entries
    }

    pub fn name_of(&self, rank: u8) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|l| l.rank() == rank)
            .map(|l| l.as_str())
    }

    pub fn level_of(&self, name: &str) -> Option<Level> {
        self.entries.iter().find(|l| l.as_str() == name).copied()
    }

    pub fn rank_of(&self, name: &str) -> Option<u8> {
        self.level_of(name).map(|l| l.rank())
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        LevelTable::SYSLOG
    }
}
