/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use crate::level::Level;
use crate::meta::LogMeta;

/// A log call after level resolution, as seen by every sink.
#[derive(Clone, Copy, Debug)]
pub struct LogRecord<'a> {
    pub level: Level,
    pub message: &'a str,
    pub meta: &'a [LogMeta],
}

impl<'a> LogRecord<'a> {
    pub fn new(level: Level, message: &'a str, meta: &'a [LogMeta]) -> Self {
        LogRecord {
            level,
            message,
            meta,
        }
    }
}
