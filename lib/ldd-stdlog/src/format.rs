/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use ldd_types::log::{AsyncLogFormatter, LogRecord};
use ldd_types::splat::splat;

use super::StdLogValue;

#[derive(Default)]
pub struct StdLogFormatter {}

impl AsyncLogFormatter<StdLogValue> for StdLogFormatter {
    fn format_record(&self, record: &LogRecord<'_>) -> anyhow::Result<StdLogValue> {
        let splatted = splat(record.message, record.meta);
        Ok(StdLogValue {
            level: record.level,
            message: splatted.message,
            fields: splatted.fields,
        })
    }
}
