/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod record;
pub use record::LogRecord;

mod stats;
pub use stats::{LogStats, LogStatsSnapshot};

mod async_log;
pub use async_log::{AsyncLogConfig, AsyncLogFormatter, AsyncLogger};
