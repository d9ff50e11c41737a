/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use ldd_types::log::{AsyncLogFormatter, LogRecord};
use ldd_types::splat::splat;

use super::LogDnaClientConfig;

/// One entry of the ingest `lines` array.
#[derive(Serialize)]
struct IngestLine<'a> {
    timestamp: i64,
    line: String,
    app: &'a str,
    level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    env: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Value>,
}

pub struct LogDnaFormatter {
    app: String,
    env: Option<String>,
    index_meta: bool,
}

impl LogDnaFormatter {
    pub(crate) fn new(config: &LogDnaClientConfig) -> Self {
        LogDnaFormatter {
            app: config.app.clone(),
            env: config.env.clone(),
            index_meta: config.index_meta,
        }
    }

    fn format_at(&self, record: &LogRecord<'_>, timestamp: i64) -> anyhow::Result<Value> {
        let splatted = splat(record.message, record.meta);
        let meta = if splatted.fields.is_empty() {
            None
        } else if self.index_meta {
            Some(Value::Object(splatted.fields))
        } else {
            Some(Value::String(serde_json::to_string(&splatted.fields)?))
        };

        let line = IngestLine {
            timestamp,
            line: splatted.message,
            app: &self.app,
            level: record.level.as_str().to_uppercase(),
            env: self.env.as_deref(),
            meta,
        };
        Ok(serde_json::to_value(line)?)
    }
}

impl AsyncLogFormatter<Value> for LogDnaFormatter {
    fn format_record(&self, record: &LogRecord<'_>) -> anyhow::Result<Value> {
        self.format_at(record, Utc::now().timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldd_types::level::Level;
    use ldd_types::meta::LogMeta;
    use serde_json::json;

    fn formatter(index_meta: bool) -> LogDnaFormatter {
        let mut config = LogDnaClientConfig::new("k".to_string(), "adonis-app").unwrap();
        config.set_env(Some("production".to_string()));
        config.set_index_meta(index_meta);
        LogDnaFormatter::new(&config)
    }

    #[test]
    fn indexed_meta() {
        let meta = [
            LogMeta::from("disk full"),
            LogMeta::from(json!({"errno": -28, "syscall": "write", "fd": 3})).sanitize(),
        ];
        let record = LogRecord::new(Level::Error, "failed: %s", &meta);
        let v = formatter(true).format_at(&record, 1000).unwrap();
        assert_eq!(
            v,
            json!({
                "timestamp": 1000,
                "line": "failed: disk full",
                "app": "adonis-app",
                "level": "ERROR",
                "env": "production",
                "meta": {"errno": -28, "syscall": "write"},
            })
        );
    }

    #[test]
    fn stringified_meta() {
        let meta = [LogMeta::from(json!({"user": 7}))];
        let record = LogRecord::new(Level::Notice, "login", &meta);
        let v = formatter(false).format_at(&record, 1000).unwrap();
        assert_eq!(v["meta"], json!(r#"{"user":7}"#));
        assert_eq!(v["level"], json!("NOTICE"));
    }

    #[test]
    fn no_meta() {
        let record = LogRecord::new(Level::Debug, "tick", &[]);
        let v = formatter(true).format_at(&record, 1000).unwrap();
        assert!(v.get("meta").is_none());
        assert_eq!(v["line"], json!("tick"));
    }
}
