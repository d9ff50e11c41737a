/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::{Value, json};

use ldd_driver::{
    BoxTransport, DRIVER_NAME, DriverConfig, DriverRegistry, Level, LogDnaDriver, LogDriver,
    LogMeta, LogRecord, LogStats, SinkFactory, SysCallErrorMeta, Transport,
};

#[derive(Debug, PartialEq)]
struct Seen {
    sink: &'static str,
    level: Level,
    message: String,
    meta: Vec<Value>,
}

type SeenList = Arc<Mutex<Vec<Seen>>>;

struct RecordingSink {
    name: &'static str,
    level: Level,
    seen: SeenList,
    stats: Arc<LogStats>,
}

impl Transport for RecordingSink {
    fn name(&self) -> &str {
        self.name
    }

    fn level(&self) -> Level {
        self.level
    }

    fn set_level(&mut self, level: Level) {
        self.level = level;
    }

    fn log(&self, record: &LogRecord<'_>) {
        self.seen.lock().unwrap().push(Seen {
            sink: self.name,
            level: record.level,
            message: record.message.to_string(),
            meta: record.meta.iter().map(|m| m.to_value()).collect(),
        });
    }

    fn stats(&self) -> Arc<LogStats> {
        Arc::clone(&self.stats)
    }
}

/// Remote creation fails without a `key`, like the real sink.
#[derive(Default)]
struct RecordingSinks {
    seen: SeenList,
}

impl RecordingSinks {
    fn sink(&self, name: &'static str, level: Level) -> BoxTransport {
        Box::new(RecordingSink {
            name,
            level,
            seen: Arc::clone(&self.seen),
            stats: Arc::new(LogStats::default()),
        })
    }
}

impl SinkFactory for RecordingSinks {
    fn console(&self, config: &DriverConfig) -> anyhow::Result<BoxTransport> {
        Ok(self.sink("console", config.level))
    }

    fn remote(&self, config: &DriverConfig) -> anyhow::Result<BoxTransport> {
        let key = yaml_rust::Yaml::String("key".to_string());
        if !config.pass_through.contains_key(&key) {
            return Err(anyhow::anyhow!("no ingestion key set"));
        }
        Ok(self.sink("logdna", config.level))
    }
}

fn recording_driver() -> (LogDnaDriver, SeenList) {
    let sinks = RecordingSinks::default();
    let seen = Arc::clone(&sinks.seen);
    (LogDnaDriver::with_sink_factory(Box::new(sinks)), seen)
}

fn yaml(s: &str) -> yaml_rust::Yaml {
    ldd_yaml::load_str(s).unwrap()
}

#[test]
fn default_allow_env() {
    let (mut driver, _) = recording_driver();
    driver.set_config(&yaml("name: billing")).unwrap();
    let config = driver.config().unwrap();
    assert_eq!(config.name, "billing");
    assert_eq!(config.allow_env, vec!["production"]);
    assert_eq!(config.level, Level::Info);
    assert!(config.index_meta);
}

#[test]
fn allow_env_override() {
    let (mut driver, _) = recording_driver();
    driver
        .set_config(&yaml("allowEnv: [staging]\nenv: staging\nkey: abc"))
        .unwrap();
    assert_eq!(driver.config().unwrap().allow_env, vec!["staging"]);
    assert_eq!(driver.sink_names(), vec!["console", "logdna"]);
}

#[test]
fn sinks_follow_env() {
    let (mut driver, _) = recording_driver();
    driver.set_config(&yaml("env: production\nkey: abc")).unwrap();
    assert_eq!(driver.sink_names(), vec!["console", "logdna"]);

    driver.set_config(&yaml("env: staging\nkey: abc")).unwrap();
    assert_eq!(driver.sink_names(), vec!["console"]);

    driver.set_config(&yaml("key: abc")).unwrap();
    assert_eq!(driver.sink_names(), vec!["console"]);
}

#[test]
fn log_with_splat_argument() {
    let (mut driver, seen) = recording_driver();
    driver.set_config(&yaml("env: staging")).unwrap();

    driver.log(3, "failed: %s", vec![LogMeta::from("disk full")]);

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![Seen {
            sink: "console",
            level: Level::Error,
            message: "failed: %s".to_string(),
            meta: vec![json!("disk full")],
        }]
    );
}

#[test]
fn syscall_error_reduced() {
    let (mut driver, seen) = recording_driver();
    driver.set_config(&yaml("env: staging")).unwrap();

    let err = json!({
        "errno": -111,
        "code": "ECONNREFUSED",
        "syscall": "connect",
        "address": "127.0.0.1",
        "port": 5432,
        "stack": "Error: connect ECONNREFUSED\n    at ...",
        "extra": {"pool": "main"},
    });
    driver.log(3, "db down", vec![LogMeta::from(err)]);

    let mut typed = SysCallErrorMeta::default();
    typed.set_address("127.0.0.1", 5432);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0].meta,
        vec![json!({
            "errno": -111,
            "code": "ECONNREFUSED",
            "syscall": "connect",
            "address": "127.0.0.1",
            "port": 5432,
        })]
    );
    assert_eq!(seen[0].meta[0]["address"], typed.to_map()["address"]);
}

#[test]
fn plain_meta_untouched() {
    let (mut driver, seen) = recording_driver();
    driver.set_config(&yaml("env: staging")).unwrap();

    let meta = json!({"errno": 0, "syscall": "read", "user": 7});
    driver.log(6, "ok", vec![LogMeta::from(meta.clone())]);
    assert_eq!(seen.lock().unwrap()[0].meta, vec![meta]);
}

#[test]
fn threshold_and_set_level() {
    let (mut driver, seen) = recording_driver();
    driver.set_config(&yaml("env: production\nkey: abc")).unwrap();
    assert_eq!(driver.level(), Some(Level::Info));

    driver.log(7, "before", Vec::new());
    assert!(seen.lock().unwrap().is_empty());

    driver.set_level(Level::Debug).unwrap();
    assert_eq!(driver.level(), Some(Level::Debug));
    driver.log(7, "after", Vec::new());
    driver.log(4, "warned", Vec::new());

    let seen = seen.lock().unwrap();
    let sinks: Vec<(&str, &str)> = seen
        .iter()
        .map(|s| (s.sink, s.message.as_str()))
        .collect();
    assert_eq!(
        sinks,
        vec![
            ("console", "after"),
            ("console", "warned"),
            ("logdna", "warned")
        ]
    );
}

#[test]
fn unknown_rank_dropped() {
    let (mut driver, seen) = recording_driver();
    driver.set_config(&yaml("env: staging")).unwrap();
    driver.log(9, "nowhere", Vec::new());
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn failed_config_keeps_state() {
    let (mut driver, _) = recording_driver();
    driver.set_config(&yaml("env: staging\nname: first")).unwrap();

    assert!(driver.set_config(&yaml("env: production\nname: second")).is_err());
    assert_eq!(driver.config().unwrap().name, "first");
    assert_eq!(driver.sink_names(), vec!["console"]);

    assert!(driver.set_config(&yaml("allowEnv: production")).is_err());
    assert_eq!(driver.config().unwrap().name, "first");
}

#[test]
fn real_sinks_require_key() {
    let mut driver = LogDnaDriver::default();
    assert!(driver.set_config(&yaml("env: production")).is_err());
    assert!(driver.config().is_none());

    driver.set_config(&yaml("env: development")).unwrap();
    assert_eq!(driver.sink_names(), vec!["console"]);
}

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse().ok())
        .unwrap_or(0)
}

/// Answer a single ingest request with 200 and return it as text.
fn accept_one_request(listener: &TcpListener) -> String {
    listener.set_nonblocking(true).unwrap();
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut stream = loop {
        match listener.accept() {
            Ok((stream, _)) => break stream,
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                assert!(Instant::now() < deadline, "no ingest request received");
                std::thread::sleep(Duration::from_millis(20));
            }
            Err(e) => panic!("accept failed: {e}"),
        }
    };
    stream.set_nonblocking(false).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .unwrap();

    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];
    loop {
        let n = stream.read(&mut tmp).unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(pos) = text.find("\r\n\r\n") {
            if text.len() >= pos + 4 + content_length(&text[..pos]) {
                break;
            }
        }
    }
    stream
        .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n")
        .unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn real_remote_sink() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let mut driver = LogDnaDriver::default();
    driver
        .set_config(&yaml(&format!(
            concat!(
                "env: production\n",
                "level: warning\n",
                "index_meta: false\n",
                "name: billing\n",
                "key: abc\n",
                "url: http://{addr}/logs/ingest\n",
                "flush_interval: 50ms\n",
            ),
            addr = addr
        )))
        .unwrap();
    assert_eq!(driver.sink_names(), vec!["console", "logdna"]);

    driver.set_level(Level::Debug).unwrap();
    assert_eq!(driver.level(), Some(Level::Debug));
    let engine = driver.engine().unwrap();
    assert_eq!(engine.transport(1).unwrap().level(), Level::Warning);

    driver.log(
        3,
        "failed: %s",
        vec![LogMeta::from("disk full"), LogMeta::from(json!({"user": 7}))],
    );

    let request = accept_one_request(&listener);
    assert!(request.starts_with("POST /logs/ingest?"));
    assert!(request.contains("Basic YWJjOg=="));
    assert!(request.contains(r#""line":"failed: disk full""#));
    assert!(request.contains(r#""app":"billing""#));
    assert!(request.contains(r#""level":"ERROR""#));
    assert!(request.contains(r#""env":"production""#));
    assert!(request.contains(r#""meta":"{\"user\":7}""#));
}

#[test]
fn registry_roundtrip() {
    let mut registry = DriverRegistry::new();
    ldd_driver::register(&mut registry).unwrap();
    assert!(registry.contains(DRIVER_NAME));

    let driver = registry
        .make_configured(DRIVER_NAME, &yaml("env: test\nlevel: warning"))
        .unwrap();
    assert_eq!(driver.level(), Some(Level::Warning));
}
