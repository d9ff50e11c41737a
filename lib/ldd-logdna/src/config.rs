/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use anyhow::{Context, anyhow};
use url::Url;
use yaml_rust::Yaml;

use ldd_types::level::Level;
use ldd_types::log::AsyncLogConfig;

const LOGDNA_DEFAULT_INGEST_URL: &str = "https://logs.logdna.com/logs/ingest";
const DEFAULT_CHANNEL_SIZE: usize = 4096;

#[derive(Clone, Debug)]
pub struct LogDnaClientConfig {
    key: String,
    hostname: String,
    ip: Option<String>,
    mac: Option<String>,
    tags: Vec<String>,
    ingest_url: Url,
    pub(crate) app: String,
    pub(crate) env: Option<String>,
    pub(crate) level: Level,
    pub(crate) index_meta: bool,
    pub(crate) timeout: Duration,
    pub(crate) flush_interval: Duration,
    pub(crate) flush_limit: usize,
    pub(crate) retry_queue_len: usize,
    pub(crate) channel_size: usize,
}

impl LogDnaClientConfig {
    pub fn new(key: String, app: &str) -> anyhow::Result<Self> {
        let ingest_url = Url::parse(LOGDNA_DEFAULT_INGEST_URL)?;
        Ok(LogDnaClientConfig {
            key,
            hostname: local_hostname(),
            ip: None,
            mac: None,
            tags: Vec::new(),
            ingest_url,
            app: app.to_string(),
            env: None,
            level: Level::Info,
            index_meta: true,
            timeout: Duration::from_secs(30),
            flush_interval: Duration::from_millis(250),
            flush_limit: 256,
            retry_queue_len: 16,
            channel_size: DEFAULT_CHANNEL_SIZE,
        })
    }

    pub fn set_ingest_url(&mut self, url: &str) -> anyhow::Result<()> {
        let url = Url::parse(url).map_err(|e| anyhow!("invalid ingest url {url}: {e}"))?;
        match url.scheme() {
            "http" | "https" => {
                self.ingest_url = url;
                Ok(())
            }
            s => Err(anyhow!("unsupported ingest url scheme {s}")),
        }
    }

    pub fn set_env(&mut self, env: Option<String>) {
        self.env = env;
    }

    pub fn set_level(&mut self, level: Level) {
        self.level = level;
    }

    pub fn set_index_meta(&mut self, enable: bool) {
        self.index_meta = enable;
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn async_log_config(&self, thread_name: &str) -> AsyncLogConfig {
        AsyncLogConfig {
            channel_capacity: self.channel_size,
            thread_name: thread_name.to_string(),
        }
    }

    /// Build from the options handed over by the driver.
    ///
    /// `key` is required, `app` falls back to `default_app`. Keys not used by
    /// this sink are skipped, as the driver passes everything it does not
    /// know about.
    pub fn parse_yaml(v: &Yaml, default_app: &str) -> anyhow::Result<Self> {
        let map = match v {
            Yaml::Hash(map) => map,
            Yaml::Null => return Err(anyhow!("no ingestion key set")),
            _ => return Err(anyhow!("yaml value type for logdna config should be 'map'")),
        };

        let mut key: Option<String> = None;
        let mut config = LogDnaClientConfig::new(String::new(), default_app)?;
        ldd_yaml::foreach_kv(map, |k, v| match ldd_yaml::key::normalize(k).as_str() {
            "key" => {
                let s = ldd_yaml::value::as_string(v).context("invalid ingestion key")?;
                if s.is_empty() {
                    return Err(anyhow!("empty ingestion key"));
                }
                key = Some(s);
                Ok(())
            }
            "hostname" => {
                config.hostname = ldd_yaml::value::as_string(v)?;
                Ok(())
            }
            "ip" => {
                config.ip = Some(ldd_yaml::value::as_string(v)?);
                Ok(())
            }
            "mac" => {
                config.mac = Some(ldd_yaml::value::as_string(v)?);
                Ok(())
            }
            "app" => {
                config.app = ldd_yaml::value::as_string(v)?;
                Ok(())
            }
            "tags" => {
                config.tags = ldd_yaml::value::as_list(v, ldd_yaml::value::as_string)?;
                Ok(())
            }
            "url" | "ingest_url" => {
                let url = ldd_yaml::value::as_string(v)?;
                config.set_ingest_url(&url)
            }
            "timeout" => {
                config.timeout = ldd_yaml::value::as_duration(v)?;
                Ok(())
            }
            "flush_interval" | "flushinterval" => {
                let interval = ldd_yaml::value::as_duration(v)?;
                if interval.is_zero() {
                    return Err(anyhow!("flush interval should not be 0"));
                }
                config.flush_interval = interval;
                Ok(())
            }
            "flush_limit" | "flushlimit" => {
                let limit = ldd_yaml::value::as_usize(v)?;
                if limit == 0 {
                    return Err(anyhow!("flush limit should not be 0"));
                }
                config.flush_limit = limit;
                Ok(())
            }
            "retry_queue_len" | "retryqueuelen" => {
                config.retry_queue_len = ldd_yaml::value::as_usize(v)?;
                Ok(())
            }
            "async_channel_size" | "channel_size" | "channelsize" => {
                let size = ldd_yaml::value::as_usize(v)?;
                if size == 0 {
                    return Err(anyhow!("channel size should not be 0"));
                }
                config.channel_size = size;
                Ok(())
            }
            _ => Ok(()),
        })?;

        match key {
            Some(key) => {
                config.key = key;
                Ok(config)
            }
            None => Err(anyhow!("no ingestion key set")),
        }
    }

    pub(crate) fn basic_auth(&self) -> String {
        use base64::Engine;

        let token = base64::engine::general_purpose::STANDARD.encode(format!("{}:", self.key()));
        format!("Basic {token}")
    }

    pub(crate) fn is_https(&self) -> bool {
        self.ingest_url.scheme() == "https"
    }

    pub(crate) fn ingest_url(&self, now_ms: i64) -> Url {
        let mut url = self.ingest_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("hostname", &self.hostname);
            if let Some(ip) = &self.ip {
                query.append_pair("ip", ip);
            }
            if let Some(mac) = &self.mac {
                query.append_pair("mac", mac);
            }
            if !self.tags.is_empty() {
                query.append_pair("tags", &self.tags.join(","));
            }
            query.append_pair("now", &now_ms.to_string());
        }
        url
    }
}

#[cfg(unix)]
fn local_hostname() -> String {
    rustix::system::uname()
        .nodename()
        .to_string_lossy()
        .into_owned()
}

#[cfg(not(unix))]
fn local_hostname() -> String {
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(s: &str) -> Yaml {
        ldd_yaml::load_str(s).unwrap()
    }

    #[test]
    fn parse_defaults() {
        let config = LogDnaClientConfig::parse_yaml(&load("key: abc123"), "adonis-app").unwrap();
        assert_eq!(config.key(), "abc123");
        assert_eq!(config.app, "adonis-app");
        assert!(config.index_meta);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.flush_limit, 256);
        assert_eq!(config.ingest_url.as_str(), LOGDNA_DEFAULT_INGEST_URL);
    }

    #[test]
    fn parse_full() {
        let v = load(concat!(
            "key: abc123\n",
            "hostname: web-1\n",
            "ip: 10.0.0.2\n",
            "app: billing\n",
            "tags: [api, eu]\n",
            "url: http://127.0.0.1:8080/logs/ingest\n",
            "timeout: 5s\n",
            "flushInterval: 1s\n",
            "flush_limit: 10\n",
            "retry_queue_len: 2\n",
            "driver: logdna\n",
        ));
        let config = LogDnaClientConfig::parse_yaml(&v, "adonis-app").unwrap();
        assert_eq!(config.app, "billing");
        assert_eq!(config.tags, vec!["api", "eu"]);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.flush_interval, Duration::from_secs(1));
        assert_eq!(config.flush_limit, 10);
        assert_eq!(config.retry_queue_len, 2);

        let url = config.ingest_url(1700000000000);
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/logs/ingest?hostname=web-1&ip=10.0.0.2&tags=api%2Ceu&now=1700000000000"
        );
    }

    #[test]
    fn parse_errors() {
        assert!(LogDnaClientConfig::parse_yaml(&Yaml::Null, "app").is_err());
        assert!(LogDnaClientConfig::parse_yaml(&load("hostname: a"), "app").is_err());
        assert!(LogDnaClientConfig::parse_yaml(&load("key: ''"), "app").is_err());
        assert!(LogDnaClientConfig::parse_yaml(&load("key: k\nurl: ftp://a/b"), "app").is_err());
        assert!(LogDnaClientConfig::parse_yaml(&load("key: k\nflush_limit: 0"), "app").is_err());
        assert!(LogDnaClientConfig::parse_yaml(&load("key: k\ntimeout: soon"), "app").is_err());
        assert!(LogDnaClientConfig::parse_yaml(&load("key: k\nflush_interval: 0"), "app").is_err());
        assert!(LogDnaClientConfig::parse_yaml(&load("key: k\nflushInterval: 0s"), "app").is_err());
        assert!(LogDnaClientConfig::parse_yaml(&load("key: k\nchannel_size: 0"), "app").is_err());
        assert!(LogDnaClientConfig::parse_yaml(&load("key: 12\nKey: ''"), "app").is_err());
    }

    #[test]
    fn parse_normalized_keys() {
        let v = load("Key: abc\nretryQueueLen: 4\nFlush-Limit: 8\nchannelSize: 32");
        let config = LogDnaClientConfig::parse_yaml(&v, "app").unwrap();
        assert_eq!(config.key(), "abc");
        assert_eq!(config.retry_queue_len, 4);
        assert_eq!(config.flush_limit, 8);
        assert_eq!(config.channel_size, 32);
    }

    #[test]
    fn auth_header() {
        let config = LogDnaClientConfig::parse_yaml(&load("key: abc"), "app").unwrap();
        // base64("abc:")
        assert_eq!(config.basic_auth(), "Basic YWJjOg==");
    }
}
