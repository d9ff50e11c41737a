/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::collections::VecDeque;
use std::sync::Arc;

use flume::Receiver;
use log::{debug, warn};
use serde_json::Value;

use ldd_engine::Transport;
use ldd_types::level::Level;
use ldd_types::log::{AsyncLogger, LogRecord, LogStats};

mod config;
pub use config::LogDnaClientConfig;

mod client;
use client::IngestClient;

mod format;
pub use format::LogDnaFormatter;

pub fn new_async_logger(
    config: &Arc<LogDnaClientConfig>,
    thread_name: &str,
) -> anyhow::Result<AsyncLogger<Value, LogDnaFormatter>> {
    let async_conf = config.async_log_config(thread_name);
    let client = IngestClient::new(Arc::clone(config))?;

    let (sender, receiver) = flume::bounded::<Value>(async_conf.channel_capacity);

    let stats = Arc::new(LogStats::default());

    let io_thread = AsyncIoThread {
        config: Arc::clone(config),
        receiver,
        stats: Arc::clone(&stats),
        retry_queue: VecDeque::with_capacity(config.retry_queue_len),
    };

    std::thread::Builder::new()
        .name(async_conf.thread_name.clone())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    warn!("failed to create runtime for logdna io thread: {e}");
                    return;
                }
            };
            rt.block_on(io_thread.run_to_end(client));
        })
        .map_err(|e| anyhow::anyhow!("failed to spawn logdna io thread: {e}"))?;

    Ok(AsyncLogger::new(sender, LogDnaFormatter::new(config), stats))
}

/// The remote sink, its level is fixed when it is created.
pub struct LogDnaTransport {
    level: Level,
    inner: AsyncLogger<Value, LogDnaFormatter>,
}

impl LogDnaTransport {
    pub fn new(config: Arc<LogDnaClientConfig>, thread_name: &str) -> anyhow::Result<Self> {
        let inner = new_async_logger(&config, thread_name)?;
        Ok(LogDnaTransport {
            level: config.level,
            inner,
        })
    }
}

impl Transport for LogDnaTransport {
    fn name(&self) -> &str {
        "logdna"
    }

    fn level(&self) -> Level {
        self.level
    }

    fn set_level(&mut self, level: Level) {
        self.level = level;
    }

    fn log(&self, record: &LogRecord<'_>) {
        let _ = self.inner.log(record);
    }

    fn stats(&self) -> Arc<LogStats> {
        self.inner.get_stats()
    }
}

struct AsyncIoThread {
    config: Arc<LogDnaClientConfig>,
    receiver: Receiver<Value>,
    stats: Arc<LogStats>,
    retry_queue: VecDeque<Vec<Value>>,
}

impl AsyncIoThread {
    async fn run_to_end(mut self, client: IngestClient) {
        let mut batch: Vec<Value> = Vec::with_capacity(self.config.flush_limit);
        let mut flush_interval = tokio::time::interval(self.config.flush_interval);

        loop {
            tokio::select! {
                r = self.receiver.recv_async() => {
                    match r {
                        Ok(line) => {
                            batch.push(line);
                            if batch.len() >= self.config.flush_limit {
                                self.flush(&client, &mut batch).await;
                            }
                        }
                        Err(_) => break,
                    }
                }
                _ = flush_interval.tick() => {
                    self.flush(&client, &mut batch).await;
                }
            }
        }

        // all senders are gone, ship what is left and quit
        self.flush(&client, &mut batch).await;
        if !self.retry_queue.is_empty() {
            let lost: usize = self.retry_queue.iter().map(|b| b.len()).sum();
            self.stats.add_peer_unreachable(lost);
            warn!("logdna io thread quit with {lost} lines unsent");
        }
        debug!(
            "logdna io thread quit, {} lines dropped in total",
            self.stats.snapshot().dropped()
        );
    }

    async fn flush(&mut self, client: &IngestClient, batch: &mut Vec<Value>) {
        while let Some(lines) = self.retry_queue.pop_front() {
            match client.send(&lines).await {
                Ok(size) => self.stats.add_passed(lines.len(), size),
                Err(e) => {
                    warn!("failed to resend logs to logdna: {e:?}");
                    self.retry_queue.push_front(lines);
                    if !batch.is_empty() {
                        let lines = std::mem::take(batch);
                        self.push_to_retry(lines);
                    }
                    return;
                }
            }
        }

        if batch.is_empty() {
            return;
        }
        let lines = std::mem::replace(batch, Vec::with_capacity(self.config.flush_limit));
        match client.send(&lines).await {
            Ok(size) => self.stats.add_passed(lines.len(), size),
            Err(e) => {
                warn!("failed to send logs to logdna: {e:?}");
                self.push_to_retry(lines);
            }
        }
    }

    fn push_to_retry(&mut self, lines: Vec<Value>) {
        self.retry_queue.push_back(lines);
        if self.retry_queue.len() > self.config.retry_queue_len {
            if let Some(dropped) = self.retry_queue.pop_front() {
                self.stats.add_peer_unreachable(dropped.len());
            }
        }
    }
}
