/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use flume::Receiver;
use serde_json::{Map, Value};

use ldd_engine::Transport;
use ldd_types::level::Level;
use ldd_types::log::{AsyncLogConfig, AsyncLogger, LogRecord, LogStats};

mod format;
pub use format::StdLogFormatter;

pub struct StdLogValue {
    level: Level,
    message: String,
    fields: Map<String, Value>,
}

pub fn new_async_logger(
    async_conf: &AsyncLogConfig,
    use_stdout: bool,
) -> AsyncLogger<StdLogValue, StdLogFormatter> {
    let (sender, receiver) = flume::bounded::<StdLogValue>(async_conf.channel_capacity);

    let stats = Arc::new(LogStats::default());

    let io_thread = AsyncIoThread {
        receiver,
        stats: Arc::clone(&stats),
    };

    let _detached_thread = std::thread::Builder::new()
        .name(async_conf.thread_name.clone())
        .spawn(move || {
            if use_stdout {
                io_thread.run(io::stdout());
            } else {
                io_thread.run(io::stderr());
            }
        });

    AsyncLogger::new(sender, StdLogFormatter::default(), stats)
}

/// The console sink: always present, its level is adjustable at runtime.
pub struct ConsoleTransport {
    level: Level,
    inner: AsyncLogger<StdLogValue, StdLogFormatter>,
}

impl ConsoleTransport {
    pub fn new(async_conf: &AsyncLogConfig, level: Level, use_stdout: bool) -> Self {
        ConsoleTransport {
            level,
            inner: new_async_logger(async_conf, use_stdout),
        }
    }
}

impl Transport for ConsoleTransport {
    fn name(&self) -> &str {
        "console"
    }

    fn level(&self) -> Level {
        self.level
    }

    fn set_level(&mut self, level: Level) {
        self.level = level;
    }

    fn log(&self, record: &LogRecord<'_>) {
        // format errors are already counted in stats
        let _ = self.inner.log(record);
    }

    fn stats(&self) -> Arc<LogStats> {
        self.inner.get_stats()
    }
}

struct AsyncIoThread {
    receiver: Receiver<StdLogValue>,
    stats: Arc<LogStats>,
}

impl AsyncIoThread {
    fn run<IO: Write + IsTerminal>(self, mut io: IO) {
        let colorize = io.is_terminal();
        let mut buf: Vec<u8> = Vec::with_capacity(1024);
        while let Ok(v) = self.receiver.recv() {
            self.write_one(&mut io, &mut buf, v, colorize);

            while let Ok(v) = self.receiver.try_recv() {
                self.write_one(&mut io, &mut buf, v, colorize);
            }

            let _ = io.flush();
        }
    }

    fn write_one<IO: Write>(
        &self,
        io: &mut IO,
        buf: &mut Vec<u8>,
        v: StdLogValue,
        colorize: bool,
    ) {
        buf.clear();
        if write_simple(buf, &v, colorize).is_err() {
            self.stats.add_format_failed();
            return;
        }
        match io.write_all(buf.as_slice()) {
            Ok(_) => self.stats.add_passed(1, buf.len()),
            Err(_) => self.stats.add_peer_unreachable(1),
        }
    }
}

fn level_style(level: Level) -> anstyle::Style {
    use anstyle::{AnsiColor, Color, Style};

    let color = match level {
        Level::Emerg | Level::Crit | Level::Error | Level::Warning => AnsiColor::Red,
        Level::Alert | Level::Notice => AnsiColor::Yellow,
        Level::Info => AnsiColor::Green,
        Level::Debug => AnsiColor::Blue,
    };
    Style::new().fg_color(Some(Color::Ansi(color)))
}

/// `level: message {fields}`
fn write_simple<IO: Write>(io: &mut IO, v: &StdLogValue, colorize: bool) -> io::Result<()> {
    if colorize {
        let style = level_style(v.level);
        write!(io, "{}{}{}", style.render(), v.level, style.render_reset())?;
    } else {
        write!(io, "{}", v.level)?;
    }
    write!(io, ": {}", v.message)?;
    if !v.fields.is_empty() {
        let fields = serde_json::to_string(&v.fields).map_err(io::Error::other)?;
        write!(io, " {fields}")?;
    }
    writeln!(io)
}
