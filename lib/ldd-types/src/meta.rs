/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::borrow::Cow;
use std::io;

use serde::Serialize;
use serde_json::{Map, Value};

const KEY_ERRNO: &str = "errno";
const KEY_SYSCALL: &str = "syscall";

/// The reduced form of a system call error record.
///
/// Low level I/O error objects may carry back references to the socket or
/// stream they came from, so only these fields are ever forwarded to sinks.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SysCallErrorMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errno: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syscall: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
}

impl SysCallErrorMeta {
    fn reduce(map: &Map<String, Value>) -> Self {
        let field = |k: &str| map.get(k).cloned();
        SysCallErrorMeta {
            errno: field(KEY_ERRNO),
            code: field("code"),
            syscall: field(KEY_SYSCALL),
            address: field("address"),
            port: field("port"),
            info: field("info"),
            path: field("path"),
            message: field("message"),
        }
    }

    pub fn from_io_error(syscall: &str, e: &io::Error) -> Self {
        let errno = e.raw_os_error();
        SysCallErrorMeta {
            errno: errno.map(Value::from),
            code: errno.and_then(errno_name).map(Value::from),
            syscall: Some(Value::from(syscall)),
            message: Some(Value::from(format!("{syscall} {e}"))),
            ..Default::default()
        }
    }

    pub fn set_address(&mut self, address: &str, port: u16) {
        self.address = Some(Value::from(address));
        self.port = Some(Value::from(port));
    }

    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        let mut put = |k: &str, v: &Option<Value>| {
            if let Some(v) = v {
                map.insert(k.to_string(), v.clone());
            }
        };
        put(KEY_ERRNO, &self.errno);
        put("code", &self.code);
        put(KEY_SYSCALL, &self.syscall);
        put("address", &self.address);
        put("port", &self.port);
        put("info", &self.info);
        put("path", &self.path);
        put("message", &self.message);
        map
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum LogMeta {
    Value(Value),
    SysCallError(SysCallErrorMeta),
}

impl LogMeta {
    /// Replace values that look like system call errors by their reduced form.
    ///
    /// A value qualifies when it is an object with truthy `errno` and
    /// `syscall` fields. Everything else is returned as is.
    pub fn sanitize(self) -> LogMeta {
        match self {
            LogMeta::Value(Value::Object(map)) if looks_like_syscall_error(&map) => {
                LogMeta::SysCallError(SysCallErrorMeta::reduce(&map))
            }
            v => v,
        }
    }

    /// Object view used when merging leftover meta into structured fields.
    pub fn as_object(&self) -> Option<Cow<'_, Map<String, Value>>> {
        match self {
            LogMeta::Value(Value::Object(map)) => Some(Cow::Borrowed(map)),
            LogMeta::Value(_) => None,
            LogMeta::SysCallError(e) => Some(Cow::Owned(e.to_map())),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            LogMeta::Value(v) => v.clone(),
            LogMeta::SysCallError(e) => Value::Object(e.to_map()),
        }
    }
}

impl From<Value> for LogMeta {
    fn from(v: Value) -> Self {
        LogMeta::Value(v)
    }
}

impl From<&str> for LogMeta {
    fn from(s: &str) -> Self {
        LogMeta::Value(Value::from(s))
    }
}

impl From<String> for LogMeta {
    fn from(s: String) -> Self {
        LogMeta::Value(Value::from(s))
    }
}

impl From<i64> for LogMeta {
    fn from(i: i64) -> Self {
        LogMeta::Value(Value::from(i))
    }
}

impl From<SysCallErrorMeta> for LogMeta {
    fn from(e: SysCallErrorMeta) -> Self {
        LogMeta::SysCallError(e)
    }
}

fn looks_like_syscall_error(map: &Map<String, Value>) -> bool {
    map.get(KEY_ERRNO).is_some_and(is_truthy) && map.get(KEY_SYSCALL).is_some_and(is_truthy)
}

pub(crate) fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(unix)]
fn errno_name(errno: i32) -> Option<&'static str> {
    let name = match errno {
        libc::EPERM => "EPERM",
        libc::ENOENT => "ENOENT",
        libc::EINTR => "EINTR",
        libc::EIO => "EIO",
        libc::EBADF => "EBADF",
        libc::EAGAIN => "EAGAIN",
        libc::ENOMEM => "ENOMEM",
        libc::EACCES => "EACCES",
        libc::EEXIST => "EEXIST",
        libc::ENOTDIR => "ENOTDIR",
        libc::EISDIR => "EISDIR",
        libc::EINVAL => "EINVAL",
        libc::EMFILE => "EMFILE",
        libc::ENOSPC => "ENOSPC",
        libc::EPIPE => "EPIPE",
        libc::EADDRINUSE => "EADDRINUSE",
        libc::EADDRNOTAVAIL => "EADDRNOTAVAIL",
        libc::ENETUNREACH => "ENETUNREACH",
        libc::ECONNABORTED => "ECONNABORTED",
        libc::ECONNRESET => "ECONNRESET",
        libc::ETIMEDOUT => "ETIMEDOUT",
        libc::ECONNREFUSED => "ECONNREFUSED",
        libc::EHOSTUNREACH => "EHOSTUNREACH",
        _ => return None,
    };
    Some(name)
}

#[cfg(not(unix))]
fn errno_name(_errno: i32) -> Option<&'static str> {
    None
}
