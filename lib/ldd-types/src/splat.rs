/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::meta::{LogMeta, is_truthy};

const KEY_MESSAGE: &str = "message";

pub struct Splatted {
    pub message: String,
    pub fields: Map<String, Value>,
}

/// Interpolate `%s %d %i %f %j %o %O` placeholders in `msg` with `meta`.
///
/// Meta values left over after interpolation are merged into `fields` when
/// they are objects, and appended to the message otherwise. The `message`
/// field of a leftover object is appended to the message, not merged.
pub fn splat(msg: &str, meta: &[LogMeta]) -> Splatted {
    let mut message = String::with_capacity(msg.len());
    let mut args = meta.iter();

    let mut chars = msg.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            message.push(c);
            continue;
        }
        let Some(&conv) = chars.peek() else {
            message.push(c);
            break;
        };
        match conv {
            '%' => {
                chars.next();
                message.push('%');
            }
            's' | 'd' | 'i' | 'f' | 'j' | 'o' | 'O' => {
                chars.next();
                match args.next() {
                    Some(arg) => push_arg(&mut message, conv, arg),
                    None => {
                        message.push('%');
                        message.push(conv);
                    }
                }
            }
            _ => message.push(c),
        }
    }

    let mut fields = Map::new();
    for arg in args {
        match arg.as_object() {
            Some(Cow::Borrowed(map)) => {
                for (k, v) in map {
                    merge_field(&mut message, &mut fields, k.clone(), v.clone());
                }
            }
            Some(Cow::Owned(map)) => {
                for (k, v) in map {
                    merge_field(&mut message, &mut fields, k, v);
                }
            }
            None => {
                message.push(' ');
                push_arg(&mut message, 's', arg);
            }
        }
    }

    Splatted { message, fields }
}

fn merge_field(message: &mut String, fields: &mut Map<String, Value>, k: String, v: Value) {
    if k != KEY_MESSAGE {
        fields.insert(k, v);
    } else if is_truthy(&v) {
        message.push(' ');
        match v {
            Value::String(s) => message.push_str(&s),
            v => message.push_str(&v.to_string()),
        }
    }
}

fn push_arg(buf: &mut String, conv: char, arg: &LogMeta) {
    let v = arg.to_value();
    match conv {
        's' => match &v {
            Value::String(s) => buf.push_str(s),
            _ => buf.push_str(&v.to_string()),
        },
        'd' | 'f' => match as_number(&v) {
            Some(f) => buf.push_str(&format_number(f)),
            None => buf.push_str("NaN"),
        },
        'i' => match as_number(&v) {
            Some(f) => buf.push_str(&format!("{}", f.trunc() as i64)),
            None => buf.push_str("NaN"),
        },
        _ => buf.push_str(&v.to_string()),
    }
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{f}")
    }
}
