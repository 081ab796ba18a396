//! Best-effort typed accessors over [`Metadata`].
//!
//! Every accessor takes a list of key aliases and resolves the first alias
//! that exists; later aliases are ignored even if they would also resolve.
//! Absent keys, values of an unexpected type, and parse failures all read
//! as the zero value of the target type.

use std::collections::HashMap;
use std::time::Duration;

use crate::metadata::{Metadata, Value};

fn lookup<'a>(md: Option<&'a dyn Metadata>, keys: &[&str]) -> Option<&'a Value> {
    let md = md?;
    keys.iter().find_map(|key| md.get(key))
}

/// Return true if any of the keys exists.
pub fn is_exists(md: Option<&dyn Metadata>, keys: &[&str]) -> bool {
    match md {
        Some(md) => keys.iter().any(|key| md.is_exists(key)),
        None => false,
    }
}

pub fn get_bool(md: Option<&dyn Metadata>, keys: &[&str]) -> bool {
    match lookup(md, keys) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Int(i)) => *i != 0,
        Some(Value::String(s)) => parse_bool(s).unwrap_or(false),
        _ => false,
    }
}

pub fn get_int(md: Option<&dyn Metadata>, keys: &[&str]) -> i64 {
    match lookup(md, keys) {
        Some(Value::Bool(b)) => i64::from(*b),
        Some(Value::Int(i)) => *i,
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

pub fn get_float(md: Option<&dyn Metadata>, keys: &[&str]) -> f64 {
    match lookup(md, keys) {
        Some(Value::Float(x)) => *x,
        Some(Value::Int(i)) => *i as f64,
        Some(Value::String(s)) => s.parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Integers are taken as seconds. Strings are parsed as a human duration
/// (`"10s"`, `"1m 30s"`, `"250ms"`) and, failing that, as integer seconds.
pub fn get_duration(md: Option<&dyn Metadata>, keys: &[&str]) -> Duration {
    match lookup(md, keys) {
        Some(Value::Duration(d)) => *d,
        Some(Value::Int(i)) => secs(*i),
        Some(Value::String(s)) => {
            let d = humantime::parse_duration(s).unwrap_or(Duration::ZERO);
            if d.is_zero() {
                secs(s.parse().unwrap_or(0))
            } else {
                d
            }
        }
        _ => Duration::ZERO,
    }
}

pub fn get_string(md: Option<&dyn Metadata>, keys: &[&str]) -> String {
    match lookup(md, keys) {
        Some(v @ (Value::String(_) | Value::Int(_) | Value::Bool(_) | Value::Float(_))) => {
            v.to_string()
        }
        _ => String::new(),
    }
}

pub fn get_strings(md: Option<&dyn Metadata>, keys: &[&str]) -> Vec<String> {
    match lookup(md, keys) {
        Some(Value::List(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

pub fn get_string_map(md: Option<&dyn Metadata>, keys: &[&str]) -> HashMap<String, Value> {
    match lookup(md, keys) {
        Some(Value::Map(m)) => m.clone(),
        _ => HashMap::new(),
    }
}

pub fn get_string_map_string(md: Option<&dyn Metadata>, keys: &[&str]) -> HashMap<String, String> {
    match lookup(md, keys) {
        Some(Value::Map(m)) => m.iter().map(|(k, v)| (k.clone(), v.to_string())).collect(),
        _ => HashMap::new(),
    }
}

fn secs(n: i64) -> Duration {
    u64::try_from(n).map(Duration::from_secs).unwrap_or(Duration::ZERO)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
