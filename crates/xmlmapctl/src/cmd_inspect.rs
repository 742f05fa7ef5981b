use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;
use tracing::info;
use xmlmap::Value;

use crate::common::{self, ConvertFlags};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct KeySummary {
    pub key: String,
    pub kind: &'static str,
    pub count: usize,
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Text(_) => "text",
        Value::Map(_) => "map",
        Value::List(_) => "list",
    }
}

/// One row per top-level key; an empty vector when the root is plain text.
pub fn summarize(value: &Value) -> Vec<KeySummary> {
    let Some(map) = value.as_map() else {
        return Vec::new();
    };
    map.iter()
        .map(|(key, value)| KeySummary {
            key: key.clone(),
            kind: kind(value),
            count: value.as_list().map_or(1, <[Value]>::len),
        })
        .collect()
}

pub async fn run(input: Option<PathBuf>, flags: ConvertFlags, json: bool) -> Result<()> {
    let data = common::read_input(input.as_deref()).await?;
    let value = common::convert(data, flags.options()).await?;
    let rows = summarize(&value);
    info!(keys = rows.len(), root = kind(&value), "inspected document");

    if json {
        return common::print_json(&rows, false);
    }

    if let Some(text) = value.as_str() {
        println!("Root element holds text: {text:?}");
        return Ok(());
    }

    println!("{:<32} {:<6} {}", "KEY", "KIND", "COUNT");
    for row in &rows {
        println!("{:<32} {:<6} {}", row.key, row.kind, row.count);
    }
    Ok(())
}
