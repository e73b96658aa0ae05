use anyhow::{Context as AnyhowContext, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Merge the options file (if any) with `--option` flags; flags win.
pub fn collect(options_file: Option<&Path>, flags: &[String]) -> Result<BTreeMap<String, String>> {
    let mut options = match options_file {
        Some(path) => load_file(path)?,
        None => BTreeMap::new(),
    };

    for flag in flags {
        let (key, value) = parse_flag(flag)?;
        options.insert(key, value);
    }
    Ok(options)
}

/// `KEY=VALUE`; the value may be empty but the key may not
pub fn parse_flag(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("Option {raw:?} is not in KEY=VALUE form"))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Option {raw:?} has an empty key");
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn load_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file {}", path.display()))?;
    let parsed: BTreeMap<String, Value> = serde_json::from_str(&raw)
        .with_context(|| format!("Options file {} is not a JSON object", path.display()))?;

    parsed
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(text) => text,
                Value::Bool(flag) => flag.to_string(),
                Value::Number(number) => number.to_string(),
                Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(";"),
                Value::Null => String::new(),
                Value::Object(_) => {
                    anyhow::bail!("Option {key} in {} must not be an object", path.display())
                }
            };
            Ok((key, value))
        })
        .collect()
}
