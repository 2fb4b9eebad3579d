use camino::Utf8Path;
use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads the strings a mod manifest declares.
#[cfg_attr(test, mockall::automock)]
pub trait ManifestReader {
    /// Every object key and string value, in document order.
    fn read(&self, path: &Utf8Path) -> Result<Vec<String>, ManifestError>;
}

/// `serde_json`-backed reader for Arcropolis `config.json` files
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonManifestReader;

impl JsonManifestReader {
    pub fn new() -> Self {
        Self
    }
}

impl ManifestReader for JsonManifestReader {
    fn read(&self, path: &Utf8Path) -> Result<Vec<String>, ManifestError> {
        let value = read_json(path)?;
        let mut strings = Vec::new();
        collect_strings(&value, &mut strings);
        Ok(strings)
    }
}

pub(crate) fn read_json(path: &Utf8Path) -> Result<Value, ManifestError> {
    let contents = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_string(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| ManifestError::Parse {
        path: path.to_string(),
        source,
    })
}

fn collect_strings(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|item| collect_strings(item, out)),
        Value::Object(map) => {
            for (key, item) in map {
                out.push(key.clone());
                collect_strings(item, out);
            }
        }
        _ => {}
    }
}

/// Replace keys and string values that appear in `rewrites` with their new text.
///
/// Matching is on the whole string; anything not listed is left as it is.
/// Returns the number of strings replaced.
pub fn rewrite_manifest_strings(value: &mut Value, rewrites: &IndexMap<String, String>) -> usize {
    match value {
        Value::String(s) => match rewrites.get(s.as_str()) {
            Some(new) => {
                *s = new.clone();
                1
            }
            None => 0,
        },
        Value::Array(items) => items
            .iter_mut()
            .map(|item| rewrite_manifest_strings(item, rewrites))
            .sum(),
        Value::Object(map) => {
            let mut edits = 0;
            let old = std::mem::take(map);
            for (key, mut item) in old {
                let key = match rewrites.get(&key) {
                    Some(new) => {
                        edits += 1;
                        new.clone()
                    }
                    None => key,
                };
                edits += rewrite_manifest_strings(&mut item, rewrites);
                map.insert(key, item);
            }
            edits
        }
        _ => 0,
    }
}
