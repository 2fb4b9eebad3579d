use crate::models::{ParamValue, SlotId};
use camino::Utf8Path;
use regex::Regex;
use std::fs;
use std::sync::LazyLock;
use thiserror::Error;

/// Extension of readable param patches (`ui/param/database/ui_chara_db.prcxml`)
pub const PARAM_EXTENSION: &str = "prcxml";

static SLOT_INDEX_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^n(\d{2})_index$").expect("Invalid slot index regex"));

#[derive(Error, Debug)]
pub enum ParamError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not well-formed XML: {source}")]
    Parse {
        path: String,
        #[source]
        source: roxmltree::Error,
    },
}

/// Reads the text values of a readable param patch.
#[cfg_attr(test, mockall::automock)]
pub trait ParamReader {
    /// Every element with non-blank text, depth first in document order.
    fn read(&self, path: &Utf8Path) -> Result<Vec<ParamValue>, ParamError>;
}

/// `roxmltree`-backed reader for `.prcxml` files
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlParamReader;

impl XmlParamReader {
    pub fn new() -> Self {
        Self
    }
}

impl ParamReader for XmlParamReader {
    fn read(&self, path: &Utf8Path) -> Result<Vec<ParamValue>, ParamError> {
        let contents = fs::read_to_string(path).map_err(|source| ParamError::Io {
            path: path.to_string(),
            source,
        })?;
        parse_values(&contents).map_err(|source| ParamError::Parse {
            path: path.to_string(),
            source,
        })
    }
}

fn parse_values(xml: &str) -> Result<Vec<ParamValue>, roxmltree::Error> {
    let document = roxmltree::Document::parse(xml)?;
    let values = document
        .root_element()
        .descendants()
        .filter(|node| node.is_element())
        .filter_map(|node| {
            let text = node.text()?.trim();
            (!text.is_empty()).then(|| ParamValue::new(node.attribute("hash"), text))
        })
        .collect();
    Ok(values)
}

/// Slot a `nXX_index` hash is keyed to.
pub fn slot_index(hash: &str) -> Option<SlotId> {
    let digits = SLOT_INDEX_HASH.captures(hash)?.get(1)?.as_str();
    digits.parse().ok().and_then(|value| SlotId::new(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    const CHARA_DB: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<struct>
  <list hash="db_root">
    <hash40 index="0">dummy</hash40>
    <struct index="1">
      <byte hash="n05_index">13</byte>
      <hash40 hash="characall_label_c05">vc_narration_characall_koopa</hash40>
      <string hash="name_id"> </string>
    </struct>
  </list>
</struct>
"#;

    #[test]
    fn test_values_in_document_order() {
        let values = parse_values(CHARA_DB).unwrap();
        assert_eq!(
            values,
            vec![
                ParamValue::new(None, "dummy"),
                ParamValue::new(Some("n05_index"), "13"),
                ParamValue::new(Some("characall_label_c05"), "vc_narration_characall_koopa"),
            ]
        );
    }

    #[test]
    fn test_read_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("ui_chara_db.prcxml")).unwrap();
        fs::write(&path, CHARA_DB).unwrap();

        let values = XmlParamReader::new().read(&path).unwrap();
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_read_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("ui_chara_db.prcxml")).unwrap();
        fs::write(&path, "<struct><list></struct>").unwrap();

        assert!(matches!(
            XmlParamReader::new().read(&path),
            Err(ParamError::Parse { .. })
        ));
        assert!(matches!(
            XmlParamReader::new().read(&path.with_file_name("missing.prcxml")),
            Err(ParamError::Io { .. })
        ));
    }

    #[test]
    fn test_slot_index_hash() {
        assert_eq!(slot_index("n05_index"), Some(SlotId::new(5).unwrap()));
        assert_eq!(slot_index("n00_index"), Some(SlotId::new(0).unwrap()));
        assert_eq!(slot_index("n08_index"), None);
        assert_eq!(slot_index("n5_index"), None);
        assert_eq!(slot_index("name_id"), None);
    }
}
