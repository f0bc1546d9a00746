//! JSON dictionary source.
//!
//! The data file is one JSON object mapping a Bopomofo spelling to its
//! candidates, each a `[text, weight]` pair in display order:
//!
//! ```json
//! { "ㄊㄞˊㄅㄟˇ": [["台北", 2]], "ㄅㄟˇ": [["北", 1]] }
//! ```

use crate::codec::BopomofoCodec;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use zhuyin_core::{Candidate, DictionaryRecord, DictionarySource, StorageError, SyllableCodec};

/// Parse dictionary JSON into records keyed by the encoded spelling.
pub fn parse_json_dictionary(
    content: &str,
    codec: &BopomofoCodec,
) -> Result<Vec<DictionaryRecord>, StorageError> {
    let entries: BTreeMap<String, Vec<Candidate>> =
        serde_json::from_str(content).map_err(StorageError::from_source)?;

    let mut records = Vec::with_capacity(entries.len());
    for (spelling, candidates) in entries {
        let key = codec
            .encode(&spelling)
            .map_err(|e| StorageError::Source(format!("bad spelling {:?}: {}", spelling, e)))?;
        records.push(DictionaryRecord::new(key, candidates));
    }
    Ok(records)
}

/// A dictionary stored as a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonDictionary {
    path: PathBuf,
}

impl JsonDictionary {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DictionarySource for JsonDictionary {
    fn records(self) -> Result<Vec<DictionaryRecord>, StorageError> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| StorageError::Source(format!("{}: {}", self.path.display(), e)))?;
        let records = parse_json_dictionary(&content, &BopomofoCodec)?;
        debug!(path = %self.path.display(), count = records.len(), "parsed dictionary");
        Ok(records)
    }
}
