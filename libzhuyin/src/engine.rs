//! Zhuyin/Bopomofo engine for libzhuyin
//!
//! Wires the Bopomofo codec into the generic segmentation engine and
//! composition controller from zhuyin-core.

use std::path::Path;
use std::sync::Arc;

use crate::codec::BopomofoCodec;
use crate::config::ZhuyinConfig;
use crate::dictionary::JsonDictionary;
use tracing::info;
use zhuyin_core::{
    CompositionController, NotificationSink, RedbStore, SegmentationEngine, StorageBackend,
    StorageError,
};

/// Segmentation engine over Bopomofo keys.
pub type Engine = SegmentationEngine<BopomofoCodec>;

/// One composition session over Bopomofo keys.
pub type ZhuyinSession<N> = CompositionController<BopomofoCodec, N>;

/// Open (or create) the redb dictionary at `path`.
pub fn open_store<P: AsRef<Path>>(path: P) -> Result<Arc<dyn StorageBackend>, StorageError> {
    let store = RedbStore::open(path)?;
    info!(path = %store.path().display(), "opened zhuyin dictionary");
    Ok(Arc::new(store))
}

/// Build a segmentation engine over `storage`.
pub fn create_engine(storage: Arc<dyn StorageBackend>, config: &ZhuyinConfig) -> Engine {
    SegmentationEngine::new(BopomofoCodec, storage, config.base().clone())
}

/// Build a session over `storage` reporting to `sink`.
pub fn create_session<N: NotificationSink>(
    storage: Arc<dyn StorageBackend>,
    config: &ZhuyinConfig,
    sink: N,
) -> ZhuyinSession<N> {
    CompositionController::new(create_engine(storage, config), sink)
}

/// Open the configured database and, when a JSON dictionary is configured,
/// bulk-load it before handing the session out.
///
/// A failed dictionary load is reported through the sink and does not fail
/// the call; the session keeps whatever the database already holds.
pub async fn open_session<N: NotificationSink>(
    config: &ZhuyinConfig,
    sink: N,
) -> Result<ZhuyinSession<N>, StorageError> {
    let storage = open_store(&config.database)?;
    let mut session = create_session(storage, config, sink);
    if let Some(path) = &config.dictionary {
        // Errors already went to the sink.
        let _ = session.load(JsonDictionary::new(path)).await;
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use zhuyin_core::{Candidate, DictionaryRecord, ImeEvent, MemoryStore, SyllableCodec};

    #[test]
    fn test_session_over_memory_store() {
        let key = BopomofoCodec.encode("ㄅㄟˇ").unwrap();
        let store = MemoryStore::from_records(vec![DictionaryRecord::new(
            key,
            vec![Candidate::new("北", 1)],
        )]);
        let config = ZhuyinConfig::default();
        let mut ime = create_session(Arc::new(store), &config, Vec::<ImeEvent>::new());
        ime.append_symbols("ㄅㄟˇ").unwrap();
        block_on(ime.query());
        assert_eq!(ime.default_candidate(), Some(&Candidate::new("北", 1)));
    }

    #[test]
    fn test_open_session_reports_missing_dictionary() {
        let dir = std::env::temp_dir().join(format!("libzhuyin_engine_{}", std::process::id()));
        let config = ZhuyinConfig {
            database: dir.join("open_session.redb"),
            dictionary: Some(dir.join("404.json")),
            ..ZhuyinConfig::default()
        };
        let ime = block_on(open_session(&config, Vec::<ImeEvent>::new())).unwrap();
        assert!(matches!(ime.sink()[0], ImeEvent::Error(_)));
        assert_eq!(ime.sink()[1], ImeEvent::LoadEnd);
        drop(ime);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
