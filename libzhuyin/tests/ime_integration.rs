//! Integration tests for libzhuyin IME functionality.
//!
//! Tests the complete IME workflow including:
//! - Loading the fixture dictionary into memory and redb stores
//! - Candidate generation for words, phrases and unmatched input
//! - Notification order for composition updates and confirmations

use async_trait::async_trait;
use futures::executor::block_on;
use libzhuyin::{
    create_session, BopomofoCodec, Candidate, CompositionState, ImeEvent, JsonDictionary,
    StorageError, SyllableCodec, ZhuyinConfig, ZhuyinSession,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use zhuyin_core::{DictionaryRecord, EncodedKey, MemoryStore, RedbStore, StorageBackend};

// Note: Integration tests run from crate directory (libzhuyin), not workspace root
const FIXTURE: &str = "tests/data/testdata.json";

const TAI: [&str; 17] = [
    "台", "臺", "抬", "颱", "檯", "苔", "跆", "邰", "鮐", "薹", "嬯", "秮", "旲", "炱", "儓", "駘",
    "籉",
];

fn words(texts: &[&str], weight: u32) -> Vec<Candidate> {
    texts.iter().map(|t| Candidate::new(*t, weight)).collect()
}

/// Memory store that counts lookups.
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    lookups: AtomicUsize,
}

#[async_trait]
impl StorageBackend for CountingStore {
    async fn lookup(&self, key: &EncodedKey) -> Result<Vec<Candidate>, StorageError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup(key).await
    }

    async fn bulk_load(&self, records: Vec<DictionaryRecord>) -> Result<usize, StorageError> {
        self.inner.bulk_load(records).await
    }

    fn name(&self) -> &str {
        "counting"
    }
}

fn loaded_session(config: &ZhuyinConfig) -> (ZhuyinSession<Vec<ImeEvent>>, Arc<CountingStore>) {
    let store = Arc::new(CountingStore::default());
    let mut ime = create_session(store.clone(), config, Vec::new());
    let count = block_on(ime.load(JsonDictionary::new(FIXTURE))).expect("fixture loads");
    assert_eq!(count, 5);
    assert_eq!(ime.sink().as_slice(), &[ImeEvent::LoadEnd]);
    ime.sink_mut().clear();
    (ime, store)
}

fn query(ime: &mut ZhuyinSession<Vec<ImeEvent>>, syllables: &str) -> Vec<Candidate> {
    ime.set_syllables(syllables).unwrap();
    block_on(ime.query());
    ime.candidates().to_vec()
}

#[test]
fn test_fixture_exists() {
    let path = PathBuf::from(FIXTURE);
    assert!(
        path.exists(),
        "Fixture {:?} does not exist. CWD: {:?}",
        path,
        std::env::current_dir().unwrap()
    );
}

#[test]
fn test_load_success_ends_once() {
    let (ime, _store) = loaded_session(&ZhuyinConfig::default());
    assert_eq!(ime.state(), CompositionState::Empty);
}

#[test]
fn test_load_missing_file_reports_error_then_end() {
    let store = Arc::new(MemoryStore::new());
    let mut ime = create_session(store, &ZhuyinConfig::default(), Vec::<ImeEvent>::new());
    let result = block_on(ime.load(JsonDictionary::new("tests/data/404.json")));
    assert!(result.is_err());
    let events = ime.sink();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], ImeEvent::Error(_)));
    assert_eq!(events[1], ImeEvent::LoadEnd);
}

#[test]
fn test_query_a_word() {
    let (mut ime, _store) = loaded_session(&ZhuyinConfig::default());
    assert_eq!(query(&mut ime, "ㄊㄞˊ"), words(&TAI, 1));
}

#[test]
fn test_query_the_same_word_twice() {
    let (mut ime, store) = loaded_session(&ZhuyinConfig::default());
    let first = query(&mut ime, "ㄊㄞˊ");
    let lookups = store.lookups.load(Ordering::SeqCst);
    assert_eq!(lookups, 1);

    block_on(ime.query());
    assert_eq!(ime.candidates(), first.as_slice());
    assert_eq!(store.lookups.load(Ordering::SeqCst), lookups, "storage hit twice");
}

#[test]
fn test_query_a_two_word_phrase() {
    let (mut ime, _store) = loaded_session(&ZhuyinConfig::default());
    let mut expected = words(&["台北"], 2);
    expected.extend(words(&TAI, 1));
    assert_eq!(query(&mut ime, "ㄊㄞˊㄅㄟˇ"), expected);
}

#[test]
fn test_query_a_three_word_phrase() {
    let (mut ime, _store) = loaded_session(&ZhuyinConfig::default());
    let mut expected = words(&["台北市", "臺北市", "台北是"], 3);
    expected.extend(words(&["台北"], 2));
    expected.extend(words(&TAI, 1));
    assert_eq!(query(&mut ime, "ㄊㄞˊㄅㄟˇㄕˋ"), expected);
}

#[test]
fn test_query_two_words_without_a_phrase() {
    let (mut ime, _store) = loaded_session(&ZhuyinConfig::default());
    assert_eq!(
        query(&mut ime, "ㄅㄟˇㄕˋ"),
        vec![Candidate::new("北ㄕˋ", 2), Candidate::new("北", 1)]
    );
}

#[test]
fn test_query_two_words_with_resolved_tail() {
    let mut config = ZhuyinConfig::default();
    config.base_mut().resolve_unmatched_tail = true;
    let (mut ime, _store) = loaded_session(&config);
    assert_eq!(
        query(&mut ime, "ㄅㄟˇㄕˋ"),
        vec![Candidate::new("北是", 2), Candidate::new("北", 1)]
    );
}

#[test]
fn test_query_non_existent_word() {
    let (mut ime, _store) = loaded_session(&ZhuyinConfig::default());
    assert_eq!(query(&mut ime, "ㄅㄟˊ"), vec![Candidate::new("ㄅㄟˊ", 1)]);
}

#[test]
fn test_query_non_existent_phrase() {
    let (mut ime, _store) = loaded_session(&ZhuyinConfig::default());
    let mut expected = vec![Candidate::new("台ㄅㄟˊ", 2)];
    expected.extend(words(&TAI, 1));
    assert_eq!(query(&mut ime, "ㄊㄞˊㄅㄟˊ"), expected);
}

#[test]
fn test_parallel_lookup_matches_sequential() {
    let mut config = ZhuyinConfig::default();
    config.base_mut().parallel_lookup = true;
    let (mut parallel, _) = loaded_session(&config);
    let (mut sequential, _) = loaded_session(&ZhuyinConfig::default());
    for input in ["ㄊㄞˊㄅㄟˇㄕˋ", "ㄅㄟˇㄕˋ", "ㄊㄞˊㄅㄟˊ", "ㄅㄟˊ"] {
        assert_eq!(query(&mut parallel, input), query(&mut sequential, input), "{}", input);
    }
}

#[test]
fn test_update_composition() {
    let (mut ime, _store) = loaded_session(&ZhuyinConfig::default());
    ime.set_syllables("ㄊㄞˊㄅㄟˇ").unwrap();
    ime.update_composition();
    assert_eq!(
        ime.sink().as_slice(),
        &[ImeEvent::CompositionUpdate("ㄊㄞˊㄅㄟˇ".into())]
    );
}

#[test]
fn test_update_selections_sets_default() {
    let (mut ime, _store) = loaded_session(&ZhuyinConfig::default());
    ime.update_selections(words(&TAI, 1));
    assert_eq!(
        ime.sink().as_slice(),
        &[ImeEvent::CandidatesUpdate(words(&TAI, 1))]
    );
    assert_eq!(ime.default_candidate(), Some(&Candidate::new("台", 1)));
}

#[test]
fn test_confirm_selection_requeries_rest() {
    let (mut ime, _store) = loaded_session(&ZhuyinConfig::default());
    ime.set_syllables("ㄊㄞˊㄅㄟˇㄕˋ").unwrap();
    block_on(ime.confirm_selection(Candidate::new("台北", 2)));

    assert_eq!(ime.syllables(), "ㄕˋ");
    assert_eq!(
        ime.sink().as_slice(),
        &[
            ImeEvent::CompositionEnd("台北".into()),
            ImeEvent::CompositionUpdate("ㄕˋ".into()),
            ImeEvent::CandidatesUpdate(vec![Candidate::new("是", 1)]),
        ]
    );
}

#[test]
fn test_confirm_whole_phrase_empties_session() {
    let (mut ime, _store) = loaded_session(&ZhuyinConfig::default());
    query(&mut ime, "ㄊㄞˊㄅㄟˇㄕˋ");
    ime.sink_mut().clear();

    let top = ime.default_candidate().cloned().unwrap();
    block_on(ime.confirm_selection(top));
    assert_eq!(ime.state(), CompositionState::Empty);
    assert!(ime.candidates().is_empty());
    assert_eq!(
        ime.sink().as_slice(),
        &[
            ImeEvent::CompositionEnd("台北市".into()),
            ImeEvent::CompositionUpdate(String::new()),
        ]
    );
}

#[test]
fn test_typing_symbol_by_symbol() {
    let (mut ime, store) = loaded_session(&ZhuyinConfig::default());
    for symbol in "ㄊㄞˊㄅㄟˇ".chars() {
        ime.append_symbol(symbol).unwrap();
        block_on(ime.query());
    }
    assert_eq!(ime.default_candidate(), Some(&Candidate::new("台北", 2)));
    // Prefixes already seen are served from the cache.
    assert!(store.lookups.load(Ordering::SeqCst) < 12);
    assert!(ime.cache().stats().0 > 0);
}

#[test]
fn test_redb_store_serves_session() {
    let path = std::env::temp_dir().join(format!(
        "libzhuyin_ime_{}_{}.redb",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    {
        let store = Arc::new(RedbStore::open(&path).unwrap());
        let mut ime = create_session(store, &ZhuyinConfig::default(), Vec::<ImeEvent>::new());
        block_on(ime.load(JsonDictionary::new(FIXTURE))).unwrap();
    }

    let store = Arc::new(RedbStore::open(&path).unwrap());
    let mut ime = create_session(store, &ZhuyinConfig::default(), Vec::<ImeEvent>::new());
    let mut expected = words(&["台北"], 2);
    expected.extend(words(&TAI, 1));
    assert_eq!(query(&mut ime, "ㄊㄞˊㄅㄟˇ"), expected);
    drop(ime);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_codec_keys_match_dictionary() {
    let codec = BopomofoCodec;
    let key = codec.encode("ㄊㄞˊㄅㄟˇㄕˋ").unwrap();
    assert_eq!(key.units(), &[0x0c2a, 0x0233, 0x2204]);
    assert_eq!(codec.decode(&key), "ㄊㄞˊㄅㄟˇㄕˋ");
}
