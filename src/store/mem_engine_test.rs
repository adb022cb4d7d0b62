use std::sync::Arc;

use parking_lot::Mutex;

use super::*;

fn recorded_keys() -> (Arc<Mutex<Vec<String>>>, ChangeListener) {
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let listener: ChangeListener = Arc::new(move |key: &str| {
        sink.lock().push(key.to_string());
    });
    (seen, listener)
}

#[test]
fn test_put_get_round_trip() {
    let engine = MemoryStoreEngine::new();
    engine.put("user", "alice").unwrap();
    assert_eq!(engine.get("user").unwrap(), Some("alice".to_string()));
    assert_eq!(engine.get("missing").unwrap(), None);
}

#[test]
fn test_put_overwrites() {
    let engine = MemoryStoreEngine::new();
    engine.put("user", "alice").unwrap();
    engine.put("user", "bob").unwrap();
    assert_eq!(engine.get("user").unwrap(), Some("bob".to_string()));
}

#[test]
fn test_remove_deletes_entry() {
    let engine = MemoryStoreEngine::new();
    engine.put("user", "alice").unwrap();
    engine.remove("user").unwrap();
    assert_eq!(engine.get("user").unwrap(), None);
}

#[test]
fn test_clear_and_all_keys() {
    let engine = MemoryStoreEngine::new();
    engine.put("a", "1").unwrap();
    engine.put("b", "2").unwrap();

    let mut keys = engine.all_keys().unwrap();
    keys.sort();
    assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);

    engine.clear().unwrap();
    assert!(engine.all_keys().unwrap().is_empty());
}

#[test]
fn test_listener_fires_on_put() {
    let engine = MemoryStoreEngine::new();
    let (seen, listener) = recorded_keys();
    let _handle = engine.register_listener(listener);

    engine.put("user", "alice").unwrap();
    engine.put("user", "bob").unwrap();
    assert_eq!(*seen.lock(), vec!["user".to_string(), "user".to_string()]);
}

#[test]
fn test_listener_fires_on_remove_of_present_key_only() {
    let engine = MemoryStoreEngine::new();
    engine.put("user", "alice").unwrap();

    let (seen, listener) = recorded_keys();
    let _handle = engine.register_listener(listener);

    engine.remove("missing").unwrap();
    assert!(seen.lock().is_empty());

    engine.remove("user").unwrap();
    assert_eq!(*seen.lock(), vec!["user".to_string()]);
}

#[test]
fn test_clear_emits_no_per_key_events() {
    let engine = MemoryStoreEngine::new();
    engine.put("a", "1").unwrap();
    engine.put("b", "2").unwrap();

    let (seen, listener) = recorded_keys();
    let _handle = engine.register_listener(listener);

    engine.clear().unwrap();
    assert!(seen.lock().is_empty());
}

#[test]
fn test_dropping_handle_deregisters_listener() {
    let engine = MemoryStoreEngine::new();
    let (seen, listener) = recorded_keys();

    let handle = engine.register_listener(listener);
    assert_eq!(engine.listener_count(), 1);

    drop(handle);
    assert_eq!(engine.listener_count(), 0);

    engine.put("user", "alice").unwrap();
    assert!(seen.lock().is_empty());
}
