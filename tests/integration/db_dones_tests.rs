//! Database-backed dones: key store operations and facade behavior.

use dones::{Dones, DonesError, KeyStore};

use super::fixture::{check_all_any_done, check_end_to_end, test_ns, TestFixture};

#[test]
fn end_to_end_scenario() {
    let fixture = TestFixture::new();
    check_end_to_end(&fixture.db_dones(&test_ns()));
}

#[test]
fn all_done_and_any_done() {
    let fixture = TestFixture::new();
    check_all_any_done(&fixture.db_dones(&test_ns()));
}

#[test]
fn namespaces_are_isolated() {
    let fixture = TestFixture::new();
    let a = fixture.db_dones(&test_ns());
    let b = fixture.db_dones(&test_ns());

    a.mark("shared-key").unwrap();
    assert!(a.done("shared-key").unwrap());
    assert!(!b.done("shared-key").unwrap());

    b.clear().unwrap();
    assert!(a.done("shared-key").unwrap());
}

#[test]
fn are_done_matches_per_key_checks() {
    let fixture = TestFixture::new();
    let dones = fixture.db_dones(&test_ns());
    let keys = ["p", "q", "r", "s"];

    dones.mark("q").unwrap();
    dones.mark("s").unwrap();

    let batch = dones.are_done(&keys).unwrap();
    let singles: Vec<bool> = keys.iter().map(|k| dones.done(k).unwrap()).collect();
    assert_eq!(batch, singles);
    assert_eq!(batch, vec![false, true, false, true]);
}

#[test]
fn structured_keys_work() {
    let fixture = TestFixture::new();
    let dones = fixture.db_dones(&test_ns());

    dones.mark(&("batch", 7)).unwrap();
    assert!(dones.done(&("batch", 7)).unwrap());
    assert!(!dones.done(&("batch", 8)).unwrap());
}

#[test]
fn invalid_namespace_is_rejected_up_front() {
    let fixture = TestFixture::new();
    match Dones::database(fixture.provider(), "not a table name") {
        Err(DonesError::InvalidNamespace(_)) => {}
        other => panic!("expected InvalidNamespace, got {other:?}"),
    }
}

#[test]
fn create_is_idempotent() {
    let fixture = TestFixture::new();
    let store = KeyStore::new(fixture.provider(), &test_ns()).unwrap();

    store.create().unwrap();
    store.create().unwrap();
    store.add("k").unwrap();
    assert!(store.exists("k").unwrap());
}

#[test]
fn drop_is_idempotent() {
    let fixture = TestFixture::new();
    let store = KeyStore::new(fixture.provider(), &test_ns()).unwrap();

    // Never created; dropping is still fine, twice.
    store.drop_table().unwrap();
    store.drop_table().unwrap();
}

#[test]
fn add_twice_inserts_once() {
    let fixture = TestFixture::new();
    let store = KeyStore::new(fixture.provider(), &test_ns()).unwrap();
    store.create().unwrap();

    let first = store.add("k").unwrap();
    let second = store.add("k").unwrap();
    assert!(first.is_some());
    assert!(second.is_none());

    // Still exactly one row: removing reports a single deletion.
    assert_eq!(store.remove("k").unwrap(), 1);
    assert!(!store.exists("k").unwrap());
}

#[test]
fn remove_missing_key_is_a_no_op() {
    let fixture = TestFixture::new();
    let store = KeyStore::new(fixture.provider(), &test_ns()).unwrap();
    store.create().unwrap();

    assert_eq!(store.remove("never-added").unwrap(), 0);
}

#[test]
fn reset_empties_the_namespace() {
    let fixture = TestFixture::new();
    let store = KeyStore::new(fixture.provider(), &test_ns()).unwrap();
    store.create().unwrap();

    store.add("k").unwrap();
    store.reset().unwrap();
    assert!(!store.exists("k").unwrap());

    // The recreated table is usable right away.
    store.add("k").unwrap();
    assert!(store.exists("k").unwrap());
}

#[test]
fn shared_facade_is_usable_across_threads() {
    let fixture = TestFixture::new();
    let dones = std::sync::Arc::new(fixture.db_dones(&test_ns()));

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let dones = std::sync::Arc::clone(&dones);
            scope.spawn(move || {
                for item in 0..5 {
                    dones.mark(&(worker, item)).unwrap();
                }
            });
        }
    });

    for worker in 0..4 {
        for item in 0..5 {
            assert!(dones.done(&(worker, item)).unwrap());
        }
    }
}
