//! Log-backed dones: ordering, batch reads, and file lifecycle.

use std::fs;
use std::sync::Arc;

use dones::LogStore;

use super::fixture::{check_all_any_done, check_end_to_end, test_ns, TestFixture};

#[test]
fn end_to_end_scenario() {
    let fixture = TestFixture::new();
    check_end_to_end(&fixture.log_dones(&test_ns()));
}

#[test]
fn all_done_and_any_done() {
    let fixture = TestFixture::new();
    check_all_any_done(&fixture.log_dones(&test_ns()));
}

#[test]
fn last_record_wins() {
    let fixture = TestFixture::new();
    let dones = fixture.log_dones(&test_ns());

    dones.mark("k").unwrap();
    dones.unmark("k").unwrap();
    dones.mark("k").unwrap();
    assert!(dones.done("k").unwrap());

    dones.mark("j").unwrap();
    dones.mark("j").unwrap();
    dones.unmark("j").unwrap();
    assert!(!dones.done("j").unwrap());
}

#[test]
fn namespaces_are_isolated() {
    let fixture = TestFixture::new();
    let a = fixture.log_dones(&test_ns());
    let b = fixture.log_dones(&test_ns());

    a.mark("shared-key").unwrap();
    assert!(!b.done("shared-key").unwrap());

    b.clear().unwrap();
    assert!(a.done("shared-key").unwrap());
}

#[test]
fn are_done_matches_per_key_checks() {
    let fixture = TestFixture::new();
    let dones = fixture.log_dones(&test_ns());
    let keys = ["a", "b", "c", "d", "e"];

    dones.mark("a").unwrap();
    dones.mark("c").unwrap();
    dones.unmark("c").unwrap();
    dones.mark("e").unwrap();

    let batch = dones.are_done(&keys).unwrap();
    let singles: Vec<bool> = keys.iter().map(|k| dones.done(k).unwrap()).collect();
    assert_eq!(batch, singles);
    assert_eq!(batch, vec![true, false, false, false, true]);
}

#[test]
fn clear_deletes_the_file_and_marks_recreate_it() {
    let fixture = TestFixture::new();
    let path = fixture.temp.path().join("lifecycle.log");
    let log = LogStore::new(&path);

    log.mark("k").unwrap();
    assert!(path.exists());

    log.clear().unwrap();
    assert!(!path.exists());
    assert!(!log.done("k").unwrap());

    // Clearing an already-cleared store is fine.
    log.clear().unwrap();

    log.mark("k").unwrap();
    assert!(path.exists());
    assert!(log.done("k").unwrap());
}

#[test]
fn log_lines_are_write_ordered_records() {
    let fixture = TestFixture::new();
    let path = fixture.temp.path().join("format.log");
    let log = LogStore::new(&path);

    log.mark("first").unwrap();
    log.mark("second").unwrap();
    log.unmark("first").unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(
        contents,
        "DONE \"first\"\nDONE \"second\"\nUNDONE \"first\"\n"
    );
}

#[test]
fn concurrent_marking_keeps_every_record() {
    let fixture = TestFixture::new();
    let dones = Arc::new(fixture.log_dones(&test_ns()));

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let dones = Arc::clone(&dones);
            scope.spawn(move || {
                for item in 0..5 {
                    dones.mark(&(worker, item)).unwrap();
                }
            });
        }
    });

    for worker in 0..8 {
        for item in 0..5 {
            assert!(dones.done(&(worker, item)).unwrap());
        }
    }
}
