use std::sync::Arc;
use std::thread;

use crate::ConflictError;
use crate::ConsistencyError;
use crate::Error;
use crate::GateState;
use crate::MultiRSW;

fn is_rw_conflict(r: crate::Result<()>) -> bool {
    matches!(r, Err(Error::Conflict(ConflictError::ReaderWriter)))
}

#[test]
fn test_new_gate_is_idle() {
    let g = MultiRSW::new();
    assert_eq!(g.state(), GateState::Idle);
}

#[test]
fn test_writer_blocks_readers_and_writers() {
    let g = MultiRSW::new();
    g.begin_write().unwrap();
    assert_eq!(g.state(), GateState::Writing);

    assert!(is_rw_conflict(g.begin_read()));
    assert!(is_rw_conflict(g.begin_write()));

    g.end_write().unwrap();
    assert_eq!(g.state(), GateState::Idle);
    g.begin_read().unwrap();
}

#[test]
fn test_reader_blocks_writer() {
    let g = MultiRSW::new();
    g.begin_read().unwrap();
    assert!(is_rw_conflict(g.begin_write()));

    // Additional readers are admitted
    g.begin_read().unwrap();
    assert_eq!(g.state(), GateState::Reading(2));
}

#[test]
fn test_n_reads_then_n_ends_leaves_gate_idle() {
    let g = MultiRSW::new();
    for _ in 0..5 {
        g.begin_read().unwrap();
    }
    assert_eq!(g.state(), GateState::Reading(5));
    for _ in 0..5 {
        g.end_read().unwrap();
    }
    assert_eq!(g.state(), GateState::Idle);
    g.begin_write().unwrap();
}

#[test]
fn test_end_read_without_reader_is_consistency_error() {
    let g = MultiRSW::new();
    let e = g.end_read().unwrap_err();
    assert!(matches!(
        e,
        Error::Consistency(ConsistencyError::NegativeReaderCount)
    ));
    // State is untouched
    assert_eq!(g.state(), GateState::Idle);
}

#[test]
fn test_end_write_without_writer_is_consistency_error() {
    let g = MultiRSW::new();
    let e = g.end_write().unwrap_err();
    assert!(matches!(e, Error::Consistency(ConsistencyError::NoActiveWriter)));
    assert!(!e.is_retryable());
}

#[test]
fn test_upgrade_single_reader() {
    let g = MultiRSW::new();
    g.begin_read().unwrap();
    g.upgrade_to_writer().unwrap();
    assert_eq!(g.state(), GateState::Writing);

    assert!(is_rw_conflict(g.begin_read()));
    g.end_write().unwrap();
    assert_eq!(g.state(), GateState::Idle);
}

#[test]
fn test_upgrade_with_multiple_readers_conflicts() {
    let g = MultiRSW::new();
    g.begin_read().unwrap();
    g.begin_read().unwrap();
    assert!(is_rw_conflict(g.upgrade_to_writer()));
    assert_eq!(g.state(), GateState::Reading(2));
}

#[test]
fn test_upgrade_with_writer_conflicts() {
    let g = MultiRSW::new();
    g.begin_write().unwrap();
    assert!(is_rw_conflict(g.upgrade_to_writer()));
}

#[test]
fn test_upgrade_without_readers_is_distinct_error() {
    let g = MultiRSW::new();
    let e = g.upgrade_to_writer().unwrap_err();
    assert!(matches!(
        e,
        Error::Conflict(ConflictError::UpgradeWithoutReaders)
    ));
    assert_eq!(g.state(), GateState::Idle);
}

#[test]
fn test_concurrent_writers_only_one_admitted() {
    let g = Arc::new(MultiRSW::new());
    let handles: Vec<_> = (0..16)
        .map(|_| {
            let g = g.clone();
            thread::spawn(move || g.begin_write().is_ok())
        })
        .collect();
    let admitted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(admitted, 1);
    assert_eq!(g.state(), GateState::Writing);
}
