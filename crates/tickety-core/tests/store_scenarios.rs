//! Store scenarios over real files: first run, reload, reset and clear.

use std::cell::RefCell;
use std::rc::Rc;

use tempfile::TempDir;
use tickety_core::ident::SystemClock;
use tickety_core::seed::SEED_COUNT;
use tickety_core::storage::DEFAULT_STORAGE_KEY;
use tickety_core::{
    FileSlot, ListView, NewTicket, Priority, Status, StatusFilter, TicketPatch, TicketRepository,
    TicketStore,
};

fn open(dir: &TempDir) -> TicketStore {
    TicketStore::open(TicketRepository::new(FileSlot::new(dir.path())), SystemClock)
}

#[test]
fn first_run_seeds_and_second_run_reloads_same_ids() {
    let dir = TempDir::new().expect("tempdir");

    let first = open(&dir);
    assert_eq!(first.len(), SEED_COUNT);
    assert!(!first.persistence_degraded());
    let ids: Vec<_> = first.tickets().iter().map(|t| t.id.clone()).collect();
    drop(first);

    let second = open(&dir);
    let reloaded: Vec<_> = second.tickets().iter().map(|t| t.id.clone()).collect();
    assert_eq!(ids, reloaded);
}

#[test]
fn created_ticket_survives_reload_at_the_front() {
    let dir = TempDir::new().expect("tempdir");
    let mut store = open(&dir);

    let created = store.create(
        NewTicket::titled("Fix login bug")
            .status(Status::Open)
            .priority(Priority::High),
    );
    assert_eq!(store.len(), SEED_COUNT + 1);
    assert_eq!(created.title, "Fix login bug");
    assert_eq!(created.description, "");
    assert_eq!(created.created_at, created.updated_at);
    drop(store);

    let store = open(&dir);
    assert_eq!(store.tickets()[0], created);
}

#[test]
fn clear_all_persists_an_empty_collection() {
    let dir = TempDir::new().expect("tempdir");
    let mut store = open(&dir);
    store.clear_all();
    assert!(store.is_empty());
    drop(store);

    let store = open(&dir);
    assert!(store.is_empty(), "an empty collection is valid prior state");
}

#[test]
fn reset_seed_after_clear_gives_fresh_ids() {
    let dir = TempDir::new().expect("tempdir");
    let mut store = open(&dir);
    let original: Vec<_> = store.tickets().iter().map(|t| t.id.clone()).collect();

    store.clear_all();
    store.reset_seed();

    assert_eq!(store.len(), SEED_COUNT);
    assert!(store.tickets().iter().all(|t| !original.contains(&t.id)));
}

#[test]
fn corrupt_file_falls_back_to_seed_and_is_overwritten() {
    let dir = TempDir::new().expect("tempdir");
    let slot = FileSlot::new(dir.path());
    let path = slot.path_for(DEFAULT_STORAGE_KEY).expect("valid key");
    std::fs::write(&path, "not json at all").expect("write corrupt state");

    let store = open(&dir);
    assert_eq!(store.len(), SEED_COUNT);

    let repaired = TicketRepository::new(FileSlot::new(dir.path()))
        .try_load()
        .expect("state readable")
        .expect("state present");
    assert_eq!(repaired.as_slice(), store.tickets());
}

#[test]
fn list_view_follows_updates_and_removals() {
    let dir = TempDir::new().expect("tempdir");
    let mut store = open(&dir);
    store.clear_all();

    let (view, subscription) = ListView::attach(&mut store, StatusFilter::Only(Status::InProgress));
    let a = store.create(NewTicket::titled("Triage inbox"));
    assert!(view.borrow().visible().is_empty());

    store.update(
        &a.id,
        TicketPatch {
            status: Some(Status::InProgress),
            ..TicketPatch::default()
        },
    );
    assert_eq!(view.borrow().visible().len(), 1);
    assert_eq!(view.borrow().counts().in_progress, 1);

    store.remove(&a.id);
    assert!(view.borrow().visible().is_empty());
    assert_eq!(view.borrow().counts().all, 0);

    assert!(store.unsubscribe(subscription));
    store.create(NewTicket::titled("After unsubscribe"));
    assert_eq!(view.borrow().counts().all, 0);
}

#[test]
fn every_observer_sees_every_publish() {
    let dir = TempDir::new().expect("tempdir");
    let mut store = open(&dir);

    let sizes = Rc::new(RefCell::new(Vec::new()));
    for _ in 0..2 {
        let sizes = Rc::clone(&sizes);
        store.subscribe(move |snapshot| sizes.borrow_mut().push(snapshot.len()));
    }

    store.create(NewTicket::titled("One more"));
    assert_eq!(
        *sizes.borrow(),
        [SEED_COUNT, SEED_COUNT, SEED_COUNT + 1, SEED_COUNT + 1]
    );
}
