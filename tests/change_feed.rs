//! Change-feed lifecycle: subscribe/unsubscribe, pumping events into
//! the store, idempotent merges, and silent degradation on disconnect.

mod common;

use common::{catalog, ids, request, scope, TestRig};
use shelf::testing::MenuItem;
use shelf::{FeedListener, RecordEvent, ScopeId};

#[test]
fn test_pumped_insert_appears_in_view_and_invalidates_cache() {
    let rig = TestRig::seeded(catalog(3));
    rig.store.load(request(0, 10)).unwrap();

    let mut listener = FeedListener::new(rig.feed.clone());
    listener.subscribe(&scope()).unwrap();

    rig.feed
        .publish(RecordEvent::Inserted(MenuItem::new("item-99", scope(), 3)));
    let applied = listener.pump(&rig.store);

    assert_eq!(applied, 1);
    let snapshot = rig.store.snapshot();
    assert_eq!(snapshot.total_count, 4);
    assert_eq!(ids(&snapshot.items).last().unwrap(), "item-99");

    // The scope's cache was invalidated: a reload refetches.
    let fetches = rig.remote.fetch_calls();
    rig.store.load(request(0, 10)).unwrap();
    assert!(rig.remote.fetch_calls() > fetches);
}

#[test]
fn test_at_least_once_delivery_is_idempotent() {
    let rig = TestRig::seeded(catalog(3));
    rig.store.load(request(0, 10)).unwrap();

    let mut listener = FeedListener::new(rig.feed.clone());
    listener.subscribe(&scope()).unwrap();

    // The transport redelivers the same event.
    let event = RecordEvent::Inserted(MenuItem::new("dup", scope(), 7));
    rig.feed.publish(event.clone());
    rig.feed.publish(event);
    listener.pump(&rig.store);

    let snapshot = rig.store.snapshot();
    assert_eq!(snapshot.total_count, 4);
    assert_eq!(
        snapshot.items.iter().filter(|i| i.name == "dup").count(),
        1
    );
}

#[test]
fn test_deleted_event_for_unknown_id_is_silent() {
    let rig = TestRig::seeded(catalog(3));
    rig.store.load(request(0, 10)).unwrap();

    let mut listener = FeedListener::new(rig.feed.clone());
    listener.subscribe(&scope()).unwrap();

    rig.feed
        .publish(RecordEvent::Deleted(MenuItem::new("never-seen", scope(), 9)));
    let applied = listener.pump(&rig.store);

    assert_eq!(applied, 1);
    assert_eq!(rig.store.snapshot().total_count, 3);
}

#[test]
fn test_disconnect_degrades_then_recovers() {
    let rig = TestRig::seeded(catalog(3));
    rig.store.load(request(0, 10)).unwrap();

    let mut listener = FeedListener::new(rig.feed.clone());
    listener.subscribe(&scope()).unwrap();

    rig.feed
        .publish(RecordEvent::Inserted(MenuItem::new("late", scope(), 5)));
    rig.feed.disconnect_once();

    // The failed poll is swallowed; nothing applied, nothing raised.
    assert_eq!(listener.pump(&rig.store), 0);
    assert_eq!(rig.store.snapshot().total_count, 3);

    // Next poll succeeds and catches up.
    assert_eq!(listener.pump(&rig.store), 1);
    assert_eq!(rig.store.snapshot().total_count, 4);
}

#[test]
fn test_resubscribing_tears_down_previous_scope() {
    let rig = TestRig::seeded(catalog(3));
    rig.store.load(request(0, 10)).unwrap();

    let mut listener = FeedListener::new(rig.feed.clone());
    listener.subscribe(&scope()).unwrap();
    assert_eq!(rig.feed.live_subscriptions(), 1);

    // Tenant switch: the old subscription is dropped with the swap.
    listener.subscribe(&ScopeId::new("rest-2")).unwrap();
    assert_eq!(listener.scope(), Some(&ScopeId::new("rest-2")));
    assert_eq!(rig.feed.live_subscriptions(), 1);

    // Events for the old scope no longer reach the listener.
    rig.feed
        .publish(RecordEvent::Inserted(MenuItem::new("ghost", scope(), 8)));
    assert_eq!(listener.pump(&rig.store), 0);

    listener.unsubscribe();
    assert_eq!(rig.feed.live_subscriptions(), 0);
}

#[test]
fn test_event_for_unwatched_scope_leaves_view_alone() {
    let rig = TestRig::seeded(catalog(3));
    rig.store.load(request(0, 10)).unwrap();
    let before = rig.store.snapshot();

    rig.store.apply_remote_event(RecordEvent::Inserted(MenuItem::new(
        "foreign",
        ScopeId::new("rest-2"),
        0,
    )));

    assert_eq!(rig.store.snapshot(), before);
}
