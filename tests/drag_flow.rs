//! Drag gestures end to end: drop policies, page-edge sentinels,
//! sustained-hover paging across pages, and the search guard.

mod common;

use common::{catalog, ids, request, scope, TestRig};
use shelf::{DragConfig, DragController, Error, ItemId, PageEdge, PageNav, Ranked};
use std::time::Duration;

fn id(s: &str) -> ItemId {
    ItemId::new(s)
}

fn controller(rig: &TestRig) -> DragController<shelf::testing::MemoryRemote> {
    DragController::new(rig.store.clone(), rig.clock.clone())
}

#[test]
fn test_drop_on_item_places_before_target() {
    let rig = TestRig::seeded(catalog(4));
    rig.store.load(request(0, 10)).unwrap();
    let drag = controller(&rig);

    drag.begin(id("item-03")).unwrap();
    drag.hover_item(&id("item-01"));
    // Hover alone commits nothing.
    assert_eq!(rig.remote.persist_calls(), 0);

    drag.drop_on_item(&id("item-01")).unwrap();
    assert_eq!(
        ids(&rig.store.snapshot().items),
        vec!["item-00", "item-03", "item-01", "item-02"]
    );
    assert!(drag.dragging().is_none());
}

#[test]
fn test_drop_on_page_edges() {
    let rig = TestRig::seeded(catalog(4));
    rig.store.load(request(0, 10)).unwrap();
    let drag = controller(&rig);

    drag.begin(id("item-02")).unwrap();
    drag.drop_on_edge(PageEdge::Start).unwrap();
    assert_eq!(
        ids(&rig.store.snapshot().items),
        vec!["item-02", "item-00", "item-01", "item-03"]
    );

    drag.begin(id("item-00")).unwrap();
    drag.drop_on_edge(PageEdge::End).unwrap();
    assert_eq!(
        ids(&rig.store.snapshot().items),
        vec!["item-02", "item-01", "item-03", "item-00"]
    );
}

#[test]
fn test_begin_rejected_while_searching() {
    let rig = TestRig::seeded(catalog(4));
    rig.store.load(request(0, 10).with_search("item")).unwrap();
    let drag = controller(&rig);

    let err = drag.begin(id("item-00")).unwrap_err();
    assert!(matches!(err, Error::ReorderDisabled));
    assert!(drag.dragging().is_none());
    assert_eq!(rig.remote.persist_calls(), 0);
}

#[test]
fn test_search_activated_mid_drag_blocks_the_drop() {
    let rig = TestRig::seeded(catalog(4));
    rig.store.load(request(0, 10)).unwrap();
    let drag = controller(&rig);

    drag.begin(id("item-03")).unwrap();
    rig.store.load(request(0, 10).with_search("item")).unwrap();

    let err = drag.drop_on_item(&id("item-00")).unwrap_err();
    assert!(matches!(err, Error::ReorderDisabled));
    assert_eq!(rig.remote.persist_calls(), 0);
}

#[test]
fn test_sustained_hover_pages_forward_without_releasing_drag() {
    let rig = TestRig::seeded(catalog(25));
    rig.store.load(request(0, 10)).unwrap();
    let drag = DragController::with_config(
        rig.store.clone(),
        rig.clock.clone(),
        DragConfig {
            page_hover_cooldown: Duration::from_millis(450),
        },
    );

    drag.begin(id("item-00")).unwrap();

    // First hover arms the cooldown; nothing fires yet.
    assert!(!drag.hover_page_nav(PageNav::Next).unwrap());
    rig.clock.advance(Duration::from_millis(449));
    assert!(!drag.hover_page_nav(PageNav::Next).unwrap());

    rig.clock.advance(Duration::from_millis(1));
    assert!(drag.hover_page_nav(PageNav::Next).unwrap());
    assert_eq!(rig.store.current_request().unwrap().page, 1);
    assert_eq!(drag.dragging(), Some(id("item-00")));

    // Re-armed per trigger: holding the hover keeps paging.
    rig.clock.advance(Duration::from_millis(450));
    assert!(drag.hover_page_nav(PageNav::Next).unwrap());
    assert_eq!(rig.store.current_request().unwrap().page, 2);

    // Cross-page drop: the dragged item lands before a page-2 row.
    drag.drop_on_item(&id("item-22")).unwrap();
    let rows = rig.remote.rows_in_order(&scope());
    let pos_dragged = rows.iter().position(|r| r.id() == &id("item-00")).unwrap();
    let pos_target = rows.iter().position(|r| r.id() == &id("item-22")).unwrap();
    assert_eq!(pos_dragged + 1, pos_target);
}

#[test]
fn test_leaving_nav_control_disarms_cooldown() {
    let rig = TestRig::seeded(catalog(25));
    rig.store.load(request(0, 10)).unwrap();
    let drag = controller(&rig);

    drag.begin(id("item-00")).unwrap();
    assert!(!drag.hover_page_nav(PageNav::Next).unwrap());
    rig.clock.advance(Duration::from_millis(400));
    drag.leave_page_nav();

    // Coming back restarts the countdown from zero.
    rig.clock.advance(Duration::from_millis(100));
    assert!(!drag.hover_page_nav(PageNav::Next).unwrap());
    assert_eq!(rig.store.current_request().unwrap().page, 0);
}

#[test]
fn test_paging_stops_at_collection_bounds() {
    let rig = TestRig::seeded(catalog(5));
    rig.store.load(request(0, 10)).unwrap();
    let drag = controller(&rig);

    drag.begin(id("item-00")).unwrap();
    assert!(!drag.hover_page_nav(PageNav::Prev).unwrap());
    rig.clock.advance(Duration::from_millis(500));
    // Cooldown elapsed, but there is no previous page to go to.
    assert!(!drag.hover_page_nav(PageNav::Prev).unwrap());
    assert_eq!(rig.store.current_request().unwrap().page, 0);
}

#[test]
fn test_cancel_discards_gesture_without_side_effects() {
    let rig = TestRig::seeded(catalog(4));
    rig.store.load(request(0, 10)).unwrap();
    let drag = controller(&rig);

    drag.begin(id("item-03")).unwrap();
    drag.hover_item(&id("item-00"));
    drag.cancel();

    assert!(drag.dragging().is_none());
    assert!(matches!(
        drag.drop_on_item(&id("item-00")).unwrap_err(),
        Error::NoActiveDrag
    ));
    assert_eq!(rig.remote.persist_calls(), 0);
    assert_eq!(
        ids(&rig.store.snapshot().items),
        vec!["item-00", "item-01", "item-02", "item-03"]
    );
}

#[test]
fn test_failed_persist_ends_drag_with_authoritative_view() {
    let rig = TestRig::seeded(catalog(5));
    rig.store.load(request(0, 10)).unwrap();
    let drag = controller(&rig);

    rig.remote.fail_rank_writes_after(0);
    drag.begin(id("item-04")).unwrap();
    let err = drag.drop_on_item(&id("item-00")).unwrap_err();
    assert!(matches!(err, Error::Remote(_)));

    // Nothing was written, and the view snapped back to the backend.
    assert_eq!(
        ids(&rig.store.snapshot().items),
        ids(&rig.remote.rows_in_order(&scope()))
    );
    assert!(drag.dragging().is_none());
}
