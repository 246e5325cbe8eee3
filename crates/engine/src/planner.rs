//! Reorder planner: minimal-cost subrange renumbering
//!
//! ## Design
//!
//! Pure functions, no I/O. Given the full ordered list of a scope and a
//! drag gesture (dragged id, target id, placement), compute the minimal
//! set of rank-key reassignments that realizes the move.
//!
//! The affected index range is the span between the dragged item's old
//! and new positions. The rank keys that existed at those positions in
//! the original list form a fixed pool that is redistributed, in
//! ascending order, over the new arrangement of the same span. No new
//! rank values are invented, so every item outside the span keeps its
//! exact key.

use shelf_core::{display_order, Error, ItemId, RankUpdate, Ranked, Result};

/// Where the dragged item lands relative to the drop target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Dragged item takes the target's position; target shifts down
    Before,
    /// Dragged item lands immediately after the target
    After,
}

/// Drop zone at the boundary of the currently displayed page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEdge {
    /// Sentinel above the first displayed row
    Start,
    /// Sentinel below the last displayed row
    End,
}

/// Plan the rank-key updates for dropping `dragged` onto `target`
///
/// `full_order` must be the scope's entire collection sorted by
/// `(rank_key, id)`, not just the current page. Dropping an item onto
/// itself is a no-op and returns an empty plan. Updates whose rank key
/// is unchanged are omitted, so the plan is minimal.
///
/// # Errors
///
/// `Error::StaleReference` when either id is missing from `full_order`;
/// the caller must abort the gesture and reload the authoritative order.
pub fn plan_move<R: Ranked>(
    full_order: &[R],
    dragged: &ItemId,
    target: &ItemId,
    placement: Placement,
) -> Result<Vec<RankUpdate>> {
    if dragged == target {
        return Ok(Vec::new());
    }

    let from = position_of(full_order, dragged)?;
    let to = position_of(full_order, target)?;

    // Index at which the dragged item re-enters the list once removed.
    let insert = match placement {
        Placement::Before => {
            if to > from {
                to - 1
            } else {
                to
            }
        }
        Placement::After => {
            if to > from {
                to
            } else {
                to + 1
            }
        }
    };

    if insert == from {
        return Ok(Vec::new());
    }

    let mut arrangement: Vec<&R> = full_order.iter().collect();
    let moved = arrangement.remove(from);
    arrangement.insert(insert, moved);

    let start = from.min(insert);
    let end = from.max(insert);

    // Fixed pool: the rank values the affected span held originally.
    let mut pool: Vec<u64> = full_order[start..=end].iter().map(|r| r.rank_key()).collect();
    pool.sort_unstable();

    let updates = arrangement[start..=end]
        .iter()
        .zip(pool)
        .filter(|(record, rank)| record.rank_key() != *rank)
        .map(|(record, rank)| RankUpdate {
            id: record.id().clone(),
            rank_key: rank,
        })
        .collect();

    Ok(updates)
}

/// Plan a move to the start or end of the currently displayed page
///
/// `edge_item` is the first (for [`PageEdge::Start`]) or last (for
/// [`PageEdge::End`]) item currently displayed; it acts as a virtual
/// drop target for the shared algorithm.
///
/// # Errors
///
/// `Error::StaleReference` as for [`plan_move`].
pub fn plan_move_to_edge<R: Ranked>(
    full_order: &[R],
    dragged: &ItemId,
    edge_item: &ItemId,
    edge: PageEdge,
) -> Result<Vec<RankUpdate>> {
    let placement = match edge {
        PageEdge::Start => Placement::Before,
        PageEdge::End => Placement::After,
    };
    plan_move(full_order, dragged, edge_item, placement)
}

/// Apply a plan to an owned list and restore display order
///
/// Shared by the store's optimistic path and by tests that want the
/// resulting arrangement rather than the raw updates.
pub fn apply_plan<R: Ranked>(items: &mut [R], updates: &[RankUpdate]) {
    for update in updates {
        if let Some(item) = items.iter_mut().find(|i| i.id() == &update.id) {
            item.set_rank_key(update.rank_key);
        }
    }
    items.sort_by(display_order);
}

fn position_of<R: Ranked>(full_order: &[R], id: &ItemId) -> Result<usize> {
    full_order
        .iter()
        .position(|r| r.id() == id)
        .ok_or_else(|| Error::StaleReference(id.clone()))
}
