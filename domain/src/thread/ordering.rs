//! Thread placement
//!
//! Stores collect a [`ThreadCursor`] inside their write transaction, call
//! [`plan_placement`], shift if asked to, and insert. The plan itself is pure.

/// Current maxima the placement depends on. Empty sets count as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadCursor {
    Root {
        /// Largest group id in use, across all discussions
        max_group_id: i64,
        /// Largest `total_order` in the discussion
        max_total_order: i64,
    },
    Reply {
        /// The parent's group
        group_id: i64,
        /// Largest `group_order` in that group
        max_group_order: i64,
        /// Largest `total_order` in that group
        max_total_order_in_group: i64,
    },
}

/// Where a new comment goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub group_id: i64,
    pub group_order: i64,
    pub total_order: i64,
    /// Every comment in the discussion with `total_order >= shift_from` moves down by one first
    pub shift_from: Option<i64>,
}

pub fn plan_placement(cursor: ThreadCursor) -> Placement {
    match cursor {
        ThreadCursor::Root {
            max_group_id,
            max_total_order,
        } => Placement {
            group_id: max_group_id + 1,
            group_order: 0,
            total_order: max_total_order + 1,
            shift_from: None,
        },
        ThreadCursor::Reply {
            group_id,
            max_group_order,
            max_total_order_in_group,
        } => {
            let target = max_total_order_in_group + 1;
            Placement {
                group_id,
                group_order: max_group_order + 1,
                total_order: target,
                shift_from: Some(target),
            }
        }
    }
}

/// Apply a placement to an in-memory list of `(group_id, group_order, total_order)`.
///
/// Used by in-memory stores to run the full algorithm without a database.
pub fn place_into(
    rows: &mut Vec<(i64, i64, i64)>,
    parent_group: Option<i64>,
    max_group_id: i64,
) -> Placement {
    let cursor = match parent_group {
        None => ThreadCursor::Root {
            max_group_id,
            max_total_order: rows.iter().map(|r| r.2).max().unwrap_or(0),
        },
        Some(group_id) => {
            let in_group = rows.iter().filter(|r| r.0 == group_id);
            ThreadCursor::Reply {
                group_id,
                max_group_order: in_group.clone().map(|r| r.1).max().unwrap_or(0),
                max_total_order_in_group: in_group.map(|r| r.2).max().unwrap_or(0),
            }
        }
    };
    let placement = plan_placement(cursor);
    if let Some(from) = placement.shift_from {
        for row in rows.iter_mut().filter(|r| r.2 >= from) {
            row.2 += 1;
        }
    }
    rows.push((placement.group_id, placement.group_order, placement.total_order));
    placement
}
