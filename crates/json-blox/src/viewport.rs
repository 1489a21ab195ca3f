//! Scroll position → visible row → breadcrumb trail.

use crate::flatten::{NodeKind, Row};
use crate::path::NodePath;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub label: String,
    pub path: NodePath,
    pub kind: NodeKind,
    pub parent_is_array: bool,
}

pub fn visible_row_index(offset: f64, row_height: f64) -> usize {
    if row_height <= 0.0 || offset <= 0.0 {
        return 0;
    }
    (offset / row_height).floor() as usize
}

/// Offset that puts `row_index` on the first visible line.
pub fn offset_for_top(row_index: usize, row_height: f64) -> f64 {
    (row_index as f64 * row_height).max(0.0)
}

/// Ancestor chain of the row at `index`, root first.
///
/// Prefixes that have no row of their own are skipped. `None` when `index`
/// is past the last row.
pub fn breadcrumbs(rows: &[Row<'_>], index: usize) -> Option<Vec<Crumb>> {
    let row = rows.get(index)?;
    let trail = row
        .path()
        .prefixes()
        .filter_map(|prefix| rows.iter().find(|candidate| candidate.path() == &prefix))
        .map(|found| Crumb {
            label: found.label(),
            path: found.path().clone(),
            kind: found.kind(),
            parent_is_array: found.parent_is_array(),
        })
        .collect();
    Some(trail)
}

/// Breadcrumbs for the row at the top of the viewport.
pub fn breadcrumbs_at(rows: &[Row<'_>], offset: f64, row_height: f64) -> Option<Vec<Crumb>> {
    breadcrumbs(rows, visible_row_index(offset, row_height))
}
