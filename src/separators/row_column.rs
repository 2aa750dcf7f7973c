use crate::cancel::CancelToken;
use crate::decompose::balanced_convex_decomposition;
use crate::{CellId, Config, GridGraph, NO_CELL};
use bevy_math::ivec2;

/// Split the graph along a single interior row or column.
///
/// Row and column candidates are gathered by two parallel tasks, each
/// sorted ascending by size, then merged shortest-first into the try-loop.
/// The first candidate passing the balanced-and-convex validator wins.
pub(crate) fn row_column(
    g: &GridGraph,
    config: &Config,
    cancel: &CancelToken,
) -> Option<Vec<GridGraph>> {
    let grid = g.grid()?;

    let (rows, columns) = rayon::join(
        || {
            let mut rows = Vec::new();
            for y in 1..grid.height() - 1 {
                let row: Vec<CellId> = (0..grid.width())
                    .map(|x| grid.get(ivec2(x, y)))
                    .filter(|&id| id != NO_CELL)
                    .collect();
                if !row.is_empty() {
                    rows.push(row);
                }
            }
            rows.sort_by_key(Vec::len);
            rows
        },
        || {
            let mut columns = Vec::new();
            for x in 1..grid.width() - 1 {
                let column: Vec<CellId> = (0..grid.height())
                    .map(|y| grid.get(ivec2(x, y)))
                    .filter(|&id| id != NO_CELL)
                    .collect();
                if !column.is_empty() {
                    columns.push(column);
                }
            }
            columns.sort_by_key(Vec::len);
            columns
        },
    );

    let mut rows = rows.into_iter().peekable();
    let mut columns = columns.into_iter().peekable();
    loop {
        if cancel.is_cancelled() {
            return None;
        }
        let candidate = match (rows.peek(), columns.peek()) {
            (Some(row), Some(column)) if row.len() <= column.len() => rows.next(),
            (Some(_), Some(_)) => columns.next(),
            (Some(_), None) => rows.next(),
            (None, Some(_)) => columns.next(),
            (None, None) => return None,
        }?;
        if let Some(children) =
            balanced_convex_decomposition(g, &candidate, config.alpha, cancel)
        {
            return Some(children);
        }
    }
}
