use crate::engine::grid::{CellIndex, OccupancyGrid};
use std::collections::VecDeque;
use tracing::trace;

/// A cell path from a source to one target.
///
/// An empty cell sequence is the "no path within the bound" sentinel; a
/// genuine zero-length path (source equals target) holds a single cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    cells: Vec<CellIndex>,
    distance: f64,
}

impl Path {
    fn unreachable() -> Self {
        Self {
            cells: Vec::new(),
            distance: 0.0,
        }
    }

    pub fn is_reachable(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Accumulated path distance in Å. Meaningless when unreachable.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn cells(&self) -> &[CellIndex] {
        &self.cells
    }
}

/// The 26-cell neighbourhood with per-step costs for a given cell size.
/// Enumeration order is fixed (k-, then j-, then i-major), which makes
/// equal-distance tie-breaks deterministic.
fn neighbor_steps(cell_size: f64) -> Vec<([i32; 3], f64)> {
    let mut steps = Vec::with_capacity(26);
    for dk in -1i32..=1 {
        for dj in -1i32..=1 {
            for di in -1i32..=1 {
                if di == 0 && dj == 0 && dk == 0 {
                    continue;
                }
                let norm = ((di * di + dj * dj + dk * dk) as f64).sqrt();
                steps.push(([di, dj, dk], cell_size * norm));
            }
        }
    }
    steps
}

/// Bounded multi-target shortest-path search over unoccupied grid cells.
///
/// Expands a FIFO queue with Euclidean centre-to-centre step costs and
/// distance relaxation, so the result is a weighted shortest path rather
/// than a hop count. Cells are only relaxed while the accumulated distance
/// stays within `max_distance`, which bounds the explored region.
///
/// The caller is responsible for endpoint preparation (shell clearing and
/// pocket opening) and for invoking [`OccupancyGrid::soft_reset`] once the
/// returned paths have been consumed.
///
/// # Return
///
/// One [`Path`] per entry of `targets`, in order; targets not reached
/// within the bound yield the unreachable sentinel.
pub fn shortest_paths(
    grid: &mut OccupancyGrid,
    source: CellIndex,
    targets: &[CellIndex],
    max_distance: f64,
) -> Vec<Path> {
    let steps = neighbor_steps(grid.cell_size());

    grid.visit(source, 0.0, None);
    let mut queue = VecDeque::new();
    queue.push_back(source);

    let mut expanded = 0u64;
    while let Some(u) = queue.pop_front() {
        expanded += 1;
        let du = grid.cell(u).distance();
        for (offset, step) in &steps {
            let Some(v) = grid.offset_index(u, *offset) else {
                continue;
            };
            if !grid.is_walkable(v) {
                continue;
            }
            let d = du + step;
            if d > max_distance {
                continue;
            }
            if d < grid.cell(v).distance() {
                grid.visit(v, d, Some(u));
                queue.push_back(v);
            }
        }
    }
    trace!(expanded, targets = targets.len(), "Search frontier exhausted.");

    targets
        .iter()
        .map(|&target| extract_path(grid, source, target, max_distance))
        .collect()
}

/// Reconstructs the path to `target` by walking back-pointers to the source.
fn extract_path(
    grid: &OccupancyGrid,
    source: CellIndex,
    target: CellIndex,
    max_distance: f64,
) -> Path {
    let distance = grid.cell(target).distance();
    if !distance.is_finite() || distance > max_distance {
        return Path::unreachable();
    }

    let mut cells = Vec::new();
    let mut current = target;
    loop {
        cells.push(current);
        if current == source {
            break;
        }
        match grid.cell(current).prev() {
            Some(prev) => current = prev,
            // A finite distance without a chain to the source indicates
            // scratch-state corruption; report the target as unreachable
            // rather than fabricating a path.
            None => return Path::unreachable(),
        }
    }
    cells.reverse();
    Path {
        cells,
        distance,
    }
}
