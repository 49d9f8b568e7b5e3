#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic A* search over the maze walkability grid.
//!
//! The search keeps all of its scratch state (costs, predecessors, open and
//! closed membership) in an arena owned by the [`Pathfinder`] value and
//! re-initialises it at every invocation, so a single grid can back any
//! number of interleaved searches without one corrupting the next.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use maze_pursuit_core::{CellCoord, Direction, GridView, Path};

const NO_PREDECESSOR: u32 = u32::MAX;

/// Reusable A* search over a [`GridView`].
#[derive(Debug, Default)]
pub struct Pathfinder {
    scratch: Vec<NodeScratch>,
    open: BinaryHeap<OpenEntry>,
}

impl Pathfinder {
    /// Creates a new pathfinder with empty scratch storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes a shortest 4-connected path from `start` to `goal`.
    ///
    /// The returned path excludes `start` and ends at `goal`. An empty path
    /// means the goal is unreachable, coincides with the start, or either
    /// endpoint is a wall; callers treat all of these as "nothing to follow"
    /// rather than errors.
    pub fn find_path(&mut self, grid: GridView<'_>, start: CellCoord, goal: CellCoord) -> Path {
        if start == goal || !grid.is_walkable(start) || !grid.is_walkable(goal) {
            return Path::default();
        }

        let (columns, rows) = grid.dimensions();
        let Some(node_count) = node_count(columns, rows) else {
            return Path::default();
        };

        self.reset(node_count);

        let Some(start_index) = node_index(start, columns) else {
            return Path::default();
        };
        let mut sequence: u64 = 0;
        self.scratch[start_index].g = 0;
        self.scratch[start_index].status = NodeStatus::Open;
        self.open.push(OpenEntry {
            f: heuristic(start, goal),
            sequence,
            cell: start,
        });

        while let Some(entry) = self.open.pop() {
            let Some(index) = node_index(entry.cell, columns) else {
                continue;
            };
            if self.scratch[index].status == NodeStatus::Closed {
                // Stale heap entry superseded by a cheaper rediscovery.
                continue;
            }
            self.scratch[index].status = NodeStatus::Closed;

            if entry.cell == goal {
                return self.reconstruct(goal, columns);
            }

            let next_g = self.scratch[index].g + 1;
            for direction in Direction::ALL {
                let Some(neighbor) = entry.cell.neighbor(direction) else {
                    continue;
                };
                if !grid.is_walkable(neighbor) {
                    continue;
                }

                let Some(neighbor_index) = node_index(neighbor, columns) else {
                    continue;
                };
                let node = &mut self.scratch[neighbor_index];
                match node.status {
                    NodeStatus::Closed => continue,
                    NodeStatus::Open if node.g <= next_g => continue,
                    NodeStatus::Untouched | NodeStatus::Open => {}
                }

                node.g = next_g;
                node.status = NodeStatus::Open;
                node.predecessor = index as u32;
                sequence += 1;
                self.open.push(OpenEntry {
                    f: next_g + heuristic(neighbor, goal),
                    sequence,
                    cell: neighbor,
                });
            }
        }

        Path::default()
    }

    fn reset(&mut self, node_count: usize) {
        self.open.clear();
        if self.scratch.len() != node_count {
            self.scratch = vec![NodeScratch::default(); node_count];
        } else {
            self.scratch.fill(NodeScratch::default());
        }
    }

    fn reconstruct(&self, goal: CellCoord, columns: u32) -> Path {
        let mut cells = Vec::new();
        let mut cursor = node_index(goal, columns);
        let mut cell = goal;
        while let Some(index) = cursor {
            let predecessor = self.scratch[index].predecessor;
            if predecessor == NO_PREDECESSOR {
                break;
            }

            cells.push(cell);
            let predecessor = predecessor as usize;
            cell = cell_at(predecessor, columns);
            cursor = Some(predecessor);
        }

        cells.reverse();
        Path::from_cells(cells)
    }
}

#[derive(Clone, Copy, Debug)]
struct NodeScratch {
    g: u32,
    predecessor: u32,
    status: NodeStatus,
}

impl Default for NodeScratch {
    fn default() -> Self {
        Self {
            g: u32::MAX,
            predecessor: NO_PREDECESSOR,
            status: NodeStatus::Untouched,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NodeStatus {
    Untouched,
    Open,
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenEntry {
    f: u32,
    sequence: u64,
    cell: CellCoord,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the lowest f pops first, with
        // ties resolved by insertion order to keep paths reproducible.
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(cell: CellCoord, goal: CellCoord) -> u32 {
    cell.manhattan_distance(goal)
}

fn node_count(columns: u32, rows: u32) -> Option<usize> {
    let count = u64::from(columns).checked_mul(u64::from(rows))?;
    if count == 0 || count > u64::from(u32::MAX) {
        return None;
    }

    usize::try_from(count).ok()
}

fn node_index(cell: CellCoord, columns: u32) -> Option<usize> {
    if cell.column() >= columns {
        return None;
    }

    let row = usize::try_from(cell.row()).ok()?;
    let column = usize::try_from(cell.column()).ok()?;
    let width = usize::try_from(columns).ok()?;
    Some(row * width + column)
}

fn cell_at(index: usize, columns: u32) -> CellCoord {
    let width = columns as usize;
    CellCoord::new((index % width) as u32, (index / width) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_pursuit_core::GridView;
    use std::collections::VecDeque;

    struct Fixture {
        walkable: Vec<bool>,
        columns: u32,
        rows: u32,
    }

    impl Fixture {
        /// Builds a grid from an ASCII sketch where `#` marks walls.
        fn parse(sketch: &[&str]) -> Self {
            let rows = sketch.len() as u32;
            let columns = sketch.first().map_or(0, |line| line.len()) as u32;
            let walkable = sketch
                .iter()
                .flat_map(|line| line.chars().map(|tile| tile != '#'))
                .collect();
            Self {
                walkable,
                columns,
                rows,
            }
        }

        fn view(&self) -> GridView<'_> {
            GridView::new(&self.walkable, self.columns, self.rows)
        }
    }

    fn bfs_shortest_len(grid: GridView<'_>, start: CellCoord, goal: CellCoord) -> Option<usize> {
        let mut queue = VecDeque::new();
        let mut distances = std::collections::HashMap::new();
        let _ = distances.insert(start, 0usize);
        queue.push_back(start);
        while let Some(cell) = queue.pop_front() {
            let distance = distances[&cell];
            if cell == goal {
                return Some(distance);
            }
            for direction in Direction::ALL {
                let Some(neighbor) = cell.neighbor(direction) else {
                    continue;
                };
                if !grid.is_walkable(neighbor) || distances.contains_key(&neighbor) {
                    continue;
                }
                let _ = distances.insert(neighbor, distance + 1);
                queue.push_back(neighbor);
            }
        }
        None
    }

    fn assert_valid_path(grid: GridView<'_>, start: CellCoord, path: &Path) {
        let mut previous = start;
        for &cell in path.cells() {
            assert_eq!(previous.manhattan_distance(cell), 1, "non-adjacent step");
            assert!(grid.is_walkable(cell), "path crosses a wall");
            previous = cell;
        }
    }

    #[test]
    fn path_matches_bfs_shortest_length() {
        let fixture = Fixture::parse(&[
            ".....", //
            ".###.", //
            ".#...", //
            ".#.#.", //
            "...#.",
        ]);
        let grid = fixture.view();
        let start = CellCoord::new(0, 0);
        let goal = CellCoord::new(4, 4);

        let mut pathfinder = Pathfinder::new();
        let path = pathfinder.find_path(grid, start, goal);

        let expected = bfs_shortest_len(grid, start, goal).expect("goal reachable");
        assert_eq!(path.len(), expected);
        assert_valid_path(grid, start, &path);
        assert_eq!(path.cells().last().copied(), Some(goal));
    }

    #[test]
    fn unreachable_goal_yields_empty_path() {
        let fixture = Fixture::parse(&[
            "..#..", //
            "..#..", //
            "..#..",
        ]);
        let mut pathfinder = Pathfinder::new();
        let path = pathfinder.find_path(
            fixture.view(),
            CellCoord::new(0, 1),
            CellCoord::new(4, 1),
        );
        assert!(path.is_empty());
    }

    #[test]
    fn start_equal_to_goal_yields_empty_path() {
        let fixture = Fixture::parse(&["...", "..."]);
        let mut pathfinder = Pathfinder::new();
        let cell = CellCoord::new(1, 1);
        assert!(pathfinder.find_path(fixture.view(), cell, cell).is_empty());
    }

    #[test]
    fn endpoints_on_walls_yield_empty_path() {
        let fixture = Fixture::parse(&["#..", "..."]);
        let mut pathfinder = Pathfinder::new();
        assert!(pathfinder
            .find_path(fixture.view(), CellCoord::new(0, 0), CellCoord::new(2, 1))
            .is_empty());
        assert!(pathfinder
            .find_path(fixture.view(), CellCoord::new(2, 1), CellCoord::new(0, 0))
            .is_empty());
        assert!(pathfinder
            .find_path(fixture.view(), CellCoord::new(2, 1), CellCoord::new(9, 9))
            .is_empty());
    }

    #[test]
    fn repeated_searches_reuse_scratch_without_leaking_state() {
        let fixture = Fixture::parse(&[
            ".....", //
            ".###.", //
            ".....",
        ]);
        let grid = fixture.view();
        let start = CellCoord::new(0, 0);
        let goal = CellCoord::new(4, 2);

        let mut pathfinder = Pathfinder::new();
        let first = pathfinder.find_path(grid, start, goal);
        // An unrelated search in between must not disturb the next result.
        let _ = pathfinder.find_path(grid, CellCoord::new(4, 0), CellCoord::new(0, 2));
        let second = pathfinder.find_path(grid, start, goal);

        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn equal_cost_candidates_resolve_deterministically() {
        // A fully open square offers many equal-length routes; the insertion
        // order tie-break must pick the same one every run.
        let fixture = Fixture::parse(&["....", "....", "....", "...."]);
        let grid = fixture.view();
        let start = CellCoord::new(0, 0);
        let goal = CellCoord::new(3, 3);

        let mut first_finder = Pathfinder::new();
        let mut second_finder = Pathfinder::new();
        let first = first_finder.find_path(grid, start, goal);
        let second = second_finder.find_path(grid, start, goal);

        assert_eq!(first.len(), 6);
        assert_eq!(first, second);
    }
}
