#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Continuous-movement and collision primitives shared by the pursuit system.
//!
//! World coordinates grow eastward along x and southward along y, so
//! [`Direction::North`] shrinks y and [`Direction::South`] grows it, matching
//! the row ordering of the walkability grid.

use std::time::Duration;

use maze_pursuit_core::{CellCoord, Direction, GridView, WorldPosition};

/// Result of advancing a position toward a world-space destination.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepOutcome {
    /// Position after the clamped step.
    pub position: WorldPosition,
    /// Whether the squared distance to the destination fell under tolerance.
    pub arrived: bool,
}

/// Advances `position` toward `target` by at most `speed * dt`.
///
/// Each axis is clamped independently so a single step never overshoots the
/// destination; a step large enough to cover the remaining distance lands
/// exactly on the target.
#[must_use]
pub fn step_toward(
    position: WorldPosition,
    target: WorldPosition,
    speed: f32,
    dt: Duration,
    arrival_tolerance_sq: f32,
) -> StepOutcome {
    let diff_x = target.x() - position.x();
    let diff_y = target.y() - position.y();
    let magnitude = (diff_x * diff_x + diff_y * diff_y).sqrt();

    let next = if magnitude > 0.0 {
        let step = speed * dt.as_secs_f32();
        let mut move_x = step * (diff_x / magnitude);
        let mut move_y = step * (diff_y / magnitude);
        if move_x.abs() > diff_x.abs() {
            move_x = diff_x;
        }
        if move_y.abs() > diff_y.abs() {
            move_y = diff_y;
        }

        WorldPosition::new(position.x() + move_x, position.y() + move_y)
    } else {
        position
    };

    StepOutcome {
        position: next,
        arrived: next.distance_squared(target) < arrival_tolerance_sq,
    }
}

/// Reports whether a step from `position` in `direction` is blocked.
///
/// The check projects the tile adjacent to the current one in the travel
/// direction and fails closed: walls, out-of-bounds tiles, and positions
/// outside the grid all count as blocked.
#[must_use]
pub fn try_step(
    position: WorldPosition,
    direction: Direction,
    grid: GridView<'_>,
    tile_length: f32,
) -> bool {
    let Some(cell) = position.cell(tile_length) else {
        return true;
    };
    let Some(next) = cell.neighbor(direction) else {
        return true;
    };

    !grid.is_walkable(next)
}

/// Displaces a position by `distance` world units along a cardinal direction.
#[must_use]
pub fn advance(position: WorldPosition, direction: Direction, distance: f32) -> WorldPosition {
    match direction {
        Direction::North => WorldPosition::new(position.x(), position.y() - distance),
        Direction::South => WorldPosition::new(position.x(), position.y() + distance),
        Direction::East => WorldPosition::new(position.x() + distance, position.y()),
        Direction::West => WorldPosition::new(position.x() - distance, position.y()),
    }
}

/// Facing derived from the dominant axis of travel between two positions.
///
/// Equal axis magnitudes resolve to the vertical facing; identical positions
/// yield `None` so callers can keep the previous facing.
#[must_use]
pub fn dominant_facing(from: WorldPosition, to: WorldPosition) -> Option<Direction> {
    let diff_x = to.x() - from.x();
    let diff_y = to.y() - from.y();
    if diff_x == 0.0 && diff_y == 0.0 {
        return None;
    }

    if diff_x.abs() > diff_y.abs() {
        Some(if diff_x > 0.0 {
            Direction::East
        } else {
            Direction::West
        })
    } else {
        Some(if diff_y > 0.0 {
            Direction::South
        } else {
            Direction::North
        })
    }
}

/// Next grid cell a step in `direction` would enter, if it stays on the grid.
#[must_use]
pub fn projected_cell(
    position: WorldPosition,
    direction: Direction,
    tile_length: f32,
) -> Option<CellCoord> {
    position
        .cell(tile_length)
        .and_then(|cell| cell.neighbor(direction))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILE: f32 = 16.0;
    const TOLERANCE_SQ: f32 = 2.0;

    #[test]
    fn oversized_step_lands_exactly_on_target() {
        let origin = WorldPosition::new(3.0, 4.0);
        let target = WorldPosition::new(4.0, 4.0);

        // One unit away with five units of travel available.
        let outcome = step_toward(origin, target, 5.0, Duration::from_secs(1), TOLERANCE_SQ);

        assert_eq!(outcome.position, target);
        assert!(outcome.arrived);
    }

    #[test]
    fn step_never_overshoots_along_either_axis() {
        let origin = WorldPosition::new(0.0, 0.0);
        let target = WorldPosition::new(3.0, 4.0);

        let outcome = step_toward(origin, target, 100.0, Duration::from_secs(1), TOLERANCE_SQ);

        assert_eq!(outcome.position, target);
        assert!(outcome.arrived);
    }

    #[test]
    fn short_step_moves_along_the_unit_vector() {
        let origin = WorldPosition::new(0.0, 0.0);
        let target = WorldPosition::new(30.0, 40.0);

        let outcome = step_toward(origin, target, 5.0, Duration::from_secs(1), TOLERANCE_SQ);

        assert!((outcome.position.x() - 3.0).abs() < 1e-5);
        assert!((outcome.position.y() - 4.0).abs() < 1e-5);
        assert!(!outcome.arrived);
    }

    #[test]
    fn zero_distance_reports_arrival_without_motion() {
        let spot = WorldPosition::new(7.5, 7.5);
        let outcome = step_toward(spot, spot, 40.0, Duration::from_millis(16), TOLERANCE_SQ);
        assert_eq!(outcome.position, spot);
        assert!(outcome.arrived);
    }

    fn two_by_two_with_east_wall() -> Vec<bool> {
        // Columns 0..2, rows 0..2; cell (1, 0) is a wall.
        vec![true, false, true, true]
    }

    #[test]
    fn try_step_blocks_walls_and_grid_edges() {
        let walkable = two_by_two_with_east_wall();
        let grid = GridView::new(&walkable, 2, 2);
        let center = CellCoord::new(0, 0).center(TILE);

        assert!(try_step(center, Direction::East, grid, TILE));
        assert!(try_step(center, Direction::North, grid, TILE));
        assert!(try_step(center, Direction::West, grid, TILE));
        assert!(!try_step(center, Direction::South, grid, TILE));
    }

    #[test]
    fn try_step_blocks_positions_off_the_grid() {
        let walkable = two_by_two_with_east_wall();
        let grid = GridView::new(&walkable, 2, 2);
        let outside = WorldPosition::new(-4.0, 8.0);
        assert!(try_step(outside, Direction::East, grid, TILE));
    }

    #[test]
    fn advance_matches_direction_axes() {
        let origin = WorldPosition::new(10.0, 10.0);
        assert_eq!(
            advance(origin, Direction::North, 4.0),
            WorldPosition::new(10.0, 6.0)
        );
        assert_eq!(
            advance(origin, Direction::South, 4.0),
            WorldPosition::new(10.0, 14.0)
        );
        assert_eq!(
            advance(origin, Direction::East, 4.0),
            WorldPosition::new(14.0, 10.0)
        );
        assert_eq!(
            advance(origin, Direction::West, 4.0),
            WorldPosition::new(6.0, 10.0)
        );
    }

    #[test]
    fn dominant_facing_prefers_the_longer_axis() {
        let from = WorldPosition::new(0.0, 0.0);
        assert_eq!(
            dominant_facing(from, WorldPosition::new(5.0, 2.0)),
            Some(Direction::East)
        );
        assert_eq!(
            dominant_facing(from, WorldPosition::new(-5.0, 2.0)),
            Some(Direction::West)
        );
        assert_eq!(
            dominant_facing(from, WorldPosition::new(2.0, 5.0)),
            Some(Direction::South)
        );
        assert_eq!(
            dominant_facing(from, WorldPosition::new(2.0, -5.0)),
            Some(Direction::North)
        );
        // Ties resolve vertically; stillness keeps the previous facing.
        assert_eq!(
            dominant_facing(from, WorldPosition::new(3.0, 3.0)),
            Some(Direction::South)
        );
        assert_eq!(dominant_facing(from, from), None);
    }

    #[test]
    fn projected_cell_follows_the_facing() {
        let center = CellCoord::new(1, 1).center(TILE);
        assert_eq!(
            projected_cell(center, Direction::North, TILE),
            Some(CellCoord::new(1, 0))
        );
        assert_eq!(
            projected_cell(CellCoord::new(0, 0).center(TILE), Direction::West, TILE),
            None
        );
    }
}
