#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Pursuit engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. The pursuit system consumes event streams,
//! queries immutable snapshots, and responds exclusively with new command
//! batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tile-type code that marks a maze cell as an impassable wall.
///
/// Level layouts arrive as row-major arrays of tile codes; every code other
/// than this one is walkable.
pub const WALL_TILE_CODE: i32 = 0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the maze from an externally loaded tile layout.
    ConfigureMaze {
        /// Number of tile columns laid out in the grid.
        columns: u32,
        /// Number of tile rows laid out in the grid.
        rows: u32,
        /// Row-major tile-type codes; [`WALL_TILE_CODE`] marks walls.
        tiles: Vec<i32>,
    },
    /// Applies a dynamic terrain change to a single cell.
    SetCellBlocked {
        /// Cell whose walkability is being changed.
        cell: CellCoord,
        /// Whether the cell becomes impassable.
        blocked: bool,
    },
    /// Updates the world position of the pursued target.
    SetTargetPosition {
        /// Current world coordinates of the target.
        position: WorldPosition,
    },
    /// Requests that a new agent spawn at the center of the provided cell.
    SpawnAgent {
        /// Cell the agent should occupy after spawning.
        cell: CellCoord,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that an agent move to a new continuous position.
    MoveAgent {
        /// Identifier of the agent attempting to move.
        agent_id: AgentId,
        /// Destination position expressed in world units.
        position: WorldPosition,
        /// Facing derived from the dominant axis of travel.
        facing: Direction,
    },
    /// Requests that an agent re-face without moving.
    SetAgentFacing {
        /// Identifier of the agent turning in place.
        agent_id: AgentId,
        /// Direction the agent should face.
        facing: Direction,
    },
    /// Requests a patrol/chase transition for an agent.
    SetAgentState {
        /// Identifier of the agent changing state.
        agent_id: AgentId,
        /// State the agent should enter.
        state: AgentState,
    },
    /// Kills an agent unconditionally, from any state.
    KillAgent {
        /// Identifier of the agent to kill.
        agent_id: AgentId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the maze grid was rebuilt from a layout.
    MazeConfigured {
        /// Number of tile columns in the rebuilt grid.
        columns: u32,
        /// Number of tile rows in the rebuilt grid.
        rows: u32,
    },
    /// Confirms a dynamic walkability change to a single cell.
    CellChanged {
        /// Cell whose walkability changed.
        cell: CellCoord,
        /// Whether the cell is now impassable.
        blocked: bool,
    },
    /// Announces that the pursued target moved.
    TargetMoved {
        /// New world coordinates of the target.
        position: WorldPosition,
    },
    /// Confirms that an agent was spawned into the maze.
    AgentSpawned {
        /// Identifier assigned to the new agent.
        agent_id: AgentId,
        /// Cell the agent occupies after spawning.
        cell: CellCoord,
        /// Randomized facing assigned at spawn.
        facing: Direction,
    },
    /// Reports that a spawn request was rejected.
    AgentSpawnRejected {
        /// Cell provided in the spawn request.
        cell: CellCoord,
        /// Specific reason the spawn failed.
        reason: SpawnError,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an agent moved to a new position.
    AgentMoved {
        /// Identifier of the agent that moved.
        agent_id: AgentId,
        /// Position the agent occupied before the move.
        from: WorldPosition,
        /// Position the agent occupies after the move.
        to: WorldPosition,
        /// Facing after the move.
        facing: Direction,
    },
    /// Confirms that an agent re-faced without moving.
    AgentTurned {
        /// Identifier of the agent that turned.
        agent_id: AgentId,
        /// Direction the agent now faces.
        facing: Direction,
    },
    /// Confirms a patrol/chase transition.
    AgentStateChanged {
        /// Identifier of the agent whose state changed.
        agent_id: AgentId,
        /// State the agent left.
        from: AgentState,
        /// State the agent entered.
        to: AgentState,
    },
    /// Announces that an agent entered the terminal dead state.
    AgentDied {
        /// Identifier of the agent that died.
        agent_id: AgentId,
        /// Simulation clock reading at the instant of death.
        at: Duration,
    },
}

/// Reasons an agent spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnError {
    /// No target position was configured; chase logic would dereference it
    /// every frame, so the absence is rejected at configuration time.
    TargetMissing,
    /// The requested cell lies outside the configured grid bounds.
    OutOfBounds,
    /// The requested cell is a wall.
    Blocked,
}

/// Cardinal movement directions available to agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All cardinal directions in a fixed, deterministic order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Returns the direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

/// Unique identifier assigned to an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// High-level behavioural state of an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    /// Wandering the maze along a randomly chosen facing.
    Patrolling,
    /// Following a planned path toward the detected target.
    Chasing,
    /// Terminal state; the agent no longer moves or transitions.
    Dead,
}

impl AgentState {
    /// Reports whether the state admits no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, AgentState::Dead)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// World-space center of the cell for a grid with the given tile length.
    #[must_use]
    pub fn center(self, tile_length: f32) -> WorldPosition {
        WorldPosition::new(
            (self.column as f32 + 0.5) * tile_length,
            (self.row as f32 + 0.5) * tile_length,
        )
    }

    /// Returns the adjacent cell in the provided direction, unless the step
    /// would leave the non-negative coordinate space.
    #[must_use]
    pub fn neighbor(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => self
                .row
                .checked_sub(1)
                .map(|row| CellCoord::new(self.column, row)),
            Direction::South => self
                .row
                .checked_add(1)
                .map(|row| CellCoord::new(self.column, row)),
            Direction::East => self
                .column
                .checked_add(1)
                .map(|column| CellCoord::new(column, self.row)),
            Direction::West => self
                .column
                .checked_sub(1)
                .map(|column| CellCoord::new(column, self.row)),
        }
    }
}

/// Continuous position expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    x: f32,
    y: f32,
}

impl WorldPosition {
    /// Creates a new world position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate in world units.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate in world units.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Squared Euclidean distance to another position.
    #[must_use]
    pub fn distance_squared(self, other: WorldPosition) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Grid cell containing this position for the given tile length.
    ///
    /// Positions with a negative coordinate lie outside the grid and yield
    /// `None`, matching the fail-closed walkability contract.
    #[must_use]
    pub fn cell(self, tile_length: f32) -> Option<CellCoord> {
        if tile_length <= 0.0 || self.x < 0.0 || self.y < 0.0 {
            return None;
        }

        let column = (self.x / tile_length).floor();
        let row = (self.y / tile_length).floor();
        if column > u32::MAX as f32 || row > u32::MAX as f32 {
            return None;
        }

        Some(CellCoord::new(column as u32, row as u32))
    }
}

/// Ordered sequence of cells produced by a path search.
///
/// The sequence excludes the start cell and ends at the goal. An empty path
/// means the goal is unreachable, or the start already coincides with it;
/// callers treat both as "nothing to follow".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    cells: Vec<CellCoord>,
}

impl Path {
    /// Creates a path from an ordered cell sequence.
    #[must_use]
    pub fn from_cells(cells: Vec<CellCoord>) -> Self {
        Self { cells }
    }

    /// Cells composing the path in travel order.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Number of cells in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the path contains no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at the provided cursor position, if the cursor is in range.
    #[must_use]
    pub fn get(&self, cursor: usize) -> Option<CellCoord> {
        self.cells.get(cursor).copied()
    }
}

/// Read-only view into the dense walkability grid.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    walkable: &'a [bool],
    columns: u32,
    rows: u32,
}

impl<'a> GridView<'a> {
    /// Captures a new grid view backed by the provided walkability slice.
    #[must_use]
    pub fn new(walkable: &'a [bool], columns: u32, rows: u32) -> Self {
        Self {
            walkable,
            columns,
            rows,
        }
    }

    /// Reports whether the cell can be traversed.
    ///
    /// Fails closed: out-of-bounds coordinates are never walkable.
    #[must_use]
    pub fn is_walkable(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .map_or(false, |index| self.walkable.get(index).copied().unwrap_or(false))
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Immutable representation of a single agent's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentSnapshot {
    /// Unique identifier assigned to the agent.
    pub id: AgentId,
    /// Continuous position of the agent in world units.
    pub position: WorldPosition,
    /// Direction the agent currently faces.
    pub facing: Direction,
    /// Behavioural state of the agent.
    pub state: AgentState,
    /// Simulation clock reading at the instant of death, once dead.
    pub died_at: Option<Duration>,
}

/// Read-only snapshot describing all agents within the maze.
#[derive(Clone, Debug, Default)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a new agent view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AgentSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured agent snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AgentSnapshot> {
        self.snapshots
    }
}

/// Aggregated tuning knobs controlling the pursuit behaviour.
#[derive(Clone, Debug, PartialEq)]
pub struct PursuitConfig {
    /// Side length of a single square tile expressed in world units.
    pub tile_length: f32,
    /// Detection radius measured in tiles; the boundary itself detects.
    pub detection_radius_tiles: f32,
    /// Movement speed in world units per second, shared by patrol and chase.
    pub speed: f32,
    /// Squared world-unit distance under which a path node counts as reached.
    pub arrival_tolerance_sq: f32,
    /// Probability of re-facing along the distance-reducing axis after a
    /// blocked chase step; the orthogonal axis receives the remainder.
    pub chase_axis_bias: f32,
    /// Maximum random draws when searching for an unblocked patrol facing
    /// before the agent stays put for the frame.
    pub direction_retry_limit: u32,
}

impl PursuitConfig {
    /// Detection radius converted into world units.
    #[must_use]
    pub fn detection_radius(&self) -> f32 {
        self.detection_radius_tiles * self.tile_length
    }
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            tile_length: 16.0,
            detection_radius_tiles: 4.0,
            speed: 40.0,
            arrival_tolerance_sq: 2.0,
            chase_axis_bias: 0.7,
            direction_retry_limit: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AgentId, AgentState, CellCoord, Direction, PursuitConfig, SpawnError};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn neighbor_fails_closed_at_coordinate_space_edge() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.neighbor(Direction::North), None);
        assert_eq!(corner.neighbor(Direction::West), None);
        assert_eq!(corner.neighbor(Direction::East), Some(CellCoord::new(1, 0)));
        assert_eq!(
            corner.neighbor(Direction::South),
            Some(CellCoord::new(0, 1))
        );
    }

    #[test]
    fn cell_centers_and_positions_invert() {
        let cell = CellCoord::new(3, 2);
        let center = cell.center(16.0);
        assert!((center.x() - 56.0).abs() < f32::EPSILON);
        assert!((center.y() - 40.0).abs() < f32::EPSILON);
        assert_eq!(center.cell(16.0), Some(cell));
    }

    #[test]
    fn negative_positions_have_no_cell() {
        assert_eq!(super::WorldPosition::new(-0.1, 4.0).cell(16.0), None);
        assert_eq!(super::WorldPosition::new(4.0, -0.1).cell(16.0), None);
    }

    #[test]
    fn opposite_directions_pair_up() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            assert_ne!(direction.opposite(), direction);
        }
    }

    #[test]
    fn only_dead_is_terminal() {
        assert!(AgentState::Dead.is_terminal());
        assert!(!AgentState::Patrolling.is_terminal());
        assert!(!AgentState::Chasing.is_terminal());
    }

    #[test]
    fn detection_radius_scales_with_tile_length() {
        let config = PursuitConfig::default();
        assert!((config.detection_radius() - 64.0).abs() < f32::EPSILON);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn agent_id_round_trips_through_bincode() {
        assert_round_trip(&AgentId::new(42));
    }

    #[test]
    fn agent_state_round_trips_through_bincode() {
        assert_round_trip(&AgentState::Chasing);
    }

    #[test]
    fn spawn_error_round_trips_through_bincode() {
        assert_round_trip(&SpawnError::TargetMissing);
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(5, 7));
    }
}
