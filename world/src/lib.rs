#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Pursuit.
//!
//! The world owns the maze walkability grid, the agents, the pursued
//! target's position, and the simulation clock. All mutation flows through
//! [`apply`]; systems observe the world exclusively through the read-only
//! [`query`] module and react by submitting new commands.

use std::time::Duration;

use maze_pursuit_core::{
    AgentId, AgentState, CellCoord, Command, Direction, Event, PursuitConfig, SpawnError,
    WALL_TILE_CODE, WorldPosition,
};

const FACING_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;

const DEFAULT_GRID_COLUMNS: u32 = 10;
const DEFAULT_GRID_ROWS: u32 = 10;

/// Dense walkability grid built from an externally loaded tile layout.
#[derive(Clone, Debug)]
struct MazeGrid {
    columns: u32,
    rows: u32,
    walkable: Vec<bool>,
}

impl MazeGrid {
    fn open(columns: u32, rows: u32) -> Self {
        let cell_count = cell_count(columns, rows);
        Self {
            columns,
            rows,
            walkable: vec![true; cell_count],
        }
    }

    fn from_tiles(columns: u32, rows: u32, tiles: &[i32]) -> Self {
        let cell_count = cell_count(columns, rows);
        let mut walkable = vec![false; cell_count];
        for (index, slot) in walkable.iter_mut().enumerate() {
            // Layouts shorter than the grid leave the remainder as walls.
            *slot = tiles
                .get(index)
                .map_or(false, |code| *code != WALL_TILE_CODE);
        }

        Self {
            columns,
            rows,
            walkable,
        }
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

    fn is_walkable(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .map_or(false, |index| self.walkable[index])
    }

    fn set_blocked(&mut self, cell: CellCoord, blocked: bool) -> bool {
        match self.index(cell) {
            Some(index) => {
                self.walkable[index] = !blocked;
                true
            }
            None => false,
        }
    }
}

fn cell_count(columns: u32, rows: u32) -> usize {
    let count = u64::from(columns) * u64::from(rows);
    usize::try_from(count).unwrap_or(0)
}

#[derive(Clone, Debug)]
struct Agent {
    id: AgentId,
    position: WorldPosition,
    facing: Direction,
    state: AgentState,
    died_at: Option<Duration>,
}

/// Represents the authoritative Maze Pursuit world state.
#[derive(Debug)]
pub struct World {
    config: PursuitConfig,
    maze: MazeGrid,
    agents: Vec<Agent>,
    target: Option<WorldPosition>,
    clock: Duration,
    next_agent_id: u32,
    facing_seed: u64,
}

impl World {
    /// Creates a new world with default tuning and a fully open default grid.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PursuitConfig::default())
    }

    /// Creates a new world with the provided tuning surface.
    #[must_use]
    pub fn with_config(config: PursuitConfig) -> Self {
        Self {
            config,
            maze: MazeGrid::open(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS),
            agents: Vec::new(),
            target: None,
            clock: Duration::ZERO,
            next_agent_id: 0,
            facing_seed: FACING_SEED,
        }
    }

    fn agent_mut(&mut self, agent_id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|agent| agent.id == agent_id)
    }

    fn spawn_error(&self, cell: CellCoord) -> Option<SpawnError> {
        if self.target.is_none() {
            return Some(SpawnError::TargetMissing);
        }
        if cell.column() >= self.maze.columns || cell.row() >= self.maze.rows {
            return Some(SpawnError::OutOfBounds);
        }
        if !self.maze.is_walkable(cell) {
            return Some(SpawnError::Blocked);
        }

        None
    }

    fn next_facing(&mut self) -> Direction {
        self.facing_seed = next_random(self.facing_seed);
        let index = (self.facing_seed >> 32) as usize % Direction::ALL.len();
        Direction::ALL[index]
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureMaze {
            columns,
            rows,
            tiles,
        } => {
            world.maze = MazeGrid::from_tiles(columns, rows, &tiles);
            world.agents.clear();
            out_events.push(Event::MazeConfigured { columns, rows });
        }
        Command::SetCellBlocked { cell, blocked } => {
            if world.maze.set_blocked(cell, blocked) {
                out_events.push(Event::CellChanged { cell, blocked });
            }
        }
        Command::SetTargetPosition { position } => {
            world.target = Some(position);
            out_events.push(Event::TargetMoved { position });
        }
        Command::SpawnAgent { cell } => {
            if let Some(reason) = world.spawn_error(cell) {
                out_events.push(Event::AgentSpawnRejected { cell, reason });
                return;
            }

            let agent_id = AgentId::new(world.next_agent_id);
            world.next_agent_id = world.next_agent_id.saturating_add(1);
            let facing = world.next_facing();
            world.agents.push(Agent {
                id: agent_id,
                position: cell.center(world.config.tile_length),
                facing,
                state: AgentState::Patrolling,
                died_at: None,
            });
            out_events.push(Event::AgentSpawned {
                agent_id,
                cell,
                facing,
            });
        }
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::MoveAgent {
            agent_id,
            position,
            facing,
        } => {
            if let Some(agent) = world.agent_mut(agent_id) {
                if agent.state.is_terminal() {
                    return;
                }

                let from = agent.position;
                agent.position = position;
                agent.facing = facing;
                out_events.push(Event::AgentMoved {
                    agent_id,
                    from,
                    to: position,
                    facing,
                });
            }
        }
        Command::SetAgentFacing { agent_id, facing } => {
            if let Some(agent) = world.agent_mut(agent_id) {
                if agent.state.is_terminal() {
                    return;
                }

                agent.facing = facing;
                out_events.push(Event::AgentTurned { agent_id, facing });
            }
        }
        Command::SetAgentState { agent_id, state } => {
            // Dead is entered exclusively through KillAgent.
            if state.is_terminal() {
                return;
            }

            if let Some(agent) = world.agent_mut(agent_id) {
                if agent.state.is_terminal() || agent.state == state {
                    return;
                }

                let from = agent.state;
                agent.state = state;
                out_events.push(Event::AgentStateChanged {
                    agent_id,
                    from,
                    to: state,
                });
            }
        }
        Command::KillAgent { agent_id } => {
            let clock = world.clock;
            if let Some(agent) = world.agent_mut(agent_id) {
                if agent.state.is_terminal() {
                    return;
                }

                agent.state = AgentState::Dead;
                agent.died_at = Some(clock);
                out_events.push(Event::AgentDied {
                    agent_id,
                    at: clock,
                });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use maze_pursuit_core::{AgentSnapshot, AgentView, GridView, PursuitConfig, WorldPosition};

    /// Provides read-only access to the tuning surface the world was built with.
    #[must_use]
    pub fn config(world: &World) -> &PursuitConfig {
        &world.config
    }

    /// Exposes a read-only view of the dense walkability grid.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        GridView::new(&world.maze.walkable, world.maze.columns, world.maze.rows)
    }

    /// Captures a read-only view of the agents inhabiting the maze.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        let snapshots: Vec<AgentSnapshot> = world
            .agents
            .iter()
            .map(|agent| AgentSnapshot {
                id: agent.id,
                position: agent.position,
                facing: agent.facing,
                state: agent.state,
                died_at: agent.died_at,
            })
            .collect();
        AgentView::from_snapshots(snapshots)
    }

    /// Current world position of the pursued target, if one was configured.
    #[must_use]
    pub fn target_position(world: &World) -> Option<WorldPosition> {
        world.target
    }

    /// Total simulated time accumulated by `Tick` commands.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }
}

fn next_random(state: u64) -> u64 {
    state.wrapping_mul(636_413_622_384_679_3005).wrapping_add(1)
}
