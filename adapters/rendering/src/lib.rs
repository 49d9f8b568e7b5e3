#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Maze Pursuit adapters.
//!
//! This crate translates world snapshots into backend-agnostic scene
//! descriptions: which animation set each agent should play, where sprites
//! sit in world space, and when a dead agent's terminal animation has
//! finished and further drawing must be suppressed. Concrete backends plug
//! in through [`RenderingBackend`].

use std::time::Duration;

use anyhow::Result as AnyResult;
use glam::Vec2;
use maze_pursuit_core::{
    AgentId, AgentSnapshot, AgentState, AgentView, CellCoord, Direction, GridView, PursuitConfig,
};

/// Wall-clock length of the terminal death animation.
///
/// Once this much simulated time has elapsed past the death instant, the
/// agent's sprite is suppressed entirely.
pub const DEATH_ANIMATION_DURATION: Duration = Duration::from_millis(600);

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Animation set a backend should play for an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationSet {
    /// Directional walk cycle used while patrolling and chasing.
    Walking(Direction),
    /// One-shot terminal animation played once after death.
    Dying,
}

impl AnimationSet {
    /// Selects the animation set for an agent snapshot.
    #[must_use]
    pub fn for_agent(agent: &AgentSnapshot) -> Self {
        match agent.state {
            AgentState::Dead => AnimationSet::Dying,
            AgentState::Patrolling | AgentState::Chasing => AnimationSet::Walking(agent.facing),
        }
    }
}

/// Sprite description for a single agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentSprite {
    /// Identifier of the agent the sprite belongs to.
    pub id: AgentId,
    /// Sprite anchor position in world units.
    pub position: Vec2,
    /// Animation set the backend should play this frame.
    pub animation: AnimationSet,
    /// Behavioural state, exposed for presentation-side effects.
    pub state: AgentState,
    /// Whether the sprite should be drawn at all. Dead agents stay visible
    /// while the death animation plays and disappear afterwards.
    pub visible: bool,
}

/// Static maze geometry prepared for drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of tile columns in the maze.
    pub columns: u32,
    /// Number of tile rows in the maze.
    pub rows: u32,
    /// Side length of a square tile in world units.
    pub tile_length: f32,
    /// Cells that should be drawn as walls.
    pub wall_cells: Vec<CellCoord>,
    /// Fill color for wall cells.
    pub wall_color: Color,
}

impl GridPresentation {
    /// Derives the wall geometry from a walkability view.
    #[must_use]
    pub fn from_grid(grid: GridView<'_>, tile_length: f32, wall_color: Color) -> Self {
        let (columns, rows) = grid.dimensions();
        let mut wall_cells = Vec::new();
        for row in 0..rows {
            for column in 0..columns {
                let cell = CellCoord::new(column, row);
                if !grid.is_walkable(cell) {
                    wall_cells.push(cell);
                }
            }
        }

        Self {
            columns,
            rows,
            tile_length,
            wall_cells,
            wall_color,
        }
    }

    /// Total width of the maze in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Total height of the maze in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }
}

/// Complete description of a frame ready for presentation.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Static maze geometry.
    pub grid: GridPresentation,
    /// Agent sprites in deterministic id order.
    pub agents: Vec<AgentSprite>,
}

/// Builds a scene from world snapshots.
///
/// `clock` is the world's accumulated simulation time; it drives the
/// suppression of finished death animations.
#[must_use]
pub fn build_scene(
    grid: GridView<'_>,
    agents: &AgentView,
    config: &PursuitConfig,
    clock: Duration,
    wall_color: Color,
) -> Scene {
    let sprites = agents
        .iter()
        .map(|agent| AgentSprite {
            id: agent.id,
            position: Vec2::new(agent.position.x(), agent.position.y()),
            animation: AnimationSet::for_agent(agent),
            state: agent.state,
            visible: agent.died_at.map_or(true, |died_at| {
                clock.saturating_sub(died_at) < DEATH_ANIMATION_DURATION
            }),
        })
        .collect();

    Scene {
        grid: GridPresentation::from_grid(grid, config.tile_length, wall_color),
        agents: sprites,
    }
}

/// Rendering backend capable of presenting Maze Pursuit scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame
    /// delta and may rebuild the scene before it is rendered, allowing
    /// adapters to animate world snapshots deterministically.
    fn run<F>(self, scene: Scene, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) + 'static;
}
