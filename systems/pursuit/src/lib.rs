#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-frame pursuit controller that drives agents through their
//! patrol/chase/dead state machine.
//!
//! The system is pure with respect to the world: it consumes event streams
//! and immutable views and responds exclusively with command batches. Plans
//! (path plus cursor) and the random source are private to the system, so
//! sharing one grid across many agents never shares mutable search state.

use std::collections::BTreeMap;
use std::time::Duration;

use maze_pursuit_core::{
    AgentId, AgentSnapshot, AgentState, AgentView, Command, Direction, Event, GridView, Path,
    PursuitConfig, WorldPosition,
};
use maze_pursuit_system_movement as movement;
use maze_pursuit_system_pathfinding::Pathfinder;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Pure system that reacts to world events and emits pursuit commands.
#[derive(Debug)]
pub struct Pursuit {
    config: PursuitConfig,
    pathfinder: Pathfinder,
    plans: BTreeMap<AgentId, Plan>,
    rng: ChaCha8Rng,
}

#[derive(Debug)]
struct Plan {
    path: Path,
    cursor: usize,
}

impl Plan {
    fn exhausted(&self) -> bool {
        self.cursor >= self.path.len()
    }
}

impl Pursuit {
    /// Creates a new pursuit system seeded for reproducible direction draws.
    #[must_use]
    pub fn new(config: PursuitConfig, seed: u64) -> Self {
        Self {
            config,
            pathfinder: Pathfinder::new(),
            plans: BTreeMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Consumes world events and immutable views to emit pursuit commands.
    ///
    /// One full behavioural update runs per `TimeAdvanced` event: detection,
    /// state transitions, path (re)planning, and a single clamped movement
    /// step per agent. A path search always completes within the same call.
    pub fn handle(
        &mut self,
        events: &[Event],
        agent_view: &AgentView,
        grid_view: GridView<'_>,
        target: Option<WorldPosition>,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::MazeConfigured { .. } => self.plans.clear(),
                Event::AgentDied { agent_id, .. } => {
                    let _ = self.plans.remove(agent_id);
                }
                _ => {}
            }
        }

        let Some(target) = target else {
            return;
        };

        for event in events {
            let Event::TimeAdvanced { dt } = event else {
                continue;
            };

            self.prune_stale_plans(agent_view);
            for agent in agent_view.iter() {
                self.tick_agent(agent, grid_view, target, *dt, out);
            }
        }
    }

    fn prune_stale_plans(&mut self, agent_view: &AgentView) {
        let live: Vec<AgentId> = agent_view.iter().map(|agent| agent.id).collect();
        self.plans.retain(|agent_id, _| live.contains(agent_id));
    }

    fn tick_agent(
        &mut self,
        agent: &AgentSnapshot,
        grid: GridView<'_>,
        target: WorldPosition,
        dt: Duration,
        out: &mut Vec<Command>,
    ) {
        if agent.state.is_terminal() {
            return;
        }

        let desired = self.desired_state(agent, target);
        if desired != agent.state {
            // Either transition discards the active plan: entering Chasing
            // forces a fresh search this very tick, and returning to
            // Patrolling never resumes a chase path.
            let _ = self.plans.remove(&agent.id);
            out.push(Command::SetAgentState {
                agent_id: agent.id,
                state: desired,
            });
        }

        match desired {
            AgentState::Patrolling => self.patrol(agent, grid, dt, out),
            AgentState::Chasing => self.chase(agent, grid, target, dt, out),
            AgentState::Dead => {}
        }
    }

    /// Detection verdict folded into the one legal non-terminal transition.
    ///
    /// The boundary is inclusive: a target sitting exactly at the detection
    /// radius is considered detected.
    fn desired_state(&self, agent: &AgentSnapshot, target: WorldPosition) -> AgentState {
        let radius = self.config.detection_radius();
        if agent.position.distance_squared(target) <= radius * radius {
            AgentState::Chasing
        } else {
            AgentState::Patrolling
        }
    }

    fn patrol(
        &mut self,
        agent: &AgentSnapshot,
        grid: GridView<'_>,
        dt: Duration,
        out: &mut Vec<Command>,
    ) {
        if !movement::try_step(agent.position, agent.facing, grid, self.config.tile_length) {
            let step = self.config.speed * dt.as_secs_f32();
            out.push(Command::MoveAgent {
                agent_id: agent.id,
                position: movement::advance(agent.position, agent.facing, step),
                facing: agent.facing,
            });
            return;
        }

        if let Some(facing) = self.pick_patrol_facing(agent, grid) {
            out.push(Command::SetAgentFacing {
                agent_id: agent.id,
                facing,
            });
        }
    }

    /// Draws a replacement patrol facing, bounded to a fixed attempt count.
    ///
    /// A fully enclosed agent exhausts the retries and stays put for the
    /// frame instead of spinning forever.
    fn pick_patrol_facing(
        &mut self,
        agent: &AgentSnapshot,
        grid: GridView<'_>,
    ) -> Option<Direction> {
        for _ in 0..self.config.direction_retry_limit {
            let candidate = Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())];
            if candidate == agent.facing {
                continue;
            }
            if movement::try_step(agent.position, candidate, grid, self.config.tile_length) {
                continue;
            }

            return Some(candidate);
        }

        None
    }

    fn chase(
        &mut self,
        agent: &AgentSnapshot,
        grid: GridView<'_>,
        target: WorldPosition,
        dt: Duration,
        out: &mut Vec<Command>,
    ) {
        let needs_plan = self
            .plans
            .get(&agent.id)
            .map_or(true, |plan| plan.exhausted());
        if needs_plan {
            let tile_length = self.config.tile_length;
            let endpoints = agent
                .position
                .cell(tile_length)
                .zip(target.cell(tile_length));
            let path = endpoints.map_or_else(Path::default, |(start, goal)| {
                self.pathfinder.find_path(grid, start, goal)
            });
            let _ = self.plans.insert(agent.id, Plan { path, cursor: 0 });
        }

        let Some(node) = self
            .plans
            .get(&agent.id)
            .and_then(|plan| plan.path.get(plan.cursor))
        else {
            // No path exists; freezing in place is the valid steady state
            // and the next tick attempts a fresh search.
            return;
        };

        if !grid.is_walkable(node) {
            // The terrain changed under a planner-approved step. Re-face
            // with the axis bias and discard the plan; the next tick then
            // routes around the obstacle with a single fresh search.
            let facing = self.biased_chase_facing(agent.position, target);
            out.push(Command::SetAgentFacing {
                agent_id: agent.id,
                facing,
            });
            let _ = self.plans.remove(&agent.id);
            return;
        }

        let outcome = movement::step_toward(
            agent.position,
            node.center(self.config.tile_length),
            self.config.speed,
            dt,
            self.config.arrival_tolerance_sq,
        );
        if outcome.position != agent.position {
            let facing =
                movement::dominant_facing(agent.position, outcome.position).unwrap_or(agent.facing);
            out.push(Command::MoveAgent {
                agent_id: agent.id,
                position: outcome.position,
                facing,
            });
        }
        if outcome.arrived {
            if let Some(plan) = self.plans.get_mut(&agent.id) {
                plan.cursor += 1;
            }
        }
    }

    /// Weighted facing choice after a blocked chase step: the configured
    /// bias selects the axis that closes distance to the target, the
    /// remainder the orthogonal axis.
    fn biased_chase_facing(&mut self, position: WorldPosition, target: WorldPosition) -> Direction {
        let horizontal = if target.x() > position.x() {
            Direction::East
        } else {
            Direction::West
        };
        let vertical = if target.y() > position.y() {
            Direction::South
        } else {
            Direction::North
        };

        if self.rng.gen::<f32>() < self.config.chase_axis_bias {
            horizontal
        } else {
            vertical
        }
    }
}
