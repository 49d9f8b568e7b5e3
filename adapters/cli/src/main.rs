#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless maze pursuit simulation.

mod layout_transfer;

use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use glam::Vec2;
use maze_pursuit_core::{AgentId, AgentState, CellCoord, Command, Event, PursuitConfig};
use maze_pursuit_rendering::{build_scene, Color};
use maze_pursuit_system_pursuit::Pursuit;
use maze_pursuit_world::{apply, query, World};

use crate::layout_transfer::MazeLayoutSnapshot;

const WALL_COLOR: Color = Color::from_rgb_u8(54, 57, 63);

/// Runs the pursuit simulation and prints agent activity to stdout.
#[derive(Debug, Parser)]
#[command(name = "maze-pursuit", version, about)]
struct Cli {
    /// Number of tile columns when no layout string is supplied.
    #[arg(long, default_value_t = 10)]
    columns: u32,
    /// Number of tile rows when no layout string is supplied.
    #[arg(long, default_value_t = 10)]
    rows: u32,
    /// Encoded maze layout; overrides the column and row flags.
    #[arg(long)]
    layout: Option<String>,
    /// Print the encoded layout of the configured maze and exit.
    #[arg(long, default_value_t = false)]
    export_layout: bool,
    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 400)]
    ticks: u64,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 100)]
    dt_ms: u64,
    /// Seed for the pursuit system's random draws.
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Column of the cell whose center hosts the pursued target.
    #[arg(long, default_value_t = 8)]
    target_column: u32,
    /// Row of the cell whose center hosts the pursued target.
    #[arg(long, default_value_t = 8)]
    target_row: u32,
    /// Column of the cell the agent spawns in.
    #[arg(long, default_value_t = 0)]
    spawn_column: u32,
    /// Row of the cell the agent spawns in.
    #[arg(long, default_value_t = 0)]
    spawn_row: u32,
    /// Ticks between status reports.
    #[arg(long, default_value_t = 25)]
    report_every: u64,
    /// Kill every living agent after this many ticks.
    #[arg(long)]
    kill_after_ticks: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = PursuitConfig::default();

    let (columns, rows, tiles) = match cli.layout.as_deref() {
        Some(encoded) => {
            let snapshot = MazeLayoutSnapshot::decode(encoded)
                .context("failed to decode the supplied maze layout")?;
            (snapshot.columns, snapshot.rows, snapshot.tiles)
        }
        None => {
            if cli.columns == 0 || cli.rows == 0 {
                bail!("the maze needs at least one column and one row");
            }
            let tile_count = cli.columns as usize * cli.rows as usize;
            (cli.columns, cli.rows, vec![1; tile_count])
        }
    };

    if cli.export_layout {
        let snapshot = MazeLayoutSnapshot {
            columns,
            rows,
            tile_length: config.tile_length,
            tiles,
        };
        println!("{}", snapshot.encode());
        return Ok(());
    }

    let mut world = World::with_config(config.clone());
    let mut pursuit = Pursuit::new(config.clone(), cli.seed);
    let mut pending_events = Vec::new();

    apply(
        &mut world,
        Command::ConfigureMaze {
            columns,
            rows,
            tiles,
        },
        &mut pending_events,
    );

    let target_cell = CellCoord::new(cli.target_column, cli.target_row);
    let target_position = target_cell.center(config.tile_length);
    apply(
        &mut world,
        Command::SetTargetPosition {
            position: target_position,
        },
        &mut pending_events,
    );

    let spawn_cell = CellCoord::new(cli.spawn_column, cli.spawn_row);
    apply(
        &mut world,
        Command::SpawnAgent { cell: spawn_cell },
        &mut pending_events,
    );
    let agent_id = spawned_agent(&pending_events)?;
    println!(
        "spawned agent {} at cell ({}, {}) in a {columns}x{rows} maze",
        agent_id.get(),
        spawn_cell.column(),
        spawn_cell.row()
    );

    let dt = Duration::from_millis(cli.dt_ms);
    let target_point = Vec2::new(target_position.x(), target_position.y());

    for tick in 1..=cli.ticks {
        if cli.kill_after_ticks == Some(tick) {
            let living: Vec<AgentId> = query::agent_view(&world)
                .iter()
                .filter(|agent| !agent.state.is_terminal())
                .map(|agent| agent.id)
                .collect();
            for id in living {
                apply(
                    &mut world,
                    Command::KillAgent { agent_id: id },
                    &mut pending_events,
                );
            }
        }

        apply(&mut world, Command::Tick { dt }, &mut pending_events);

        let mut commands = Vec::new();
        {
            let agent_view = query::agent_view(&world);
            let grid_view = query::grid_view(&world);
            let target = query::target_position(&world);
            pursuit.handle(
                &pending_events,
                &agent_view,
                grid_view,
                target,
                &mut commands,
            );
        }
        pending_events.clear();
        for command in commands {
            apply(&mut world, command, &mut pending_events);
        }

        if cli.report_every > 0 && tick % cli.report_every == 0 {
            report(&world, tick, target_point);
        }
    }

    let scene = build_scene(
        query::grid_view(&world),
        &query::agent_view(&world),
        query::config(&world),
        query::clock(&world),
        WALL_COLOR,
    );
    println!(
        "finished after {:.1}s of simulated time: {} wall cell(s), {} visible sprite(s)",
        query::clock(&world).as_secs_f32(),
        scene.grid.wall_cells.len(),
        scene.agents.iter().filter(|sprite| sprite.visible).count()
    );

    Ok(())
}

/// Extracts the spawned agent id, or fails with the rejection reason.
fn spawned_agent(events: &[Event]) -> anyhow::Result<AgentId> {
    for event in events {
        match event {
            Event::AgentSpawned { agent_id, .. } => return Ok(*agent_id),
            Event::AgentSpawnRejected { cell, reason } => bail!(
                "spawn at cell ({}, {}) was rejected: {reason:?}",
                cell.column(),
                cell.row()
            ),
            _ => {}
        }
    }
    bail!("the world emitted no spawn outcome");
}

fn report(world: &World, tick: u64, target_point: Vec2) {
    for agent in query::agent_view(world).iter() {
        let position = Vec2::new(agent.position.x(), agent.position.y());
        let distance = position.distance(target_point);
        let state = match agent.state {
            AgentState::Patrolling => "patrolling",
            AgentState::Chasing => "chasing",
            AgentState::Dead => "dead",
        };
        println!(
            "tick {tick:>5} | agent {} | {state:<10} | at ({:>6.1}, {:>6.1}) | {distance:>6.1} units from target",
            agent.id.get(),
            position.x,
            position.y,
        );
    }
}
