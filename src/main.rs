//! Command-line runner for the headless platforming sandbox.
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::{Quat, Vec2, Vec3};
use log::info;

use grapnel::sandbox::Sandbox;
use grapnel::stats::Validate;
use grapnel::{
    init_logging, ActorId, Body, ClimbSurface, Enemy, EnemyStateKind, GrappleTargetId,
    InputFrame, Movable, Player, PlayerStateKind, StatsProvider, Tag, TapHoldClassifier,
};
use serde::de::DeserializeOwned;

/// Runs a scripted platforming scenario in the headless sandbox
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Number of fixed ticks to simulate
    #[arg(short, long, default_value_t = 400)]
    ticks: u32,

    /// Tick length in seconds
    #[arg(long, default_value_t = 0.02)]
    dt: f32,

    /// JSON stats document for the player
    #[arg(long)]
    player_stats: Option<PathBuf>,

    /// JSON stats document for the enemy
    #[arg(long)]
    enemy_stats: Option<PathBuf>,
}

fn load_stats<T>(path: Option<&PathBuf>) -> Result<StatsProvider<T>>
where
    T: Default + Validate + DeserializeOwned,
{
    let Some(file) = path else {
        return Ok(StatsProvider::default());
    };
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("reading stats from {}", file.display()))?;
    StatsProvider::from_json(&json).with_context(|| format!("loading {}", file.display()))
}

/// Walks into the wall, climbs, lets go, then taps the grapple.
fn scripted_input(time: f32, classifier: &mut TapHoldClassifier, dt: f32) -> InputFrame {
    let mut frame = InputFrame::default();
    if time < 5.0 {
        frame = frame
            .with_movement(Vec3::Z)
            .with_stick(Vec2::new(0.0, 1.0));
    }
    if (5.0..5.02).contains(&time) {
        frame = frame.with_jump();
    }
    let grapple_down = (6.5..6.6).contains(&time);
    if let Some(press) = classifier.update(grapple_down, dt) {
        frame = frame
            .with_grapple(press)
            .with_look(Vec3::new(0.0, 0.0, 1.0));
    }
    frame
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut sandbox = Sandbox::new(args.dt);
    sandbox.add_wall(
        ClimbSurface::new(
            Vec3::new(0.0, 3.0, 8.5),
            Quat::from_rotation_y(std::f32::consts::PI),
            Vec3::new(3.0, 3.0, 0.5),
        ),
        true,
    );
    sandbox
        .world
        .add_grapple_target(GrappleTargetId(1), Vec3::new(0.0, 12.0, 4.0), 0.5);

    let player_stats = load_stats(args.player_stats.as_ref())?;
    let enemy_stats = load_stats(args.enemy_stats.as_ref())?;

    let mut player =
        Player::new(ActorId(1), Body::new(Vec3::new(0.0, 1.0, 0.0), 0.5, 2.0), player_stats)
            .into_controller();
    let mut enemy =
        Enemy::new(ActorId(2), Body::new(Vec3::new(6.0, 1.0, 0.0), 0.5, 2.0), enemy_stats)
            .into_controller();
    sandbox.spawn(&mut player, Tag::Player, PlayerStateKind::Idle)?;
    sandbox.spawn(&mut enemy, Tag::Enemy, EnemyStateKind::Idle)?;

    let mut classifier = TapHoldClassifier::new(player.host().stats().grapple_hold_threshold);
    for step in 0..args.ticks {
        #[expect(clippy::cast_precision_loss, reason = "tick counts stay far below 2^24")]
        let time = step as f32 * args.dt;
        let input = scripted_input(time, &mut classifier, args.dt);
        sandbox
            .tick(&mut player, &input)
            .with_context(|| format!("player tick {step}"))?;
        sandbox
            .tick(&mut enemy, &InputFrame::default())
            .with_context(|| format!("enemy tick {step}"))?;
        sandbox.resolve_contact(&mut enemy, &mut player);
    }

    for event in sandbox.events.events() {
        info!("{event:?}");
    }
    info!(
        "player ended in {:?} at {}",
        player.current(),
        player.host().body().position
    );
    info!(
        "enemy ended in {:?} at {}",
        enemy.current(),
        enemy.host().body().position
    );
    Ok(())
}
