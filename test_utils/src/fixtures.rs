//! Convenience constructors for actors, paths and scenes used in tests.
use glam::{Quat, Vec3};

use grapnel::input::InputFrame;
use grapnel::path::{CatmullRom, Path};
use grapnel::sandbox::Sandbox;
use grapnel::state_machine::Controller;
use grapnel::stats::{EnemyStats, PlayerStats, StatsProvider};
use grapnel::{ActorId, Body, ClimbSurface, ControllerError, Enemy, PathId, Player};

/// Radius shared by the test capsules.
pub const TEST_RADIUS: f32 = 0.5;
/// Height shared by the test capsules.
pub const TEST_HEIGHT: f32 = 2.0;

/// A player controller standing at `position` with default stats.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use test_utils::player_at;
/// let player = player_at(1, Vec3::new(0.0, 1.0, 0.0));
/// assert_eq!(player.host().stats().top_speed, 6.0);
/// ```
#[must_use]
pub fn player_at(id: u32, position: Vec3) -> Controller<Player> {
    player_with(id, position, PlayerStats::default())
}

/// A player controller with custom stats.
#[must_use]
pub fn player_with(id: u32, position: Vec3, stats: PlayerStats) -> Controller<Player> {
    Player::new(
        ActorId(id),
        Body::new(position, TEST_RADIUS, TEST_HEIGHT),
        StatsProvider::single(stats),
    )
    .into_controller()
}

/// An enemy controller at `position` with default stats.
#[must_use]
pub fn enemy_at(id: u32, position: Vec3) -> Controller<Enemy> {
    enemy_with(id, position, EnemyStats::default())
}

/// An enemy controller with custom stats.
#[must_use]
pub fn enemy_with(id: u32, position: Vec3, stats: EnemyStats) -> Controller<Enemy> {
    Enemy::new(
        ActorId(id),
        Body::new(position, TEST_RADIUS, TEST_HEIGHT),
        StatsProvider::single(stats),
    )
    .into_controller()
}

/// A straight open path from `from` to `to`.
///
/// # Panics
/// Panics if the endpoints cannot form a curve, which never happens for two
/// points.
#[must_use]
pub fn straight_path(id: u32, from: Vec3, to: Vec3) -> Path {
    let curve = CatmullRom::new(vec![from, to], false)
        .unwrap_or_else(|e| panic!("two points always form a curve: {e}"));
    Path::new(PathId(id), curve)
}

/// A 6 x 6 climbable wall whose face points toward -Z at `face_z`.
#[must_use]
pub fn climbable_wall(face_z: f32) -> ClimbSurface {
    ClimbSurface::new(
        Vec3::new(0.0, 3.0, face_z + 0.5),
        Quat::from_rotation_y(std::f32::consts::PI),
        Vec3::new(3.0, 3.0, 0.5),
    )
}

/// Ground input along `direction`.
#[must_use]
pub fn walk_input(direction: Vec3) -> InputFrame {
    InputFrame::default().with_movement(direction)
}

/// Ticks `controller` with the same input `count` times.
///
/// # Errors
/// Returns the first controller error.
pub fn scripted_ticks<H>(
    sandbox: &mut Sandbox,
    controller: &mut Controller<H>,
    input: &InputFrame,
    count: usize,
) -> Result<(), ControllerError>
where
    H: grapnel::state_machine::Controlled + grapnel::PathFollower,
{
    for _ in 0..count {
        sandbox.tick(controller, input)?;
    }
    Ok(())
}
