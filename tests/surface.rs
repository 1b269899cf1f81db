//! Clamping properties of climbable surfaces.

use glam::{Quat, Vec2, Vec3};
use grapnel::surface::ClimbSurface;
use rstest::{fixture, rstest};

#[fixture]
fn tilted_wall() -> ClimbSurface {
    ClimbSurface::new(
        Vec3::new(2.0, 4.0, -1.0),
        Quat::from_rotation_y(0.6) * Quat::from_rotation_x(0.2),
        Vec3::new(3.0, 2.5, 0.4),
    )
}

#[rstest]
#[case::front_face(Vec3::Z)]
#[case::back_face(Vec3::NEG_Z)]
#[case::side_face(Vec3::X)]
#[case::top_face(Vec3::Y)]
#[case::diagonal_tie(Vec3::new(1.0, 1.0, 0.0))]
fn clamped_points_stay_inside_padded_extent(tilted_wall: ClimbSurface, #[case] local_normal: Vec3) {
    let normal = tilted_wall.rotation * local_normal.normalize();
    let padding = Vec2::new(0.5, 0.75);
    let queries = [
        Vec3::new(10.0, -7.0, 3.0),
        Vec3::new(-5.0, 20.0, -4.0),
        Vec3::new(2.0, 4.0, -1.0),
        Vec3::new(2.5, 3.0, 6.0),
    ];
    for query in queries {
        let (point, normalized) = tilted_wall.clamp_point_to_wall_face(query, normal, padding);
        assert!(
            (0.0..=1.0).contains(&normalized.x) && (0.0..=1.0).contains(&normalized.y),
            "normalised {normalized} out of range for {query}"
        );
        let local = tilted_wall.to_local(point).abs();
        let limit = tilted_wall.half_extents + Vec3::splat(1e-4);
        assert!(
            local.cmple(limit).all(),
            "{point} left the box for {query}"
        );
    }
}

#[rstest]
fn clamping_is_idempotent(tilted_wall: ClimbSurface) {
    let wall = tilted_wall;
    let normal = wall.normal();
    let padding = Vec2::new(0.25, -0.3);
    let (once, first) = wall.clamp_point_to_wall_face(Vec3::new(9.0, 9.0, 9.0), normal, padding);
    let (twice, second) = wall.clamp_point_to_wall_face(once, normal, padding);
    assert!((once - twice).length() < 1e-4);
    assert!((first - second).length() < 1e-4);
}

#[rstest]
fn wall_direction_sign_follows_the_side(tilted_wall: ClimbSurface) {
    let wall = tilted_wall;
    let front = wall.center + wall.normal() * 2.0;
    let behind = wall.center - wall.normal() * 2.0;
    let ahead = wall.direction_to_wall(front);
    let back = wall.direction_to_wall(behind);
    assert!(ahead.distance > 0.0);
    assert!(back.distance < 0.0);
    assert!((ahead.direction + wall.normal()).length() < 1e-5);
    assert!((back.direction - wall.normal()).length() < 1e-5);
}
