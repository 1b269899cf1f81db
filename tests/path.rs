//! Path membership, pursuit and trigger volume behaviour.

use approx::assert_relative_eq;
use glam::Vec3;
use grapnel::path::{resolve_pursuit, PursuitStep};
use grapnel::sandbox::Sandbox;
use grapnel::{
    Actor, InputFrame, Movable, PathError, PathFollower, PathId, PlayerStateKind, Tag,
    TraversalSign,
};
use rstest::{fixture, rstest};
use test_utils::{assert_vec3_near, player_at, scripted_ticks, straight_path};

#[fixture]
fn along_x() -> grapnel::Path {
    straight_path(1, Vec3::new(-10.0, 1.0, 0.0), Vec3::new(10.0, 1.0, 0.0))
}

#[rstest]
fn joining_twice_keeps_one_membership(mut along_x: grapnel::Path) {
    let player = player_at(7, Vec3::new(0.0, 1.0, 0.0));

    assert!(along_x.join(player.host()));
    assert!(!along_x.join(player.host()));
    assert_eq!(along_x.member_count(), 1);
    assert_eq!(
        along_x.sign_of(player.host().actor_id()),
        Some(TraversalSign::Forward)
    );
}

#[rstest]
fn cached_forward_against_the_tangent_reverses_the_sign(mut along_x: grapnel::Path) {
    let mut player = player_at(7, Vec3::new(0.0, 1.0, 0.0));
    player.host_mut().set_cached_path_forward(Vec3::NEG_X);

    assert!(along_x.join(player.host()));
    let forward = along_x
        .path_forward(player.host().actor_id(), Vec3::new(0.0, 1.0, 0.0))
        .unwrap_or_else(|e| panic!("{e}"));
    assert_vec3_near(forward, Vec3::NEG_X, 1e-4);
}

#[rstest]
fn leaving_caches_the_path_forward(mut along_x: grapnel::Path) {
    let mut player = player_at(7, Vec3::new(2.0, 1.0, 0.0));

    assert!(!along_x.leave(player.host_mut()));
    assert!(along_x.join(player.host()));
    assert!(along_x.leave(player.host_mut()));
    assert!(!along_x.leave(player.host_mut()));

    assert!(!along_x.contains(player.host().actor_id()));
    assert_vec3_near(player.host().cached_path_forward(), Vec3::X, 1e-4);
}

#[rstest]
fn non_members_have_no_path_forward(along_x: grapnel::Path) {
    let player = player_at(7, Vec3::ZERO);
    let actor = player.host().actor_id();

    let result = along_x.path_forward(actor, Vec3::ZERO);

    assert_eq!(
        result,
        Err(PathError::NotAMember {
            path: PathId(1),
            actor
        })
    );
}

#[rstest]
#[case::target_ahead(3.0, 7.0, Some(1.0))]
#[case::target_behind(7.0, 3.0, Some(-1.0))]
#[case::same_spot(5.0, 5.05, None)]
fn pursuit_follows_the_parameter_gap(
    #[case] pursuer_x: f32,
    #[case] target_x: f32,
    #[case] expected_sign: Option<f32>,
) {
    let path = straight_path(2, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));

    let step = resolve_pursuit(
        &path,
        Vec3::new(pursuer_x, 0.0, 1.0),
        Vec3::new(target_x, 0.0, -1.0),
    );

    match (step, expected_sign) {
        (PursuitStep::Advance(direction), Some(sign)) => {
            assert_relative_eq!(direction.x, sign, epsilon = 1e-4);
            assert_relative_eq!(direction.z, 0.0, epsilon = 1e-4);
        }
        (PursuitStep::Hold, None) => {}
        (other, _) => panic!("unexpected pursuit step {other:?}"),
    }
}

#[test]
fn trigger_volume_joins_glues_and_releases() {
    let mut sandbox = Sandbox::new(0.02);
    sandbox.add_path(
        straight_path(3, Vec3::new(-10.0, 1.0, 0.0), Vec3::new(10.0, 1.0, 0.0)),
        Vec3::new(0.0, 1.0, 0.0),
        3.0,
    );
    let mut player = player_at(1, Vec3::new(0.0, 1.0, 0.5));
    sandbox
        .spawn(&mut player, Tag::Player, PlayerStateKind::Idle)
        .unwrap_or_else(|e| panic!("{e}"));

    scripted_ticks(&mut sandbox, &mut player, &InputFrame::default(), 10)
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(player.host().current_path(), Some(PathId(3)));
    assert_relative_eq!(player.host().body().position.z, 0.0, epsilon = 1e-3);

    player.host_mut().body_mut().position = Vec3::new(0.0, 1.0, 10.0);
    sandbox
        .sync_paths(player.host_mut())
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(player.host().current_path(), None);
    let paths = &sandbox.paths;
    let path = paths.get(PathId(3)).unwrap_or_else(|| panic!("path missing"));
    assert_eq!(path.member_count(), 0);
}
