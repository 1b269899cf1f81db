//! Behaviour scenarios for the player controller using rust-rspec.
//!
//! Each scenario rebuilds its sandbox before every example, so the shared
//! world behind the mutex never leaks state between examples.

#[path = "support/rspec_runner.rs"]
mod rspec_runner;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use glam::{Vec2, Vec3};
use grapnel::sandbox::Sandbox;
use grapnel::{
    ActorId, Controller, ControllerEvent, GrapplePress, GrappleTargetId, InputFrame, Movable,
    Player, PlayerStateKind, Tag,
};
use rspec_runner::run_serial;
use test_utils::{climbable_wall, player_at, scripted_ticks, walk_input, TEST_RADIUS};

const DT: f32 = 0.02;
const WALL_FACE_Z: f32 = 3.0;
/// Where a capsule pressed against the wall face comes to rest.
const CLING_Z: f32 = WALL_FACE_Z - TEST_RADIUS;

#[derive(Debug)]
struct Scene {
    sandbox: Sandbox,
    player: Controller<Player>,
}

#[derive(Debug, Clone)]
struct PlayerWorld {
    scene: Arc<Mutex<Option<Scene>>>,
    build: fn(&mut Sandbox),
}

impl PlayerWorld {
    fn new(build: fn(&mut Sandbox)) -> Self {
        Self {
            scene: Arc::new(Mutex::new(None)),
            build,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Scene>> {
        self.scene.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rebuilds the sandbox with a grounded player at the origin.
    fn reset(&self) {
        let mut sandbox = Sandbox::new(DT);
        (self.build)(&mut sandbox);
        let mut player = player_at(1, Vec3::new(0.0, 1.0, 0.0));
        player.host_mut().body_mut().grounded = true;
        sandbox
            .spawn(&mut player, Tag::Player, PlayerStateKind::Idle)
            .unwrap_or_else(|e| panic!("spawn failed: {e}"));
        *self.lock() = Some(Scene { sandbox, player });
    }

    fn with_scene<T>(&self, f: impl FnOnce(&mut Scene) -> T) -> T {
        let mut guard = self.lock();
        let scene = guard
            .as_mut()
            .unwrap_or_else(|| panic!("scene not built"));
        f(scene)
    }

    fn tick(&self, input: &InputFrame, count: usize) {
        self.with_scene(|scene| {
            scripted_ticks(&mut scene.sandbox, &mut scene.player, input, count)
                .unwrap_or_else(|e| panic!("tick failed: {e}"));
        });
    }

    /// Ticks without input while the player stays in `kind`, at most `limit`
    /// times.
    fn tick_while(&self, kind: PlayerStateKind, limit: usize) {
        self.with_scene(|scene| {
            for _ in 0..limit {
                if scene.player.current() != Some(kind) {
                    return;
                }
                scene
                    .sandbox
                    .tick(&mut scene.player, &InputFrame::default())
                    .unwrap_or_else(|e| panic!("tick failed: {e}"));
            }
        });
    }

    fn current(&self) -> Option<PlayerStateKind> {
        self.with_scene(|scene| scene.player.current())
    }

    fn saw(&self, event: &ControllerEvent) -> bool {
        self.with_scene(|scene| scene.sandbox.events.events().contains(event))
    }
}

fn wall_ahead(sandbox: &mut Sandbox) {
    sandbox.add_wall(climbable_wall(WALL_FACE_Z), true);
}

fn anchor_ahead(sandbox: &mut Sandbox) {
    sandbox
        .world
        .add_grapple_target(GrappleTargetId(1), Vec3::new(0.0, 3.0, 4.0), 0.5);
}

/// Puts an anchor on the line from the sandbox camera to the origin.
fn anchor_under_crosshair(sandbox: &mut Sandbox) {
    sandbox
        .world
        .add_grapple_target(GrappleTargetId(2), Vec3::new(0.0, 2.5, -5.0), 0.5);
}

fn grapple(press: GrapplePress) -> InputFrame {
    InputFrame::default().with_grapple(press)
}

#[test]
fn walking_into_a_climbable_wall() {
    run_serial(&rspec::given(
        "a player walking toward a climbable wall",
        PlayerWorld::new(wall_ahead),
        |ctx| {
            ctx.before_each(|world| world.reset());

            ctx.when("they keep walking into it", |ctx| {
                ctx.before_each(|world| world.tick(&walk_input(Vec3::Z), 75));
                ctx.then("they cling to the face", |world| {
                    assert_eq!(world.current(), Some(PlayerStateKind::WallClimb));
                    world.with_scene(|scene| {
                        let player = scene.player.host();
                        assert!(player.climb_wall().is_some());
                        let z = player.body().position.z;
                        assert!((z - CLING_Z).abs() < 0.02, "clinging at z = {z}");
                    });
                });
            });

            ctx.when("they push the stick up while clinging", |ctx| {
                ctx.before_each(|world| {
                    world.tick(&walk_input(Vec3::Z), 75);
                    world.tick(&InputFrame::default().with_stick(Vec2::Y), 20);
                });
                ctx.then("they climb without leaving the face", |world| {
                    assert_eq!(world.current(), Some(PlayerStateKind::WallClimb));
                    world.with_scene(|scene| {
                        let position = scene.player.host().body().position;
                        assert!(position.y > 1.5, "still at height {}", position.y);
                        assert!((position.z - CLING_Z).abs() < 0.02);
                    });
                });
            });

            ctx.when("they jump while clinging", |ctx| {
                ctx.before_each(|world| {
                    world.tick(&walk_input(Vec3::Z), 75);
                    world.tick(&InputFrame::default().with_jump(), 1);
                });
                ctx.then("they leap away from the wall", |world| {
                    assert_eq!(world.current(), Some(PlayerStateKind::Fall));
                    world.with_scene(|scene| {
                        let player = scene.player.host();
                        assert!(player.climb_wall().is_none());
                        assert!(player.body().velocity.z < 0.0);
                        assert!(player.body().velocity.y > 0.0);
                    });
                });
            });
        },
    ));
}

#[test]
fn tapping_the_grapple_button() {
    run_serial(&rspec::given(
        "a player near a grapple anchor in front of them",
        PlayerWorld::new(anchor_ahead),
        |ctx| {
            ctx.before_each(|world| world.reset());

            ctx.when("the grapple button is tapped", |ctx| {
                ctx.before_each(|world| world.tick(&grapple(GrapplePress::Tap), 1));
                ctx.then("they are reeled toward the anchor", |world| {
                    assert_eq!(world.current(), Some(PlayerStateKind::GrapplePull));
                    assert!(world.saw(&ControllerEvent::GrappleFired {
                        actor: ActorId(1),
                        target: GrappleTargetId(1),
                    }));
                });
            });

            ctx.when("the pull runs its course", |ctx| {
                ctx.before_each(|world| {
                    world.tick(&grapple(GrapplePress::Tap), 1);
                    world.tick_while(PlayerStateKind::GrapplePull, 40);
                });
                ctx.then("they let go next to the anchor", |world| {
                    assert_eq!(world.current(), Some(PlayerStateKind::Fall));
                    assert!(world.saw(&ControllerEvent::Highlight {
                        target: GrappleTargetId(1),
                        highlighted: false,
                    }));
                    world.with_scene(|scene| {
                        let player = scene.player.host();
                        assert!(player.grapple_target().is_none());
                        let gap = player.body().position.distance(Vec3::new(0.0, 3.0, 4.0));
                        assert!(gap <= 1.0 + 1e-3, "stopped {gap} from the anchor");
                    });
                });
            });
        },
    ));
}

#[test]
fn holding_the_grapple_button() {
    run_serial(&rspec::given(
        "a player with an anchor under the crosshair",
        PlayerWorld::new(anchor_under_crosshair),
        |ctx| {
            ctx.before_each(|world| world.reset());

            ctx.when("the hold is recognised", |ctx| {
                ctx.before_each(|world| world.tick(&grapple(GrapplePress::HoldStarted), 1));
                ctx.then("free aim opens with the cursor released", |world| {
                    assert_eq!(world.current(), Some(PlayerStateKind::GrappleAim));
                    assert!(world.saw(&ControllerEvent::AimSession {
                        actor: ActorId(1),
                        active: true,
                        cursor_locked: false,
                    }));
                });
            });

            ctx.when("they crouch while aiming", |ctx| {
                ctx.before_each(|world| {
                    world.tick(&grapple(GrapplePress::HoldStarted), 1);
                    world.tick(&InputFrame::default().with_crouch(), 1);
                });
                ctx.then("aiming is cancelled", |world| {
                    assert_eq!(world.current(), Some(PlayerStateKind::Idle));
                    assert!(world.saw(&ControllerEvent::AimSession {
                        actor: ActorId(1),
                        active: false,
                        cursor_locked: true,
                    }));
                    assert!(world.saw(&ControllerEvent::Highlight {
                        target: GrappleTargetId(2),
                        highlighted: false,
                    }));
                });
            });

            ctx.when("they fire at the highlighted anchor", |ctx| {
                ctx.before_each(|world| {
                    world.tick(&grapple(GrapplePress::HoldStarted), 1);
                    world.tick(&InputFrame::default().with_fire(), 1);
                });
                ctx.then("the pull starts toward it", |world| {
                    assert_eq!(world.current(), Some(PlayerStateKind::GrapplePull));
                    world.with_scene(|scene| {
                        let target = scene.player.host().grapple_target();
                        assert_eq!(target.map(|t| t.id), Some(GrappleTargetId(2)));
                    });
                });
            });
        },
    ));
}
