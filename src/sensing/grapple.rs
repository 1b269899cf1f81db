//! Grapple target acquisition and the free-aim session.
use glam::{Vec2, Vec3};
use log::debug;

use super::cone::{cone_direction, nearest_in_cone};
use crate::components::{ActorId, GrappleTargetId, LayerMask, Tag};
use crate::events::{ControllerEvent, EventSink};
use crate::world::{AimCamera, OverlapBuffer, Ray, SceneQuery};

/// An acquired anchor: its id and the point the pull heads for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrappleTarget {
    /// Anchor id.
    pub id: GrappleTargetId,
    /// Point the pull heads for.
    pub point: Vec3,
}

/// Query parameters shared by free and auto aim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimSettings {
    /// Layers searched for anchors.
    pub grapple_layers: LayerMask,
    /// Layers that block line of sight.
    pub obstacle_layers: LayerMask,
    /// Maximum anchor distance.
    pub range: f32,
    /// Radius of the auto-aim search sphere.
    pub auto_aim_radius: f32,
    /// Full cone angle in radians.
    pub cone_angle: f32,
}

/// `true` when nothing on `obstacles` lies between `launch` and `point`.
#[must_use]
pub fn has_line_of_sight(scene: &dyn SceneQuery, launch: Vec3, point: Vec3, obstacles: LayerMask) -> bool {
    !scene.linecast(launch, point, obstacles)
}

/// Casts a camera ray through `screen_point` and accepts the first hit if it
/// is a grapple target visible from `launch`.
///
/// Obstacles hit before any target block the aim.
#[must_use]
pub fn resolve_free_aim(
    scene: &dyn SceneQuery,
    camera: &dyn AimCamera,
    screen_point: Vec2,
    launch: Vec3,
    settings: &AimSettings,
) -> Option<GrappleTarget> {
    let ray: Ray = camera.screen_point_to_ray(screen_point);
    let hit = scene.raycast(
        ray,
        settings.range,
        settings.grapple_layers | settings.obstacle_layers,
    )?;
    if !hit.collider.layers.intersects(settings.grapple_layers) {
        return None;
    }
    if !has_line_of_sight(scene, launch, hit.point, settings.obstacle_layers) {
        debug!("free aim hit {} but launch point is blocked", hit.collider.id);
        return None;
    }
    hit.collider.grapple.map(|id| GrappleTarget {
        id,
        point: hit.collider.center,
    })
}

/// Picks the nearest grapple target inside the look cone around `launch`.
///
/// `buffer` is cleared and reused for the overlap query.
#[must_use]
pub fn resolve_auto_aim(
    scene: &dyn SceneQuery,
    launch: Vec3,
    look: Vec3,
    path_forward: Vec3,
    up: Vec3,
    settings: &AimSettings,
    buffer: &mut OverlapBuffer,
) -> Option<GrappleTarget> {
    let direction = cone_direction(look, path_forward, up);
    buffer.clear();
    scene.overlap_sphere(
        launch,
        settings.auto_aim_radius,
        Some(Tag::GrappleTarget),
        settings.grapple_layers,
        buffer,
    );
    let hit = nearest_in_cone(buffer, launch, direction, settings.cone_angle, |collider| {
        collider.grapple.is_some()
    })?;
    if !has_line_of_sight(scene, launch, hit.closest_point, settings.obstacle_layers) {
        return None;
    }
    hit.grapple.map(|id| GrappleTarget {
        id,
        point: hit.center,
    })
}

/// State of one free-aim session: crosshair, cursor lock and the currently
/// highlighted candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct AimSession {
    actor: ActorId,
    crosshair: Vec2,
    cursor_locked: bool,
    candidate: Option<GrappleTarget>,
}

impl AimSession {
    /// Opens a session with the crosshair centred and the cursor released.
    pub fn begin(actor: ActorId, screen_size: Vec2, events: &mut dyn EventSink) -> Self {
        events.publish(ControllerEvent::AimSession {
            actor,
            active: true,
            cursor_locked: false,
        });
        Self {
            actor,
            crosshair: screen_size * 0.5,
            cursor_locked: false,
            candidate: None,
        }
    }

    /// Crosshair position in screen pixels.
    #[must_use]
    pub const fn crosshair(&self) -> Vec2 {
        self.crosshair
    }

    /// `true` while the pointer is captured.
    #[must_use]
    pub const fn cursor_locked(&self) -> bool {
        self.cursor_locked
    }

    /// Currently highlighted anchor.
    #[must_use]
    pub const fn candidate(&self) -> Option<GrappleTarget> {
        self.candidate
    }

    /// Integrates crosshair motion, keeping it on screen.
    pub fn move_crosshair(&mut self, delta: Vec2, sensitivity: f32, screen_size: Vec2) {
        self.crosshair = (self.crosshair + delta * sensitivity).clamp(Vec2::ZERO, screen_size);
    }

    /// Places the crosshair at an absolute pointer position.
    pub fn point_at(&mut self, pointer: Vec2, screen_size: Vec2) {
        self.crosshair = pointer.clamp(Vec2::ZERO, screen_size);
    }

    /// The single highlighting pass for this tick.
    ///
    /// Events are only published when the candidate changes.
    pub fn highlight(&mut self, found: Option<GrappleTarget>, events: &mut dyn EventSink) {
        let previous = self.candidate.map(|target| target.id);
        let next = found.map(|target| target.id);
        if previous != next {
            if let Some(target) = previous {
                events.publish(ControllerEvent::Highlight {
                    target,
                    highlighted: false,
                });
            }
            if let Some(target) = next {
                events.publish(ControllerEvent::Highlight {
                    target,
                    highlighted: true,
                });
            }
        }
        self.candidate = found;
    }

    /// Hands the highlighted candidate to the caller. It stays highlighted;
    /// the new owner is responsible for clearing it.
    pub fn take_candidate(&mut self) -> Option<GrappleTarget> {
        self.candidate.take()
    }

    /// Closes the session: clears any remaining highlight and locks the
    /// cursor again.
    pub fn end(mut self, events: &mut dyn EventSink) {
        self.highlight(None, events);
        self.cursor_locked = true;
        events.publish(ControllerEvent::AimSession {
            actor: self.actor,
            active: false,
            cursor_locked: self.cursor_locked,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;

    fn target(id: u32) -> GrappleTarget {
        GrappleTarget {
            id: GrappleTargetId(id),
            point: Vec3::ZERO,
        }
    }

    #[test]
    fn highlight_only_reports_changes() {
        let mut log = EventLog::new();
        let mut session = AimSession::begin(ActorId(1), Vec2::new(800.0, 600.0), &mut log);
        assert_eq!(session.crosshair(), Vec2::new(400.0, 300.0));
        log.drain();

        session.highlight(Some(target(1)), &mut log);
        session.highlight(Some(target(1)), &mut log);
        assert_eq!(log.len(), 1);

        session.highlight(Some(target(2)), &mut log);
        assert_eq!(
            log.drain(),
            vec![
                ControllerEvent::Highlight {
                    target: GrappleTargetId(1),
                    highlighted: true
                },
                ControllerEvent::Highlight {
                    target: GrappleTargetId(1),
                    highlighted: false
                },
                ControllerEvent::Highlight {
                    target: GrappleTargetId(2),
                    highlighted: true
                },
            ]
        );

        session.end(&mut log);
        assert_eq!(
            log.events().last(),
            Some(&ControllerEvent::AimSession {
                actor: ActorId(1),
                active: false,
                cursor_locked: true
            })
        );
    }

    #[test]
    fn crosshair_stays_on_screen() {
        let mut log = EventLog::new();
        let size = Vec2::new(100.0, 50.0);
        let mut session = AimSession::begin(ActorId(1), size, &mut log);
        session.move_crosshair(Vec2::new(500.0, -500.0), 1.0, size);
        assert_eq!(session.crosshair(), Vec2::new(100.0, 0.0));
    }
}
