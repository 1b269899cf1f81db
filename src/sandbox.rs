//! Headless reference implementation of the world collaborators.
//!
//! The sandbox is deliberately small: an infinite ground plane, oriented
//! boxes and spheres, exact ray tests and a fixed camera. It backs the
//! integration tests and the `grapnel` binary.
use glam::{Quat, Vec2, Vec3};
use hashbrown::HashMap;
use log::{debug, trace};
use ordered_float::OrderedFloat;

use crate::components::{ActorId, ColliderId, GrappleTargetId, LayerMask, PathId, Tag};
use crate::enemy::Enemy;
use crate::entity::{Actor, Movable, PathFollower};
use crate::error::{ControllerError, PathError};
use crate::events::EventLog;
use crate::input::InputFrame;
use crate::path::{Path, PathSet};
use crate::player::Player;
use crate::state_machine::{Controlled, Controller, Tick};
use crate::surface::ClimbSurface;
use crate::vector_math::look_rotation;
use crate::world::{
    ActorDirectory, ActorSnapshot, AimCamera, Capsule, ColliderInfo, Contact, MoveReport,
    MovementExecutor, OverlapBuffer, Ray, RayHit, SceneQuery,
};

/// Linecasts stop this far short of their end point so the target surface
/// itself does not count as an obstruction.
const LINECAST_SKIN: f32 = 1.0e-3;

/// Extra reach allowed when testing actor capsules for touch contact.
const CONTACT_SKIN: f32 = 0.05;

/// Contact normals steeper than this count as standing ground.
const GROUND_NORMAL_Y: f32 = 0.7;

/// Solid geometry of a sandbox collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Ball around a point.
    Sphere {
        /// Centre in world space.
        center: Vec3,
        /// Radius in metres.
        radius: f32,
    },
    /// Oriented box.
    Box(ClimbSurface),
}

impl Shape {
    /// Centre of the shape in world space.
    #[must_use]
    pub const fn center(&self) -> Vec3 {
        match self {
            Self::Sphere { center, .. } => *center,
            Self::Box(surface) => surface.center,
        }
    }

    /// Closest point of the solid shape to `point`; `point` itself when
    /// inside.
    #[must_use]
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        match self {
            Self::Sphere { center, radius } => {
                let offset = point - *center;
                if offset.length() <= *radius {
                    point
                } else {
                    *center + offset.normalize_or_zero() * *radius
                }
            }
            Self::Box(surface) => {
                let half = surface.half_extents;
                surface.to_world(surface.to_local(point).clamp(-half, half))
            }
        }
    }

    /// Distance along `ray` to the first surface crossing, zero when the ray
    /// starts inside.
    #[must_use]
    pub fn raycast(&self, ray: &Ray) -> Option<f32> {
        match self {
            Self::Sphere { center, radius } => ray_sphere(ray, *center, *radius),
            Self::Box(surface) => ray_box(ray, surface),
        }
    }
}

fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let offset = ray.origin - center;
    let c = offset.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    let b = offset.dot(ray.direction);
    let discriminant = b * b - c;
    if b > 0.0 || discriminant < 0.0 {
        return None;
    }
    Some(-b - discriminant.sqrt())
}

fn ray_box(ray: &Ray, surface: &ClimbSurface) -> Option<f32> {
    let origin = surface.to_local(ray.origin).to_array();
    let direction = (surface.rotation.inverse() * ray.direction).to_array();
    let half = surface.half_extents.to_array();

    let mut near = f32::NEG_INFINITY;
    let mut far = f32::INFINITY;
    for ((o, d), h) in origin.into_iter().zip(direction).zip(half) {
        if d.abs() <= f32::EPSILON {
            if o.abs() > h {
                return None;
            }
            continue;
        }
        let a = (-h - o) / d;
        let b = (h - o) / d;
        near = near.max(a.min(b));
        far = far.min(a.max(b));
    }
    if far < near.max(0.0) {
        return None;
    }
    Some(near.max(0.0))
}

/// A static or actor-bound collider in the sandbox scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SandboxCollider {
    /// Scene-unique id.
    pub id: ColliderId,
    /// Gameplay tag.
    pub tag: Tag,
    /// Query layers the collider belongs to.
    pub layers: LayerMask,
    /// Solid geometry.
    pub shape: Shape,
    /// Owning actor, if any.
    pub actor: Option<ActorId>,
    /// Grapple anchor carried by the collider, if any.
    pub grapple: Option<GrappleTargetId>,
}

impl SandboxCollider {
    /// Query view of the collider with `closest_point` filled in.
    #[must_use]
    pub fn info(&self, closest_point: Vec3) -> ColliderInfo {
        ColliderInfo {
            id: self.id,
            tag: self.tag,
            layers: self.layers,
            center: self.shape.center(),
            closest_point,
            actor: self.actor,
            grapple: self.grapple,
            surface: match self.shape {
                Shape::Box(surface) => Some(surface),
                Shape::Sphere { .. } => None,
            },
        }
    }
}

/// Scene colliders and actor snapshots.
#[derive(Debug, Default)]
pub struct SandboxWorld {
    colliders: Vec<SandboxCollider>,
    actors: HashMap<ActorId, ActorSnapshot>,
    next_collider: u32,
}

impl SandboxWorld {
    /// Empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a collider and returns its id.
    pub fn add_collider(&mut self, tag: Tag, layers: LayerMask, shape: Shape) -> ColliderId {
        self.next_collider += 1;
        let id = ColliderId(self.next_collider);
        self.colliders.push(SandboxCollider {
            id,
            tag,
            layers,
            shape,
            actor: None,
            grapple: None,
        });
        id
    }

    /// Adds a spherical grapple anchor.
    pub fn add_grapple_target(
        &mut self,
        target: GrappleTargetId,
        center: Vec3,
        radius: f32,
    ) -> ColliderId {
        let id = self.add_collider(
            Tag::GrappleTarget,
            LayerMask::GRAPPLE,
            Shape::Sphere { center, radius },
        );
        if let Some(collider) = self.collider_mut(id) {
            collider.grapple = Some(target);
        }
        id
    }

    /// Registers an actor with a sphere collider of its body radius.
    pub fn add_actor<A: PathFollower + ?Sized>(&mut self, actor: &A, tag: Tag) -> ColliderId {
        let body = actor.body();
        let id = self.add_collider(
            tag,
            LayerMask::ACTOR,
            Shape::Sphere {
                center: body.position,
                radius: body.radius,
            },
        );
        if let Some(collider) = self.collider_mut(id) {
            collider.actor = Some(actor.actor_id());
        }
        self.sync_actor(actor);
        id
    }

    /// Refreshes the snapshot and collider of a registered actor.
    pub fn sync_actor<A: PathFollower + ?Sized>(&mut self, actor: &A) {
        let id = actor.actor_id();
        let body = actor.body();
        self.actors.insert(
            id,
            ActorSnapshot {
                id,
                position: body.position,
                alive: actor.is_alive(),
                grounded: body.grounded,
                height: body.height,
                path: actor.current_path(),
            },
        );
        for collider in self.colliders.iter_mut().filter(|c| c.actor == Some(id)) {
            collider.shape = Shape::Sphere {
                center: body.position,
                radius: body.radius,
            };
        }
    }

    /// Drops an actor's snapshot and colliders.
    pub fn remove_actor(&mut self, id: ActorId) {
        self.actors.remove(&id);
        self.colliders.retain(|c| c.actor != Some(id));
    }

    /// Collider registered under `id`.
    #[must_use]
    pub fn collider(&self, id: ColliderId) -> Option<&SandboxCollider> {
        self.colliders.iter().find(|c| c.id == id)
    }

    fn collider_mut(&mut self, id: ColliderId) -> Option<&mut SandboxCollider> {
        self.colliders.iter_mut().find(|c| c.id == id)
    }
}

impl SceneQuery for SandboxWorld {
    fn overlap_sphere(
        &self,
        center: Vec3,
        radius: f32,
        tag: Option<Tag>,
        layers: LayerMask,
        out: &mut OverlapBuffer,
    ) {
        let candidates = self
            .colliders
            .iter()
            .filter(|c| c.layers.intersects(layers))
            .filter(|c| tag.map_or(true, |wanted| c.tag == wanted));
        for collider in candidates {
            let closest = collider.shape.closest_point(center);
            if closest.distance(center) <= radius {
                out.push(collider.info(closest));
            }
        }
        if out.dropped() > 0 {
            trace!("overlap at {center} dropped {} colliders", out.dropped());
        }
    }

    fn raycast(&self, ray: Ray, max_distance: f32, layers: LayerMask) -> Option<RayHit> {
        self.colliders
            .iter()
            .filter(|c| c.layers.intersects(layers))
            .filter_map(|c| {
                let distance = c.shape.raycast(&ray)?;
                (distance <= max_distance).then_some((distance, c))
            })
            .min_by_key(|(distance, _)| OrderedFloat(*distance))
            .map(|(distance, collider)| {
                let point = ray.at(distance);
                RayHit {
                    point,
                    distance,
                    collider: collider.info(point),
                }
            })
    }

    fn linecast(&self, from: Vec3, to: Vec3, layers: LayerMask) -> bool {
        let offset = to - from;
        let length = offset.length();
        if length <= LINECAST_SKIN {
            return false;
        }
        self.raycast(Ray::new(from, offset), length - LINECAST_SKIN, layers)
            .is_some()
    }
}

impl ActorDirectory for SandboxWorld {
    fn actor(&self, id: ActorId) -> Option<ActorSnapshot> {
        self.actors.get(&id).copied()
    }
}

/// Collision-aware mover over a ground plane and solid boxes.
#[derive(Debug, Clone, Default)]
pub struct SandboxMover {
    /// Height of the infinite ground plane.
    pub ground_height: f32,
    solids: Vec<SandboxCollider>,
    rotations: HashMap<ActorId, Quat>,
}

impl SandboxMover {
    /// Mover with the ground plane at `ground_height` and no solids.
    #[must_use]
    pub fn new(ground_height: f32) -> Self {
        Self {
            ground_height,
            ..Self::default()
        }
    }

    /// Makes a box collider block movement.
    pub fn add_solid(&mut self, collider: SandboxCollider) {
        self.solids.push(collider);
    }

    /// Last rotation reported for `actor`.
    #[must_use]
    pub fn rotation(&self, actor: ActorId) -> Option<Quat> {
        self.rotations.get(&actor).copied()
    }

    fn push_out(
        surface: &ClimbSurface,
        capsule: Capsule,
        position: &mut Vec3,
    ) -> Option<(Vec3, Vec3)> {
        let half = surface.half_extents;
        let closest = |p: Vec3| surface.to_world(surface.to_local(p).clamp(-half, half));
        let reach = (capsule.height * 0.5 - capsule.radius).max(0.0);

        let first = closest(*position);
        let along = (first.y - position.y).clamp(-reach, reach);
        let spine = *position + Vec3::Y * along;
        let point = closest(spine);
        let offset = spine - point;
        let distance = offset.length();
        if distance >= capsule.radius {
            return None;
        }
        let normal = if distance > f32::EPSILON {
            let outward = offset / distance;
            *position += outward * (capsule.radius - distance);
            outward
        } else {
            let exit = surface.closest_surface_info(spine);
            *position += exit.point - spine + exit.normal * capsule.radius;
            exit.normal
        };
        Some((point, normal))
    }
}

impl MovementExecutor for SandboxMover {
    fn move_by(&mut self, capsule: Capsule, origin: Vec3, delta: Vec3) -> MoveReport {
        let mut position = origin + delta;
        let mut grounded = false;
        let mut contacts = Vec::new();

        for solid in &self.solids {
            let Shape::Box(surface) = solid.shape else {
                continue;
            };
            if let Some((point, normal)) = Self::push_out(&surface, capsule, &mut position) {
                grounded |= normal.y > GROUND_NORMAL_Y && delta.y <= 0.0;
                contacts.push(Contact {
                    point,
                    normal,
                    collider: solid.info(point),
                });
            }
        }

        let floor = self.ground_height + capsule.height * 0.5;
        if position.y <= floor {
            position.y = floor;
            grounded |= delta.y <= 0.0;
        }

        MoveReport {
            position,
            grounded,
            contacts,
        }
    }

    fn set_rotation(&mut self, actor: ActorId, rotation: Quat) {
        self.rotations.insert(actor, rotation);
    }
}

/// Pinhole camera at a fixed pose. Screen y grows upward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedCamera {
    /// Eye position.
    pub position: Vec3,
    /// View orientation; local +Z looks forward.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub vertical_fov: f32,
    /// Screen size in pixels.
    pub size: Vec2,
}

impl FixedCamera {
    /// Camera at `position` aimed at `target` with a 60 degree field of view.
    #[must_use]
    pub fn looking_at(position: Vec3, target: Vec3, size: Vec2) -> Self {
        Self {
            position,
            rotation: look_rotation((target - position).normalize_or_zero(), Vec3::Y),
            vertical_fov: 60.0_f32.to_radians(),
            size,
        }
    }
}

impl AimCamera for FixedCamera {
    fn screen_point_to_ray(&self, point: Vec2) -> Ray {
        let ndc = point / self.size.max(Vec2::ONE) * 2.0 - Vec2::ONE;
        let half = (self.vertical_fov * 0.5).tan();
        let aspect = self.size.x / self.size.y.max(1.0);
        let direction = self.rotation
            * Vec3::new(ndc.x * half * aspect, ndc.y * half, 1.0);
        Ray::new(self.position, direction)
    }

    fn screen_size(&self) -> Vec2 {
        self.size
    }
}

/// Spherical proximity volume that joins followers to a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathTrigger {
    /// Path joined on entry.
    pub path: PathId,
    /// Centre of the volume.
    pub center: Vec3,
    /// Radius of the volume.
    pub radius: f32,
}

/// Everything needed to tick controllers headlessly.
#[derive(Debug)]
pub struct Sandbox {
    /// Colliders and actor snapshots.
    pub world: SandboxWorld,
    /// Movement executor shared by all controllers.
    pub mover: SandboxMover,
    /// Registered paths.
    pub paths: PathSet,
    /// Path join volumes.
    pub triggers: Vec<PathTrigger>,
    /// Camera used for grapple aiming.
    pub camera: FixedCamera,
    /// Events published by every controller.
    pub events: EventLog,
    /// Fixed timestep in seconds.
    pub dt: f32,
}

impl Sandbox {
    /// Empty scene with the ground at height zero.
    #[must_use]
    pub fn new(dt: f32) -> Self {
        Self {
            world: SandboxWorld::new(),
            mover: SandboxMover::new(0.0),
            paths: PathSet::new(),
            triggers: Vec::new(),
            camera: FixedCamera::looking_at(
                Vec3::new(0.0, 5.0, -10.0),
                Vec3::ZERO,
                Vec2::new(1920.0, 1080.0),
            ),
            events: EventLog::new(),
            dt,
        }
    }

    /// Adds a solid box, optionally tagged as climbable.
    pub fn add_wall(&mut self, surface: ClimbSurface, climbable: bool) -> ColliderId {
        let tag = if climbable {
            Tag::ClimbableWall
        } else {
            Tag::Untagged
        };
        let id = self
            .world
            .add_collider(tag, LayerMask::OBSTACLE, Shape::Box(surface));
        if let Some(collider) = self.world.collider(id) {
            self.mover.add_solid(*collider);
        }
        id
    }

    /// Registers `path` with a trigger volume around `center`.
    pub fn add_path(&mut self, path: Path, center: Vec3, radius: f32) {
        self.triggers.push(PathTrigger {
            path: path.id(),
            center,
            radius,
        });
        self.paths.insert(path);
    }

    /// Registers the host with the world and activates `kind`.
    ///
    /// # Errors
    /// Propagates errors from the initial state's enter chain.
    pub fn spawn<H: Controlled + PathFollower>(
        &mut self,
        controller: &mut Controller<H>,
        tag: Tag,
        kind: H::Kind,
    ) -> Result<(), ControllerError> {
        self.world.add_actor(controller.host(), tag);
        let input = InputFrame::default();
        let mut tick = Tick::new(
            self.dt,
            &input,
            &self.world,
            &self.world,
            &self.paths,
            &mut self.mover,
            &mut self.events,
        )
        .with_camera(&self.camera);
        controller.start(kind, &mut tick)
    }

    /// Advances one controller by a tick and refreshes the world from it.
    ///
    /// # Errors
    /// Propagates controller and path errors.
    pub fn tick<H: Controlled + PathFollower>(
        &mut self,
        controller: &mut Controller<H>,
        input: &InputFrame,
    ) -> Result<(), ControllerError> {
        let mut tick = Tick::new(
            self.dt,
            input,
            &self.world,
            &self.world,
            &self.paths,
            &mut self.mover,
            &mut self.events,
        )
        .with_camera(&self.camera);
        controller.tick(&mut tick)?;
        self.world.sync_actor(controller.host());
        self.sync_paths(controller.host_mut())?;
        Ok(())
    }

    /// Fires trigger enter/exit for `follower` against every path volume.
    ///
    /// # Errors
    /// Fails if a trigger references an unregistered path.
    pub fn sync_paths<F: PathFollower + ?Sized>(&mut self, follower: &mut F) -> Result<(), PathError> {
        let actor = follower.actor_id();
        for trigger in &self.triggers {
            let inside = follower.body().position.distance(trigger.center) <= trigger.radius;
            let member = self.paths.path(trigger.path)?.contains(actor);
            if inside && !member {
                self.paths.trigger_enter(trigger.path, follower)?;
            } else if !inside && member {
                self.paths.trigger_exit(trigger.path, follower)?;
            }
        }
        Ok(())
    }

    /// Runs the enemy's touch attack if the two capsules overlap.
    pub fn resolve_contact(
        &mut self,
        enemy: &mut Controller<Enemy>,
        player: &mut Controller<Player>,
    ) -> bool {
        let reach = enemy.host().body().radius + player.host().body().radius + CONTACT_SKIN;
        let distance = enemy
            .host()
            .body()
            .position
            .distance(player.host().body().position);
        if distance > reach {
            return false;
        }
        let hit = enemy
            .host_mut()
            .contact_attack(player.host_mut(), &mut self.events);
        self.world.sync_actor(player.host());
        hit
    }

    /// Damages an enemy, removing it from its path when it dies.
    ///
    /// # Errors
    /// Fails if the enemy references an unregistered path.
    pub fn damage_enemy(
        &mut self,
        enemy: &mut Controller<Enemy>,
        amount: i32,
    ) -> Result<bool, PathError> {
        let died = enemy
            .host_mut()
            .apply_damage(amount, &mut self.paths, &mut self.events)?;
        if died {
            debug!("{} removed from play", enemy.host().actor_id());
        }
        self.world.sync_actor(enemy.host());
        Ok(died)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ray_hits_box_face() {
        let surface = ClimbSurface::new(Vec3::new(0.0, 0.0, 5.0), Quat::IDENTITY, Vec3::ONE);
        let hit = ray_box(&Ray::new(Vec3::ZERO, Vec3::Z), &surface);
        assert_eq!(hit, Some(4.0));
        assert_eq!(ray_box(&Ray::new(Vec3::ZERO, Vec3::X), &surface), None);
    }

    #[test]
    fn ray_hits_sphere_front() {
        let hit = ray_sphere(&Ray::new(Vec3::ZERO, Vec3::X), Vec3::new(10.0, 0.0, 0.0), 2.0);
        assert_eq!(hit, Some(8.0));
    }

    #[test]
    fn mover_stands_on_ground() {
        let mut mover = SandboxMover::new(0.0);
        let capsule = Capsule {
            radius: 0.5,
            height: 2.0,
        };
        let report = mover.move_by(capsule, Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, -0.5, 0.0));
        assert!(report.grounded);
        assert_relative_eq!(report.position.y, 1.0);
        assert_relative_eq!(report.position.x, 1.0);
    }

    #[test]
    fn mover_pushes_out_of_walls() {
        let mut world = SandboxWorld::new();
        let surface = ClimbSurface::new(Vec3::new(0.0, 2.0, 2.0), Quat::IDENTITY, Vec3::new(2.0, 2.0, 0.5));
        let id = world.add_collider(Tag::ClimbableWall, LayerMask::OBSTACLE, Shape::Box(surface));
        let mut mover = SandboxMover::new(0.0);
        if let Some(collider) = world.collider(id) {
            mover.add_solid(*collider);
        }
        let capsule = Capsule {
            radius: 0.5,
            height: 2.0,
        };
        let report = mover.move_by(capsule, Vec3::new(0.0, 1.0, 0.5), Vec3::new(0.0, 0.0, 0.7));
        assert_eq!(report.contacts.len(), 1);
        assert_relative_eq!(report.position.z, 1.0, epsilon = 1e-5);
        let normal = report.contacts.first().map(|contact| contact.normal);
        assert_eq!(normal, Some(Vec3::NEG_Z));
    }
}
