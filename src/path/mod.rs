//! Path-constrained movement along parametric curves.
//!
//! A [`Path`] owns a curve and the set of actors currently traversing it.
//! Each member's traversal sign is fixed when it joins and dropped when it
//! leaves. [`PathSet`] routes proximity-volume enter/exit notifications to
//! the right path and keeps the follower's current-path reference in sync.
pub mod curve;
pub mod pursuit;

use glam::{Quat, Vec3};
use hashbrown::HashMap;
use log::debug;

pub use curve::{CatmullRom, Curve};
pub use pursuit::{pursuit_sign, resolve_pursuit, PursuitStep};

use crate::components::{ActorId, PathId};
use crate::constants::DEFAULT_PATH_RESOLUTION;
use crate::entity::PathFollower;
use crate::error::PathError;
use crate::vector_math::{flatten, move_towards};
use crate::world::MovementExecutor;

/// Whether a member moves with or against the curve's own tangent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalSign {
    /// Along the tangent.
    Forward,
    /// Against the tangent.
    Reversed,
}

impl TraversalSign {
    /// `1.0` or `-1.0`.
    #[must_use]
    pub const fn factor(self) -> f32 {
        match self {
            Self::Forward => 1.0,
            Self::Reversed => -1.0,
        }
    }
}

/// Closest curve sample to a query point, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestPoint {
    /// The point on the curve.
    pub point: Vec3,
    /// Unit tangent in the curve's natural direction.
    pub tangent: Vec3,
    /// Normalised curve parameter in `[0, 1]`.
    pub t: f32,
}

/// A posed curve and the actors currently traversing it.
#[derive(Debug)]
pub struct Path {
    id: PathId,
    translation: Vec3,
    rotation: Quat,
    curve: Box<dyn Curve>,
    resolution: usize,
    members: HashMap<ActorId, TraversalSign>,
}

impl Path {
    /// An empty path at the world origin with the default resolution.
    #[must_use]
    pub fn new(id: PathId, curve: impl Curve + 'static) -> Self {
        Self {
            id,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            curve: Box::new(curve),
            resolution: DEFAULT_PATH_RESOLUTION,
            members: HashMap::new(),
        }
    }

    /// Places the curve's local space in the world.
    #[must_use]
    pub fn with_pose(mut self, translation: Vec3, rotation: Quat) -> Self {
        self.translation = translation;
        self.rotation = rotation.normalize();
        self
    }

    /// Number of segments sampled by nearest-point queries. At least one.
    #[must_use]
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution.max(1);
        self
    }

    /// The path's id.
    #[must_use]
    pub const fn id(&self) -> PathId {
        self.id
    }

    /// Whether the underlying curve loops.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.curve.is_closed()
    }

    /// `true` if `actor` has joined.
    #[must_use]
    pub fn contains(&self, actor: ActorId) -> bool {
        self.members.contains_key(&actor)
    }

    /// The sign `actor` joined with.
    #[must_use]
    pub fn sign_of(&self, actor: ActorId) -> Option<TraversalSign> {
        self.members.get(&actor).copied()
    }

    /// Number of actors on the path.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// World position of the curve at `t`.
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.translation + self.rotation * self.curve.evaluate(t)
    }

    /// Finds the curve point closest to `point`.
    ///
    /// The curve is sampled at `resolution + 1` evenly spaced parameters.
    /// The best sample is then refined by projecting onto the chords to
    /// its neighbouring samples.
    #[must_use]
    pub fn nearest_point_and_tangent(&self, point: Vec3) -> NearestPoint {
        let local = self.rotation.inverse() * (point - self.translation);
        let step = 1.0 / self.resolution as f32;
        let sample = |i: usize| {
            let t = i as f32 * step;
            (t, self.curve.evaluate(t))
        };

        let mut best_index = 0;
        let mut best_distance = f32::INFINITY;
        for i in 0..=self.resolution {
            let distance = sample(i).1.distance_squared(local);
            if distance < best_distance {
                best_distance = distance;
                best_index = i;
            }
        }

        let (mut best_t, _) = sample(best_index);
        let neighbours = [
            best_index.checked_sub(1),
            (best_index < self.resolution).then_some(best_index + 1),
        ];
        for neighbour in neighbours.into_iter().flatten() {
            let (t0, a) = sample(best_index);
            let (t1, b) = sample(neighbour);
            let chord = b - a;
            let length = chord.length_squared();
            if length <= f32::EPSILON {
                continue;
            }
            let s = ((local - a).dot(chord) / length).clamp(0.0, 1.0);
            let distance = (a + chord * s).distance_squared(local);
            if distance < best_distance {
                best_distance = distance;
                best_t = t0 + (t1 - t0) * s;
            }
        }

        let t = best_t.clamp(0.0, 1.0);
        NearestPoint {
            point: self.point_at(t),
            tangent: (self.rotation * self.curve.tangent(t)).normalize_or_zero(),
            t,
        }
    }

    /// Adds `follower` with a traversal sign chosen from its cached forward.
    ///
    /// Returns `false` without changes when the follower is already a member
    /// or is dead.
    pub fn join<F: PathFollower + ?Sized>(&mut self, follower: &F) -> bool {
        let actor = follower.actor_id();
        if self.members.contains_key(&actor) || !follower.is_alive() {
            return false;
        }
        let nearest = self.nearest_point_and_tangent(follower.body().position);
        let sign = if nearest.tangent.dot(follower.path_forward_hint()) < 0.0 {
            TraversalSign::Reversed
        } else {
            TraversalSign::Forward
        };
        debug!("{actor} joined {} ({sign:?})", self.id);
        self.members.insert(actor, sign);
        true
    }

    /// Removes `follower`, first storing its current path forward in the
    /// follower's cache. Returns `false` when it was not a member.
    pub fn leave<F: PathFollower + ?Sized>(&mut self, follower: &mut F) -> bool {
        let actor = follower.actor_id();
        let Some(sign) = self.members.get(&actor).copied() else {
            return false;
        };
        let nearest = self.nearest_point_and_tangent(follower.body().position);
        follower.set_cached_path_forward(nearest.tangent * sign.factor());
        self.members.remove(&actor);
        debug!("{actor} left {}", self.id);
        true
    }

    /// The direction `actor` treats as ahead when standing at `position`.
    ///
    /// # Errors
    /// Returns [`PathError::NotAMember`] if `actor` has not joined.
    pub fn path_forward(&self, actor: ActorId, position: Vec3) -> Result<Vec3, PathError> {
        self.path_forward_with_nearest(actor, position)
            .map(|(forward, _)| forward)
    }

    /// Like [`Path::path_forward`] but also returns the nearest sample.
    ///
    /// # Errors
    /// Returns [`PathError::NotAMember`] if `actor` has not joined.
    pub fn path_forward_with_nearest(
        &self,
        actor: ActorId,
        position: Vec3,
    ) -> Result<(Vec3, NearestPoint), PathError> {
        let sign = self.sign_of(actor).ok_or(PathError::NotAMember {
            path: self.id,
            actor,
        })?;
        let nearest = self.nearest_point_and_tangent(position);
        Ok((nearest.tangent * sign.factor(), nearest))
    }
}

/// Offset that pulls `position` toward `closest` along the axis that is
/// neither up nor forward, limited to `force * dt`.
#[must_use]
pub fn path_adjustment(
    position: Vec3,
    closest: Vec3,
    up: Vec3,
    forward: Vec3,
    force: f32,
    dt: f32,
) -> Vec3 {
    let offset = flatten(flatten(closest - position, up), forward);
    move_towards(Vec3::ZERO, offset, force * dt)
}

/// Every path in a scene, keyed by id.
#[derive(Debug, Default)]
pub struct PathSet {
    paths: HashMap<PathId, Path>,
}

impl PathSet {
    /// No paths.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `path`, replacing any path with the same id.
    pub fn insert(&mut self, path: Path) {
        self.paths.insert(path.id(), path);
    }

    /// The path registered under `id`.
    #[must_use]
    pub fn get(&self, id: PathId) -> Option<&Path> {
        self.paths.get(&id)
    }

    /// Like [`PathSet::get`], for callers that require the path.
    ///
    /// # Errors
    /// Returns [`PathError::UnknownPath`] if `id` is not registered.
    pub fn path(&self, id: PathId) -> Result<&Path, PathError> {
        self.paths.get(&id).ok_or(PathError::UnknownPath(id))
    }

    /// Every registered id, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = PathId> + '_ {
        self.paths.keys().copied()
    }

    /// Proximity volume entry: joins the path and records it on the
    /// follower.
    ///
    /// # Errors
    /// Returns [`PathError::UnknownPath`] if `id` is not registered.
    pub fn trigger_enter<F: PathFollower + ?Sized>(
        &mut self,
        id: PathId,
        follower: &mut F,
    ) -> Result<bool, PathError> {
        let path = self.paths.get_mut(&id).ok_or(PathError::UnknownPath(id))?;
        let joined = path.join(follower);
        if joined {
            follower.set_current_path(Some(id));
        }
        Ok(joined)
    }

    /// Proximity volume exit: leaves the path and clears the follower's
    /// reference to it.
    ///
    /// # Errors
    /// Returns [`PathError::UnknownPath`] if `id` is not registered.
    pub fn trigger_exit<F: PathFollower + ?Sized>(
        &mut self,
        id: PathId,
        follower: &mut F,
    ) -> Result<bool, PathError> {
        let path = self.paths.get_mut(&id).ok_or(PathError::UnknownPath(id))?;
        let left = path.leave(follower);
        if left && follower.current_path() == Some(id) {
            follower.set_current_path(None);
        }
        Ok(left)
    }

    /// Path forward for a follower on `id`.
    ///
    /// # Errors
    /// Fails if the path is unknown or the actor is not a member.
    pub fn path_forward(&self, id: PathId, actor: ActorId, position: Vec3) -> Result<Vec3, PathError> {
        self.path(id)?.path_forward(actor, position)
    }

    /// Lateral offset keeping `follower` glued to its current path, if any.
    ///
    /// # Errors
    /// Fails if the follower references an unknown path or is not a member
    /// of it.
    pub fn adjustment<F: PathFollower + ?Sized>(
        &self,
        follower: &F,
        force: f32,
        dt: f32,
    ) -> Result<Option<Vec3>, PathError> {
        let Some(id) = follower.current_path() else {
            return Ok(None);
        };
        let body = follower.body();
        let (forward, nearest) = self
            .path(id)?
            .path_forward_with_nearest(follower.actor_id(), body.position)?;
        Ok(Some(path_adjustment(
            body.position,
            nearest.point,
            body.up(),
            forward,
            force,
            dt,
        )))
    }
}

/// Pulls `follower` back toward its current path through `mover`.
///
/// Only the position is taken from the move; the grounded flag reported by
/// the main move stays authoritative.
///
/// # Errors
/// Fails if the follower references an unknown path or is not a member of
/// it.
pub fn glue_to_path<F: PathFollower + ?Sized>(
    paths: &PathSet,
    follower: &mut F,
    mover: &mut dyn MovementExecutor,
    force: f32,
    dt: f32,
) -> Result<(), PathError> {
    let Some(offset) = paths.adjustment(follower, force, dt)? else {
        return Ok(());
    };
    if offset == Vec3::ZERO {
        return Ok(());
    }
    let body = follower.body();
    let report = mover.move_by(body.capsule(), body.position, offset);
    follower.body_mut().position = report.position;
    Ok(())
}
