//! Radius-based sight with spot/view hysteresis.
use glam::Vec3;
use log::info;

use crate::components::{ActorId, LayerMask, Tag};
use crate::error::ControllerError;
use crate::world::{ActorDirectory, OverlapBuffer, SceneQuery};

/// Outcome of one sight update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SightChange {
    /// Target unchanged.
    Unchanged,
    /// A target was acquired.
    Spotted(ActorId),
    /// The held target was lost.
    Escaped(ActorId),
}

/// Holds at most one target of a given tag.
///
/// Acquisition only happens within the spot range, while a held target is
/// only dropped beyond the (larger) view range or on death.
#[derive(Debug, Clone, PartialEq)]
pub struct SightSensor {
    target_tag: Tag,
    target: Option<ActorId>,
    buffer: OverlapBuffer,
}

impl SightSensor {
    /// Sensor looking for `target_tag` with room for `capacity` overlaps.
    #[must_use]
    pub fn new(target_tag: Tag, capacity: usize) -> Self {
        Self {
            target_tag,
            target: None,
            buffer: OverlapBuffer::new(capacity),
        }
    }

    /// Held target, if any.
    #[must_use]
    pub const fn target(&self) -> Option<ActorId> {
        self.target
    }

    /// Drops the held target without reporting it.
    pub const fn forget(&mut self) {
        self.target = None;
    }

    /// Runs one acquisition or retention check from `position`.
    ///
    /// # Errors
    /// Returns [`ControllerError::StaleTarget`] when the held target is no
    /// longer known to `actors`.
    pub fn update(
        &mut self,
        position: Vec3,
        spot_range: f32,
        view_range: f32,
        scene: &dyn SceneQuery,
        actors: &dyn ActorDirectory,
    ) -> Result<SightChange, ControllerError> {
        if let Some(held) = self.target {
            let snapshot = actors.actor(held).ok_or(ControllerError::StaleTarget(held))?;
            let distance = snapshot.position.distance(position);
            if snapshot.alive && distance <= view_range {
                return Ok(SightChange::Unchanged);
            }
            info!("{held} escaped at distance {distance:.2}");
            self.target = None;
            return Ok(SightChange::Escaped(held));
        }

        self.buffer.clear();
        scene.overlap_sphere(
            position,
            spot_range,
            Some(self.target_tag),
            LayerMask::ALL,
            &mut self.buffer,
        );
        let tag = self.target_tag;
        let spotted = self
            .buffer
            .iter()
            .filter(|hit| hit.tag == tag)
            .filter_map(|hit| hit.actor)
            .find(|id| actors.actor(*id).is_some_and(|actor| actor.alive));

        let Some(id) = spotted else {
            return Ok(SightChange::Unchanged);
        };
        info!("spotted {id}");
        self.target = Some(id);
        Ok(SightChange::Spotted(id))
    }
}
