//! Target acquisition: radius sight for enemies and grapple aiming for the
//! player.
pub mod cone;
pub mod grapple;
pub mod sight;

pub use cone::{cone_direction, nearest_in_cone};
pub use grapple::{
    has_line_of_sight, resolve_auto_aim, resolve_free_aim, AimSession, AimSettings, GrappleTarget,
};
pub use sight::{SightChange, SightSensor};
