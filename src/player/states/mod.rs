//! Player locomotion states.
mod brake;
mod fall;
mod grapple_aim;
mod grapple_pull;
mod idle;
mod wall_climb;
mod walk;

pub use brake::BrakeState;
pub use fall::FallState;
pub use grapple_aim::GrappleAimState;
pub use grapple_pull::GrapplePullState;
pub use idle::IdleState;
pub use wall_climb::WallClimbState;
pub use walk::WalkState;
