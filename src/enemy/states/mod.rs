//! Enemy behaviour states.
mod follow;
mod idle;

pub use follow::FollowState;
pub use idle::EnemyIdleState;
