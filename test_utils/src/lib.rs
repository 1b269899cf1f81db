//! Utility helpers for tests.
//!
//! Builders for common actors and scenes plus float-tolerant assertions on
//! `glam` vectors.
pub mod assertions;
pub mod fixtures;

pub use assertions::{assert_vec3_near, max_component_error};
pub use fixtures::{
    climbable_wall, enemy_at, enemy_with, player_at, player_with, scripted_ticks, straight_path,
    walk_input, TEST_HEIGHT, TEST_RADIUS,
};
