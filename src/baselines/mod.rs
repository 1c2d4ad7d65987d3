pub mod locks;
pub mod repo;
pub mod services;

pub use locks::KeyLocks;
pub use repo::{BaselineStore, PgBaselineStore, UserMealBaseline};
pub use services::BaselineUpdate;

/// Samples needed before a baseline replaces the external lookup.
pub const MATURE_SAMPLES: i32 = 5;

/// Case-insensitive identity of a meal name.
pub fn meal_key(meal_name: &str) -> String {
    meal_name.trim().to_lowercase()
}
