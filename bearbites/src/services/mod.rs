mod menu;
mod prewarm;

pub use menu::{MenuService, DATE_BOUNDS_HORIZON, EMPTY_STREAK_LIMIT};
pub use prewarm::PrewarmManager;
