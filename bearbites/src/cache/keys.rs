//! Cache key namespaces and their lifetimes.

use chrono::NaiveDate;
use std::time::Duration;

const HOUR: u64 = 60 * 60;

pub const MENU_TTL: Duration = Duration::from_secs(24 * HOUR);
/// Label pages rarely change once published.
pub const FOOD_DETAIL_TTL: Duration = Duration::from_secs(7 * 24 * HOUR);
pub const DATE_BOUNDS_TTL: Duration = Duration::from_secs(24 * HOUR);

pub fn menu_key(location_id: &str, date: NaiveDate) -> String {
    format!("menu:{location_id}:{}", date.format("%Y-%m-%d"))
}

pub fn food_key(item_id: &str) -> String {
    format!("food:{item_id}")
}

pub fn date_bounds_key(location_id: &str) -> String {
    format!("datebounds:{location_id}")
}

/// Spicy classifications never expire.
pub fn spicy_key(item_id: &str) -> String {
    format!("spicy:{item_id}")
}
