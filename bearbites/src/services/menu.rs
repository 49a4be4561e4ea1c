use chrono::{Days, NaiveDate, NaiveTime};
use futures::future::join_all;
use std::sync::Arc;

use crate::cache::keys::{self, DATE_BOUNDS_TTL, FOOD_DETAIL_TTL, MENU_TTL};
use crate::cache::{Cache, Clock, SystemClock};
use crate::error::Result;
use crate::models::{
    all_locations, find_location, DateBounds, DayMenu, FoodDetail, Location, MealMenuItem,
    MenuFilter,
};
use crate::scraper::urls::menu_url;
use crate::scraper::{LabelParser, ShortMenuParser};
use crate::timezone;
use crate::upstream::HtmlFetcher;

/// Days scanned in each direction when discovering published dates.
pub const DATE_BOUNDS_HORIZON: u64 = 30;
/// Consecutive empty days that end a scan direction.
pub const EMPTY_STREAK_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn step(self, today: NaiveDate, offset: u64) -> Option<NaiveDate> {
        match self {
            Direction::Forward => today.checked_add_days(Days::new(offset)),
            Direction::Backward => today.checked_sub_days(Days::new(offset)),
        }
    }
}

/// Unfetched days count as empty.
fn published(days: &[Option<bool>]) -> Vec<bool> {
    days.iter().map(|day| day.unwrap_or(false)).collect()
}

/// Walk `has_items` (index 0 is one day away from `today`) and return the
/// bound for that direction.
///
/// The bound is the last populated day seen before `EMPTY_STREAK_LIMIT`
/// empty days in a row, or `today` if there was none. A direction that
/// never hits the streak ends at the horizon.
fn scan_bound(today: NaiveDate, direction: Direction, has_items: &[bool]) -> NaiveDate {
    let mut bound = today;
    let mut empty_streak = 0;

    for (i, populated) in has_items.iter().enumerate() {
        let offset = i as u64 + 1;
        if *populated {
            empty_streak = 0;
            bound = direction.step(today, offset).unwrap_or(bound);
        } else {
            empty_streak += 1;
            if empty_streak >= EMPTY_STREAK_LIMIT {
                return bound;
            }
        }
    }

    direction
        .step(today, has_items.len() as u64)
        .unwrap_or(bound)
}

/// Scrape-or-cache access to menus and food details.
///
/// Every public operation degrades to "no data" (`None` or empty) instead
/// of returning an error; failures are logged here.
#[derive(Clone)]
pub struct MenuService {
    cache: Cache,
    fetcher: Arc<dyn HtmlFetcher>,
    short_menu: Arc<ShortMenuParser>,
    labels: Arc<LabelParser>,
    base_url: String,
    clock: Arc<dyn Clock>,
}

impl MenuService {
    pub fn new(cache: Cache, fetcher: Arc<dyn HtmlFetcher>, base_url: &str) -> Result<Self> {
        Self::with_clock(cache, fetcher, base_url, Arc::new(SystemClock))
    }

    pub fn with_clock(
        cache: Cache,
        fetcher: Arc<dyn HtmlFetcher>,
        base_url: &str,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self {
            cache,
            fetcher,
            short_menu: Arc::new(ShortMenuParser::new(&base_url)?),
            labels: Arc::new(LabelParser::new()?),
            base_url,
            clock,
        })
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Today's date in the dining halls' timezone.
    pub fn today(&self) -> NaiveDate {
        timezone::date_at(self.clock.now())
    }

    /// Wall-clock time in the dining halls' timezone.
    pub fn local_time(&self) -> NaiveTime {
        timezone::local_time_at(self.clock.now())
    }

    pub fn get_locations(&self) -> Vec<Location> {
        all_locations()
    }

    pub async fn get_menu(&self, location_id: &str, date: NaiveDate) -> Option<DayMenu> {
        let Some(location) = find_location(location_id) else {
            tracing::debug!(location_id, "Unknown location");
            return None;
        };

        let key = keys::menu_key(location_id, date);
        if let Some(menu) = self.cache.get_json::<DayMenu>(&key).await {
            return Some(menu);
        }

        let url = menu_url(&self.base_url, &location, date);
        let html = match self.fetcher.fetch(&url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(location_id, %date, error = %e, "Failed to fetch menu");
                return None;
            }
        };

        let menu = self.short_menu.parse(&html, &location.id, &location.name, date);
        self.cache.put_json_logged(&key, &menu, Some(MENU_TTL)).await;
        Some(menu)
    }

    pub async fn get_food_detail(&self, item_id: &str, label_url: &str) -> Option<FoodDetail> {
        let key = keys::food_key(item_id);
        if let Some(detail) = self.cache.get_json::<FoodDetail>(&key).await {
            return Some(detail);
        }

        let html = match self.fetcher.fetch(label_url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(item_id, error = %e, "Failed to fetch food detail");
                return None;
            }
        };

        let detail = self.labels.parse(&html, item_id);
        self.cache
            .put_json_logged(&key, &detail, Some(FOOD_DETAIL_TTL))
            .await;
        Some(detail)
    }

    /// One entry per day starting at `start`, in order. Days are fetched
    /// concurrently and independently.
    pub async fn get_menus_for_date_range(
        &self,
        location_id: &str,
        start: NaiveDate,
        days: u32,
    ) -> Vec<Option<DayMenu>> {
        let fetches = (0..u64::from(days)).map(|offset| async move {
            match start.checked_add_days(Days::new(offset)) {
                Some(date) => self.get_menu(location_id, date).await,
                None => None,
            }
        });
        join_all(fetches).await
    }

    /// Earliest and latest dates with published menus around today.
    pub async fn get_date_bounds(&self, location_id: &str) -> Option<DateBounds> {
        find_location(location_id)?;

        let key = keys::date_bounds_key(location_id);
        if let Some(bounds) = self.cache.get_json::<DateBounds>(&key).await {
            return Some(bounds);
        }

        let today = self.today();
        let (forward, backward) = futures::join!(
            self.populated_days(location_id, today, Direction::Forward),
            self.populated_days(location_id, today, Direction::Backward),
        );

        let bounds = DateBounds {
            min_date: scan_bound(today, Direction::Backward, &published(&backward)),
            max_date: scan_bound(today, Direction::Forward, &published(&forward)),
        };
        if forward.iter().chain(&backward).all(Option::is_none) {
            tracing::warn!(location_id, "No menu could be fetched for date bounds; not caching");
            return Some(bounds);
        }
        tracing::info!(
            location_id,
            min_date = %bounds.min_date,
            max_date = %bounds.max_date,
            "Discovered menu date bounds"
        );

        self.cache
            .put_json_logged(&key, &bounds, Some(DATE_BOUNDS_TTL))
            .await;
        Some(bounds)
    }

    /// Fetch every day of the horizon in one direction; this also warms
    /// the menu cache for each of them. `None` marks a day whose menu could
    /// not be fetched.
    async fn populated_days(&self, location_id: &str, today: NaiveDate, direction: Direction) -> Vec<Option<bool>> {
        let fetches = (1..=DATE_BOUNDS_HORIZON).map(|offset| async move {
            let date = direction.step(today, offset)?;
            self.get_menu(location_id, date)
                .await
                .map(|menu| menu.has_items())
        });
        join_all(fetches).await
    }

    /// Items whose name contains `query`, ignoring case, with their meal.
    pub async fn search_menu_items(
        &self,
        location_id: &str,
        date: NaiveDate,
        query: &str,
    ) -> Vec<MealMenuItem> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        let Some(menu) = self.get_menu(location_id, date).await else {
            return Vec::new();
        };

        menu.meals
            .into_iter()
            .flat_map(|(meal, items)| items.into_iter().map(move |item| MealMenuItem { item, meal }))
            .filter(|hit| hit.item.name.to_lowercase().contains(&query))
            .collect()
    }

    /// The day's menu restricted to items passing `filter`; meals left
    /// without items are dropped.
    pub async fn get_filtered_menu(
        &self,
        location_id: &str,
        date: NaiveDate,
        filter: &MenuFilter,
    ) -> Option<DayMenu> {
        let mut menu = self.get_menu(location_id, date).await?;
        for items in menu.meals.values_mut() {
            items.retain(|item| filter.matches(item));
        }
        menu.meals.retain(|_, items| !items.is_empty());
        Some(menu)
    }
}
