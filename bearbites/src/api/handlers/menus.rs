//! Menu, location and date-bounds handlers.

use axum::extract::{Path, Query, State};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeSet;

use crate::api::response::{ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::error::BearBitesError;
use crate::models::{find_location, Allergen, DateBounds, DayMenu, Location, MealMenuItem, MenuFilter};
use crate::timezone::parse_iso_date;

pub const DEFAULT_RANGE_DAYS: u32 = 7;
pub const MAX_RANGE_DAYS: u32 = 14;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterQuery {
    #[serde(default)]
    pub vegan: bool,
    #[serde(default)]
    pub vegetarian: bool,
    #[serde(default)]
    pub gluten_free: bool,
    /// Comma-separated allergen names, e.g. `milk,tree-nuts`.
    pub exclude: Option<String>,
}

impl FilterQuery {
    fn into_filter(self) -> Result<MenuFilter, BearBitesError> {
        let mut exclude_allergens = BTreeSet::new();
        for name in self.exclude.iter().flat_map(|list| list.split(',')) {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let allergen: Allergen = name.parse().map_err(BearBitesError::Validation)?;
            exclude_allergens.insert(allergen);
        }
        Ok(MenuFilter {
            vegan: self.vegan,
            vegetarian: self.vegetarian,
            gluten_free: self.gluten_free,
            exclude_allergens,
        })
    }
}

fn check_location<T: serde::Serialize>(location_id: &str) -> Result<(), ApiResponse<T>> {
    match find_location(location_id) {
        Some(_) => Ok(()),
        None => Err(BearBitesError::UnknownLocation(location_id.to_string()).into()),
    }
}

fn menu_unavailable<T: serde::Serialize>(location_id: &str, date: NaiveDate) -> ApiResponse<T> {
    ApiResponse::not_found(format!("No menu available for location {location_id} on {date}"))
}

/// `GET /api/v1/locations`
pub async fn list_locations(State(state): State<AppState>) -> ApiResponse<Vec<Location>> {
    ApiResponse::success(state.menus.get_locations())
}

/// `GET /api/v1/menus/{locationId}/{date}`
///
/// Queues the menu for spicy enrichment without waiting on it.
pub async fn get_menu(
    State(state): State<AppState>,
    Path((location_id, date)): Path<(String, String)>,
) -> ApiResponse<DayMenu> {
    if let Err(resp) = check_location(&location_id) {
        return resp;
    }
    let date = match parse_iso_date(&date) {
        Ok(date) => date,
        Err(e) => return e.into(),
    };

    match state.menus.get_menu(&location_id, date).await {
        Some(menu) => {
            state.enrichment.submit(menu.clone());
            ApiResponse::success(menu)
        }
        None => menu_unavailable(&location_id, date),
    }
}

/// `GET /api/v1/menus/{locationId}?start=YYYY-MM-DD&days=N`
///
/// One entry per day; days that could not be loaded are `null`.
pub async fn get_menu_range(
    State(state): State<AppState>,
    Path(location_id): Path<String>,
    Query(query): Query<RangeQuery>,
) -> ApiResponse<Vec<Option<DayMenu>>> {
    if let Err(resp) = check_location(&location_id) {
        return resp;
    }

    let days = query.days.unwrap_or(DEFAULT_RANGE_DAYS);
    if !(1..=MAX_RANGE_DAYS).contains(&days) {
        return ApiResponse::error(
            ErrorCode::InvalidRequest,
            format!("days must be between 1 and {MAX_RANGE_DAYS}"),
        );
    }
    let start = match query.start.as_deref() {
        Some(value) => match parse_iso_date(value) {
            Ok(date) => date,
            Err(e) => return e.into(),
        },
        None => state.menus.today(),
    };

    ApiResponse::success(
        state
            .menus
            .get_menus_for_date_range(&location_id, start, days)
            .await,
    )
}

/// `GET /api/v1/locations/{locationId}/date-bounds`
pub async fn get_date_bounds(
    State(state): State<AppState>,
    Path(location_id): Path<String>,
) -> ApiResponse<DateBounds> {
    if let Err(resp) = check_location(&location_id) {
        return resp;
    }

    match state.menus.get_date_bounds(&location_id).await {
        Some(bounds) => ApiResponse::success(bounds),
        None => ApiResponse::error(ErrorCode::InternalError, "Date bounds unavailable"),
    }
}

/// `GET /api/v1/menus/{locationId}/{date}/search?q=...`
pub async fn search_menu(
    State(state): State<AppState>,
    Path((location_id, date)): Path<(String, String)>,
    Query(query): Query<SearchQuery>,
) -> ApiResponse<Vec<MealMenuItem>> {
    if let Err(resp) = check_location(&location_id) {
        return resp;
    }
    let date = match parse_iso_date(&date) {
        Ok(date) => date,
        Err(e) => return e.into(),
    };
    if query.q.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Query cannot be empty");
    }

    ApiResponse::success(
        state
            .menus
            .search_menu_items(&location_id, date, &query.q)
            .await,
    )
}

/// `GET /api/v1/menus/{locationId}/{date}/filtered?vegan=true&exclude=milk`
pub async fn get_filtered_menu(
    State(state): State<AppState>,
    Path((location_id, date)): Path<(String, String)>,
    Query(query): Query<FilterQuery>,
) -> ApiResponse<DayMenu> {
    if let Err(resp) = check_location(&location_id) {
        return resp;
    }
    let date = match parse_iso_date(&date) {
        Ok(date) => date,
        Err(e) => return e.into(),
    };
    let filter = match query.into_filter() {
        Ok(filter) => filter,
        Err(e) => return e.into(),
    };

    match state.menus.get_filtered_menu(&location_id, date, &filter).await {
        Some(menu) => ApiResponse::success(menu),
        None => menu_unavailable(&location_id, date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_query_parses_allergens() {
        let query = FilterQuery {
            vegan: true,
            exclude: Some("milk, tree-nuts,,".to_string()),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert!(filter.vegan);
        assert_eq!(
            filter.exclude_allergens,
            BTreeSet::from([Allergen::Milk, Allergen::TreeNuts])
        );
    }

    #[test]
    fn test_filter_query_rejects_unknown_allergen() {
        let query = FilterQuery {
            exclude: Some("gluten".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            query.into_filter(),
            Err(BearBitesError::Validation(_))
        ));
    }
}
