use axum::extract::{Path, Query, State};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::response::ApiResponse;
use crate::api::AppState;
use crate::error::BearBitesError;
use crate::models::{
    api_meal_key, available_meals, current_or_next_meal, find_location, meal_hours, meal_status,
    DayType, MealHours, MealStatus, MealType,
};
use crate::timezone::parse_iso_date;

#[derive(Debug, Deserialize)]
pub struct HoursQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSchedule {
    pub meal: MealType,
    /// Meal heading the vendor publishes this meal's items under.
    pub data_meal: MealType,
    pub hours: MealHours,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MealStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoursData {
    pub location_id: String,
    pub date: NaiveDate,
    pub day_type: DayType,
    /// Only reported for today.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_meal: Option<MealType>,
    pub meals: Vec<MealSchedule>,
}

/// `GET /api/v1/locations/{locationId}/hours?date=YYYY-MM-DD`
pub async fn get_hours(
    State(state): State<AppState>,
    Path(location_id): Path<String>,
    Query(query): Query<HoursQuery>,
) -> ApiResponse<HoursData> {
    if find_location(&location_id).is_none() {
        return BearBitesError::UnknownLocation(location_id).into();
    }
    let today = state.menus.today();
    let date = match query.date.as_deref().map(parse_iso_date) {
        Some(Ok(date)) => date,
        Some(Err(e)) => return e.into(),
        None => today,
    };
    let now = (date == today).then(|| state.menus.local_time());

    let meals = available_meals(&location_id, date)
        .into_iter()
        .filter_map(|meal| {
            let hours = meal_hours(&location_id, meal, date)?;
            Some(MealSchedule {
                meal,
                data_meal: api_meal_key(meal, date),
                hours,
                label: hours.to_string(),
                status: now.map(|now| meal_status(&location_id, meal, date, now)),
            })
        })
        .collect();

    ApiResponse::success(HoursData {
        current_meal: now.map(|now| current_or_next_meal(&location_id, date, now)),
        day_type: DayType::for_date(date),
        location_id,
        date,
        meals,
    })
}
