//! Published serving hours per location.
//!
//! The vendor pages do not carry hours, so these are a static table keyed by
//! location and by weekday/weekend. Dates are calendar dates in the reference
//! timezone; callers pass the local wall-clock time when asking for a status.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::MealType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    pub fn for_date(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => Self::Weekend,
            _ => Self::Weekday,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl std::fmt::Display for MealHours {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%-I:%M %p"),
            self.end.format("%-I:%M %p")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealStatus {
    Open,
    Upcoming,
    Closed,
}

const fn hm(hour: u32, minute: u32) -> (u32, u32) {
    (hour, minute)
}

type Window = Option<((u32, u32), (u32, u32))>;

/// (location, day type, [breakfast, brunch, lunch, dinner])
const HOURS: &[(&str, DayType, [Window; 4])] = &[
    (
        "03",
        DayType::Weekday,
        [
            Some((hm(7, 30), hm(10, 30))),
            None,
            Some((hm(10, 30), hm(14, 30))),
            Some((hm(17, 0), hm(21, 0))),
        ],
    ),
    (
        "03",
        DayType::Weekend,
        [
            None,
            Some((hm(10, 0), hm(14, 30))),
            None,
            Some((hm(17, 0), hm(21, 0))),
        ],
    ),
    (
        "02",
        DayType::Weekday,
        [
            None,
            None,
            Some((hm(11, 0), hm(14, 30))),
            Some((hm(17, 0), hm(22, 0))),
        ],
    ),
    ("02", DayType::Weekend, [None, None, None, None]),
];

fn meal_index(meal: MealType) -> usize {
    match meal {
        MealType::Breakfast => 0,
        MealType::Brunch => 1,
        MealType::Lunch => 2,
        MealType::Dinner => 3,
    }
}

/// Serving window for a meal, or `None` when the meal is not served.
pub fn meal_hours(location_id: &str, meal: MealType, date: NaiveDate) -> Option<MealHours> {
    let day_type = DayType::for_date(date);
    let (_, _, windows) = HOURS
        .iter()
        .find(|(id, kind, _)| *id == location_id && *kind == day_type)?;
    let ((sh, sm), (eh, em)) = windows[meal_index(meal)]?;

    Some(MealHours {
        start: NaiveTime::from_hms_opt(sh, sm, 0)?,
        end: NaiveTime::from_hms_opt(eh, em, 0)?,
    })
}

pub fn meal_status(location_id: &str, meal: MealType, date: NaiveDate, now: NaiveTime) -> MealStatus {
    let Some(hours) = meal_hours(location_id, meal, date) else {
        return MealStatus::Closed;
    };

    if now < hours.start {
        MealStatus::Upcoming
    } else if now < hours.end {
        MealStatus::Open
    } else {
        MealStatus::Closed
    }
}

pub fn available_meals(location_id: &str, date: NaiveDate) -> Vec<MealType> {
    MealType::ALL
        .into_iter()
        .filter(|meal| meal_hours(location_id, *meal, date).is_some())
        .collect()
}

/// The meal open right now, else the next one today, else the last one
/// served today. Falls back to dinner for a closed day.
pub fn current_or_next_meal(location_id: &str, date: NaiveDate, now: NaiveTime) -> MealType {
    let statuses: Vec<(MealType, MealStatus)> = MealType::ALL
        .into_iter()
        .map(|meal| (meal, meal_status(location_id, meal, date, now)))
        .collect();

    if let Some((meal, _)) = statuses.iter().find(|(_, s)| *s == MealStatus::Open) {
        return *meal;
    }
    if let Some((meal, _)) = statuses.iter().find(|(_, s)| *s == MealStatus::Upcoming) {
        return *meal;
    }

    available_meals(location_id, date)
        .last()
        .copied()
        .unwrap_or(MealType::Dinner)
}

/// Weekend brunch is published by the vendor under the lunch heading.
pub fn api_meal_key(meal: MealType, date: NaiveDate) -> MealType {
    if meal == MealType::Brunch && DayType::for_date(date) == DayType::Weekend {
        MealType::Lunch
    } else {
        meal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn saturday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 24).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_weekday_hours() {
        let hours = meal_hours("03", MealType::Breakfast, monday()).unwrap();
        assert_eq!(hours.to_string(), "7:30 AM - 10:30 AM");
        assert!(meal_hours("03", MealType::Brunch, monday()).is_none());
        assert!(meal_hours("99", MealType::Lunch, monday()).is_none());
    }

    #[test]
    fn test_meal_status_transitions() {
        assert_eq!(
            meal_status("03", MealType::Lunch, monday(), at(9, 0)),
            MealStatus::Upcoming
        );
        assert_eq!(
            meal_status("03", MealType::Lunch, monday(), at(10, 30)),
            MealStatus::Open
        );
        assert_eq!(
            meal_status("03", MealType::Lunch, monday(), at(14, 30)),
            MealStatus::Closed
        );
    }

    #[test]
    fn test_current_or_next_meal() {
        assert_eq!(current_or_next_meal("03", monday(), at(8, 0)), MealType::Breakfast);
        assert_eq!(current_or_next_meal("03", monday(), at(15, 0)), MealType::Dinner);
        assert_eq!(current_or_next_meal("03", monday(), at(23, 0)), MealType::Dinner);
        assert_eq!(current_or_next_meal("02", saturday(), at(12, 0)), MealType::Dinner);
    }

    #[test]
    fn test_weekend_brunch_maps_to_lunch() {
        assert_eq!(api_meal_key(MealType::Brunch, saturday()), MealType::Lunch);
        assert_eq!(api_meal_key(MealType::Brunch, monday()), MealType::Brunch);
        assert_eq!(api_meal_key(MealType::Dinner, saturday()), MealType::Dinner);
    }

    #[test]
    fn test_closed_location_has_no_meals() {
        assert!(available_meals("02", saturday()).is_empty());
        assert_eq!(
            available_meals("03", saturday()),
            vec![MealType::Brunch, MealType::Dinner]
        );
    }
}
