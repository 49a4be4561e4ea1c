use axum::extract::{Path, Query, State};
use serde::Deserialize;
use url::Url;

use crate::api::response::{ApiResponse, ErrorCode};
use crate::api::AppState;
use crate::error::BearBitesError;
use crate::models::{find_location, FoodDetail};
use crate::scraper::urls::{label_url, ITEM_ID_PARAM};
use crate::timezone::parse_iso_date;

/// Either the `labelUrl` scraped with the menu item, or the location (and
/// optionally the date, default today) to build one from.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodQuery {
    pub label_url: Option<String>,
    pub location_id: Option<String>,
    pub date: Option<String>,
}

/// A caller-supplied label page must live under the configured vendor base
/// and describe the requested item, since its detail is cached under that id.
fn check_label_url(base_url: &str, item_id: &str, label_url: &str) -> Result<(), BearBitesError> {
    let base = Url::parse(base_url)?;
    let url = Url::parse(label_url)?;

    let base_path = format!("{}/", base.path().trim_end_matches('/'));
    let same_origin = url.scheme() == base.scheme()
        && url.host_str() == base.host_str()
        && url.port_or_known_default() == base.port_or_known_default();
    if !same_origin || !url.path().starts_with(&base_path) {
        return Err(BearBitesError::Validation(
            "labelUrl must point at the menu vendor".to_string(),
        ));
    }

    let labelled = url
        .query_pairs()
        .find(|(key, _)| key == ITEM_ID_PARAM)
        .map(|(_, value)| value);
    if labelled.as_deref() != Some(item_id) {
        return Err(BearBitesError::Validation(format!(
            "labelUrl does not describe item {item_id}"
        )));
    }
    Ok(())
}

fn resolve_label_url(
    state: &AppState,
    item_id: &str,
    query: FoodQuery,
) -> Result<String, ApiResponse<FoodDetail>> {
    if let Some(url) = query.label_url.filter(|url| !url.trim().is_empty()) {
        check_label_url(state.menus.base_url(), item_id, &url)?;
        return Ok(url);
    }

    let Some(location_id) = query.location_id else {
        return Err(ApiResponse::error(
            ErrorCode::InvalidRequest,
            "labelUrl or locationId is required",
        ));
    };
    let location = find_location(&location_id)
        .ok_or_else(|| BearBitesError::UnknownLocation(location_id.clone()))?;
    let date = match query.date {
        Some(value) => parse_iso_date(&value)?,
        None => state.menus.today(),
    };

    Ok(label_url(state.menus.base_url(), &location, date, item_id))
}

/// `GET /api/v1/food/{itemId}?labelUrl=...` or
/// `GET /api/v1/food/{itemId}?locationId=03&date=2026-03-09`
pub async fn get_food_detail(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Query(query): Query<FoodQuery>,
) -> ApiResponse<FoodDetail> {
    if item_id.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Item id cannot be empty");
    }
    let label_url = match resolve_label_url(&state, &item_id, query) {
        Ok(url) => url,
        Err(response) => return response,
    };

    match state.menus.get_food_detail(&item_id, &label_url).await {
        Some(detail) => ApiResponse::success(detail),
        None => ApiResponse::not_found(format!("No label available for item {item_id}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://foodpro.example.edu/foodpro";

    #[test]
    fn test_label_url_must_be_on_vendor() {
        let ok = "https://foodpro.example.edu/foodpro/label.aspx?locationNum=03&RecNumAndPort=061002*3";
        assert!(check_label_url(BASE, "061002*3", ok).is_ok());

        for url in [
            "https://foodpro.example.edu/foodprox/label.aspx?RecNumAndPort=061002*3",
            "https://foodpro.example.edu:8443/foodpro/label.aspx?RecNumAndPort=061002*3",
            "http://foodpro.example.edu/foodpro/label.aspx?RecNumAndPort=061002*3",
            "http://169.254.169.254/latest?RecNumAndPort=061002*3",
        ] {
            assert!(
                matches!(check_label_url(BASE, "061002*3", url), Err(BearBitesError::Validation(_))),
                "{url}"
            );
        }
        assert!(matches!(
            check_label_url(BASE, "061002*3", "not a url"),
            Err(BearBitesError::UrlParse(_))
        ));
    }

    #[test]
    fn test_label_url_must_match_item() {
        let other = "https://foodpro.example.edu/foodpro/label.aspx?RecNumAndPort=MILD";
        assert!(check_label_url(BASE, "HOT", other).is_err());

        let missing = "https://foodpro.example.edu/foodpro/label.aspx?locationNum=03";
        assert!(check_label_url(BASE, "HOT", missing).is_err());

        let encoded = "https://foodpro.example.edu/foodpro/label.aspx?RecNumAndPort=061002%2A3";
        assert!(check_label_url(BASE, "061002*3", encoded).is_ok());
    }
}
