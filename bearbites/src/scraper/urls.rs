//! Vendor URL construction. The query strings are reproduced exactly as the
//! vendor's own pages build them, including the pre-encoded constants.

use chrono::NaiveDate;

use crate::models::Location;
use crate::timezone::format_vendor_date;

const SITE_NAME: &str = "University+of+California%2c+Riverside+Dining+Services";
const WEEKS_MENUS: &str = "This+Week%27s+Menus";
/// Query key carrying the item id on label pages.
pub const ITEM_ID_PARAM: &str = "RecNumAndPort";

pub fn menu_url(base_url: &str, location: &Location, date: NaiveDate) -> String {
    format!(
        "{base_url}/shortmenu.aspx?sName={SITE_NAME}&locationNum={}&locationName={}&naFlag=1&WeeksMenus={WEEKS_MENUS}&myaction=read&dtdate={}",
        location.id,
        urlencoding::encode(&location.name),
        urlencoding::encode(&format_vendor_date(date)),
    )
}

pub fn label_url(base_url: &str, location: &Location, date: NaiveDate, item_id: &str) -> String {
    format!(
        "{base_url}/label.aspx?locationNum={}&locationName={}&dtdate={}&{ITEM_ID_PARAM}={}",
        location.id,
        urlencoding::encode(&location.name),
        urlencoding::encode(&format_vendor_date(date)),
        urlencoding::encode(item_id),
    )
}

/// Absolute URL for a label path scraped from a list page.
pub fn resolve_label_path(base_url: &str, label_path: &str) -> String {
    format!("{base_url}/{}", label_path.trim_start_matches('/'))
}

/// The item id is the URL-decoded `RecNumAndPort` query value.
pub fn extract_item_id(label_path: &str) -> Option<String> {
    let marker = format!("{ITEM_ID_PARAM}=");
    let start = label_path.find(&marker)? + marker.len();
    let rest = &label_path[start..];
    let end = rest.find(['&', '\'', '"']).unwrap_or(rest.len());
    let raw = &rest[..end];
    if raw.is_empty() {
        return None;
    }

    match urlencoding::decode(raw) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(e) => {
            tracing::debug!(value = raw, error = %e, "Undecodable item id");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glasgow() -> Location {
        Location {
            id: "03".to_string(),
            name: "Glasgow".to_string(),
        }
    }

    #[test]
    fn test_menu_url_is_exact() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(
            menu_url("https://foodpro.ucr.edu/foodpro", &glasgow(), date),
            "https://foodpro.ucr.edu/foodpro/shortmenu.aspx?sName=University+of+California%2c+Riverside+Dining+Services&locationNum=03&locationName=Glasgow&naFlag=1&WeeksMenus=This+Week%27s+Menus&myaction=read&dtdate=3%2F9%2F2026"
        );
    }

    #[test]
    fn test_label_url_encodes_item_id() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(
            label_url("http://vendor", &glasgow(), date, "061002*3"),
            "http://vendor/label.aspx?locationNum=03&locationName=Glasgow&dtdate=10%2F19%2F2026&RecNumAndPort=061002%2A3"
        );
    }

    #[test]
    fn test_extract_item_id() {
        assert_eq!(
            extract_item_id("label.aspx?locationNum=03&RecNumAndPort=061002%2A3&x=1"),
            Some("061002*3".to_string())
        );
        assert_eq!(
            extract_item_id("label.aspx?RecNumAndPort=123456*1"),
            Some("123456*1".to_string())
        );
        assert_eq!(extract_item_id("label.aspx?locationNum=03"), None);
        assert_eq!(extract_item_id("label.aspx?RecNumAndPort=&a=b"), None);
    }

    #[test]
    fn test_resolve_label_path() {
        assert_eq!(
            resolve_label_path("http://vendor/foodpro", "label.aspx?a=1"),
            "http://vendor/foodpro/label.aspx?a=1"
        );
    }
}
