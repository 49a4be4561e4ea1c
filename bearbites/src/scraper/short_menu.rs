//! List page ("short menu") parser.

use chrono::NaiveDate;
use regex::Regex;

use super::icons::IconScanner;
use super::text::decode_entities;
use super::urls::{extract_item_id, resolve_label_path};
use crate::error::Result;
use crate::models::{DayMenu, MealType, MenuItem, SpicyStatus};

pub const DEFAULT_STATION: &str = "General";

/// Station dividers of one meal section, ordered by byte offset.
#[derive(Debug, Default)]
pub struct StationIndex {
    markers: Vec<(usize, String)>,
}

impl StationIndex {
    pub fn new(mut markers: Vec<(usize, String)>) -> Self {
        markers.sort_by_key(|(offset, _)| *offset);
        Self { markers }
    }

    /// The last station whose marker starts before `offset`.
    pub fn station_at(&self, offset: usize) -> &str {
        let idx = self.markers.partition_point(|(start, _)| *start < offset);
        match idx {
            0 => DEFAULT_STATION,
            n => &self.markers[n - 1].1,
        }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

pub struct ShortMenuParser {
    base_url: String,
    meal_header: Regex,
    meal_name: Regex,
    station: Regex,
    item_wrapper: Regex,
    item_link: Regex,
    icons: IconScanner,
}

impl ShortMenuParser {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            meal_header: Regex::new(r#"(?i)<h3 class="shortmenumeals">"#)?,
            meal_name: Regex::new(r"(?i)^(\w+)</h3>")?,
            station: Regex::new(r#"(?i)<div class="shortmenucats">--\s*(.+?)\s*--</div>"#)?,
            item_wrapper: Regex::new(r#"(?is)<div class="menuItemWrapper">(.*?)</div>\s*</td>"#)?,
            item_link: Regex::new(r#"(?i)<a href='(label\.aspx\?[^']+)'[^>]*>\s*([^<]+?)\s*</a>"#)?,
            icons: IconScanner::new()?,
        })
    }

    pub fn parse(&self, html: &str, location_id: &str, location_name: &str, date: NaiveDate) -> DayMenu {
        let mut menu = DayMenu::new(location_id, location_name, date);

        for section in self.meal_sections(html) {
            let Some(caps) = self.meal_name.captures(section) else {
                continue;
            };
            let Ok(meal) = caps[1].parse::<MealType>() else {
                tracing::debug!(heading = &caps[1], "Skipping unrecognised meal section");
                continue;
            };

            let items = self.parse_section(section);
            if !items.is_empty() {
                menu.meals.entry(meal).or_default().extend(items);
            }
        }

        tracing::debug!(
            location_id,
            %date,
            meals = menu.meals.len(),
            items = menu.item_count(),
            "Parsed short menu"
        );
        menu
    }

    /// Text between consecutive meal headers; anything before the first
    /// header is page chrome.
    fn meal_sections<'h>(&self, html: &'h str) -> Vec<&'h str> {
        let headers: Vec<_> = self.meal_header.find_iter(html).collect();
        headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let end = headers.get(i + 1).map_or(html.len(), |next| next.start());
                &html[header.end()..end]
            })
            .collect()
    }

    fn parse_section(&self, section: &str) -> Vec<MenuItem> {
        let stations = StationIndex::new(
            self.station
                .captures_iter(section)
                .filter_map(|caps| {
                    let offset = caps.get(0)?.start();
                    Some((offset, decode_entities(caps[1].trim())))
                })
                .collect(),
        );

        self.item_wrapper
            .captures_iter(section)
            .filter_map(|caps| {
                let offset = caps.get(0)?.start();
                let fragment = caps.get(1)?.as_str();
                self.parse_item(fragment, stations.station_at(offset))
            })
            .collect()
    }

    fn parse_item(&self, fragment: &str, station: &str) -> Option<MenuItem> {
        let Some(link) = self.item_link.captures(fragment) else {
            tracing::trace!("Menu item fragment without label link");
            return None;
        };

        let label_path = decode_entities(&link[1]);
        let name = decode_entities(link[2].trim());
        let id = extract_item_id(&label_path)?;
        if name.is_empty() {
            return None;
        }

        Some(MenuItem {
            id,
            name,
            station: station.to_string(),
            dietary_tags: self.icons.dietary_tags(fragment),
            allergens: self.icons.allergens(fragment),
            label_url: resolve_label_path(&self.base_url, &label_path),
            is_spicy: SpicyStatus::Unknown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Allergen, DietaryTag};

    fn item_html(id: &str, name: &str, icons: &str) -> String {
        format!(
            r#"<tr><td><div class="menuItemWrapper"><div class="shortmenurecipes"><a href='label.aspx?locationNum=03&RecNumAndPort={id}' target='_self'>
                {name}
            </a></div><div class="menuItemPieceIcons">{icons}</div></div></td></tr>"#
        )
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    #[test]
    fn test_station_index_picks_last_preceding_marker() {
        let index = StationIndex::new(vec![(50, "Grill".into()), (10, "Deli".into())]);
        assert_eq!(index.station_at(5), DEFAULT_STATION);
        assert_eq!(index.station_at(10), DEFAULT_STATION);
        assert_eq!(index.station_at(11), "Deli");
        assert_eq!(index.station_at(49), "Deli");
        assert_eq!(index.station_at(51), "Grill");
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_items_without_station_get_default() {
        let html = format!(
            r#"<h3 class="shortmenumeals">Dinner</h3>{}"#,
            item_html("100*1", "Rice", "")
        );
        let parser = ShortMenuParser::new("http://vendor").unwrap();
        let menu = parser.parse(&html, "03", "Glasgow", date());

        let dinner = &menu.meals[&MealType::Dinner];
        assert_eq!(dinner[0].station, DEFAULT_STATION);
        assert_eq!(dinner[0].name, "Rice");
        assert_eq!(
            dinner[0].label_url,
            "http://vendor/label.aspx?locationNum=03&RecNumAndPort=100*1"
        );
    }

    #[test]
    fn test_empty_and_unknown_meals_are_omitted() {
        let html = format!(
            r#"<h3 class="shortmenumeals">Breakfast</h3><div class="shortmenucats">-- Grill --</div>
               <h3 class="shortmenumeals">Midnight</h3>{}
               <h3 class="SHORTMENUMEALS">LUNCH</h3>{}"#,
            item_html("1", "Waffle", ""),
            item_html("2", "Salad", r#"<img src="LegendImages/vgn_.png"><img src="AllergenImages/sesame.png">"#),
        );
        let parser = ShortMenuParser::new("http://vendor").unwrap();
        let menu = parser.parse(&html, "03", "Glasgow", date());

        assert_eq!(menu.meals.keys().copied().collect::<Vec<_>>(), vec![MealType::Lunch]);
        let salad = &menu.meals[&MealType::Lunch][0];
        assert!(salad.dietary_tags.contains(&DietaryTag::Vegan));
        assert!(salad.allergens.contains(&Allergen::Sesame));
    }

    #[test]
    fn test_fragments_without_link_or_id_are_skipped() {
        let html = r#"<h3 class="shortmenumeals">Lunch</h3>
            <div class="menuItemWrapper"><span>No link</span></div></td>
            <div class="menuItemWrapper"><a href='label.aspx?locationNum=03'>No id</a></div></td>"#;
        let parser = ShortMenuParser::new("http://vendor").unwrap();
        let menu = parser.parse(html, "03", "Glasgow", date());
        assert!(menu.meals.is_empty());
    }
}
