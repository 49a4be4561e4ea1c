use serde::{Deserialize, Serialize};

/// A dining hall as known to the vendor (`locationNum` / `locationName`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
}

struct LocationEntry {
    id: &'static str,
    name: &'static str,
}

const LOCATIONS: &[LocationEntry] = &[
    LocationEntry {
        id: "02",
        name: "Lothian",
    },
    LocationEntry {
        id: "03",
        name: "Glasgow",
    },
];

pub fn all_locations() -> Vec<Location> {
    LOCATIONS
        .iter()
        .map(|entry| Location {
            id: entry.id.to_string(),
            name: entry.name.to_string(),
        })
        .collect()
}

pub fn find_location(location_id: &str) -> Option<Location> {
    LOCATIONS
        .iter()
        .find(|entry| entry.id == location_id)
        .map(|entry| Location {
            id: entry.id.to_string(),
            name: entry.name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_location() {
        assert_eq!(find_location("03").map(|l| l.name), Some("Glasgow".to_string()));
        assert!(find_location("99").is_none());
        assert!(find_location("").is_none());
    }

    #[test]
    fn test_all_locations_are_unique() {
        let locations = all_locations();
        assert_eq!(locations.len(), 2);
        assert_ne!(locations[0].id, locations[1].id);
    }
}
