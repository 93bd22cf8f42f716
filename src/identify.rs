//! Mock plant identification.
//!
//! There is no image model: the uploaded file's name is matched against a
//! fixed table of substrings, first match wins.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantInfo {
    pub name: String,
    pub growth: String,
    pub water: String,
    pub light: String,
    pub habitat: String,
}

struct PlantEntry {
    patterns: &'static [&'static str],
    name: &'static str,
    growth: &'static str,
    water: &'static str,
    light: &'static str,
    habitat: &'static str,
}

impl PlantEntry {
    fn to_info(&self) -> PlantInfo {
        PlantInfo {
            name: self.name.to_string(),
            growth: self.growth.to_string(),
            water: self.water.to_string(),
            light: self.light.to_string(),
            habitat: self.habitat.to_string(),
        }
    }
}

const PLANTS: &[PlantEntry] = &[
    PlantEntry {
        patterns: &["blueagava"],
        name: "Blue Agava",
        growth: "Perennial",
        water: "Medium",
        light: "6 Hrs",
        habitat: "Mexico",
    },
    PlantEntry {
        patterns: &["gasteria"],
        name: "Gasteria",
        growth: "Perennial",
        water: "Low",
        light: "4 - 6 Hrs",
        habitat: "South Africa",
    },
    PlantEntry {
        patterns: &["aloevera"],
        name: "Aloe Vera",
        growth: "Perennial",
        water: "Low",
        light: "6 - 8 Hrs",
        habitat: "Africa",
    },
    PlantEntry {
        patterns: &["ghaf"],
        name: "Ghaf Tree",
        growth: "Perennial",
        water: "Very low",
        light: "Full sun",
        habitat: "Desert, native to UAE",
    },
    PlantEntry {
        patterns: &["deserthyacinth"],
        name: "Desert Hyacinth",
        growth: "Perennial herb",
        water: "Minimal (parasitic plant)",
        light: "Full desert sun",
        habitat: "Sandy deserts of UAE",
    },
    PlantEntry {
        // The published sample images use the misspelled form.
        patterns: &["tribulusomanense", "tribulusomanese"],
        name: "Tribulus omanense",
        growth: "Annual ground cover",
        water: "Low",
        light: "Full sun",
        habitat: "Desert plains of UAE",
    },
];

/// Identify a plant from an uploaded file name (case-insensitive).
pub fn identify_by_file_name(file_name: &str) -> PlantInfo {
    let lower = file_name.to_lowercase();
    PLANTS
        .iter()
        .find(|entry| entry.patterns.iter().any(|p| lower.contains(p)))
        .map(PlantEntry::to_info)
        .unwrap_or_else(unknown_plant)
}

pub fn unknown_plant() -> PlantInfo {
    PlantInfo {
        name: "Unknown Plant".to_string(),
        growth: "-".to_string(),
        water: "-".to_string(),
        light: "-".to_string(),
        habitat: "-".to_string(),
    }
}
