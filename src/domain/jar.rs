//! The six fixed jar categories and their catalog metadata.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::common::Displayable;

/// Closed set of jar categories. Serialized as the upper-case category code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JarId {
    Nec,
    Ffa,
    Lts,
    Edu,
    Play,
    Give,
}

impl JarId {
    /// All categories in catalog order.
    pub const ALL: [JarId; 6] = [
        JarId::Nec,
        JarId::Ffa,
        JarId::Lts,
        JarId::Edu,
        JarId::Play,
        JarId::Give,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JarId::Nec => "NEC",
            JarId::Ffa => "FFA",
            JarId::Lts => "LTS",
            JarId::Edu => "EDU",
            JarId::Play => "PLAY",
            JarId::Give => "GIVE",
        }
    }

    /// Looks up a category by its exact code.
    pub fn from_code(code: &str) -> Option<JarId> {
        JarId::ALL.into_iter().find(|id| id.as_str() == code)
    }

    /// Static metadata for this category.
    pub fn catalog_entry(&self) -> &'static CatalogEntry {
        let index = match self {
            JarId::Nec => 0,
            JarId::Ffa => 1,
            JarId::Lts => 2,
            JarId::Edu => 3,
            JarId::Play => 4,
            JarId::Give => 5,
        };
        &CATALOG[index]
    }
}

impl fmt::Display for JarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JarId {
    type Err = String;

    /// Case-insensitive parse, used for user input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JarId::from_code(&s.trim().to_ascii_uppercase())
            .ok_or_else(|| format!("unknown jar `{}`", s.trim()))
    }
}

/// Immutable reference data for one jar category.
#[derive(Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: JarId,
    pub name: &'static str,
    pub description: &'static str,
    pub default_percentage: u8,
    pub color: &'static str,
    pub icon: &'static str,
}

static CATALOG: [CatalogEntry; 6] = [
    CatalogEntry {
        id: JarId::Nec,
        name: "Necessities",
        description: "Everyday living costs: food, housing, transport, bills.",
        default_percentage: 55,
        color: "sky",
        icon: "home",
    },
    CatalogEntry {
        id: JarId::Ffa,
        name: "Financial Freedom",
        description: "Invested to build passive income. Never spent.",
        default_percentage: 10,
        color: "emerald",
        icon: "trend-up",
    },
    CatalogEntry {
        id: JarId::Lts,
        name: "Long-term Savings",
        description: "Big goals: a home, a car, travel, a wedding.",
        default_percentage: 10,
        color: "indigo",
        icon: "moon",
    },
    CatalogEntry {
        id: JarId::Edu,
        name: "Education",
        description: "Investing in yourself: books, courses, seminars.",
        default_percentage: 10,
        color: "amber",
        icon: "cap",
    },
    CatalogEntry {
        id: JarId::Play,
        name: "Play",
        description: "Hobbies, entertainment, and rewarding yourself.",
        default_percentage: 10,
        color: "rose",
        icon: "heart",
    },
    CatalogEntry {
        id: JarId::Give,
        name: "Give",
        description: "Charity, helping family and friends, gifts.",
        default_percentage: 5,
        color: "fuchsia",
        icon: "people",
    },
];

/// The full catalog in its fixed order.
pub fn catalog() -> &'static [CatalogEntry] {
    &CATALOG
}

/// One jar per category at its default percentage, in catalog order.
pub fn default_jars() -> Vec<Jar> {
    JarId::ALL.into_iter().map(Jar::from_catalog).collect()
}

/// A jar as configured inside one month's record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jar {
    pub id: JarId,
    pub name: String,
    pub description: String,
    pub percentage: u8,
    pub color: String,
    pub icon: String,
}

impl Jar {
    /// Builds the jar for `id` at the catalog's default percentage.
    pub fn from_catalog(id: JarId) -> Self {
        Self::with_percentage(id, id.catalog_entry().default_percentage)
    }

    /// Catalog metadata for `id` with the given percentage overlaid.
    pub fn with_percentage(id: JarId, percentage: u8) -> Self {
        let entry = id.catalog_entry();
        Self {
            id,
            name: entry.name.to_string(),
            description: entry.description.to_string(),
            percentage,
            color: entry.color.to_string(),
            icon: entry.icon.to_string(),
        }
    }
}

impl Displayable for Jar {
    fn display_label(&self) -> String {
        format!("{} {} ({}%)", self.id, self.name, self.percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_order_matches_ids() {
        let ids: Vec<JarId> = catalog().iter().map(|entry| entry.id).collect();
        assert_eq!(ids, JarId::ALL.to_vec());
        for id in JarId::ALL {
            assert_eq!(id.catalog_entry().id, id);
        }
    }

    #[test]
    fn default_percentages_sum_to_one_hundred() {
        let total: u32 = default_jars().iter().map(|jar| jar.percentage as u32).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn jar_id_serializes_as_code() {
        let json = serde_json::to_string(&JarId::Play).unwrap();
        assert_eq!(json, "\"PLAY\"");
        let parsed: JarId = serde_json::from_str("\"GIVE\"").unwrap();
        assert_eq!(parsed, JarId::Give);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("nec".parse::<JarId>().unwrap(), JarId::Nec);
        assert!("travel".parse::<JarId>().is_err());
    }
}
