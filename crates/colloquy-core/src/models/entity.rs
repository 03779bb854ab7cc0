use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Entity categories the classifier knows how to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    ProductType,
    PriceRange,
    Brand,
    Sport,
    Team,
}

impl EntityType {
    pub const ALL: [EntityType; 5] = [
        Self::ProductType,
        Self::PriceRange,
        Self::Brand,
        Self::Sport,
        Self::Team,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProductType => "product_type",
            Self::PriceRange => "price_range",
            Self::Brand => "brand",
            Self::Sport => "sport",
            Self::Team => "team",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity type → ordered, deduplicated values.
pub type EntityMap = BTreeMap<EntityType, Vec<String>>;

/// Append `value` under `entity_type` unless it is already present.
/// Returns true when the value was new.
pub fn push_entity(map: &mut EntityMap, entity_type: EntityType, value: &str) -> bool {
    let values = map.entry(entity_type).or_default();
    if values.iter().any(|v| v == value) {
        return false;
    }
    values.push(value.to_string());
    true
}

/// Merge every value of `from` into `into`, keeping first-seen order.
pub fn merge_entities(into: &mut EntityMap, from: &EntityMap) -> usize {
    let mut added = 0;
    for (entity_type, values) in from {
        for value in values {
            if push_entity(into, *entity_type, value) {
                added += 1;
            }
        }
    }
    added
}
