//! Fixed vocabularies from the game's `item_defs` conventions.
//!
//! These tables are exact, not inferred: the customization-area codes,
//! nation directory codes and tier numerals below are the complete sets
//! the game client ships with. Catalog construction treats any code
//! outside them as an error rather than admitting an unknown category.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// The three damage-state geometry branches every model carries, in
/// document order.
pub const MODEL_STATES: [&str; 3] = ["undamaged", "destroyed", "exploded"];

/// A coarse customization surface that camouflage or paint may target.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum Region {
    Gun,
    Chassis,
    Turret,
    Hull,
}

impl Region {
    pub fn name(self) -> &'static str {
        match self {
            Region::Gun => "Gun",
            Region::Chassis => "Chassis",
            Region::Turret => "Turret",
            Region::Hull => "Hull",
        }
    }

    /// Resolve a raw `customizableVehicleAreas` code to its region.
    ///
    /// The code must already be whitespace-trimmed. Codes outside the
    /// table resolve to `None`; callers decide how fatal that is.
    pub fn from_area_code(code: &str) -> Option<Region> {
        match code {
            "GUN" | "GUN GUN_2" => Some(Region::Gun),
            "CHASSIS" => Some(Region::Chassis),
            "TURRET" => Some(Region::Turret),
            "HULL" => Some(Region::Hull),
            _ => None,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Nation directory codes mapped to display names.
pub static NATIONS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("ussr", "USSR"),
        ("germany", "Germany"),
        ("usa", "USA"),
        ("china", "China"),
        ("france", "France"),
        ("uk", "UK"),
        ("japan", "Japan"),
        ("czech", "Czechoslovakia"),
        ("sweden", "Sweden"),
        ("poland", "Poland"),
        ("italy", "Italy"),
    ])
});

pub fn nation_display_name(code: &str) -> Option<&'static str> {
    NATIONS.get(code).copied()
}

/// Roman numeral for a vehicle tier. Styles only exist on tiers 4-10.
pub fn tier_roman(tier: u8) -> Option<&'static str> {
    match tier {
        4 => Some("IV"),
        5 => Some("V"),
        6 => Some("VI"),
        7 => Some("VII"),
        8 => Some("VIII"),
        9 => Some("IX"),
        10 => Some("X"),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn area_codes() {
        assert_eq!(Region::from_area_code("GUN"), Some(Region::Gun));
        assert_eq!(Region::from_area_code("GUN GUN_2"), Some(Region::Gun));
        assert_eq!(Region::from_area_code("CHASSIS"), Some(Region::Chassis));
        assert_eq!(Region::from_area_code("TURRET"), Some(Region::Turret));
        assert_eq!(Region::from_area_code("HULL"), Some(Region::Hull));
        assert_eq!(Region::from_area_code("TRACKS"), None);
    }

    #[test]
    fn nations_table_is_complete() {
        assert_eq!(NATIONS.len(), 11);
        assert_eq!(nation_display_name("czech"), Some("Czechoslovakia"));
        assert_eq!(nation_display_name("atlantis"), None);
    }

    #[test]
    fn tier_numerals() {
        assert_eq!(tier_roman(4), Some("IV"));
        assert_eq!(tier_roman(10), Some("X"));
        assert_eq!(tier_roman(3), None);
        assert_eq!(tier_roman(11), None);
    }
}
