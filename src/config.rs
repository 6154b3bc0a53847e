//! Engine configuration.
//!
//! The canonical sets of damage types, source categories, weapon labels and
//! so on are host data, not engine logic. The engine receives them as an
//! [`EngineConfig`] and never interprets them beyond membership/lookup.
//! Matching against these sets is case-insensitive throughout; the
//! canonical casing stored here is what appears in output tables.

use serde::{Deserialize, Serialize};

/// Default maximum character level the XP table is extended to.
pub const DEFAULT_MAX_LEVEL: u32 = 250;

/// Closed configuration sets injected by the host.
///
/// # Examples
///
/// ```rust
/// use sheetstat::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert!(config.damage_type("fire").is_some());
/// assert_eq!(config.damage_type("fire").unwrap(), "Fire");
/// assert!(config.damage_type("gravity").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Damage types tracked by the history and resistance tables.
    pub damage_types: Vec<String>,
    /// Source categories for the damage-history buckets.
    pub source_categories: Vec<String>,
    /// Weapon-type labels; each has a default attack row.
    pub weapon_types: Vec<String>,
    /// Spell damage sources; a spell's attack row is `Magic{source}`.
    pub spell_sources: Vec<String>,
    /// Status names tracked by the status-count history table.
    pub status_keys: Vec<String>,
    /// Maximum level the XP threshold table is extended to.
    pub max_level: u32,
}

impl EngineConfig {
    /// Resolve a damage type case-insensitively to its canonical casing.
    pub fn damage_type<'a>(&'a self, raw: &str) -> Option<&'a str> {
        canonical(&self.damage_types, raw)
    }

    /// Resolve a source category case-insensitively to its canonical casing.
    pub fn source_category<'a>(&'a self, raw: &str) -> Option<&'a str> {
        canonical(&self.source_categories, raw)
    }

    /// The fallback source category for log entries that omit or misspell
    /// theirs. First entry of the configured list (Melee by default).
    pub fn default_source(&self) -> &str {
        self.source_categories
            .first()
            .map(String::as_str)
            .unwrap_or("Melee")
    }
}

fn canonical<'a>(set: &'a [String], raw: &str) -> Option<&'a str> {
    set.iter()
        .find(|entry| entry.eq_ignore_ascii_case(raw))
        .map(String::as_str)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            damage_types: vec_of(&[
                "Acid",
                "Bludgeoning",
                "Cold",
                "Fire",
                "Force",
                "Lightning",
                "Necrotic",
                "Piercing",
                "Poison",
                "Psychic",
                "Radiant",
                "Slashing",
                "Sonic",
                "Bleed",
            ]),
            source_categories: vec_of(&["Melee", "Ranged", "Explosive"]),
            weapon_types: vec_of(&[
                "ThrownAmmo",
                "ThrownWeapon",
                "Sling",
                "1hCrossbow",
                "Bow",
                "Blowgun",
                "Crossbow",
                "HeavyRange",
                "Siege",
                "Spray",
                "Whip",
                "LightPiercing",
                "LightBludgeoning",
                "LightSlashing",
                "MediumPiercing",
                "MediumBludgeoning",
                "MediumSlashing",
                "HeavyPiercing",
                "HeavyBludgeoning",
                "HeavySlashing",
                "Unarmed",
                "MagicAcid",
                "Explosive",
                "MagicCold",
                "MagicFire",
                "MagicForce",
                "MagicLightning",
                "MagicNecrotic",
                "MagicPoison",
                "MagicPsychic",
                "MagicRadiant",
                "MagicSonic",
            ]),
            spell_sources: vec_of(&[
                "Acid", "Cold", "Fire", "Force", "Lightning", "Necrotic", "Poison", "Psychic",
                "Radiant", "Sonic",
            ]),
            status_keys: vec_of(&[
                "Bleed",
                "Burn",
                "Crit",
                "Fear",
                "Mute",
                "Petrified",
                "Poison",
                "Stun",
                "Pierce",
            ]),
            max_level: DEFAULT_MAX_LEVEL,
        }
    }
}

fn vec_of(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let config = EngineConfig::default();
        assert_eq!(config.damage_type("FIRE"), Some("Fire"));
        assert_eq!(config.source_category("ranged"), Some("Ranged"));
        assert_eq!(config.source_category("teleport"), None);
    }

    #[test]
    fn test_default_source_is_melee() {
        let config = EngineConfig::default();
        assert_eq!(config.default_source(), "Melee");
    }

    #[test]
    fn test_default_set_sizes() {
        let config = EngineConfig::default();
        assert_eq!(config.damage_types.len(), 14);
        assert_eq!(config.source_categories.len(), 3);
        assert_eq!(config.weapon_types.len(), 32);
        assert_eq!(config.spell_sources.len(), 10);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"max_level": 100}"#).unwrap();
        assert_eq!(config.max_level, 100);
        assert_eq!(config.source_categories.len(), 3);
    }
}
