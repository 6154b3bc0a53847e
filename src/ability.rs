//! The five core abilities and their per-source score columns.
//!
//! Every ability total is an additive stack of columns: the race base (read
//! from the owned race item at derivation time), plus the stored `level`,
//! `gear`, `misc` and `temp` columns kept here. Columns are never collapsed
//! in storage; the derivation sums them fresh on every pass.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five core abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityKey {
    Str,
    Dex,
    Con,
    Int,
    Cha,
}

impl AbilityKey {
    /// All abilities in canonical order.
    pub const ALL: [AbilityKey; 5] = [
        AbilityKey::Str,
        AbilityKey::Dex,
        AbilityKey::Con,
        AbilityKey::Int,
        AbilityKey::Cha,
    ];

    /// The lowercase storage key.
    pub fn as_str(self) -> &'static str {
        match self {
            AbilityKey::Str => "str",
            AbilityKey::Dex => "dex",
            AbilityKey::Con => "con",
            AbilityKey::Int => "int",
            AbilityKey::Cha => "cha",
        }
    }

    /// The display label.
    pub fn label(self) -> &'static str {
        match self {
            AbilityKey::Str => "Strength",
            AbilityKey::Dex => "Dexterity",
            AbilityKey::Con => "Constitution",
            AbilityKey::Int => "Intelligence",
            AbilityKey::Cha => "Charisma",
        }
    }

    /// Parse a lowercase storage key.
    pub fn from_str_key(key: &str) -> Option<AbilityKey> {
        AbilityKey::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl fmt::Display for AbilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored score columns for one ability. The race base lives on the race
/// item, not here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityScore {
    pub level: f64,
    pub gear: f64,
    pub misc: f64,
    pub temp: f64,
}

impl AbilityScore {
    /// Sum of the stored columns, excluding the race base.
    pub fn component_sum(&self) -> f64 {
        self.level + self.gear + self.misc + self.temp
    }
}

/// A value per ability, addressed by [`AbilityKey`].
///
/// # Examples
///
/// ```rust
/// use sheetstat::{AbilityKey, PerAbility};
///
/// let mut levels: PerAbility<f64> = PerAbility::default();
/// *levels.get_mut(AbilityKey::Str) = 3.0;
/// assert_eq!(*levels.get(AbilityKey::Str), 3.0);
/// assert_eq!(levels.sum(), 3.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct PerAbility<T> {
    pub str: T,
    pub dex: T,
    pub con: T,
    pub int: T,
    pub cha: T,
}

impl<T> PerAbility<T> {
    pub fn get(&self, key: AbilityKey) -> &T {
        match key {
            AbilityKey::Str => &self.str,
            AbilityKey::Dex => &self.dex,
            AbilityKey::Con => &self.con,
            AbilityKey::Int => &self.int,
            AbilityKey::Cha => &self.cha,
        }
    }

    pub fn get_mut(&mut self, key: AbilityKey) -> &mut T {
        match key {
            AbilityKey::Str => &mut self.str,
            AbilityKey::Dex => &mut self.dex,
            AbilityKey::Con => &mut self.con,
            AbilityKey::Int => &mut self.int,
            AbilityKey::Cha => &mut self.cha,
        }
    }

    /// Iterate in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (AbilityKey, &T)> {
        AbilityKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }

    /// Build a table by mapping each ability through `f`.
    pub fn from_fn(mut f: impl FnMut(AbilityKey) -> T) -> Self {
        PerAbility {
            str: f(AbilityKey::Str),
            dex: f(AbilityKey::Dex),
            con: f(AbilityKey::Con),
            int: f(AbilityKey::Int),
            cha: f(AbilityKey::Cha),
        }
    }
}

impl PerAbility<f64> {
    /// Sum across all five abilities.
    pub fn sum(&self) -> f64 {
        self.str + self.dex + self.con + self.int + self.cha
    }
}

/// The stored ability block of a character.
pub type Abilities = PerAbility<AbilityScore>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_roundtrip() {
        for key in AbilityKey::ALL {
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key.as_str()));
            let back: AbilityKey = serde_json::from_str(&json).unwrap();
            assert_eq!(back, key);
            assert_eq!(AbilityKey::from_str_key(key.as_str()), Some(key));
        }
        assert_eq!(AbilityKey::from_str_key("wis"), None);
    }

    #[test]
    fn test_component_sum() {
        let score = AbilityScore {
            level: 1.0,
            gear: 1.0,
            misc: 0.5,
            temp: -0.5,
        };
        assert_eq!(score.component_sum(), 2.0);
    }

    #[test]
    fn test_sparse_json_defaults() {
        let abilities: Abilities =
            serde_json::from_str(r#"{"str": {"level": 2}}"#).unwrap();
        assert_eq!(abilities.str.level, 2.0);
        assert_eq!(abilities.str.gear, 0.0);
        assert_eq!(abilities.dex, AbilityScore::default());
    }

    #[test]
    fn test_per_ability_access() {
        let mut table: PerAbility<f64> = PerAbility::default();
        *table.get_mut(AbilityKey::Con) = 4.0;
        assert_eq!(*table.get(AbilityKey::Con), 4.0);
        assert_eq!(table.sum(), 4.0);
        let keys: Vec<_> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys.len(), 5);
        assert_eq!(keys[0], AbilityKey::Str);
    }
}
