//! Raw character input tree.
//!
//! These are the editable, stored fields the host hands the engine as a
//! read-only snapshot. Every field is `#[serde(default)]`: missing or
//! partially-shaped data deserializes to safe zeros instead of failing,
//! and normalization fills structural defaults (vault rows, attack keys)
//! without ever writing back to storage.

use crate::ability::Abilities;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default names for the 20 stats-vault rows.
pub const VAULT_DEFAULT_NAMES: [&str; VAULT_ROWS] = [
    "Determine Value",
    "Regeneration",
    "Calories",
    "Intoxication",
    "Attribute 5",
    "Attribute 6",
    "Attribute 7",
    "Attribute 8",
    "Attribute 9",
    "Attribute 10",
    "Attribute 11",
    "Attribute 12",
    "Attribute 13",
    "Attribute 14",
    "Attribute 15",
    "Attribute 16",
    "Attribute 17",
    "Attribute 18",
    "Attribute 19",
    "Attribute 20",
];

/// The stats vault is a fixed-length table of exactly this many rows.
pub const VAULT_ROWS: usize = 20;

/// Default attack rows seeded into an empty offense table: `(name, range)`.
pub const DEFAULT_ATTACKS: [(&str, f64); 32] = [
    ("ThrownAmmo", 20.0),
    ("ThrownWeapon", 20.0),
    ("Sling", 30.0),
    ("1hCrossbow", 40.0),
    ("Bow", 60.0),
    ("Blowgun", 20.0),
    ("Crossbow", 80.0),
    ("HeavyRange", 120.0),
    ("Siege", 500.0),
    ("Spray", 10.0),
    ("Whip", 10.0),
    ("LightPiercing", 5.0),
    ("LightBludgeoning", 5.0),
    ("LightSlashing", 5.0),
    ("MediumPiercing", 5.0),
    ("MediumBludgeoning", 5.0),
    ("MediumSlashing", 5.0),
    ("HeavyPiercing", 10.0),
    ("HeavyBludgeoning", 5.0),
    ("HeavySlashing", 5.0),
    ("Unarmed", 5.0),
    ("MagicAcid", 5.0),
    ("Explosive", 5.0),
    ("MagicCold", 5.0),
    ("MagicFire", 5.0),
    ("MagicForce", 5.0),
    ("MagicLightning", 5.0),
    ("MagicNecrotic", 5.0),
    ("MagicPoison", 5.0),
    ("MagicPsychic", 5.0),
    ("MagicRadiant", 5.0),
    ("MagicSonic", 5.0),
];

/// Lower-case damage keys every attack row carries.
pub const ATTACK_DAMAGE_KEYS: [&str; 13] = [
    "acid",
    "bludgeoning",
    "cold",
    "fire",
    "force",
    "lightning",
    "necrotic",
    "piercing",
    "poison",
    "psychic",
    "radiant",
    "slashing",
    "sonic",
];

/// Status-chance keys every attack row carries, with their defaults.
pub const ATTACK_STATUS_DEFAULTS: [(&str, f64); 8] = [
    ("bleed", 21.0),
    ("burn", 21.0),
    ("crit", 20.0),
    ("mute", 21.0),
    ("petrified", 21.0),
    ("poison", 21.0),
    ("stun", 21.0),
    ("pierce", 21.0),
];

/// The root raw-character snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Character {
    pub abilities: Abilities,
    /// Lifetime XP; the current level is derived from it.
    pub xp: i64,
    pub defences: Defences,
    pub movement: MovementBenefits,
    pub stats_vault: StatsVault,
    pub offense: Offense,
    pub misc_stats: MiscStats,
    pub history: History,
    /// Editable per-damage-type resistance bonuses.
    pub resistances: BTreeMap<String, ResistanceBonus>,
}

/// Editable defence sub-bonuses. Bases and totals are derived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defences {
    pub physical: PhysicalDefence,
    pub magical: MagicalDefence,
    pub health: HealthDefence,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicalDefence {
    pub dex_skill: f64,
    pub con_skill: f64,
    pub gear: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MagicalDefence {
    pub int_skill: f64,
    pub cha_skill: f64,
    pub gear: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthDefence {
    pub benefit: f64,
    pub gear: f64,
}

/// Editable movement benefits; levels, bases and totals are derived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementBenefits {
    pub walk: MovementBenefit,
    pub swim: MovementBenefit,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementBenefit {
    pub benefit: f64,
}

/// The stats vault: an index-addressed table of exactly [`VAULT_ROWS`] rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsVault {
    pub attributes: Vec<VaultRow>,
}

/// One vault row: a name, a level, and ten free detail columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultRow {
    pub name: String,
    pub level: f64,
    pub detail1: f64,
    pub detail2: f64,
    pub detail3: f64,
    pub detail4: f64,
    pub detail5: f64,
    pub detail6: f64,
    pub detail7: f64,
    pub detail8: f64,
    pub detail9: f64,
    pub detail10: f64,
}

impl VaultRow {
    /// A fresh row with the given name and zeroed columns.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Read detail column `n` (1-based). Out-of-range columns read as `None`.
    pub fn detail(&self, n: u8) -> Option<f64> {
        Some(match n {
            1 => self.detail1,
            2 => self.detail2,
            3 => self.detail3,
            4 => self.detail4,
            5 => self.detail5,
            6 => self.detail6,
            7 => self.detail7,
            8 => self.detail8,
            9 => self.detail9,
            10 => self.detail10,
            _ => return None,
        })
    }

    /// Mutable access to detail column `n` (1-based).
    pub fn detail_mut(&mut self, n: u8) -> Option<&mut f64> {
        Some(match n {
            1 => &mut self.detail1,
            2 => &mut self.detail2,
            3 => &mut self.detail3,
            4 => &mut self.detail4,
            5 => &mut self.detail5,
            6 => &mut self.detail6,
            7 => &mut self.detail7,
            8 => &mut self.detail8,
            9 => &mut self.detail9,
            10 => &mut self.detail10,
            _ => return None,
        })
    }
}

/// The offensive attack-profile table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Offense {
    pub attacks: Vec<AttackRow>,
}

/// One attack profile: hit modifier plus per-damage-type and per-status
/// columns, keyed lower-case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackRow {
    pub name: String,
    pub range: f64,
    pub hit: f64,
    pub dmg: BTreeMap<String, f64>,
    pub status: BTreeMap<String, f64>,
}

impl AttackRow {
    /// A new row with the full default key set.
    pub fn with_defaults(name: impl Into<String>, range: f64) -> Self {
        let mut row = Self {
            name: name.into(),
            range,
            ..Self::default()
        };
        row.fill_default_keys();
        row
    }

    /// Ensure every canonical damage and status key exists; existing values
    /// win over defaults.
    pub fn fill_default_keys(&mut self) {
        for key in ATTACK_DAMAGE_KEYS {
            self.dmg.entry(key.to_string()).or_insert(0.0);
        }
        for (key, default) in ATTACK_STATUS_DEFAULTS {
            self.status.entry(key.to_string()).or_insert(default);
        }
    }
}

/// Free-form misc stats (Regeneration lives here by naming convention).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiscStats {
    pub entries: Vec<MiscEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiscEntry {
    pub name: String,
    pub level: f64,
}

/// Stored damage history. Two shapes coexist historically: an append-only
/// `log` and a pre-aggregated `damage` map. When both are present the log
/// wins; see [`crate::history`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct History {
    pub log: Vec<DamageEvent>,
    pub damage: BTreeMap<String, BTreeMap<String, AggregateCell>>,
    pub status_counts: BTreeMap<String, f64>,
}

/// One append-only history event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageEvent {
    #[serde(rename = "type")]
    pub damage_type: String,
    /// Missing or unrecognized sources fall back to the default category.
    pub source: Option<String>,
    #[serde(alias = "damageDone")]
    pub done: f64,
    #[serde(alias = "damageTaken")]
    pub taken: f64,
}

/// One cell of the pre-aggregated history shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateCell {
    #[serde(alias = "value")]
    pub done: f64,
    #[serde(alias = "damageTaken")]
    pub taken: f64,
}

/// Editable resistance bonuses for one damage type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResistanceBonus {
    pub flat: f64,
    pub per_dice: f64,
    pub per_level: f64,
}

/// Normalize a vault table to exactly [`VAULT_ROWS`] rows: empty names take
/// the default name for their slot, missing rows are appended, extras are
/// truncated.
pub fn normalize_vault(rows: &[VaultRow]) -> Vec<VaultRow> {
    let mut out: Vec<VaultRow> = rows.iter().take(VAULT_ROWS).cloned().collect();
    for (i, row) in out.iter_mut().enumerate() {
        if row.name.is_empty() {
            row.name = VAULT_DEFAULT_NAMES[i].to_string();
        }
    }
    for i in out.len()..VAULT_ROWS {
        out.push(VaultRow::named(VAULT_DEFAULT_NAMES[i]));
    }
    out
}

/// Normalize an attack table: seed the full default table when empty,
/// otherwise complete every row's key set.
pub fn normalize_attacks(rows: &[AttackRow]) -> Vec<AttackRow> {
    if rows.is_empty() {
        return DEFAULT_ATTACKS
            .iter()
            .map(|&(name, range)| AttackRow::with_defaults(name, range))
            .collect();
    }
    rows.iter()
        .map(|row| {
            let mut row = row.clone();
            row.fill_default_keys();
            row
        })
        .collect()
}
