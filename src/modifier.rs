//! Modifier overlay.
//!
//! Modifiers arrive from the host as `{key, mode, value, disabled,
//! suppressed}` records whose keys are structured string paths such as
//! `system.offense.attacks.3.dmg.fire`. All stringly-typed coupling is
//! isolated in [`ModifierTarget::parse`], which translates a key into a
//! typed target; the overlay itself then works purely on typed addresses.
//!
//! The overlay never mutates stored base data. Callers hand it the already
//! normalized working copies of the attack table, vault table, resistance
//! map and history buckets, and each active modifier patches the addressed
//! cell in place. Unmatched keys, out-of-range row indexes and unknown
//! damage types are skipped, not errors: the host may hand the engine a
//! snapshot that is mid-transition.

use crate::character::{AggregateCell, AttackRow, ResistanceBonus, VaultRow};
use crate::config::EngineConfig;
use crate::error::KeyParseError;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One externally supplied modifier record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifier {
    pub key: String,
    pub mode: ModifierMode,
    pub value: f64,
    pub disabled: bool,
    pub suppressed: bool,
}

impl Modifier {
    /// Disabled or suppressed modifiers never affect output.
    pub fn is_active(&self) -> bool {
        !self.disabled && !self.suppressed
    }
}

/// How a modifier combines with the current value at its target.
///
/// Hosts store modes either as the legacy numeric codes (1 through 5) or as
/// lowercase names; both deserialize here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierMode {
    #[default]
    Add,
    Multiply,
    Override,
    Upgrade,
    Downgrade,
}

impl ModifierMode {
    /// Legacy numeric encoding used by host active effects.
    pub fn from_code(code: u8) -> Option<ModifierMode> {
        match code {
            1 => Some(ModifierMode::Multiply),
            2 => Some(ModifierMode::Add),
            3 => Some(ModifierMode::Downgrade),
            4 => Some(ModifierMode::Upgrade),
            5 => Some(ModifierMode::Override),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<ModifierMode> {
        match name.to_ascii_lowercase().as_str() {
            "add" => Some(ModifierMode::Add),
            "multiply" => Some(ModifierMode::Multiply),
            "override" => Some(ModifierMode::Override),
            "upgrade" => Some(ModifierMode::Upgrade),
            "downgrade" => Some(ModifierMode::Downgrade),
            _ => None,
        }
    }

    /// Combine `value` into `current`.
    ///
    /// Legacy storage used a multiplier of 0 to mean "unset", so MULTIPLY
    /// with value 0 is a no-op rather than zeroing the field.
    pub fn apply(self, current: f64, value: f64) -> f64 {
        match self {
            ModifierMode::Add => current + value,
            ModifierMode::Multiply if value == 0.0 => current,
            ModifierMode::Multiply => current * value,
            ModifierMode::Override => value,
            ModifierMode::Upgrade => current.max(value),
            ModifierMode::Downgrade => current.min(value),
        }
    }
}

impl<'de> Deserialize<'de> for ModifierMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Code(u8),
            Name(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Code(code) => ModifierMode::from_code(code)
                .ok_or_else(|| de::Error::custom(format!("unknown modifier mode code {code}"))),
            Repr::Name(name) => ModifierMode::from_name(&name)
                .ok_or_else(|| de::Error::custom(format!("unknown modifier mode {name:?}"))),
        }
    }
}

/// Addressable field on an attack row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttackField {
    Hit,
    Range,
    /// Lower-case damage column key.
    Damage(String),
    /// Lower-case status column key.
    Status(String),
}

/// Addressable field on a vault row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultField {
    Level,
    /// 1-based detail column.
    Detail(u8),
}

/// Addressable field on a resistance entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResistField {
    Flat,
    PerDice,
    PerLevel,
}

/// Addressable field on a history bucket cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryField {
    Done,
    Taken,
}

/// A typed target resolved from an external modifier key.
#[derive(Debug, Clone, PartialEq)]
pub enum ModifierTarget {
    Attack { row: usize, field: AttackField },
    Vault { row: usize, field: VaultField },
    Resistance { damage_type: String, field: ResistField },
    History { damage_type: String, source: String, field: HistoryField },
}

impl ModifierTarget {
    /// Translate a structured key path into a typed target.
    ///
    /// Recognized shapes:
    ///
    /// - `system.offense.attacks.{row}.hit|range`
    /// - `system.offense.attacks.{row}.dmg.{damageType}`
    /// - `system.offense.attacks.{row}.status.{statusKey}`
    /// - `system.statsVault.attributes.{row}.level|detail{1..10}`
    /// - `system.resistances.{damageType}.flat|perDice|perLevel`
    /// - `system.history.damage.{damageType}.{source}.done|taken`
    ///
    /// Damage types and source categories are canonicalized against `config`
    /// case-insensitively; damage and status column keys are stored
    /// lower-case.
    pub fn parse(key: &str, config: &EngineConfig) -> Result<ModifierTarget, KeyParseError> {
        let unknown = || KeyParseError::UnknownKey(key.to_string());
        let path = key.strip_prefix("system.").ok_or_else(unknown)?;

        if let Some(rest) = path.strip_prefix("offense.attacks.") {
            let (row, field) = split_row(key, rest)?;
            let field = if let Some(dmg) = field.strip_prefix("dmg.") {
                let canonical = config
                    .damage_type(dmg)
                    .ok_or_else(|| KeyParseError::UnknownDamageType(dmg.to_string()))?;
                AttackField::Damage(canonical.to_ascii_lowercase())
            } else if let Some(status) = field.strip_prefix("status.") {
                let status = status.to_ascii_lowercase();
                if !config.status_keys.iter().any(|k| k.eq_ignore_ascii_case(&status)) {
                    return Err(KeyParseError::UnknownField {
                        key: key.to_string(),
                        field: status,
                    });
                }
                AttackField::Status(status)
            } else {
                match field {
                    "hit" => AttackField::Hit,
                    "range" => AttackField::Range,
                    other => {
                        return Err(KeyParseError::UnknownField {
                            key: key.to_string(),
                            field: other.to_string(),
                        })
                    }
                }
            };
            return Ok(ModifierTarget::Attack { row, field });
        }

        if let Some(rest) = path.strip_prefix("statsVault.attributes.") {
            let (row, field) = split_row(key, rest)?;
            let field = match field {
                "level" => VaultField::Level,
                other => match other.strip_prefix("detail").and_then(|n| n.parse::<u8>().ok()) {
                    Some(n @ 1..=10) => VaultField::Detail(n),
                    _ => {
                        return Err(KeyParseError::UnknownField {
                            key: key.to_string(),
                            field: other.to_string(),
                        })
                    }
                },
            };
            return Ok(ModifierTarget::Vault { row, field });
        }

        if let Some(rest) = path.strip_prefix("resistances.") {
            let (damage_type, field) = rest.split_once('.').ok_or_else(unknown)?;
            let damage_type = config
                .damage_type(damage_type)
                .ok_or_else(|| KeyParseError::UnknownDamageType(damage_type.to_string()))?
                .to_string();
            let field = match field {
                "flat" => ResistField::Flat,
                "perDice" => ResistField::PerDice,
                "perLevel" => ResistField::PerLevel,
                other => {
                    return Err(KeyParseError::UnknownField {
                        key: key.to_string(),
                        field: other.to_string(),
                    })
                }
            };
            return Ok(ModifierTarget::Resistance { damage_type, field });
        }

        if let Some(rest) = path.strip_prefix("history.damage.") {
            let mut segments = rest.split('.');
            let damage_type = segments.next().ok_or_else(unknown)?;
            let source = segments.next().ok_or_else(unknown)?;
            let field = segments.next().ok_or_else(unknown)?;
            if segments.next().is_some() {
                return Err(unknown());
            }
            let damage_type = config
                .damage_type(damage_type)
                .ok_or_else(|| KeyParseError::UnknownDamageType(damage_type.to_string()))?
                .to_string();
            let source = config
                .source_category(source)
                .ok_or_else(|| KeyParseError::UnknownSource(source.to_string()))?
                .to_string();
            let field = match field {
                "done" => HistoryField::Done,
                "taken" => HistoryField::Taken,
                other => {
                    return Err(KeyParseError::UnknownField {
                        key: key.to_string(),
                        field: other.to_string(),
                    })
                }
            };
            return Ok(ModifierTarget::History {
                damage_type,
                source,
                field,
            });
        }

        Err(unknown())
    }
}

fn split_row<'a>(key: &str, rest: &'a str) -> Result<(usize, &'a str), KeyParseError> {
    let (index, field) = rest
        .split_once('.')
        .ok_or_else(|| KeyParseError::UnknownKey(key.to_string()))?;
    let row = index
        .parse::<usize>()
        .map_err(|_| KeyParseError::BadIndex(key.to_string()))?;
    Ok((row, field))
}

/// The mutable working tables a modifier pass patches.
#[derive(Debug)]
pub struct OverlayTables<'a> {
    pub attacks: &'a mut [AttackRow],
    pub vault: &'a mut [VaultRow],
    pub resistances: &'a mut BTreeMap<String, ResistanceBonus>,
    /// Canonical damage-type -> source-category -> cell buckets.
    pub history: &'a mut BTreeMap<String, BTreeMap<String, AggregateCell>>,
}

/// Apply every active modifier onto the working tables, in collection
/// order. Cumulative modes accumulate; OVERRIDE is last-applied-wins.
///
/// Keys that fail to parse and row indexes beyond the current tables are
/// skipped. Absent map cells read as 0 and are created on write.
pub fn apply_modifiers(modifiers: &[Modifier], config: &EngineConfig, tables: &mut OverlayTables) {
    for modifier in modifiers.iter().filter(|m| m.is_active()) {
        let target = match ModifierTarget::parse(&modifier.key, config) {
            Ok(target) => target,
            Err(err) => {
                tracing::debug!(key = %modifier.key, %err, "skipping unmatched modifier key");
                continue;
            }
        };
        apply_one(&target, modifier.mode, modifier.value, tables);
    }
}

fn apply_one(target: &ModifierTarget, mode: ModifierMode, value: f64, tables: &mut OverlayTables) {
    match target {
        ModifierTarget::Attack { row, field } => {
            let Some(attack) = tables.attacks.get_mut(*row) else {
                tracing::debug!(row, "attack row out of range, skipping modifier");
                return;
            };
            let slot = match field {
                AttackField::Hit => &mut attack.hit,
                AttackField::Range => &mut attack.range,
                AttackField::Damage(key) => attack.dmg.entry(key.clone()).or_insert(0.0),
                AttackField::Status(key) => attack.status.entry(key.clone()).or_insert(0.0),
            };
            *slot = mode.apply(*slot, value);
        }
        ModifierTarget::Vault { row, field } => {
            let Some(vault_row) = tables.vault.get_mut(*row) else {
                tracing::debug!(row, "vault row out of range, skipping modifier");
                return;
            };
            let slot = match field {
                VaultField::Level => Some(&mut vault_row.level),
                VaultField::Detail(n) => vault_row.detail_mut(*n),
            };
            if let Some(slot) = slot {
                *slot = mode.apply(*slot, value);
            }
        }
        ModifierTarget::Resistance { damage_type, field } => {
            let entry = tables
                .resistances
                .entry(damage_type.clone())
                .or_insert_with(ResistanceBonus::default);
            let slot = match field {
                ResistField::Flat => &mut entry.flat,
                ResistField::PerDice => &mut entry.per_dice,
                ResistField::PerLevel => &mut entry.per_level,
            };
            *slot = mode.apply(*slot, value);
        }
        ModifierTarget::History {
            damage_type,
            source,
            field,
        } => {
            let cell = tables
                .history
                .entry(damage_type.clone())
                .or_default()
                .entry(source.clone())
                .or_insert_with(AggregateCell::default);
            let slot = match field {
                HistoryField::Done => &mut cell.done,
                HistoryField::Taken => &mut cell.taken,
            };
            *slot = mode.apply(*slot, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> (
        Vec<AttackRow>,
        Vec<VaultRow>,
        BTreeMap<String, ResistanceBonus>,
        BTreeMap<String, BTreeMap<String, AggregateCell>>,
    ) {
        let attacks = crate::character::normalize_attacks(&[]);
        let vault = crate::character::normalize_vault(&[]);
        (attacks, vault, BTreeMap::new(), BTreeMap::new())
    }

    fn add(key: &str, value: f64) -> Modifier {
        Modifier {
            key: key.into(),
            mode: ModifierMode::Add,
            value,
            ..Modifier::default()
        }
    }

    #[test]
    fn test_add_accumulates_and_override_wins() {
        let config = EngineConfig::default();
        let (mut attacks, mut vault, mut resistances, mut history) = tables();
        let mut working = OverlayTables {
            attacks: &mut attacks,
            vault: &mut vault,
            resistances: &mut resistances,
            history: &mut history,
        };
        let adds = vec![
            add("system.offense.attacks.0.hit", 5.0),
            add("system.offense.attacks.0.hit", 5.0),
        ];
        apply_modifiers(&adds, &config, &mut working);
        assert_eq!(working.attacks[0].hit, 10.0);

        let over = vec![Modifier {
            key: "system.offense.attacks.0.hit".into(),
            mode: ModifierMode::Override,
            value: 7.0,
            ..Modifier::default()
        }];
        apply_modifiers(&over, &config, &mut working);
        assert_eq!(working.attacks[0].hit, 7.0);
    }

    #[test]
    fn test_multiply_zero_is_noop() {
        assert_eq!(ModifierMode::Multiply.apply(6.0, 0.0), 6.0);
        assert_eq!(ModifierMode::Multiply.apply(6.0, 2.0), 12.0);
        assert_eq!(ModifierMode::Upgrade.apply(6.0, 4.0), 6.0);
        assert_eq!(ModifierMode::Downgrade.apply(6.0, 4.0), 4.0);
    }

    #[test]
    fn test_disabled_and_suppressed_skipped() {
        let config = EngineConfig::default();
        let (mut attacks, mut vault, mut resistances, mut history) = tables();
        let mut working = OverlayTables {
            attacks: &mut attacks,
            vault: &mut vault,
            resistances: &mut resistances,
            history: &mut history,
        };
        let mods = vec![
            Modifier {
                disabled: true,
                ..add("system.offense.attacks.0.hit", 5.0)
            },
            Modifier {
                suppressed: true,
                ..add("system.offense.attacks.0.hit", 5.0)
            },
        ];
        apply_modifiers(&mods, &config, &mut working);
        assert_eq!(working.attacks[0].hit, 0.0);
    }

    #[test]
    fn test_out_of_range_row_is_noop() {
        let config = EngineConfig::default();
        let (mut attacks, mut vault, mut resistances, mut history) = tables();
        let mut working = OverlayTables {
            attacks: &mut attacks,
            vault: &mut vault,
            resistances: &mut resistances,
            history: &mut history,
        };
        apply_modifiers(&[add("system.offense.attacks.99.hit", 5.0)], &config, &mut working);
        assert!(working.attacks.iter().all(|a| a.hit == 0.0));
    }

    #[test]
    fn test_parse_attack_damage_and_status() {
        let config = EngineConfig::default();
        let target = ModifierTarget::parse("system.offense.attacks.3.dmg.Fire", &config).unwrap();
        assert_eq!(
            target,
            ModifierTarget::Attack {
                row: 3,
                field: AttackField::Damage("fire".into()),
            }
        );
        let target = ModifierTarget::parse("system.offense.attacks.0.status.Crit", &config).unwrap();
        assert_eq!(
            target,
            ModifierTarget::Attack {
                row: 0,
                field: AttackField::Status("crit".into()),
            }
        );
    }

    #[test]
    fn test_parse_vault_and_resistance() {
        let config = EngineConfig::default();
        let target =
            ModifierTarget::parse("system.statsVault.attributes.2.detail7", &config).unwrap();
        assert_eq!(
            target,
            ModifierTarget::Vault {
                row: 2,
                field: VaultField::Detail(7),
            }
        );
        let target = ModifierTarget::parse("system.resistances.fire.perDice", &config).unwrap();
        assert_eq!(
            target,
            ModifierTarget::Resistance {
                damage_type: "Fire".into(),
                field: ResistField::PerDice,
            }
        );
    }

    #[test]
    fn test_parse_history_cell() {
        let config = EngineConfig::default();
        let target =
            ModifierTarget::parse("system.history.damage.Fire.ranged.taken", &config).unwrap();
        assert_eq!(
            target,
            ModifierTarget::History {
                damage_type: "Fire".into(),
                source: "Ranged".into(),
                field: HistoryField::Taken,
            }
        );
    }

    #[test]
    fn test_parse_rejections() {
        let config = EngineConfig::default();
        assert!(matches!(
            ModifierTarget::parse("system.offense.attacks.x.hit", &config),
            Err(KeyParseError::BadIndex(_))
        ));
        assert!(matches!(
            ModifierTarget::parse("system.offense.attacks.0.colour", &config),
            Err(KeyParseError::UnknownField { .. })
        ));
        assert!(matches!(
            ModifierTarget::parse("system.resistances.Gravity.flat", &config),
            Err(KeyParseError::UnknownDamageType(_))
        ));
        assert!(matches!(
            ModifierTarget::parse("name", &config),
            Err(KeyParseError::UnknownKey(_))
        ));
        assert!(matches!(
            ModifierTarget::parse("system.history.damage.Fire.Orbital.done", &config),
            Err(KeyParseError::UnknownSource(_))
        ));
    }

    #[test]
    fn test_mode_deserializes_codes_and_names() {
        let m: Modifier = serde_json::from_str(
            r#"{"key": "system.offense.attacks.0.hit", "mode": 5, "value": 2}"#,
        )
        .unwrap();
        assert_eq!(m.mode, ModifierMode::Override);
        let m: Modifier = serde_json::from_str(r#"{"key": "k", "mode": "upgrade", "value": 1}"#)
            .unwrap();
        assert_eq!(m.mode, ModifierMode::Upgrade);
    }
}
