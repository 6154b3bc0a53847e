//! Defence and resource derivation.
//!
//! AC-like totals, health/mana pools, movement speeds and the damage-dice
//! preview, all computed from the aggregated stat block plus the banding
//! functions. The physical and magical AC tables start from the race base
//! of their two abilities, not the full totals; the skill and gear columns
//! are the stored editable fields plus equipped-item AC bonuses.

use crate::ability::AbilityKey;
use crate::aggregate::{EquipTotals, StatBlock};
use crate::band;
use crate::character::Character;
use serde::{Deserialize, Serialize};

/// Physical AC breakdown: `total = baseDex + dexSkill + baseCon + conSkill + gear`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicalAc {
    pub base_dex: f64,
    pub dex_skill: f64,
    pub base_con: f64,
    pub con_skill: f64,
    pub gear: f64,
    pub total: f64,
}

/// Magical AC breakdown: `total = baseInt + intSkill + baseCha + chaSkill + gear`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MagicalAc {
    pub base_int: f64,
    pub int_skill: f64,
    pub base_cha: f64,
    pub cha_skill: f64,
    pub gear: f64,
    pub total: f64,
}

/// Health pool: max is total CON plus the banded CON skill bonus. The regen
/// fields come from the conventionally named "Regeneration" misc-stat row,
/// at 5% of max HP per regen level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HealthPool {
    pub total_con: f64,
    pub hp_mod: f64,
    pub con_skill_bonus: f64,
    pub max: f64,
    pub regen_pct: f64,
    pub regen_amount: f64,
}

/// Mana pool: max is total INT, unbanded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManaPool {
    pub max: f64,
}

/// One movement speed: `total = level * 10 + dexBoost + benefit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MovementSpeed {
    pub level: f64,
    pub base: f64,
    pub dex_boost: f64,
    pub benefit: f64,
    pub total: f64,
}

/// Walk and swim speeds, computed identically from independent race
/// movement sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Movement {
    pub walk: MovementSpeed,
    pub swim: MovementSpeed,
}

/// One derived damage-dice preview, e.g. 3d8.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DicePreview {
    /// Which ability's total drove the bands.
    pub ability: AbilityKey,
    pub count: u8,
    pub size: u8,
}

impl Default for DicePreview {
    fn default() -> Self {
        Self {
            ability: AbilityKey::Str,
            count: 1,
            size: 4,
        }
    }
}

/// Physical and magical dice previews.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageDice {
    pub physical: DicePreview,
    pub magical: DicePreview,
}

/// The complete defence/resource block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Defenses {
    pub physical: PhysicalAc,
    pub magical: MagicalAc,
    pub health: HealthPool,
    pub mana: ManaPool,
    pub movement: Movement,
    pub dice: DamageDice,
}

/// Derive the defence/resource block.
///
/// `race_walk`/`race_swim` are the summed race movement levels; `equipped`
/// carries the AC bonuses of currently equipped items.
pub fn derive_defenses(
    character: &Character,
    stats: &StatBlock,
    race_walk: f64,
    race_swim: f64,
    equipped: &EquipTotals,
) -> Defenses {
    let physical_stored = &character.defences.physical;
    let physical = {
        let mut ac = PhysicalAc {
            base_dex: stats.abilities.dex.race,
            dex_skill: physical_stored.dex_skill,
            base_con: stats.abilities.con.race,
            con_skill: physical_stored.con_skill,
            gear: physical_stored.gear + equipped.pac,
            total: 0.0,
        };
        ac.total = ac.base_dex + ac.dex_skill + ac.base_con + ac.con_skill + ac.gear;
        ac
    };

    let magical_stored = &character.defences.magical;
    let magical = {
        let mut ac = MagicalAc {
            base_int: stats.abilities.int.race,
            int_skill: magical_stored.int_skill,
            base_cha: stats.abilities.cha.race,
            cha_skill: magical_stored.cha_skill,
            gear: magical_stored.gear + equipped.mac,
            total: 0.0,
        };
        ac.total = ac.base_int + ac.int_skill + ac.base_cha + ac.cha_skill + ac.gear;
        ac
    };

    let total_con = stats.total(AbilityKey::Con);
    let hp_mod = band::hp_multiplier(total_con);
    let con_skill_bonus = total_con * hp_mod;
    let max = total_con + con_skill_bonus;
    let regen_level = regen_level(character);
    let regen_pct = regen_level * 5.0;
    let health = HealthPool {
        total_con,
        hp_mod,
        con_skill_bonus,
        max,
        regen_pct,
        regen_amount: (max * regen_pct / 100.0).floor(),
    };

    let mana = ManaPool {
        max: stats.total(AbilityKey::Int),
    };

    let dex_boost = band::dex_boost(stats.total(AbilityKey::Dex));
    let movement = Movement {
        walk: movement_speed(race_walk, dex_boost, character.movement.walk.benefit),
        swim: movement_speed(race_swim, dex_boost, character.movement.swim.benefit),
    };

    let dice = DamageDice {
        physical: dice_preview(stats, AbilityKey::Str, AbilityKey::Dex),
        magical: dice_preview(stats, AbilityKey::Int, AbilityKey::Cha),
    };

    Defenses {
        physical,
        magical,
        health,
        mana,
        movement,
        dice,
    }
}

fn movement_speed(level: f64, dex_boost: f64, benefit: f64) -> MovementSpeed {
    let base = level * 10.0;
    MovementSpeed {
        level,
        base,
        dex_boost,
        benefit,
        total: base + dex_boost + benefit,
    }
}

/// Pick the higher of the two ability totals (ties go to `first`) and band
/// it into a dice preview.
fn dice_preview(stats: &StatBlock, first: AbilityKey, second: AbilityKey) -> DicePreview {
    let (ability, value) = if stats.total(second) > stats.total(first) {
        (second, stats.total(second))
    } else {
        (first, stats.total(first))
    };
    DicePreview {
        ability,
        count: band::dice_count(value),
        size: band::die_size(value),
    }
}

/// Level of the misc-stat row named "Regeneration" (case-insensitive), or 0.
fn regen_level(character: &Character) -> f64 {
    character
        .misc_stats
        .entries
        .iter()
        .find(|entry| entry.name.trim().eq_ignore_ascii_case("regeneration"))
        .map(|entry| entry.level)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate;
    use crate::character::MiscEntry;
    use crate::item::{Item, ItemData, RaceStatField, RaceSystem};

    fn character_with(abilities: impl FnOnce(&mut Character)) -> Character {
        let mut character = Character::default();
        abilities(&mut character);
        character
    }

    #[test]
    fn test_ac_uses_race_base_not_totals() {
        let mut race = RaceSystem::default();
        race.attributes.dex = RaceStatField::Nested { base: 3.0 };
        race.attributes.con = RaceStatField::Bare(2.0);
        let items = vec![Item {
            name: "Race".into(),
            data: ItemData::Race(race),
            ..Item::default()
        }];
        let character = character_with(|c| {
            c.abilities.dex.level = 10.0;
            c.defences.physical.dex_skill = 1.0;
            c.defences.physical.gear = 2.0;
        });
        let stats = aggregate::aggregate(&character, &items, 1);
        let equipped = aggregate::equipped_totals(&items);
        let derived = derive_defenses(&character, &stats, 0.0, 0.0, &equipped);
        // 3 (base dex) + 1 (dex skill) + 2 (base con) + 0 + 2 (gear)
        assert_eq!(derived.physical.total, 8.0);
        assert_eq!(derived.physical.base_dex, 3.0);
    }

    #[test]
    fn test_health_pool_banding() {
        let character = character_with(|c| c.abilities.con.level = 100.0);
        let stats = aggregate::aggregate(&character, &[], 1);
        let derived = derive_defenses(&character, &stats, 0.0, 0.0, &EquipTotals::default());
        assert_eq!(derived.health.hp_mod, 1.0);
        assert_eq!(derived.health.con_skill_bonus, 100.0);
        assert_eq!(derived.health.max, 200.0);
    }

    #[test]
    fn test_regen_from_misc_row() {
        let character = character_with(|c| {
            c.abilities.con.level = 100.0;
            c.misc_stats.entries.push(MiscEntry {
                name: " Regeneration ".into(),
                level: 2.0,
            });
        });
        let stats = aggregate::aggregate(&character, &[], 1);
        let derived = derive_defenses(&character, &stats, 0.0, 0.0, &EquipTotals::default());
        assert_eq!(derived.health.regen_pct, 10.0);
        assert_eq!(derived.health.regen_amount, 20.0);
    }

    #[test]
    fn test_movement_band() {
        let character = character_with(|c| {
            c.abilities.dex.level = 45.0;
            c.movement.walk.benefit = 5.0;
        });
        let stats = aggregate::aggregate(&character, &[], 1);
        let derived = derive_defenses(&character, &stats, 2.0, 0.0, &EquipTotals::default());
        assert_eq!(derived.movement.walk.base, 20.0);
        assert_eq!(derived.movement.walk.dex_boost, 40.0);
        assert_eq!(derived.movement.walk.total, 65.0);
        assert_eq!(derived.movement.swim.total, 40.0);
    }

    #[test]
    fn test_dice_preview_tie_goes_to_first() {
        let character = character_with(|c| {
            c.abilities.str.level = 35.0;
            c.abilities.dex.level = 35.0;
            c.abilities.cha.level = 12.0;
        });
        let stats = aggregate::aggregate(&character, &[], 1);
        let derived = derive_defenses(&character, &stats, 0.0, 0.0, &EquipTotals::default());
        assert_eq!(derived.dice.physical.ability, AbilityKey::Str);
        assert_eq!(derived.dice.physical.count, 3);
        assert_eq!(derived.dice.physical.size, 8);
        assert_eq!(derived.dice.magical.ability, AbilityKey::Cha);
        assert_eq!(derived.dice.magical.count, 1);
        assert_eq!(derived.dice.magical.size, 6);
    }
}
