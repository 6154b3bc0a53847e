//! Stat aggregation.
//!
//! Builds final ability totals from the additive column stack: race base
//! (summed across every owned race item), the stored level/misc/temp
//! columns, and a gear column combining the stored gear value with the
//! bonuses of currently equipped items. Also tracks level-point bookkeeping
//! (earned vs. spent).

use crate::ability::{AbilityKey, PerAbility};
use crate::character::Character;
use crate::item::Item;
use serde::{Deserialize, Serialize};

/// Derived column breakdown for one ability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityBreakdown {
    /// Sum of base contributions across all owned race items.
    pub race: f64,
    pub level: f64,
    /// Stored gear column plus equipped-item bonuses.
    pub gear: f64,
    pub misc: f64,
    pub temp: f64,
    /// `race + level + gear + misc + temp`.
    pub total: f64,
}

/// Level-point bookkeeping: three points per character level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelPoints {
    pub earned: f64,
    pub spent: f64,
    /// `max(0, earned - spent)`, never negative.
    pub remaining: f64,
}

/// Aggregated ability block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StatBlock {
    pub abilities: PerAbility<AbilityBreakdown>,
    /// Sum of all five totals.
    pub grand_total: f64,
    pub points: LevelPoints,
}

impl StatBlock {
    pub fn total(&self, key: AbilityKey) -> f64 {
        self.abilities.get(key).total
    }
}

/// Totals of equip-gated bonuses across currently equipped items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EquipTotals {
    pub pac: f64,
    pub mac: f64,
    pub abilities: PerAbility<f64>,
}

/// Sum equip-gated bonuses over equipped gear, weapons and armour.
/// Unequipped items contribute nothing.
pub fn equipped_totals(items: &[Item]) -> EquipTotals {
    let mut totals = EquipTotals::default();
    for equip in items.iter().filter(|i| i.is_equipped()).filter_map(Item::equip) {
        totals.pac += equip.pac_bonus;
        totals.mac += equip.mac_bonus;
        totals.abilities.str += equip.str_bonus;
        totals.abilities.dex += equip.dex_bonus;
        totals.abilities.con += equip.con_bonus;
        totals.abilities.int += equip.int_bonus;
        totals.abilities.cha += equip.cha_bonus;
    }
    totals
}

/// Sum per-ability race base contributions across all owned race items.
pub fn race_base(items: &[Item]) -> PerAbility<f64> {
    let mut base = PerAbility::<f64>::default();
    for race in items.iter().filter_map(Item::race) {
        for key in AbilityKey::ALL {
            *base.get_mut(key) += race.attributes.get(key).value();
        }
    }
    base
}

/// Sum race movement levels across all owned race items: `(walk, swim)`.
pub fn race_movement(items: &[Item]) -> (f64, f64) {
    items.iter().filter_map(Item::race).fold((0.0, 0.0), |(walk, swim), race| {
        (
            walk + race.movement.walking.level(),
            swim + race.movement.swimming.level(),
        )
    })
}

/// Aggregate the full stat block for a character at the given level.
pub fn aggregate(character: &Character, items: &[Item], level: u32) -> StatBlock {
    let race = race_base(items);
    let equipped = equipped_totals(items);

    let abilities = PerAbility::from_fn(|key| {
        let score = character.abilities.get(key);
        let mut breakdown = AbilityBreakdown {
            race: *race.get(key),
            level: score.level,
            gear: score.gear + equipped.abilities.get(key),
            misc: score.misc,
            temp: score.temp,
            total: 0.0,
        };
        breakdown.total = breakdown.race
            + breakdown.level
            + breakdown.gear
            + breakdown.misc
            + breakdown.temp;
        breakdown
    });

    let grand_total = AbilityKey::ALL
        .into_iter()
        .map(|key| abilities.get(key).total)
        .sum();

    let earned = f64::from(level) * 3.0;
    let spent = AbilityKey::ALL
        .into_iter()
        .map(|key| character.abilities.get(key).level)
        .sum::<f64>();
    let points = LevelPoints {
        earned,
        spent,
        remaining: (earned - spent).max(0.0),
    };

    StatBlock {
        abilities,
        grand_total,
        points,
    }
}
