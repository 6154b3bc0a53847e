//! The derivation pipeline.
//!
//! [`derive_character`] is the engine's only entry point: a pure function
//! from a raw character snapshot, its owned items, the active modifiers and
//! the configuration to a fully populated [`DerivedSheet`]. It never
//! mutates its inputs and never fails; re-running it on the same inputs
//! reproduces the same output.
//!
//! Pipeline order: leveling, stat aggregation, defence/resource derivation,
//! table normalization, modifier overlay, history reduction, resistance
//! tiers, ability summaries.

use crate::aggregate::{self, StatBlock};
use crate::band;
use crate::character::{AttackRow, Character, ResistanceBonus, VaultRow};
use crate::config::EngineConfig;
use crate::defense::{self, Defenses};
use crate::history::{
    self, BenefitResistRow, BenefitResistState, DamageTable, StatusCount,
};
use crate::item::Item;
use crate::leveling::{LevelTable, XpProgress};
use crate::modifier::{self, Modifier, OverlayTables};
use crate::progression::{self, AbilitySummary};
use crate::PerAbility;
use serde::{Deserialize, Serialize};

/// One row of the editable resistance table, modifier overlay applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResistanceRow {
    pub damage_type: String,
    pub flat: f64,
    pub per_dice: f64,
    pub per_level: f64,
}

/// Everything the engine derives for one character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedSheet {
    /// Current level, from lifetime XP. Never below 1.
    pub level: u32,
    pub xp_progress: XpProgress,
    pub stats: StatBlock,
    pub defenses: Defenses,
    /// d20 check modifier per ability total.
    pub check_modifiers: PerAbility<i64>,
    /// Vault rows, normalized to the fixed length, modifiers applied.
    pub vault: Vec<VaultRow>,
    /// Attack rows, key sets completed, modifiers applied.
    pub attacks: Vec<AttackRow>,
    /// Editable resistance bonuses per configured type, modifiers applied.
    pub resistances: Vec<ResistanceRow>,
    /// Reduced damage-history table, modifiers applied.
    pub damage: DamageTable,
    pub status_counts: Vec<StatusCount>,
    /// Per-item benefit-resist evaluation.
    pub benefit_resists: Vec<BenefitResistState>,
    /// Earned benefit resistances summed per damage type.
    pub benefit_resist_rows: Vec<BenefitResistRow>,
    /// Level summaries of every owned ability item, in item order.
    pub ability_levels: Vec<AbilitySummary>,
}

impl DerivedSheet {
    /// Look up an attack profile by row name, case-insensitive. An unknown
    /// name falls back to the first row; only an empty table yields `None`.
    pub fn attack_profile(&self, name: &str) -> Option<&AttackRow> {
        self.attacks
            .iter()
            .find(|row| row.name.eq_ignore_ascii_case(name))
            .or_else(|| self.attacks.first())
    }

    /// The attack-profile row name for an ability item: the combat block's
    /// weapon type, or `Magic{source}` for spell-type abilities.
    pub fn profile_name(item: &Item) -> Option<String> {
        let ability = item.ability()?;
        if let Some(combat) = &ability.combat {
            if !combat.weapon_type.is_empty() {
                return Some(combat.weapon_type.clone());
            }
        }
        if item.is_spell_type() {
            let source = ability
                .spell
                .as_ref()
                .map(|spell| spell.source.as_str())
                .unwrap_or_default();
            return Some(format!("Magic{source}"));
        }
        None
    }
}

/// Damage multiplier a profile row grants for one damage type: `1 + bonus`.
pub fn damage_multiplier(row: &AttackRow, damage_type: &str) -> f64 {
    1.0 + row
        .dmg
        .get(&damage_type.to_ascii_lowercase())
        .copied()
        .unwrap_or(0.0)
}

/// Derive the complete sheet. Pure: inputs are read-only snapshots and the
/// output carries no references back into them.
pub fn derive_character(
    character: &Character,
    items: &[Item],
    modifiers: &[Modifier],
    config: &EngineConfig,
) -> DerivedSheet {
    let table = LevelTable::new(config.max_level);
    let level = table.level_for_xp(character.xp);
    let xp_progress = table.progress(character.xp);

    let stats = aggregate::aggregate(character, items, level);
    let equipped = aggregate::equipped_totals(items);
    let (race_walk, race_swim) = aggregate::race_movement(items);
    let defenses = defense::derive_defenses(character, &stats, race_walk, race_swim, &equipped);

    let check_modifiers =
        PerAbility::from_fn(|key| band::check_modifier(stats.total(key)));

    let mut vault = crate::character::normalize_vault(&character.stats_vault.attributes);
    let mut attacks = crate::character::normalize_attacks(&character.offense.attacks);
    let mut resistances = character.resistances.clone();
    let mut buckets = history::normalize_history(&character.history, config);

    modifier::apply_modifiers(
        modifiers,
        config,
        &mut OverlayTables {
            attacks: &mut attacks,
            vault: &mut vault,
            resistances: &mut resistances,
            history: &mut buckets,
        },
    );

    let damage = history::damage_table(&buckets, config);
    let status_counts = history::status_table(&character.history, config);
    let benefit_resists = history::benefit_resist_states(items, &buckets);
    let benefit_resist_rows = history::benefit_resist_rows(&benefit_resists, config);

    let resistances = config
        .damage_types
        .iter()
        .map(|damage_type| {
            let stored = resistances
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(damage_type))
                .map(|(_, v)| *v)
                .unwrap_or_else(ResistanceBonus::default);
            ResistanceRow {
                damage_type: damage_type.clone(),
                flat: stored.flat,
                per_dice: stored.per_dice,
                per_level: stored.per_level,
            }
        })
        .collect();

    let ability_levels = items
        .iter()
        .filter_map(progression::ability_summary)
        .collect();

    DerivedSheet {
        level,
        xp_progress,
        stats,
        defenses,
        check_modifiers,
        vault,
        attacks,
        resistances,
        damage,
        status_counts,
        benefit_resists,
        benefit_resist_rows,
        ability_levels,
    }
}
