//! Damage-history reduction and resistance tiers.
//!
//! History is stored in one of two shapes: an append-only event log or a
//! pre-aggregated per-type/per-source map. Both reduce to the same canonical
//! bucket, damage type -> source category -> `{done, taken}`. When both
//! shapes are present the log wins and the aggregate is ignored.
//!
//! Benefit-resist items earn tiers from cumulative damage taken of their
//! damage type, against one of three geometric requirement ladders. The
//! three physical types (Bludgeoning, Slashing, Piercing) use the same
//! ladders scaled by 10.

use crate::character::{AggregateCell, History};
use crate::config::EngineConfig;
use crate::item::{Item, ResistMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical damage-type -> source-category -> cell buckets.
pub type DamageBuckets = BTreeMap<String, BTreeMap<String, AggregateCell>>;

/// Cumulative damage-taken requirements per tier, flat mode.
pub const FLAT_REQS: [f64; 15] = [
    30.0, 90.0, 210.0, 450.0, 930.0, 1_890.0, 3_810.0, 7_650.0, 15_330.0, 30_690.0, 61_410.0,
    122_850.0, 245_730.0, 491_490.0, 983_010.0,
];

/// Cumulative damage-taken requirements per tier, per-dice mode.
pub const PER_DICE_REQS: [f64; 15] = [
    3_810.0, 7_650.0, 15_330.0, 30_690.0, 61_410.0, 122_850.0, 245_730.0, 491_490.0, 983_010.0,
    1_966_050.0, 3_932_130.0, 7_864_290.0, 15_728_610.0, 31_457_250.0, 62_914_530.0,
];

/// Cumulative damage-taken requirements per tier, per-level mode.
pub const PER_LEVEL_REQS: [f64; 15] = [
    491_490.0,
    983_010.0,
    1_966_050.0,
    3_932_130.0,
    7_864_290.0,
    15_728_610.0,
    31_457_250.0,
    62_914_530.0,
    125_829_090.0,
    251_658_210.0,
    503_316_450.0,
    1_006_632_930.0,
    2_013_265_890.0,
    4_026_531_810.0,
    8_053_063_650.0,
];

/// Damage types whose requirement ladders are scaled by 10.
const TEN_X_TYPES: [&str; 3] = ["Bludgeoning", "Slashing", "Piercing"];

/// Reduce stored history into canonical buckets. Every configured
/// type/source cell exists in the result, zeroed when untouched.
///
/// Unrecognized damage types are dropped; a missing or unrecognized source
/// in a log entry falls back to the default category. Matching is
/// case-insensitive.
pub fn normalize_history(history: &History, config: &EngineConfig) -> DamageBuckets {
    let mut buckets: DamageBuckets = config
        .damage_types
        .iter()
        .map(|damage_type| {
            let sources = config
                .source_categories
                .iter()
                .map(|source| (source.clone(), AggregateCell::default()))
                .collect();
            (damage_type.clone(), sources)
        })
        .collect();

    if !history.log.is_empty() {
        for event in &history.log {
            let Some(damage_type) = config.damage_type(&event.damage_type) else {
                tracing::debug!(damage_type = %event.damage_type, "dropping unrecognized damage type");
                continue;
            };
            let source = event
                .source
                .as_deref()
                .and_then(|raw| config.source_category(raw))
                .unwrap_or_else(|| config.default_source());
            if let Some(cell) = buckets
                .get_mut(damage_type)
                .and_then(|node| node.get_mut(source))
            {
                cell.done += event.done;
                cell.taken += event.taken;
            }
        }
    } else {
        for (raw_type, node) in &history.damage {
            let Some(damage_type) = config.damage_type(raw_type) else {
                tracing::debug!(damage_type = %raw_type, "dropping unrecognized damage type");
                continue;
            };
            for source in &config.source_categories {
                let stored = node
                    .get(&source.to_ascii_lowercase())
                    .or_else(|| node.get(source));
                if let (Some(stored), Some(cell)) = (
                    stored,
                    buckets
                        .get_mut(damage_type)
                        .and_then(|n| n.get_mut(source)),
                ) {
                    cell.done += stored.done;
                    cell.taken += stored.taken;
                }
            }
        }
    }

    buckets
}

/// One row of the per-type damage table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageTypeGroup {
    pub damage_type: String,
    pub rows: Vec<SourceRow>,
    pub total: AggregateCell,
}

/// One source row within a damage-type group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    pub source: String,
    pub done: f64,
    pub taken: f64,
}

/// The resolved damage-history table plus grand totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageTable {
    pub groups: Vec<DamageTypeGroup>,
    pub grand_total: AggregateCell,
}

/// Lay the buckets out as an ordered table, config order, with per-type and
/// grand totals.
pub fn damage_table(buckets: &DamageBuckets, config: &EngineConfig) -> DamageTable {
    let mut grand_total = AggregateCell::default();
    let groups = config
        .damage_types
        .iter()
        .map(|damage_type| {
            let node = buckets.get(damage_type);
            let rows: Vec<SourceRow> = config
                .source_categories
                .iter()
                .map(|source| {
                    let cell = node
                        .and_then(|n| n.get(source))
                        .copied()
                        .unwrap_or_default();
                    SourceRow {
                        source: source.clone(),
                        done: cell.done,
                        taken: cell.taken,
                    }
                })
                .collect();
            let total = AggregateCell {
                done: rows.iter().map(|r| r.done).sum(),
                taken: rows.iter().map(|r| r.taken).sum(),
            };
            grand_total.done += total.done;
            grand_total.taken += total.taken;
            DamageTypeGroup {
                damage_type: damage_type.clone(),
                rows,
                total,
            }
        })
        .collect();
    DamageTable {
        groups,
        grand_total,
    }
}

/// One row of the status-count table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: f64,
}

/// Status counts laid out over the configured status set, zero-filled.
pub fn status_table(history: &History, config: &EngineConfig) -> Vec<StatusCount> {
    config
        .status_keys
        .iter()
        .map(|status| StatusCount {
            status: status.clone(),
            count: history.status_counts.get(status).copied().unwrap_or(0.0),
        })
        .collect()
}

/// Total damage taken of one type, summed across all source categories.
/// The legacy "Bleeding" label reads the "Bleed" bucket; "None" or an
/// unknown type reads 0.
pub fn taken_for_type(buckets: &DamageBuckets, damage_type: &str) -> f64 {
    if damage_type.is_empty() || damage_type.eq_ignore_ascii_case("none") {
        return 0.0;
    }
    let key = if damage_type.eq_ignore_ascii_case("bleeding") {
        "Bleed"
    } else {
        damage_type
    };
    buckets
        .iter()
        .find(|(stored, _)| stored.eq_ignore_ascii_case(key))
        .map(|(_, node)| node.values().map(|cell| cell.taken).sum())
        .unwrap_or(0.0)
}

/// The requirement ladder for a mode and damage type.
pub fn requirements(damage_type: &str, mode: ResistMode) -> Vec<f64> {
    let base = match mode {
        ResistMode::Flat => &FLAT_REQS,
        ResistMode::PerDice => &PER_DICE_REQS,
        ResistMode::PerLevel => &PER_LEVEL_REQS,
    };
    let scale = if TEN_X_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(damage_type))
    {
        10.0
    } else {
        1.0
    };
    base.iter().map(|req| req * scale).collect()
}

/// Highest tier whose requirement is met; 0 below the first threshold.
pub fn tier_from(damage: f64, reqs: &[f64]) -> u32 {
    let mut tier = 0;
    for (i, req) in reqs.iter().enumerate() {
        if damage >= *req {
            tier = i as u32 + 1;
        } else {
            break;
        }
    }
    tier
}

/// Resistance value for a tier: flat mode counts double.
pub fn resistance_value(mode: ResistMode, tier: u32) -> f64 {
    if tier == 0 {
        return 0.0;
    }
    match mode {
        ResistMode::Flat => -2.0 * f64::from(tier),
        ResistMode::PerDice | ResistMode::PerLevel => -f64::from(tier),
    }
}

/// Derived state of one benefit-resist item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitResistState {
    pub name: String,
    pub damage_type: String,
    pub mode: ResistMode,
    /// Cumulative damage taken of the associated type.
    pub damage: f64,
    pub tier: u32,
    pub resistance: f64,
}

/// Per-type sums of earned benefit resistances, one column per mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitResistRow {
    pub damage_type: String,
    pub flat: f64,
    pub per_dice: f64,
    pub per_level: f64,
}

/// Evaluate every benefit-resist item against the damage buckets.
pub fn benefit_resist_states(items: &[Item], buckets: &DamageBuckets) -> Vec<BenefitResistState> {
    items
        .iter()
        .filter_map(|item| {
            let resist = item.resist()?;
            let damage = taken_for_type(buckets, &resist.damage_type);
            let reqs = requirements(&resist.damage_type, resist.mode);
            let tier = tier_from(damage, &reqs);
            Some(BenefitResistState {
                name: item.name.clone(),
                damage_type: resist.damage_type.clone(),
                mode: resist.mode,
                damage,
                tier,
                resistance: resistance_value(resist.mode, tier),
            })
        })
        .collect()
}

/// Sum earned benefit resistances into one row per configured damage type.
/// Items whose type is not in the configured set are dropped.
pub fn benefit_resist_rows(
    states: &[BenefitResistState],
    config: &EngineConfig,
) -> Vec<BenefitResistRow> {
    let mut rows: Vec<BenefitResistRow> = config
        .damage_types
        .iter()
        .map(|damage_type| BenefitResistRow {
            damage_type: damage_type.clone(),
            ..BenefitResistRow::default()
        })
        .collect();

    for state in states.iter().filter(|s| s.tier >= 1) {
        let Some(row) = rows
            .iter_mut()
            .find(|row| row.damage_type.eq_ignore_ascii_case(&state.damage_type))
        else {
            tracing::debug!(damage_type = %state.damage_type, "dropping benefit resist of unconfigured type");
            continue;
        };
        match state.mode {
            ResistMode::Flat => row.flat += state.resistance,
            ResistMode::PerDice => row.per_dice += state.resistance,
            ResistMode::PerLevel => row.per_level += state.resistance,
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::DamageEvent;
    use crate::item::{ItemData, ResistSystem};

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_log_normalizes_lenient_source() {
        let mut history = History::default();
        history.log.push(DamageEvent {
            damage_type: "Fire".into(),
            source: Some("ranged".into()),
            done: 10.0,
            taken: 0.0,
        });
        history.log.push(DamageEvent {
            damage_type: "Fire".into(),
            source: None,
            done: 0.0,
            taken: 7.0,
        });
        history.log.push(DamageEvent {
            damage_type: "Gravity".into(),
            source: Some("Melee".into()),
            done: 99.0,
            taken: 99.0,
        });
        let buckets = normalize_history(&history, &config());
        assert_eq!(buckets["Fire"]["Ranged"].done, 10.0);
        assert_eq!(buckets["Fire"]["Melee"].taken, 7.0);
        assert!(!buckets.contains_key("Gravity"));
    }

    #[test]
    fn test_log_wins_over_aggregate() {
        let mut history = History::default();
        history.log.push(DamageEvent {
            damage_type: "Cold".into(),
            source: Some("Melee".into()),
            done: 5.0,
            taken: 0.0,
        });
        history
            .damage
            .entry("Cold".into())
            .or_default()
            .insert("Melee".into(), AggregateCell { done: 100.0, taken: 100.0 });
        let buckets = normalize_history(&history, &config());
        assert_eq!(buckets["Cold"]["Melee"].done, 5.0);
        assert_eq!(buckets["Cold"]["Melee"].taken, 0.0);
    }

    #[test]
    fn test_aggregate_accepts_lowercase_source_keys() {
        let mut history = History::default();
        history
            .damage
            .entry("Acid".into())
            .or_default()
            .insert("ranged".into(), AggregateCell { done: 3.0, taken: 4.0 });
        let buckets = normalize_history(&history, &config());
        assert_eq!(buckets["Acid"]["Ranged"].done, 3.0);
        assert_eq!(buckets["Acid"]["Ranged"].taken, 4.0);
    }

    #[test]
    fn test_damage_table_totals() {
        let mut history = History::default();
        history.log.push(DamageEvent {
            damage_type: "Fire".into(),
            source: Some("Melee".into()),
            done: 10.0,
            taken: 2.0,
        });
        history.log.push(DamageEvent {
            damage_type: "Cold".into(),
            source: Some("Explosive".into()),
            done: 1.0,
            taken: 8.0,
        });
        let cfg = config();
        let table = damage_table(&normalize_history(&history, &cfg), &cfg);
        assert_eq!(table.groups.len(), cfg.damage_types.len());
        let fire = table
            .groups
            .iter()
            .find(|g| g.damage_type == "Fire")
            .unwrap();
        assert_eq!(fire.total.done, 10.0);
        assert_eq!(fire.rows.len(), 3);
        assert_eq!(table.grand_total.done, 11.0);
        assert_eq!(table.grand_total.taken, 10.0);
    }

    #[test]
    fn test_tier_ladder() {
        assert_eq!(tier_from(0.0, &FLAT_REQS), 0);
        assert_eq!(tier_from(29.0, &FLAT_REQS), 0);
        assert_eq!(tier_from(30.0, &FLAT_REQS), 1);
        assert_eq!(tier_from(209.0, &FLAT_REQS), 2);
        assert_eq!(tier_from(983_010.0, &FLAT_REQS), 15);
        assert_eq!(tier_from(f64::MAX, &FLAT_REQS), 15);
    }

    #[test]
    fn test_physical_types_scale_by_ten() {
        let reqs = requirements("Slashing", ResistMode::Flat);
        assert_eq!(reqs[0], 300.0);
        let reqs = requirements("Fire", ResistMode::Flat);
        assert_eq!(reqs[0], 30.0);
    }

    #[test]
    fn test_resistance_values() {
        assert_eq!(resistance_value(ResistMode::Flat, 3), -6.0);
        assert_eq!(resistance_value(ResistMode::PerDice, 3), -3.0);
        assert_eq!(resistance_value(ResistMode::PerLevel, 1), -1.0);
        assert_eq!(resistance_value(ResistMode::Flat, 0), 0.0);
    }

    #[test]
    fn test_bleeding_reads_bleed_bucket() {
        let mut history = History::default();
        history.log.push(DamageEvent {
            damage_type: "Bleed".into(),
            source: Some("Melee".into()),
            done: 0.0,
            taken: 50.0,
        });
        let buckets = normalize_history(&history, &config());
        assert_eq!(taken_for_type(&buckets, "Bleeding"), 50.0);
        assert_eq!(taken_for_type(&buckets, "None"), 0.0);
    }

    #[test]
    fn test_benefit_resist_pipeline() {
        let mut history = History::default();
        history.log.push(DamageEvent {
            damage_type: "Fire".into(),
            source: Some("Ranged".into()),
            done: 0.0,
            taken: 450.0,
        });
        let cfg = config();
        let buckets = normalize_history(&history, &cfg);
        let items = vec![Item {
            name: "Fireproof Hide".into(),
            data: ItemData::BenefitResist(ResistSystem {
                damage_type: "Fire".into(),
                mode: ResistMode::Flat,
            }),
            ..Item::default()
        }];
        let states = benefit_resist_states(&items, &buckets);
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].tier, 4);
        assert_eq!(states[0].resistance, -8.0);

        let rows = benefit_resist_rows(&states, &cfg);
        let fire = rows.iter().find(|r| r.damage_type == "Fire").unwrap();
        assert_eq!(fire.flat, -8.0);
        assert_eq!(fire.per_dice, 0.0);
    }
}
