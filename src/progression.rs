//! Ability-item leveling and use accounting.
//!
//! An ability item carries two levels. The stored level (`base + bonus`)
//! governs gameplay and unlock triggers. The preview level is derived from
//! accumulated uses by inverting a quadratic use curve and is advisory
//! only. Both are clamped: the preview by its own cap, the effective level
//! by the unlock20 rule (cap 15 until unlocked, then up to 20).

use crate::item::{AbilitySystem, Item, ProgressBlock, UnlockRef};
use serde::{Deserialize, Serialize};

/// Default preview-level cap.
pub const DEFAULT_USES_CAP: f64 = 15.0;

/// Invert the quadratic use curve: level `n` requires roughly
/// `(n-1)^2 * factor` uses, so `level = floor(sqrt(uses/factor)) + 1 + flat`,
/// clamped to `[1, cap]`. `factor` is floored at 0.0001.
pub fn compute_level_from_uses(uses: f64, factor: f64, flat: f64, cap: f64) -> f64 {
    let uses = uses.max(0.0);
    let factor = factor.max(0.0001);
    let level = (uses / factor).sqrt().floor() + 1.0 + flat;
    level.clamp(1.0, cap.max(1.0))
}

/// Clamp an effective level. The cap is `min(20, max)` once unlock20 is
/// set, and `min(15, max)` before that; a zero/negative stored max falls
/// back to the cap itself.
pub fn clamp_effective_level(total: f64, unlock20: bool, max: f64) -> f64 {
    let hard: f64 = if unlock20 { 20.0 } else { 15.0 };
    let cap = if max > 0.0 { hard.min(max) } else { hard };
    total.clamp(1.0, cap)
}

/// Result of [`add_uses`]: the new progress block plus whether the preview
/// level rose (the trigger hosts use to schedule unlock grants).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsesOutcome {
    pub progress: ProgressBlock,
    pub leveled_up: bool,
}

/// Add `inc` uses to a progress block without mutating the input. Uses
/// never drop below zero.
pub fn add_uses(progress: &ProgressBlock, inc: f64) -> UsesOutcome {
    let before = compute_level_from_uses(
        progress.uses,
        progress.factor,
        progress.flat,
        DEFAULT_USES_CAP,
    );
    let mut next = *progress;
    next.uses = (next.uses + inc).max(0.0);
    let after = compute_level_from_uses(next.uses, next.factor, next.flat, DEFAULT_USES_CAP);
    UsesOutcome {
        progress: next,
        leveled_up: after > before,
    }
}

/// Derived level summary for one ability item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilitySummary {
    pub name: String,
    /// `base + bonus`, unclamped.
    pub stored_level: f64,
    /// Stored level clamped by the unlock20 rule.
    pub effective_level: f64,
    /// Uses-derived preview level.
    pub preview_level: f64,
    /// The cap the effective level is held to.
    pub cap: f64,
}

/// Summarize an ability item's levels, or `None` for non-ability items.
pub fn ability_summary(item: &Item) -> Option<AbilitySummary> {
    let system = item.ability()?;
    let stored = system.stored_level();
    let cap = if system.level.unlock20 {
        20.0f64.min(positive_or(system.level.max, 20.0))
    } else {
        15.0
    };
    Some(AbilitySummary {
        name: item.name.clone(),
        stored_level: stored,
        effective_level: clamp_effective_level(stored, system.level.unlock20, system.level.max),
        preview_level: compute_level_from_uses(
            system.progress.uses,
            system.progress.factor,
            system.progress.flat,
            DEFAULT_USES_CAP,
        ),
        cap,
    })
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        fallback
    }
}

/// Unlock entries of `ability` whose threshold the stored base level now
/// meets and whose referenced item has not already been granted from this
/// entry. Idempotent: already-present grants are recognized by the
/// provenance tag linking a granted item back to its source reference.
pub fn pending_unlocks<'a>(ability: &'a AbilitySystem, owned: &[Item]) -> Vec<&'a UnlockRef> {
    let base = ability.level.base;
    ability
        .unlocks
        .iter()
        .filter(|unlock| {
            if unlock.item.is_empty() || unlock.level <= 0.0 {
                tracing::debug!(?unlock, "ignoring unresolvable unlock entry");
                return false;
            }
            base >= unlock.level
        })
        .filter(|unlock| {
            !owned
                .iter()
                .any(|item| item.granted_src.as_deref() == Some(unlock.item.as_str()))
        })
        .collect()
}
