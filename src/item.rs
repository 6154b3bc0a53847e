//! Owned items.
//!
//! Items are polymorphic over their `type` tag; each type carries a
//! different `system` payload and contributes to the derivation differently:
//! race items feed stat/movement bases, equippables feed equip-gated
//! bonuses, ability items carry leveling/progress state, benefit-resist
//! items earn damage-gated resistance tiers. Everything else is inert to the
//! engine but still round-trips.
//!
//! Historical storage kept two shapes for race contributions (a nested
//! `{base}` object or a bare number) and two movement spellings; both are
//! expressed here as untagged sum types and field aliases so either shape
//! normalizes to a number.

use crate::ability::PerAbility;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// An owned item: `{name, type, system}` plus provenance flags for items
/// granted by an unlock or effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub data: ItemData,
    #[serde(default, rename = "grantedBy", skip_serializing_if = "Option::is_none")]
    pub granted_by: Option<String>,
    #[serde(default, rename = "grantedSrc", skip_serializing_if = "Option::is_none")]
    pub granted_src: Option<String>,
}

/// Type-tagged item payload.
///
/// Serialization is the adjacently tagged `{type, system}` shape.
/// Deserialization is hand-rolled: the type tag is matched
/// case-insensitively, unknown types coerce to [`ItemData::Other`] whatever
/// their `system` contents, and a malformed payload for a known type
/// coerces to that type's defaults. Host documents never abort a read.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type", content = "system", rename_all = "camelCase")]
pub enum ItemData {
    Race(RaceSystem),
    Gear(EquipSystem),
    Weapon(EquipSystem),
    Armour(EquipSystem),
    SkillCombat(AbilitySystem),
    SkillCharisma(AbilitySystem),
    SkillCrafting(AbilitySystem),
    SkillMovement(AbilitySystem),
    SkillPerception(AbilitySystem),
    SkillStealth(AbilitySystem),
    Spell(AbilitySystem),
    Ritual(AbilitySystem),
    Music(AbilitySystem),
    Consumable(ConsumableSystem),
    Potion(ConsumableSystem),
    BenefitResist(ResistSystem),
    StatusEffect(StatusEffectSystem),
    Currency(CurrencySystem),
    Achievement(AchievementSystem),
    /// Any item type the engine has no use for.
    #[default]
    Other,
}

impl<'de> Deserialize<'de> for ItemData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize, Default)]
        #[serde(default)]
        struct Raw {
            #[serde(rename = "type")]
            kind: String,
            system: serde_json::Value,
        }

        fn payload<T: DeserializeOwned + Default>(kind: &str, system: serde_json::Value) -> T {
            if system.is_null() {
                return T::default();
            }
            serde_json::from_value(system).unwrap_or_else(|err| {
                tracing::debug!(kind, %err, "coercing malformed item payload to defaults");
                T::default()
            })
        }

        let raw = Raw::deserialize(deserializer)?;
        let kind = raw.kind.to_ascii_lowercase();
        let data = match kind.as_str() {
            "race" => ItemData::Race(payload(&kind, raw.system)),
            "gear" => ItemData::Gear(payload(&kind, raw.system)),
            "weapon" => ItemData::Weapon(payload(&kind, raw.system)),
            "armour" | "armor" => ItemData::Armour(payload(&kind, raw.system)),
            "skillcombat" => ItemData::SkillCombat(payload(&kind, raw.system)),
            "skillcharisma" => ItemData::SkillCharisma(payload(&kind, raw.system)),
            "skillcrafting" => ItemData::SkillCrafting(payload(&kind, raw.system)),
            "skillmovement" => ItemData::SkillMovement(payload(&kind, raw.system)),
            "skillperception" => ItemData::SkillPerception(payload(&kind, raw.system)),
            "skillstealth" => ItemData::SkillStealth(payload(&kind, raw.system)),
            "spell" => ItemData::Spell(payload(&kind, raw.system)),
            "ritual" => ItemData::Ritual(payload(&kind, raw.system)),
            "music" => ItemData::Music(payload(&kind, raw.system)),
            "consumable" => ItemData::Consumable(payload(&kind, raw.system)),
            "potion" => ItemData::Potion(payload(&kind, raw.system)),
            "benefitresist" => ItemData::BenefitResist(payload(&kind, raw.system)),
            "statuseffect" => ItemData::StatusEffect(payload(&kind, raw.system)),
            "currency" => ItemData::Currency(payload(&kind, raw.system)),
            "achievement" => ItemData::Achievement(payload(&kind, raw.system)),
            _ => {
                tracing::debug!(%kind, "treating unrecognized item type as inert");
                ItemData::Other
            }
        };
        Ok(data)
    }
}

impl Item {
    pub fn race(&self) -> Option<&RaceSystem> {
        match &self.data {
            ItemData::Race(system) => Some(system),
            _ => None,
        }
    }

    /// Equip payload for gear, weapons and armour.
    pub fn equip(&self) -> Option<&EquipSystem> {
        match &self.data {
            ItemData::Gear(system) | ItemData::Weapon(system) | ItemData::Armour(system) => {
                Some(system)
            }
            _ => None,
        }
    }

    /// Ability payload for the six skill types plus spell/ritual/music.
    pub fn ability(&self) -> Option<&AbilitySystem> {
        match &self.data {
            ItemData::SkillCombat(system)
            | ItemData::SkillCharisma(system)
            | ItemData::SkillCrafting(system)
            | ItemData::SkillMovement(system)
            | ItemData::SkillPerception(system)
            | ItemData::SkillStealth(system)
            | ItemData::Spell(system)
            | ItemData::Ritual(system)
            | ItemData::Music(system) => Some(system),
            _ => None,
        }
    }

    pub fn resist(&self) -> Option<&ResistSystem> {
        match &self.data {
            ItemData::BenefitResist(system) => Some(system),
            _ => None,
        }
    }

    /// Whether this item is an equipped gear/weapon/armour piece.
    pub fn is_equipped(&self) -> bool {
        self.equip().map(|e| e.equipped).unwrap_or(false)
    }

    /// Spells, rituals and music resolve their attack row as
    /// `Magic{spell source}` rather than a weapon type.
    pub fn is_spell_type(&self) -> bool {
        matches!(
            self.data,
            ItemData::Spell(_) | ItemData::Ritual(_) | ItemData::Music(_)
        )
    }
}

/// Race item payload: per-ability base contributions and movement levels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceSystem {
    pub attributes: PerAbility<RaceStatField>,
    pub movement: RaceMovement,
}

/// A race stat contribution in either historical shape.
///
/// # Examples
///
/// ```rust
/// use sheetstat::item::RaceStatField;
///
/// let nested: RaceStatField = serde_json::from_str(r#"{"base": 3}"#).unwrap();
/// let bare: RaceStatField = serde_json::from_str("3").unwrap();
/// assert_eq!(nested.value(), 3.0);
/// assert_eq!(bare.value(), 3.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RaceStatField {
    Nested {
        #[serde(default)]
        base: f64,
    },
    Bare(f64),
}

impl RaceStatField {
    pub fn value(self) -> f64 {
        match self {
            RaceStatField::Nested { base } => base,
            RaceStatField::Bare(value) => value,
        }
    }
}

impl Default for RaceStatField {
    fn default() -> Self {
        RaceStatField::Bare(0.0)
    }
}

/// Race movement block; both the long and short field spellings are
/// accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceMovement {
    #[serde(alias = "walk")]
    pub walking: RaceMoveField,
    #[serde(alias = "swim")]
    pub swimming: RaceMoveField,
}

/// A race movement level in either historical shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RaceMoveField {
    Nested {
        #[serde(default)]
        level: f64,
    },
    Bare(f64),
}

impl RaceMoveField {
    pub fn level(self) -> f64 {
        match self {
            RaceMoveField::Nested { level } => level,
            RaceMoveField::Bare(value) => value,
        }
    }
}

impl Default for RaceMoveField {
    fn default() -> Self {
        RaceMoveField::Bare(0.0)
    }
}

/// Equip-gated bonus fields shared by gear, weapons and armour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EquipSystem {
    pub equipped: bool,
    pub pac_bonus: f64,
    pub mac_bonus: f64,
    pub str_bonus: f64,
    pub dex_bonus: f64,
    pub con_bonus: f64,
    pub int_bonus: f64,
    pub cha_bonus: f64,
}

/// Ability item payload: stored level, use-based progress, unlock entries,
/// and the optional combat/spell blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilitySystem {
    pub level: LevelBlock,
    pub progress: ProgressBlock,
    pub unlocks: Vec<UnlockRef>,
    pub combat: Option<CombatBlock>,
    pub spell: Option<SpellBlock>,
}

impl AbilitySystem {
    /// The stored level (`base + bonus`) before effective-level clamping.
    /// This is the gameplay-governing value; the uses-derived level is
    /// preview only.
    pub fn stored_level(&self) -> f64 {
        self.level.base + self.level.bonus
    }
}

/// Stored level block for an ability item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelBlock {
    pub base: f64,
    pub bonus: f64,
    pub unlock20: bool,
    pub max: f64,
}

impl Default for LevelBlock {
    fn default() -> Self {
        Self {
            base: 1.0,
            bonus: 0.0,
            unlock20: false,
            max: 20.0,
        }
    }
}

/// Use-accumulation block driving the preview level curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressBlock {
    pub uses: f64,
    pub initial_uses: f64,
    pub factor: f64,
    pub flat: f64,
}

impl Default for ProgressBlock {
    fn default() -> Self {
        Self {
            uses: 0.0,
            initial_uses: 0.0,
            factor: 1.0,
            flat: 0.0,
        }
    }
}

/// One configured unlock: reaching `level` grants a copy of the referenced
/// item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnlockRef {
    #[serde(alias = "lvl")]
    pub level: f64,
    /// Opaque reference to the item to grant (resolved by the host).
    #[serde(alias = "uuid")]
    pub item: String,
}

/// Combat block for combat skills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CombatBlock {
    pub weapon_type: String,
    pub damage_type: String,
    pub hit_mod: f64,
}

impl Default for CombatBlock {
    fn default() -> Self {
        Self {
            weapon_type: "ThrownAmmo".into(),
            damage_type: "none".into(),
            hit_mod: 0.0,
        }
    }
}

/// Spell block for spell/ritual/music abilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpellBlock {
    pub mana_cost: f64,
    pub source: String,
}

impl Default for SpellBlock {
    fn default() -> Self {
        Self {
            mana_cost: 0.0,
            source: "Radiant".into(),
        }
    }
}

/// Consumable/potion payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsumableSystem {
    pub quantity: f64,
    pub calories: f64,
    pub portions: f64,
}

impl Default for ConsumableSystem {
    fn default() -> Self {
        Self {
            quantity: 1.0,
            calories: 0.0,
            portions: 1.0,
        }
    }
}

/// Benefit-resist payload: which damage type it tracks and which requirement
/// ladder applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResistSystem {
    pub damage_type: String,
    pub mode: ResistMode,
}

impl Default for ResistSystem {
    fn default() -> Self {
        Self {
            damage_type: "None".into(),
            mode: ResistMode::Flat,
        }
    }
}

/// Which geometric requirement ladder a benefit-resist item climbs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResistMode {
    #[default]
    Flat,
    PerDice,
    PerLevel,
}

/// Status-effect payload (inert to the derivation; grouped by kind by the
/// host UI).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusEffectSystem {
    pub kind: String,
}

/// Currency payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencySystem {
    pub value: f64,
}

/// Achievement payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AchievementSystem {
    pub tags: String,
}
