//! # sheetstat - Deterministic Derived-Stats Engine for Character Sheets
//!
//! A derived-stats computation engine for tabletop-RPG character sheets
//! that provides:
//! - **Deterministic** derivation (same input → same output)
//! - **Pure** evaluation (inputs are read-only snapshots, nothing is
//!   written back)
//! - **Idempotent** re-evaluation (re-deriving from the same raw data
//!   reproduces the same sheet)
//! - **Never-fatal** behavior (malformed input coerces, unresolvable
//!   references skip)
//!
//! ## Core Concepts
//!
//! ### Derivation Pipeline
//!
//! Raw stored data flows through a fixed pipeline:
//!
//! ```text
//! [Character + Items] → [Aggregation] → [Banding] → [Modifier Overlay] → [DerivedSheet]
//! ```
//!
//! 1. **Aggregation** sums ability columns (race base, level, gear, misc,
//!    temp) into totals
//! 2. **Banding** maps totals to tier outputs (HP multiplier, movement
//!    boost, damage dice)
//! 3. **Overlay** applies externally supplied modifiers onto the working
//!    tables via typed addressing
//! 4. **DerivedSheet** carries every displayed number, recomputed from
//!    scratch per evaluation
//!
//! The damage-history reducer and the ability-progression deriver run as
//! side pipelines feeding the same output.
//!
//! ## Example
//!
//! ```rust
//! use sheetstat::{derive_character, Character, EngineConfig};
//!
//! let raw: Character = serde_json::from_str(
//!     r#"{"xp": 350, "abilities": {"con": {"level": 25}}}"#,
//! ).unwrap();
//!
//! let sheet = derive_character(&raw, &[], &[], &EngineConfig::default());
//! assert_eq!(sheet.level, 3);             // 350 XP is past the 300 threshold
//! assert_eq!(sheet.defenses.health.max, 30.0); // 25 CON + 25 * 0.2
//! ```
//!
//! ## Modules
//!
//! - [`ability`] - Ability keys and per-ability score columns
//! - [`character`] - Raw character input tree and table normalizers
//! - [`item`] - Polymorphic owned items
//! - [`config`] - Injectable closed configuration sets
//! - [`leveling`] - Cumulative-XP level table
//! - [`band`] - Banding step functions
//! - [`modifier`] - Typed modifier overlay
//! - [`aggregate`] - Ability-total aggregation
//! - [`defense`] - AC, pools, movement, damage dice
//! - [`progression`] - Ability-item leveling and unlocks
//! - [`history`] - Damage-history reduction and resistance tiers
//! - [`derive`] - The pipeline entry point
//! - [`error`] - Error types

pub mod ability;
pub mod aggregate;
pub mod band;
pub mod character;
pub mod config;
pub mod defense;
pub mod derive;
pub mod error;
pub mod history;
pub mod item;
pub mod leveling;
pub mod modifier;
pub mod progression;

// Re-export main types for convenience
pub use ability::{Abilities, AbilityKey, AbilityScore, PerAbility};
pub use character::Character;
pub use config::EngineConfig;
pub use derive::{derive_character, DerivedSheet};
pub use error::KeyParseError;
pub use item::Item;
pub use leveling::{LevelTable, XpProgress};
pub use modifier::{Modifier, ModifierMode, ModifierTarget};

// Re-export the main derived blocks
pub use aggregate::StatBlock;
pub use defense::Defenses;
pub use history::DamageBuckets;
pub use progression::AbilitySummary;
