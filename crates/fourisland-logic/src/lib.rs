//! Pure breeding and genetics logic for Four Island.
//!
//! This crate contains all game rules that are independent of storage,
//! clocks, or any runtime. Functions take plain data plus an injected
//! RNG and return results, making them unit-testable and reproducible
//! under a seeded generator.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`balance`] | Odds denominators, capacities, timers, the nature list |
//! | [`config`] | Genetics capability toggles and parent-boost multipliers |
//! | [`creature`] | Egg/creature data model, genders, stats, IV spreads |
//! | [`evolution`] | Evolution rule checks (candy, gender, retro coverage) |
//! | [`filters`] | Declarative keep/release filters over hatched creatures |
//! | [`genetics`] | Breeding: compatibility, inheritance, egg assembly |
//! | [`probability`] | Roll primitives (odds, IVs, nature, gender) |
//! | [`retro`] | Retro sprite catalog and the two-phase variant roll |
//! | [`species`] | Species table: egg groups, rarity, gender rates, rules |
//! | [`upgrades`] | Store catalog, costs, and per-level effect helpers |
//! | [`wild`] | Rarity-weighted wild species picks and wild egg rolls |

pub mod balance;
pub mod config;
pub mod creature;
pub mod evolution;
pub mod filters;
pub mod genetics;
pub mod probability;
pub mod retro;
pub mod species;
pub mod upgrades;
pub mod wild;
