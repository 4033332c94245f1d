//! Upgrade catalog and the per-level effects on the simulation knobs.
//!
//! Costs follow `floor(base * multiplier^level)` with no level cap. The
//! iv-inheritance level is carried in the save layout and read by the
//! breeding engine, but has no store row and cannot be bought.

use serde::{Deserialize, Serialize};

use crate::balance::{daycare, incubation};

/// Step-roll widening per eggStepsBoost level, applied to min and max.
pub const STEPS_PER_LEVEL: u32 = 3;
/// Tick-interval reduction per tickSpeedBoost level.
pub const TICK_REDUCTION_PER_LEVEL_MS: u64 = 25;

/// The purchasable upgrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpgradeKind {
    EggStepsBoost,
    TickSpeedBoost,
    EggSpeedBoost,
    EggCapacityBoost,
}

/// Pricing row for one upgrade.
#[derive(Debug, Clone, Copy)]
pub struct UpgradeSpec {
    pub display_name: &'static str,
    pub base_cost: u64,
    pub cost_multiplier: f64,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 4] = [
        UpgradeKind::EggStepsBoost,
        UpgradeKind::TickSpeedBoost,
        UpgradeKind::EggSpeedBoost,
        UpgradeKind::EggCapacityBoost,
    ];

    pub fn spec(self) -> UpgradeSpec {
        match self {
            UpgradeKind::EggStepsBoost => UpgradeSpec {
                display_name: "Egg Steps Boost",
                base_cost: 150,
                cost_multiplier: 1.8,
            },
            UpgradeKind::TickSpeedBoost => UpgradeSpec {
                display_name: "Tick Speed Boost",
                base_cost: 200,
                cost_multiplier: 1.9,
            },
            UpgradeKind::EggSpeedBoost => UpgradeSpec {
                display_name: "Breeding Speed",
                base_cost: 250,
                cost_multiplier: 1.85,
            },
            UpgradeKind::EggCapacityBoost => UpgradeSpec {
                display_name: "Egg Capacity",
                base_cost: 300,
                cost_multiplier: 1.75,
            },
        }
    }

    /// Price of the next level when `level` are already owned.
    pub fn cost_at(self, level: u32) -> u64 {
        let spec = self.spec();
        (spec.base_cost as f64 * spec.cost_multiplier.powi(level as i32)).floor() as u64
    }
}

/// Owned upgrade levels, persisted under the `upgrades` key.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeLevels {
    #[serde(default)]
    pub egg_steps_boost: u32,
    #[serde(default)]
    pub tick_speed_boost: u32,
    #[serde(default)]
    pub egg_speed_boost: u32,
    #[serde(default)]
    pub egg_capacity_boost: u32,
    #[serde(default)]
    pub iv_inheritance_boost: u32,
}

impl UpgradeLevels {
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::EggStepsBoost => self.egg_steps_boost,
            UpgradeKind::TickSpeedBoost => self.tick_speed_boost,
            UpgradeKind::EggSpeedBoost => self.egg_speed_boost,
            UpgradeKind::EggCapacityBoost => self.egg_capacity_boost,
        }
    }

    pub fn bump(&mut self, kind: UpgradeKind) {
        match kind {
            UpgradeKind::EggStepsBoost => self.egg_steps_boost += 1,
            UpgradeKind::TickSpeedBoost => self.tick_speed_boost += 1,
            UpgradeKind::EggSpeedBoost => self.egg_speed_boost += 1,
            UpgradeKind::EggCapacityBoost => self.egg_capacity_boost += 1,
        }
    }

    /// Inclusive step-roll bounds with the steps boost applied.
    pub fn step_range(&self) -> (u32, u32) {
        let boost = self.egg_steps_boost * STEPS_PER_LEVEL;
        (
            incubation::STEPS_PER_TICK_MIN + boost,
            incubation::STEPS_PER_TICK_MAX + boost,
        )
    }

    /// Midpoint step yield, the per-tick figure offline catch-up uses.
    pub fn average_steps_per_tick(&self) -> u32 {
        let (min, max) = self.step_range();
        (min + max) / 2
    }

    /// Incubator tick interval with the speed boost applied, floored at
    /// the minimum interval.
    pub fn tick_interval_ms(&self) -> u64 {
        let reduction = u64::from(self.tick_speed_boost) * TICK_REDUCTION_PER_LEVEL_MS;
        incubation::TICK_INTERVAL_MS
            .saturating_sub(reduction)
            .max(incubation::MIN_TICK_INTERVAL_MS)
    }

    /// Daycare egg queue capacity with the capacity boost applied.
    pub fn daycare_capacity(&self) -> usize {
        daycare::MAX_EGGS + self.egg_capacity_boost as usize
    }
}
