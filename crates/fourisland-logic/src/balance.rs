//! Balance constants - incubation pacing, odds denominators, capacities.
//!
//! These are plain constants with no storage or clock dependency.
//! Both the session engines and the native simtest read these.

pub mod incubation {
    /// Inclusive bounds of the per-tick step roll, before upgrades.
    pub const STEPS_PER_TICK_MIN: u32 = 20;
    pub const STEPS_PER_TICK_MAX: u32 = 45;
    /// Base delay between incubator ticks.
    pub const TICK_INTERVAL_MS: u64 = 1000;
    /// The tick interval never drops below this, whatever the upgrade level.
    pub const MIN_TICK_INTERVAL_MS: u64 = 250;
    /// Incubator slots.
    pub const CAPACITY: usize = 6;
    /// Each hatch pays one rare candy with probability 1 in this.
    pub const RARE_CANDY_CHANCE: u32 = 20;
}

pub mod odds {
    /// Base shiny roll denominator.
    pub const SHINY: u32 = 8192;
    /// Base alpha roll denominator.
    pub const ALPHA: u32 = 1000;
    /// A shiny hatch upgrades to square shiny at 1 in this.
    pub const SQUARE_SHINY: u32 = 16;
}

pub mod storage {
    pub const PC_CAPACITY: usize = 1200;
    pub const BOX_SIZE: usize = 30;
}

pub mod wild {
    /// Wild roll weights by rarity tier. Special carries no weight and
    /// never hatches from a wild egg.
    pub const COMMON_WEIGHT: u32 = 50;
    pub const UNCOMMON_WEIGHT: u32 = 30;
    pub const RARE_WEIGHT: u32 = 10;
}

pub mod daycare {
    /// Egg queue capacity before eggCapacityBoost levels.
    pub const MAX_EGGS: usize = 10;
    /// Base breeding timers, keyed by average parent rarity rank.
    pub const EGG_TIMER_COMMON_MS: u64 = 30_000;
    pub const EGG_TIMER_UNCOMMON_MS: u64 = 45_000;
    pub const EGG_TIMER_RARE_MS: u64 = 60_000;
    pub const EGG_TIMER_SPECIAL_MS: u64 = 120_000;
    /// Each eggSpeedBoost level multiplies the timer by this.
    pub const EGG_SPEED_MULTIPLIER: f64 = 0.9;
    /// IV slots inherited from the parents, before ivInheritanceBoost levels.
    pub const INHERITED_IV_COUNT: usize = 3;

    /// Base timer for an average rarity rank (1..=4). Ranks past the
    /// special tier clamp to the special timer.
    pub fn base_timer_ms(avg_rank: u8) -> u64 {
        match avg_rank {
            0 | 1 => EGG_TIMER_COMMON_MS,
            2 => EGG_TIMER_UNCOMMON_MS,
            3 => EGG_TIMER_RARE_MS,
            _ => EGG_TIMER_SPECIAL_MS,
        }
    }
}

/// Highest value a single IV can take.
pub const MAX_IV: u8 = 31;

/// The fixed nature list. Hatch rolls pick uniformly from this.
pub const NATURES: [&str; 25] = [
    "Hardy", "Bold", "Modest", "Calm", "Timid", "Lonely", "Docile", "Mild", "Gentle", "Hasty",
    "Brave", "Relaxed", "Quiet", "Sassy", "Careful", "Serious", "Jolly", "Naive", "Bashful",
    "Quirky", "Adamant", "Impish", "Lax", "Rash", "Naughty",
];
