//! Breeding capability configuration - which inheritance features run and
//! how strongly trait-carrying parents boost the rolls.
//!
//! The breeding routines take this by reference instead of probing for
//! globals, so a caller can hand in a trimmed-down config (or
//! `GeneticsConfig::bare()`) and every feature degrades to the plain wild
//! roll on its own.

use serde::{Deserialize, Serialize};

/// Boost applied to a 1-in-N roll depending on how many parents carry the
/// trait being rolled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TraitBoost {
    pub enabled: bool,
    /// Odds multiplier when exactly one parent carries the trait.
    pub one_parent: f64,
    /// Odds multiplier when both parents carry it.
    pub two_parents: f64,
}

impl TraitBoost {
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            one_parent: 1.0,
            two_parents: 1.0,
        }
    }

    /// Multiplier for the given number of trait-carrying parents.
    pub fn multiplier(&self, carriers: usize) -> f64 {
        if !self.enabled {
            return 1.0;
        }
        match carriers {
            0 => 1.0,
            1 => self.one_parent,
            _ => self.two_parents,
        }
    }
}

/// Nature inheritance settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NatureInheritance {
    pub enabled: bool,
    /// Percent chance the offspring copies a nature both parents share.
    pub match_chance: f64,
}

impl NatureInheritance {
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            match_chance: 0.0,
        }
    }
}

/// Which inheritance features the breeding system runs. A disabled feature
/// falls back to the same roll a wild egg gets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticsConfig {
    pub shiny: TraitBoost,
    pub alpha: TraitBoost,
    pub nature: NatureInheritance,
    pub retro: TraitBoost,
}

impl GeneticsConfig {
    /// Everything off. Breeding still resolves species, gender and IVs,
    /// but no trait gets a parent boost.
    pub const fn bare() -> Self {
        Self {
            shiny: TraitBoost::disabled(),
            alpha: TraitBoost::disabled(),
            nature: NatureInheritance::disabled(),
            retro: TraitBoost::disabled(),
        }
    }
}

impl Default for GeneticsConfig {
    fn default() -> Self {
        Self {
            shiny: TraitBoost {
                enabled: true,
                one_parent: 2.0,
                two_parents: 10.0,
            },
            alpha: TraitBoost {
                enabled: true,
                one_parent: 2.0,
                two_parents: 10.0,
            },
            nature: NatureInheritance {
                enabled: true,
                match_chance: 100.0,
            },
            retro: TraitBoost {
                enabled: true,
                one_parent: 2.0,
                two_parents: 5.0,
            },
        }
    }
}
