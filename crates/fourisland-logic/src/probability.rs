//! Probability primitives behind every genetic roll.
//!
//! Two roll shapes exist on purpose. Wild generation uses the plain
//! `1 in N` integer roll; inheritance uses a real-valued chance so parent
//! multipliers can scale it, clamped so boosted odds never exceed
//! certainty. Callers pass their own `Rng`, which keeps every path
//! reproducible under a seeded generator.

use rand::Rng;

use crate::balance::{MAX_IV, NATURES};
use crate::creature::{Gender, IvSpread, Stat};

/// Plain `1 in denominator` roll.
pub fn roll_one_in(rng: &mut impl Rng, denominator: u32) -> bool {
    rng.gen_range(0..denominator) == 0
}

/// Bernoulli roll at `multiplier / denominator`, clamped to certainty.
pub fn roll_odds(rng: &mut impl Rng, denominator: u32, multiplier: f64) -> bool {
    let chance = (multiplier / f64::from(denominator)).min(1.0);
    rng.gen::<f64>() < chance
}

/// Six independent uniform IVs over the full 0-31 domain.
pub fn roll_ivs(rng: &mut impl Rng) -> IvSpread {
    let mut ivs = IvSpread::default();
    for stat in Stat::ALL {
        ivs.set(stat, rng.gen_range(0..=MAX_IV));
    }
    ivs
}

/// Uniform pick from the fixed nature list.
pub fn roll_nature(rng: &mut impl Rng) -> &'static str {
    NATURES[rng.gen_range(0..NATURES.len())]
}

/// Gender from a species gender rate: negative is genderless, 0 and 100
/// are fixed, anything else is the percent chance of male.
pub fn roll_gender(rng: &mut impl Rng, gender_rate: i8) -> Gender {
    if gender_rate < 0 {
        return Gender::Genderless;
    }
    match gender_rate {
        0 => Gender::Female,
        100 => Gender::Male,
        rate => {
            if rng.gen::<f64>() * 100.0 < f64::from(rate) {
                Gender::Male
            } else {
                Gender::Female
            }
        }
    }
}
